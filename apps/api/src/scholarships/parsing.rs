//! Decoding of scholarship replies.
//!
//! Models do not reliably honour the requested shape, so the reply is tried
//! against an ordered chain of decoders. Each tier only counts as a hit when
//! it produces at least one item.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::parse_json_reply;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipRecommendation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "match", default)]
    pub match_score: f64,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct ScholarshipEnvelope {
    #[serde(default)]
    scholarships: Vec<ScholarshipRecommendation>,
}

type Tier = fn(&str) -> Option<Vec<ScholarshipRecommendation>>;

const TIERS: [(&str, Tier); 3] = [
    ("bare array", parse_bare_array),
    ("wrapper object", parse_wrapper),
    ("bracket extraction", parse_bracket_extract),
];

/// Runs the tiers in order and returns the first non-empty result.
pub fn parse_scholarships(raw: &str) -> Vec<ScholarshipRecommendation> {
    for (name, tier) in TIERS {
        if let Some(items) = tier(raw) {
            debug!("Scholarship reply decoded via {name} ({} items)", items.len());
            return items;
        }
    }
    debug!("Scholarship reply matched no known shape");
    Vec::new()
}

/// `[ {...}, ... ]`
pub fn parse_bare_array(raw: &str) -> Option<Vec<ScholarshipRecommendation>> {
    parse_json_reply::<Vec<ScholarshipRecommendation>>(raw)
        .ok()
        .filter(|items| !items.is_empty())
}

/// `{"scholarships": [ ... ]}`
pub fn parse_wrapper(raw: &str) -> Option<Vec<ScholarshipRecommendation>> {
    parse_json_reply::<ScholarshipEnvelope>(raw)
        .ok()
        .map(|envelope| envelope.scholarships)
        .filter(|items| !items.is_empty())
}

/// The text between the first `[` and the last `]`, decoded as an array.
/// Recovers arrays embedded in prose.
pub fn parse_bracket_extract(raw: &str) -> Option<Vec<ScholarshipRecommendation>> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<ScholarshipRecommendation>>(&raw[start..=end])
        .ok()
        .filter(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"{"title":"AI Grant","description":"For AI","match":88,"link":"https://grant.org"}"#;

    #[test]
    fn test_bare_array_tier() {
        let raw = format!("[{ITEM}]");
        let items = parse_bare_array(&raw).unwrap();
        assert_eq!(items[0].title, "AI Grant");
        assert_eq!(items[0].match_score, 88.0);
        assert!(parse_bare_array("[]").is_none());
        assert!(parse_bare_array(&format!(r#"{{"scholarships":[{ITEM}]}}"#)).is_none());
    }

    #[test]
    fn test_wrapper_tier() {
        let raw = format!(r#"{{"scholarships":[{ITEM}]}}"#);
        assert_eq!(parse_wrapper(&raw).unwrap().len(), 1);
        assert!(parse_wrapper(r#"{"scholarships":[]}"#).is_none());
        assert!(parse_wrapper(r#"{"results":[]}"#).is_none());
    }

    #[test]
    fn test_bracket_tier_recovers_array_from_prose() {
        let raw = format!("Here are some options: [{ITEM}] Good luck!");
        let items = parse_bracket_extract(&raw).unwrap();
        assert_eq!(items[0].link, "https://grant.org");
        assert!(parse_bracket_extract("] backwards [").is_none());
        assert!(parse_bracket_extract("no brackets at all").is_none());
    }

    #[test]
    fn test_chain_falls_through_in_order() {
        assert_eq!(parse_scholarships(&format!("[{ITEM}]")).len(), 1);
        assert_eq!(
            parse_scholarships(&format!(r#"{{"scholarships":[{ITEM},{ITEM}]}}"#)).len(),
            2
        );
        assert_eq!(parse_scholarships(&format!("Sure! [{ITEM}]")).len(), 1);
        assert!(parse_scholarships("I could not find any scholarships.").is_empty());
    }

    #[test]
    fn test_unknown_wrapper_key_is_recovered_by_bracket_tier() {
        // Decodes as an envelope with no `scholarships`, so the wrapper tier misses.
        let raw = format!(r#"{{"results":[{ITEM}]}}"#);
        assert!(parse_bare_array(&raw).is_none());
        assert!(parse_wrapper(&raw).is_none());
        assert_eq!(parse_scholarships(&raw).len(), 1);
    }
}
