//! In-memory `Store` used by unit tests, with switches to inject failures.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::models::course::CourseRow;
use crate::models::recommendation::{NewRecommendation, RecommendationRow};
use crate::models::scholarship::{NewScholarship, ScholarshipRow};
use crate::models::transcript::{TranscriptRow, TranscriptSummaryRow};
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    transcripts: Vec<TranscriptRow>,
    courses: Vec<CourseRow>,
    recommendations: Vec<RecommendationRow>,
    scholarships: Vec<ScholarshipRow>,
    next_id: i64,
    clock: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_scholarship_titles: Mutex<HashSet<String>>,
    fail_scholarship_reads: Mutex<bool>,
    fail_course_reads: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn add_transcript(&self, owner: &str, text: Option<&str>) -> i64 {
        let mut t = self.tables();
        let (id, created_at) = t.allocate();
        t.transcripts.push(TranscriptRow {
            id,
            owner: owner.to_string(),
            filename: format!("transcript_{id}.pdf"),
            text_extracted: text.map(String::from),
            created_at,
        });
        id
    }

    pub fn add_course(&self, code: &str, name: &str, link: Option<&str>) -> i64 {
        let mut t = self.tables();
        let (id, _) = t.allocate();
        t.courses.push(CourseRow {
            id,
            code: code.to_string(),
            name: name.to_string(),
            learning_outcomes: Some(format!("Learning outcomes for {name}")),
            course_link: link.map(String::from),
        });
        id
    }

    pub fn add_recommendation(
        &self,
        owner: &str,
        transcript_id: Option<i64>,
        payload: &str,
    ) -> i64 {
        let mut t = self.tables();
        let (id, created_at) = t.allocate();
        t.recommendations.push(RecommendationRow {
            id,
            owner: owner.to_string(),
            transcript_id,
            payload: payload.to_string(),
            summary: None,
            created_at,
        });
        id
    }

    pub fn add_scholarship(&self, owner: &str, title: &str, score: Option<f64>) -> i64 {
        let mut t = self.tables();
        let (id, created_at) = t.allocate();
        t.scholarships.push(ScholarshipRow {
            id,
            owner: owner.to_string(),
            title: title.to_string(),
            description: Some(format!("About {title}")),
            match_score: score,
            link: Some(format!("https://example.org/{id}")),
            created_at,
        });
        id
    }

    pub fn fail_scholarship_title(&self, title: &str) {
        self.failing_scholarship_titles
            .lock()
            .unwrap()
            .insert(title.to_string());
    }

    pub fn fail_scholarship_reads(&self) {
        *self.fail_scholarship_reads.lock().unwrap() = true;
    }

    pub fn fail_course_reads(&self) {
        *self.fail_course_reads.lock().unwrap() = true;
    }

    pub fn recommendations(&self) -> Vec<RecommendationRow> {
        self.tables().recommendations.clone()
    }

    pub fn scholarships(&self) -> Vec<ScholarshipRow> {
        self.tables().scholarships.clone()
    }

    pub fn payload_of(&self, id: i64) -> Option<String> {
        self.tables()
            .recommendations
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.payload.clone())
    }
}

impl Tables {
    /// Ids and timestamps both increase monotonically so "newest" is well defined.
    fn allocate(&mut self) -> (i64, chrono::DateTime<Utc>) {
        self.next_id += 1;
        self.clock += 1;
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (self.next_id, epoch + Duration::seconds(self.clock))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_transcript(&self, id: i64) -> Result<Option<TranscriptRow>, StoreError> {
        Ok(self.tables().transcripts.iter().find(|t| t.id == id).cloned())
    }

    async fn list_transcripts(
        &self,
        owner: &str,
    ) -> Result<Vec<TranscriptSummaryRow>, StoreError> {
        let mut rows: Vec<_> = self
            .tables()
            .transcripts
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| TranscriptSummaryRow {
                id: t.id,
                owner: t.owner.clone(),
                filename: t.filename.clone(),
                created_at: t.created_at,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_all_courses(&self) -> Result<Vec<CourseRow>, StoreError> {
        if *self.fail_course_reads.lock().unwrap() {
            return Err(StoreError::Unavailable("courses offline".into()));
        }
        Ok(self.tables().courses.clone())
    }

    async fn create_recommendation(
        &self,
        params: NewRecommendation,
    ) -> Result<RecommendationRow, StoreError> {
        let mut t = self.tables();
        let (id, created_at) = t.allocate();
        let row = RecommendationRow {
            id,
            owner: params.owner,
            transcript_id: params.transcript_id,
            payload: params.payload,
            summary: params.summary,
            created_at,
        };
        t.recommendations.push(row.clone());
        Ok(row)
    }

    async fn get_recommendation(
        &self,
        id: i64,
    ) -> Result<Option<RecommendationRow>, StoreError> {
        Ok(self
            .tables()
            .recommendations
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update_recommendation_payload(
        &self,
        id: i64,
        owner: &str,
        payload: &str,
    ) -> Result<Option<RecommendationRow>, StoreError> {
        let mut t = self.tables();
        let updated = t
            .recommendations
            .iter_mut()
            .find(|r| r.id == id && r.owner == owner)
            .map(|r| {
                r.payload = payload.to_string();
                r.clone()
            });
        Ok(updated)
    }

    async fn list_recommendations(
        &self,
        owner: &str,
    ) -> Result<Vec<RecommendationRow>, StoreError> {
        let mut rows: Vec<_> = self
            .tables()
            .recommendations
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_scholarship(
        &self,
        params: NewScholarship,
    ) -> Result<ScholarshipRow, StoreError> {
        if self
            .failing_scholarship_titles
            .lock()
            .unwrap()
            .contains(&params.title)
        {
            return Err(StoreError::Unavailable(format!(
                "rejected scholarship '{}'",
                params.title
            )));
        }
        let mut t = self.tables();
        let (id, created_at) = t.allocate();
        let row = ScholarshipRow {
            id,
            owner: params.owner,
            title: params.title,
            description: params.description,
            match_score: params.match_score,
            link: params.link,
            created_at,
        };
        t.scholarships.push(row.clone());
        Ok(row)
    }

    async fn list_recent_scholarships(
        &self,
        owner: &str,
        limit: i64,
    ) -> Result<Vec<ScholarshipRow>, StoreError> {
        if *self.fail_scholarship_reads.lock().unwrap() {
            return Err(StoreError::Unavailable("scholarships offline".into()));
        }
        let mut rows: Vec<_> = self
            .tables()
            .scholarships
            .iter()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
