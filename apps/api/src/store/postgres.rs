use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::course::CourseRow;
use crate::models::recommendation::{NewRecommendation, RecommendationRow};
use crate::models::scholarship::{NewScholarship, ScholarshipRow};
use crate::models::transcript::{TranscriptRow, TranscriptSummaryRow};
use crate::store::{Store, StoreError};

/// Payload is read back as text so the stored document reaches the engines unchanged.
const RECOMMENDATION_COLUMNS: &str =
    "id, owner, transcript_id, payload::text AS payload, summary, created_at";

/// `Store` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_transcript(&self, id: i64) -> Result<Option<TranscriptRow>, StoreError> {
        Ok(sqlx::query_as::<_, TranscriptRow>(
            "SELECT id, owner, filename, text_extracted, created_at FROM transcripts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_transcripts(
        &self,
        owner: &str,
    ) -> Result<Vec<TranscriptSummaryRow>, StoreError> {
        Ok(sqlx::query_as::<_, TranscriptSummaryRow>(
            r#"
            SELECT id, owner, filename, created_at
            FROM transcripts
            WHERE owner = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_all_courses(&self) -> Result<Vec<CourseRow>, StoreError> {
        Ok(sqlx::query_as::<_, CourseRow>(
            "SELECT id, code, name, learning_outcomes, course_link FROM courses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_recommendation(
        &self,
        params: NewRecommendation,
    ) -> Result<RecommendationRow, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO recommendations (owner, transcript_id, payload, summary)
            VALUES ($1, $2, $3::jsonb, $4)
            RETURNING {RECOMMENDATION_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(&params.owner)
            .bind(params.transcript_id)
            .bind(&params.payload)
            .bind(&params.summary)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_recommendation(
        &self,
        id: i64,
    ) -> Result<Option<RecommendationRow>, StoreError> {
        let sql = format!("SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE id = $1");
        Ok(sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_recommendation_payload(
        &self,
        id: i64,
        owner: &str,
        payload: &str,
    ) -> Result<Option<RecommendationRow>, StoreError> {
        let sql = format!(
            r#"
            UPDATE recommendations
            SET payload = $3::jsonb
            WHERE id = $1 AND owner = $2
            RETURNING {RECOMMENDATION_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(id)
            .bind(owner)
            .bind(payload)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_recommendations(
        &self,
        owner: &str,
    ) -> Result<Vec<RecommendationRow>, StoreError> {
        let sql = format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE owner = $1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_scholarship(
        &self,
        params: NewScholarship,
    ) -> Result<ScholarshipRow, StoreError> {
        Ok(sqlx::query_as::<_, ScholarshipRow>(
            r#"
            INSERT INTO scholarships (owner, title, description, match_score, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner, title, description, match_score, link, created_at
            "#,
        )
        .bind(&params.owner)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.match_score)
        .bind(&params.link)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_recent_scholarships(
        &self,
        owner: &str,
        limit: i64,
    ) -> Result<Vec<ScholarshipRow>, StoreError> {
        Ok(sqlx::query_as::<_, ScholarshipRow>(
            r#"
            SELECT id, owner, title, description, match_score, link, created_at
            FROM scholarships
            WHERE owner = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
