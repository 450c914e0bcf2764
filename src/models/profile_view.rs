use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (student, company) per calendar day, deduped at write time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileView {
    pub id: Uuid,
    pub student_id: Uuid,
    pub company_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}
