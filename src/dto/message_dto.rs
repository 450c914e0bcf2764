use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::student_dto::CompanyBrief;
use crate::models::message::Message;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessagePayload {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanySendMessagePayload {
    pub student_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// One conversation as the student's inbox shows it: newest thread
/// first, unread counted across the whole thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub company: CompanyBrief,
    pub messages: Vec<Message>,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyMessageRow {
    pub id: Uuid,
    pub student_name: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StudentMessagesQuery {
    pub company_id: Option<Uuid>,
}
