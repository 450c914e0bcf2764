use std::collections::HashMap;

use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::message_dto::{CompanyMessageRow, ThreadSummary};
use crate::dto::student_dto::CompanyBrief;
use crate::error::Result;
use crate::models::message::{Message, MessageSender};
use crate::utils::time;

/// Identical (sender, content) messages inside this window return the
/// prior row instead of inserting. A heuristic, not a transactional
/// guarantee: two near-simultaneous sends can still double-insert.
const DEDUP_WINDOW_MINUTES: i64 = 5;

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn send(
        &self,
        student_id: Uuid,
        company_id: Uuid,
        sender: MessageSender,
        content: &str,
    ) -> Result<Message> {
        let window_start = time::now() - Duration::minutes(DEDUP_WINDOW_MINUTES);
        let recent_duplicate = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, student_id, company_id, sender, content, sent_at, is_read
            FROM messages
            WHERE student_id = $1 AND company_id = $2 AND sender = $3 AND content = $4
              AND sent_at >= $5
            ORDER BY sent_at DESC
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .bind(company_id)
        .bind(sender)
        .bind(content)
        .bind(window_start)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(message) = recent_duplicate {
            return Ok(message);
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (student_id, company_id, sender, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, student_id, company_id, sender, content, sent_at, is_read
            "#,
        )
        .bind(student_id)
        .bind(company_id)
        .bind(sender)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Per-company thread summaries for the student's inbox, newest
    /// thread first.
    pub async fn student_threads(&self, student_id: Uuid) -> Result<Vec<ThreadSummary>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, student_id, company_id, sender, content, sent_at, is_read
            FROM messages
            WHERE student_id = $1
            ORDER BY sent_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let company_ids: Vec<Uuid> = messages.iter().map(|m| m.company_id).collect();
        let companies = sqlx::query_as::<_, CompanyBrief>(
            "SELECT id, name, logo_url FROM companies WHERE id = ANY($1)",
        )
        .bind(&company_ids)
        .fetch_all(&self.pool)
        .await?;
        let companies: HashMap<Uuid, CompanyBrief> =
            companies.into_iter().map(|c| (c.id, c)).collect();

        Ok(group_threads(messages, &companies))
    }

    pub async fn conversation(&self, student_id: Uuid, company_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, student_id, company_id, sender, content, sent_at, is_read
            FROM messages
            WHERE student_id = $1 AND company_id = $2
            ORDER BY sent_at ASC
            "#,
        )
        .bind(student_id)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn mark_thread_read(&self, student_id: Uuid, company_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE student_id = $1 AND company_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(student_id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn company_inbox(&self, company_id: Uuid) -> Result<Vec<CompanyMessageRow>> {
        let rows = sqlx::query_as::<_, CompanyMessageRow>(
            r#"
            SELECT m.id, s.name AS student_name, m.content, m.sent_at, m.is_read
            FROM messages m
            JOIN students s ON m.student_id = s.id
            WHERE m.company_id = $1
            ORDER BY m.sent_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Groups a DESC-ordered message list into per-company threads. First
/// occurrence order is thread recency order, so the result is already
/// newest-thread-first.
fn group_threads(
    messages: Vec<Message>,
    companies: &HashMap<Uuid, CompanyBrief>,
) -> Vec<ThreadSummary> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut threads: HashMap<Uuid, ThreadSummary> = HashMap::new();

    for message in messages {
        let company_id = message.company_id;
        let entry = threads.entry(company_id).or_insert_with(|| {
            order.push(company_id);
            ThreadSummary {
                company: companies.get(&company_id).cloned().unwrap_or(CompanyBrief {
                    id: company_id,
                    name: "Unknown Company".to_string(),
                    logo_url: None,
                }),
                messages: Vec::new(),
                last_message: None,
                unread_count: 0,
            }
        });

        if !message.is_read {
            entry.unread_count += 1;
        }
        if entry
            .last_message
            .as_ref()
            .map(|last| message.sent_at > last.sent_at)
            .unwrap_or(true)
        {
            entry.last_message = Some(message.clone());
        }
        entry.messages.push(message);
    }

    order
        .into_iter()
        .filter_map(|id| threads.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(company_id: Uuid, minutes_ago: i64, is_read: bool) -> Message {
        Message {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            company_id,
            sender: MessageSender::Student,
            content: "hello".to_string(),
            sent_at: Utc.with_ymd_and_hms(2025, 3, 6, 12, 0, 0).unwrap()
                - Duration::minutes(minutes_ago),
            is_read,
        }
    }

    #[test]
    fn groups_by_company_newest_thread_first() {
        let acme = Uuid::new_v4();
        let globex = Uuid::new_v4();
        // DESC order, as the query returns them.
        let messages = vec![
            message(acme, 1, false),
            message(globex, 5, true),
            message(acme, 10, true),
        ];
        let companies = HashMap::new();

        let threads = group_threads(messages, &companies);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].company.id, acme);
        assert_eq!(threads[0].messages.len(), 2);
        assert_eq!(threads[1].company.id, globex);
    }

    #[test]
    fn counts_unread_and_picks_latest_message() {
        let acme = Uuid::new_v4();
        let messages = vec![
            message(acme, 1, false),
            message(acme, 2, false),
            message(acme, 3, true),
        ];
        let newest_at = messages[0].sent_at;

        let threads = group_threads(messages, &HashMap::new());
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].unread_count, 2);
        assert_eq!(threads[0].last_message.as_ref().unwrap().sent_at, newest_at);
    }
}
