use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::student_dto::JobBrief;
use crate::models::application::ApplicationStatus;
use crate::models::company::Company;
use crate::models::job::{Job, JobType};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyProfilePayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub size: Option<String>,
    #[validate(range(min = 1800, max = 2100))]
    pub founded_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentBrief {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// An application as the company sees it on its profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithStudent {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub cover_letter: Option<String>,
    pub notes: Option<String>,
    pub student: StudentBrief,
    pub job: JobBrief,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfileResponse {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
    pub applications: Vec<ApplicationWithStudent>,
}

/// Flat row for the company's applications table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyApplicationRow {
    pub id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanyCreateApplicationPayload {
    pub student_id: Uuid,
    pub job_id: Uuid,
    #[validate(length(max = 2000))]
    pub cover_letter: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateApplicationStatusPayload {
    pub status: ApplicationStatus,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StudentFilterQuery {
    pub search: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    /// Comma-separated list; matched by array containment.
    pub skills: Option<String>,
    pub min_gpa: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub salary: Option<String>,
    #[validate(length(min = 1))]
    pub location: String,
    pub job_type: JobType,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub salary: Option<String>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInterviewPayload {
    pub application_id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: i32,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiringSeries {
    pub labels: Vec<String>,
    pub hired: Vec<i64>,
    pub interviewing: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSummary {
    pub total_applications: i64,
    pub interviews_scheduled: i64,
    pub pending_reviews: i64,
    pub offers_extended: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub application_data: ChartSeries,
    pub hiring_data: HiringSeries,
    pub visitor_data: ChartSeries,
    pub summary: ChartSummary,
}
