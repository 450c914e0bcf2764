use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::ApplicationStatus;
use crate::models::interview::Interview;
use crate::models::job::{Job, JobType};
use crate::models::student::Student;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStudentProfilePayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub major: Option<String>,
    #[validate(range(min = 0.0, max = 4.0))]
    pub gpa: Option<f64>,
    pub year: Option<String>,
    pub skills: Option<Vec<String>>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub phone: Option<String>,
    pub resume_pdf_url: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyBrief {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobBrief {
    pub id: Uuid,
    pub title: String,
    pub job_type: JobType,
    pub location: String,
}

/// An application as the student sees it: company and job embedded,
/// interviews soonest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithContext {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub cover_letter: Option<String>,
    pub notes: Option<String>,
    pub company: CompanyBrief,
    pub job: JobBrief,
    pub interviews: Vec<Interview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfileResponse {
    #[serde(flatten)]
    pub student: Student,
    pub applications: Vec<ApplicationWithContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub total_applications: i64,
    pub upcoming_interviews: i64,
    pub unread_messages: i64,
    pub applications_by_status: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompanySearchQuery {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub position: Option<String>,
    pub job_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySearchHit {
    #[serde(flatten)]
    pub company: crate::models::company::Company,
    pub active_jobs: usize,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetailsResponse {
    #[serde(flatten)]
    pub company: crate::models::company::Company,
    pub jobs: Vec<Job>,
    pub my_applications: Vec<ApplicationWithContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    pub job_id: Uuid,
    pub company_id: Uuid,
    #[validate(length(max = 2000))]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewWithContext {
    #[serde(flatten)]
    pub interview: Interview,
    pub company: CompanyBrief,
    pub job: JobBrief,
}
