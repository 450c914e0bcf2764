use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::company_dto::{
    ApplicationWithStudent, CompanyApplicationRow, CompanyCreateApplicationPayload,
    CompanyProfileResponse, CreateInterviewPayload, CreateJobPayload, StudentBrief,
    StudentFilterQuery, UpdateApplicationStatusPayload, UpdateCompanyProfilePayload,
    UpdateJobPayload,
};
use crate::dto::student_dto::JobBrief;
use crate::error::{is_unique_violation, Error, Result};
use crate::models::account::Account;
use crate::models::application::ApplicationStatus;
use crate::models::company::Company;
use crate::models::interview::Interview;
use crate::models::job::{Job, JobType};
use crate::models::student::Student;

const COMPANY_COLUMNS: &str = "id, name, email, industry, location, description, logo_url, \
     website, size, founded_year, created_at, updated_at";

const JOB_COLUMNS: &str = "id, company_id, title, description, requirements, salary, location, \
     job_type, is_active, created_at, updated_at";

const STUDENT_COLUMNS: &str = "id, name, email, major, year, gpa, skills, bio, linkedin, github, \
     phone, resume_pdf_url, profile_image_url, created_at, updated_at";

const INTERVIEW_COLUMNS: &str = "id, application_id, student_id, company_id, title, description, \
     scheduled_at, duration_minutes, meeting_link, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ApplicationStudentRow {
    id: Uuid,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
    cover_letter: Option<String>,
    notes: Option<String>,
    student_id: Uuid,
    student_name: String,
    student_email: String,
    job_id: Uuid,
    job_title: String,
    job_type: JobType,
    job_location: String,
}

impl From<ApplicationStudentRow> for ApplicationWithStudent {
    fn from(row: ApplicationStudentRow) -> Self {
        ApplicationWithStudent {
            id: row.id,
            status: row.status,
            applied_at: row.applied_at,
            cover_letter: row.cover_letter,
            notes: row.notes,
            student: StudentBrief {
                id: row.student_id,
                name: row.student_name,
                email: row.student_email,
            },
            job: JobBrief {
                id: row.job_id,
                title: row.job_title,
                job_type: row.job_type,
                location: row.job_location,
            },
        }
    }
}

const APPLICATION_STUDENT_SELECT: &str = r#"
    SELECT a.id, a.status, a.applied_at, a.cover_letter, a.notes,
           s.id AS student_id, s.name AS student_name, s.email AS student_email,
           j.id AS job_id, j.title AS job_title, j.job_type, j.location AS job_location
    FROM applications a
    JOIN students s ON a.student_id = s.id
    JOIN jobs j ON a.job_id = j.id
"#;

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_or_create_profile(&self, account: &Account) -> Result<Company> {
        if let Some(company_id) = account.company_id {
            let existing = sqlx::query_as::<_, Company>(&format!(
                "SELECT {} FROM companies WHERE id = $1",
                COMPANY_COLUMNS
            ))
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(company) = existing {
                return Ok(company);
            }
        }

        let email = format!("{}@company.com", account.name);
        let existing = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE email = $1",
            COMPANY_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let company = match existing {
            Some(company) => company,
            None => {
                tracing::info!(account = %account.name, "creating company profile");
                sqlx::query_as::<_, Company>(&format!(
                    r#"
                    INSERT INTO companies (name, email, industry, location, description)
                    VALUES ($1, $2, 'Technology', 'Not specified', 'Welcome to our company!')
                    RETURNING {}
                    "#,
                    COMPANY_COLUMNS
                ))
                .bind(&account.name)
                .bind(&email)
                .fetch_one(&self.pool)
                .await?
            }
        };

        sqlx::query("UPDATE accounts SET company_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(company.id)
            .bind(account.id)
            .execute(&self.pool)
            .await?;

        Ok(company)
    }

    pub async fn get_profile(&self, company_id: Uuid) -> Result<CompanyProfileResponse> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Company profile not found".into()))?;

        let jobs = self.list_jobs(company_id).await?;

        let rows = sqlx::query_as::<_, ApplicationStudentRow>(&format!(
            "{} WHERE a.company_id = $1 ORDER BY a.applied_at DESC",
            APPLICATION_STUDENT_SELECT
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CompanyProfileResponse {
            company,
            jobs,
            applications: rows.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn update_profile(
        &self,
        company_id: Uuid,
        payload: UpdateCompanyProfilePayload,
    ) -> Result<Company> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            UPDATE companies
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                description = COALESCE($4, description),
                industry = COALESCE($5, industry),
                location = COALESCE($6, location),
                website = COALESCE($7, website),
                logo_url = COALESCE($8, logo_url),
                size = COALESCE($9, size),
                founded_year = COALESCE($10, founded_year),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(company_id)
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.description)
        .bind(payload.industry)
        .bind(payload.location)
        .bind(payload.website)
        .bind(payload.logo_url)
        .bind(payload.size)
        .bind(payload.founded_year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Company profile not found".into()))?;

        Ok(company)
    }

    pub async fn list_applications(&self, company_id: Uuid) -> Result<Vec<CompanyApplicationRow>> {
        let rows = sqlx::query_as::<_, CompanyApplicationRow>(
            r#"
            SELECT a.id, s.name AS student_name, s.email AS student_email,
                   j.title AS job_title, a.status, a.applied_at
            FROM applications a
            JOIN students s ON a.student_id = s.id
            JOIN jobs j ON a.job_id = j.id
            WHERE a.company_id = $1
            ORDER BY a.applied_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Direct creation by the company; the job must be one of its own.
    pub async fn create_application(
        &self,
        company_id: Uuid,
        payload: CompanyCreateApplicationPayload,
    ) -> Result<ApplicationWithStudent> {
        let job_owner = sqlx::query_scalar::<_, Uuid>("SELECT company_id FROM jobs WHERE id = $1")
            .bind(payload.job_id)
            .fetch_optional(&self.pool)
            .await?;
        if job_owner != Some(company_id) {
            return Err(Error::NotFound("Job not found".into()));
        }

        let student = sqlx::query_scalar::<_, Uuid>("SELECT id FROM students WHERE id = $1")
            .bind(payload.student_id)
            .fetch_optional(&self.pool)
            .await?;
        if student.is_none() {
            return Err(Error::NotFound("Student not found".into()));
        }

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM applications WHERE student_id = $1 AND job_id = $2",
        )
        .bind(payload.student_id)
        .bind(payload.job_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(
                "This student has already applied for this position".into(),
            ));
        }

        let status = payload.status.unwrap_or(ApplicationStatus::Applied);
        let application_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO applications (student_id, company_id, job_id, status, cover_letter, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(payload.student_id)
        .bind(company_id)
        .bind(payload.job_id)
        .bind(status)
        .bind(payload.cover_letter)
        .bind(payload.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::BadRequest("This student has already applied for this position".into())
            } else {
                Error::from(e)
            }
        })?;

        self.application_with_student(application_id).await
    }

    /// The only way an application moves through the pipeline: explicit
    /// company action. Any valid status value may be set.
    pub async fn update_application_status(
        &self,
        company_id: Uuid,
        application_id: Uuid,
        payload: UpdateApplicationStatusPayload,
    ) -> Result<ApplicationWithStudent> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE applications
            SET status = $3, notes = COALESCE($4, notes), updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING id
            "#,
        )
        .bind(application_id)
        .bind(company_id)
        .bind(payload.status)
        .bind(payload.notes)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_none() {
            return Err(Error::NotFound("Application not found".into()));
        }

        self.application_with_student(application_id).await
    }

    async fn application_with_student(
        &self,
        application_id: Uuid,
    ) -> Result<ApplicationWithStudent> {
        let row = sqlx::query_as::<_, ApplicationStudentRow>(&format!(
            "{} WHERE a.id = $1",
            APPLICATION_STUDENT_SELECT
        ))
        .bind(application_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn filter_students(&self, query: StudentFilterQuery) -> Result<Vec<Student>> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(name ILIKE ${} OR major ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }
        if let Some(major) = query.major {
            filters.push(format!("major ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", major));
        }
        if let Some(year) = query.year {
            filters.push(format!("year = ${}", args.len() + 1));
            args.push(year);
        }
        if let Some(skills) = query.skills {
            let normalized: Vec<String> = skills
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !normalized.is_empty() {
                filters.push(format!(
                    "skills @> string_to_array(${}, ',')",
                    args.len() + 1
                ));
                args.push(normalized.join(","));
            }
        }
        if let Some(min_gpa) = query.min_gpa {
            // Parsed float, safe to inline.
            filters.push(format!("gpa >= {}", min_gpa));
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let students_query = format!(
            "SELECT {} FROM students {} ORDER BY name",
            STUDENT_COLUMNS, where_clause
        );
        let mut statement = sqlx::query_as::<_, Student>(&students_query);
        for value in &args {
            statement = statement.bind(value);
        }
        let students = statement.fetch_all(&self.pool).await?;

        Ok(students)
    }

    pub async fn list_jobs(&self, company_id: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE company_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    pub async fn create_job(&self, company_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (company_id, title, description, requirements, salary, location,
                              job_type, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(company_id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.requirements)
        .bind(payload.salary)
        .bind(payload.location)
        .bind(payload.job_type)
        .bind(payload.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn update_job(
        &self,
        company_id: Uuid,
        job_id: Uuid,
        payload: UpdateJobPayload,
    ) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                requirements = COALESCE($5, requirements),
                salary = COALESCE($6, salary),
                location = COALESCE($7, location),
                job_type = COALESCE($8, job_type),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(company_id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.requirements)
        .bind(payload.salary)
        .bind(payload.location)
        .bind(payload.job_type)
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;

        Ok(job)
    }

    pub async fn delete_job(&self, company_id: Uuid, job_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND company_id = $2")
            .bind(job_id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Job not found".into()));
        }

        Ok(())
    }

    /// Proposes an interview for one of the company's applications. It
    /// starts PENDING and stays there until the student accepts. The
    /// application's status is left untouched.
    pub async fn propose_interview(
        &self,
        company_id: Uuid,
        payload: CreateInterviewPayload,
    ) -> Result<Interview> {
        let student_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT student_id FROM applications WHERE id = $1 AND company_id = $2",
        )
        .bind(payload.application_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))?;

        let interview = sqlx::query_as::<_, Interview>(&format!(
            r#"
            INSERT INTO interviews (application_id, student_id, company_id, title, description,
                                    scheduled_at, duration_minutes, meeting_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            INTERVIEW_COLUMNS
        ))
        .bind(payload.application_id)
        .bind(student_id)
        .bind(company_id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.scheduled_at)
        .bind(payload.duration_minutes)
        .bind(payload.meeting_link)
        .fetch_one(&self.pool)
        .await?;

        Ok(interview)
    }
}
