use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::student_dto::{
    ApplicationWithContext, CompanyBrief, CompanyDetailsResponse, CompanySearchHit,
    CompanySearchQuery, CreateApplicationPayload, InterviewWithContext, JobBrief,
    StudentDashboard, StudentProfileResponse, UpdateStudentProfilePayload,
};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::account::Account;
use crate::models::application::ApplicationStatus;
use crate::models::company::Company;
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::job::{Job, JobType};
use crate::models::student::Student;
use crate::utils::time;

const STUDENT_COLUMNS: &str = "id, name, email, major, year, gpa, skills, bio, linkedin, github, \
     phone, resume_pdf_url, profile_image_url, created_at, updated_at";

const JOB_COLUMNS: &str = "id, company_id, title, description, requirements, salary, location, \
     job_type, is_active, created_at, updated_at";

const INTERVIEW_COLUMNS: &str = "id, application_id, student_id, company_id, title, description, \
     scheduled_at, duration_minutes, meeting_link, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ApplicationContextRow {
    id: Uuid,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
    cover_letter: Option<String>,
    notes: Option<String>,
    company_id: Uuid,
    company_name: String,
    company_logo_url: Option<String>,
    job_id: Uuid,
    job_title: String,
    job_type: JobType,
    job_location: String,
}

impl ApplicationContextRow {
    fn into_context(self, interviews: Vec<Interview>) -> ApplicationWithContext {
        ApplicationWithContext {
            id: self.id,
            status: self.status,
            applied_at: self.applied_at,
            cover_letter: self.cover_letter,
            notes: self.notes,
            company: CompanyBrief {
                id: self.company_id,
                name: self.company_name,
                logo_url: self.company_logo_url,
            },
            job: JobBrief {
                id: self.job_id,
                title: self.job_title,
                job_type: self.job_type,
                location: self.job_location,
            },
            interviews,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InterviewContextRow {
    id: Uuid,
    application_id: Uuid,
    student_id: Uuid,
    company_id: Uuid,
    title: String,
    description: Option<String>,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    meeting_link: Option<String>,
    status: InterviewStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    company_name: String,
    company_logo_url: Option<String>,
    job_id: Uuid,
    job_title: String,
    job_type: JobType,
    job_location: String,
}

impl From<InterviewContextRow> for InterviewWithContext {
    fn from(row: InterviewContextRow) -> Self {
        InterviewWithContext {
            company: CompanyBrief {
                id: row.company_id,
                name: row.company_name,
                logo_url: row.company_logo_url,
            },
            job: JobBrief {
                id: row.job_id,
                title: row.job_title,
                job_type: row.job_type,
                location: row.job_location,
            },
            interview: Interview {
                id: row.id,
                application_id: row.application_id,
                student_id: row.student_id,
                company_id: row.company_id,
                title: row.title,
                description: row.description,
                scheduled_at: row.scheduled_at,
                duration_minutes: row.duration_minutes,
                meeting_link: row.meeting_link,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const INTERVIEW_CONTEXT_SELECT: &str = r#"
    SELECT i.id, i.application_id, i.student_id, i.company_id, i.title, i.description,
           i.scheduled_at, i.duration_minutes, i.meeting_link, i.status, i.created_at,
           i.updated_at,
           c.name AS company_name, c.logo_url AS company_logo_url,
           j.id AS job_id, j.title AS job_title, j.job_type, j.location AS job_location
    FROM interviews i
    JOIN companies c ON i.company_id = c.id
    JOIN applications a ON i.application_id = a.id
    JOIN jobs j ON a.job_id = j.id
"#;

#[derive(Clone)]
pub struct StudentService {
    pool: PgPool,
}

impl StudentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lazy profile creation: the profile row is created on first
    /// authenticated access and linked back onto the account.
    pub async fn get_or_create_profile(&self, account: &Account) -> Result<Student> {
        if let Some(student_id) = account.student_id {
            let existing = sqlx::query_as::<_, Student>(&format!(
                "SELECT {} FROM students WHERE id = $1",
                STUDENT_COLUMNS
            ))
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(student) = existing {
                return Ok(student);
            }
        }

        let email = format!("{}@student.com", account.name);
        let existing = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE email = $1",
            STUDENT_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let student = match existing {
            Some(student) => student,
            None => {
                tracing::info!(account = %account.name, "creating student profile");
                sqlx::query_as::<_, Student>(&format!(
                    r#"
                    INSERT INTO students (name, email, major, year, gpa, skills)
                    VALUES ($1, $2, 'Computer Science', 'Senior', 3.0, ARRAY['Programming'])
                    RETURNING {}
                    "#,
                    STUDENT_COLUMNS
                ))
                .bind(&account.name)
                .bind(&email)
                .fetch_one(&self.pool)
                .await?
            }
        };

        sqlx::query("UPDATE accounts SET student_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(student.id)
            .bind(account.id)
            .execute(&self.pool)
            .await?;

        Ok(student)
    }

    pub async fn get_profile(&self, student_id: Uuid) -> Result<StudentProfileResponse> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Student profile not found".into()))?;

        let applications = self.applications_with_context(student_id, None).await?;

        Ok(StudentProfileResponse {
            student,
            applications,
        })
    }

    pub async fn update_profile(
        &self,
        student_id: Uuid,
        payload: UpdateStudentProfilePayload,
    ) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                major = COALESCE($4, major),
                gpa = COALESCE($5, gpa),
                year = COALESCE($6, year),
                skills = COALESCE($7, skills),
                bio = COALESCE($8, bio),
                linkedin = COALESCE($9, linkedin),
                github = COALESCE($10, github),
                phone = COALESCE($11, phone),
                resume_pdf_url = COALESCE($12, resume_pdf_url),
                profile_image_url = COALESCE($13, profile_image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.major)
        .bind(payload.gpa)
        .bind(payload.year)
        .bind(payload.skills)
        .bind(payload.bio)
        .bind(payload.linkedin)
        .bind(payload.github)
        .bind(payload.phone)
        .bind(payload.resume_pdf_url)
        .bind(payload.profile_image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Student profile not found".into()))?;

        Ok(student)
    }

    pub async fn dashboard(&self, student_id: Uuid) -> Result<StudentDashboard> {
        let total_applications =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE student_id = $1")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?;

        let upcoming_interviews = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM interviews
            WHERE student_id = $1 AND status = 'SCHEDULED' AND scheduled_at >= NOW()
            "#,
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        let unread_messages = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE student_id = $1 AND is_read = FALSE",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        let status_rows = sqlx::query_as::<_, (ApplicationStatus, i64)>(
            "SELECT status, COUNT(*) FROM applications WHERE student_id = $1 GROUP BY status",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let applications_by_status: HashMap<String, i64> = status_rows
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count))
            .collect();

        Ok(StudentDashboard {
            total_applications,
            upcoming_interviews,
            unread_messages,
            applications_by_status,
        })
    }

    /// Filter composition is passed straight through to SQL; no ranking
    /// or pagination beyond what the database gives.
    pub async fn search_companies(
        &self,
        query: CompanySearchQuery,
    ) -> Result<Vec<CompanySearchHit>> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(name ILIKE ${} OR description ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }
        if let Some(industry) = query.industry {
            filters.push(format!("industry ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", industry));
        }
        if let Some(location) = query.location {
            filters.push(format!("location ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", location));
        }
        if let Some(size) = query.size {
            filters.push(format!("size = ${}", args.len() + 1));
            args.push(size);
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let companies_query = format!(
            "SELECT id, name, email, industry, location, description, logo_url, website, size, \
             founded_year, created_at, updated_at FROM companies {} ORDER BY name",
            where_clause
        );
        let mut statement = sqlx::query_as::<_, Company>(&companies_query);
        for value in &args {
            statement = statement.bind(value);
        }
        let companies = statement.fetch_all(&self.pool).await?;

        let company_ids: Vec<Uuid> = companies.iter().map(|c| c.id).collect();

        let mut job_filters = vec![
            "company_id = ANY($1)".to_string(),
            "is_active = TRUE".to_string(),
        ];
        let mut job_args: Vec<String> = Vec::new();
        if let Some(position) = query.position {
            job_filters.push(format!("title ILIKE ${}", job_args.len() + 2));
            job_args.push(format!("%{}%", position));
        }
        if let Some(job_type) = query.job_type {
            job_filters.push(format!("job_type::text ILIKE ${}", job_args.len() + 2));
            job_args.push(format!("%{}%", job_type));
        }

        let jobs_query = format!(
            "SELECT {} FROM jobs WHERE {} ORDER BY created_at DESC",
            JOB_COLUMNS,
            job_filters.join(" AND ")
        );
        let mut jobs_statement = sqlx::query_as::<_, Job>(&jobs_query).bind(&company_ids);
        for value in &job_args {
            jobs_statement = jobs_statement.bind(value);
        }
        let jobs = jobs_statement.fetch_all(&self.pool).await?;

        let mut jobs_by_company: HashMap<Uuid, Vec<Job>> = HashMap::new();
        for job in jobs {
            jobs_by_company.entry(job.company_id).or_default().push(job);
        }

        Ok(companies
            .into_iter()
            .map(|company| {
                let jobs = jobs_by_company.remove(&company.id).unwrap_or_default();
                CompanySearchHit {
                    active_jobs: jobs.len(),
                    jobs,
                    company,
                }
            })
            .collect())
    }

    pub async fn company_details(
        &self,
        company_id: Uuid,
        student_id: Uuid,
    ) -> Result<CompanyDetailsResponse> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, email, industry, location, description, logo_url, website, size, \
             founded_year, created_at, updated_at FROM companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;

        self.track_profile_view(student_id, company_id).await?;

        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE company_id = $1 AND is_active = TRUE ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let my_applications = self
            .applications_with_context(student_id, Some(company_id))
            .await?;

        Ok(CompanyDetailsResponse {
            company,
            jobs,
            my_applications,
        })
    }

    /// One profile view per (student, company) per calendar day.
    async fn track_profile_view(&self, student_id: Uuid, company_id: Uuid) -> Result<()> {
        let (day_start, day_end) = time::day_bounds(time::now());
        let existing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM profile_views
            WHERE student_id = $1 AND company_id = $2 AND viewed_at >= $3 AND viewed_at < $4
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .bind(company_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_none() {
            sqlx::query("INSERT INTO profile_views (student_id, company_id) VALUES ($1, $2)")
                .bind(student_id)
                .bind(company_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    pub async fn create_application(
        &self,
        student_id: Uuid,
        payload: CreateApplicationPayload,
    ) -> Result<ApplicationWithContext> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM applications WHERE student_id = $1 AND job_id = $2",
        )
        .bind(student_id)
        .bind(payload.job_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(
                "You have already applied for this position".into(),
            ));
        }

        let application_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO applications (student_id, company_id, job_id, cover_letter)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(student_id)
        .bind(payload.company_id)
        .bind(payload.job_id)
        .bind(payload.cover_letter)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A lost race against the unique constraint reads the same
            // as the pre-check to the client.
            if is_unique_violation(&e) {
                Error::BadRequest("You have already applied for this position".into())
            } else {
                Error::from(e)
            }
        })?;

        self.application_with_context(application_id).await
    }

    pub async fn my_applications(&self, student_id: Uuid) -> Result<Vec<ApplicationWithContext>> {
        self.applications_with_context(student_id, None).await
    }

    async fn application_with_context(
        &self,
        application_id: Uuid,
    ) -> Result<ApplicationWithContext> {
        let row = sqlx::query_as::<_, ApplicationContextRow>(
            r#"
            SELECT a.id, a.status, a.applied_at, a.cover_letter, a.notes,
                   c.id AS company_id, c.name AS company_name, c.logo_url AS company_logo_url,
                   j.id AS job_id, j.title AS job_title, j.job_type, j.location AS job_location
            FROM applications a
            JOIN companies c ON a.company_id = c.id
            JOIN jobs j ON a.job_id = j.id
            WHERE a.id = $1
            "#,
        )
        .bind(application_id)
        .fetch_one(&self.pool)
        .await?;

        let interviews = sqlx::query_as::<_, Interview>(&format!(
            "SELECT {} FROM interviews WHERE application_id = $1 ORDER BY scheduled_at ASC",
            INTERVIEW_COLUMNS
        ))
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(row.into_context(interviews))
    }

    async fn applications_with_context(
        &self,
        student_id: Uuid,
        company_id: Option<Uuid>,
    ) -> Result<Vec<ApplicationWithContext>> {
        let mut sql = String::from(
            r#"
            SELECT a.id, a.status, a.applied_at, a.cover_letter, a.notes,
                   c.id AS company_id, c.name AS company_name, c.logo_url AS company_logo_url,
                   j.id AS job_id, j.title AS job_title, j.job_type, j.location AS job_location
            FROM applications a
            JOIN companies c ON a.company_id = c.id
            JOIN jobs j ON a.job_id = j.id
            WHERE a.student_id = $1
            "#,
        );
        if company_id.is_some() {
            sql.push_str(" AND a.company_id = $2");
        }
        sql.push_str(" ORDER BY a.applied_at DESC");

        let mut statement = sqlx::query_as::<_, ApplicationContextRow>(&sql).bind(student_id);
        if let Some(company_id) = company_id {
            statement = statement.bind(company_id);
        }
        let rows = statement.fetch_all(&self.pool).await?;

        let application_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let interviews = sqlx::query_as::<_, Interview>(&format!(
            "SELECT {} FROM interviews WHERE application_id = ANY($1) ORDER BY scheduled_at ASC",
            INTERVIEW_COLUMNS
        ))
        .bind(&application_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut interviews_by_application: HashMap<Uuid, Vec<Interview>> = HashMap::new();
        for interview in interviews {
            interviews_by_application
                .entry(interview.application_id)
                .or_default()
                .push(interview);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let interviews = interviews_by_application.remove(&row.id).unwrap_or_default();
                row.into_context(interviews)
            })
            .collect())
    }

    pub async fn upcoming_interviews(&self, student_id: Uuid) -> Result<Vec<InterviewWithContext>> {
        let rows = sqlx::query_as::<_, InterviewContextRow>(&format!(
            "{} WHERE i.student_id = $1 AND i.status = 'SCHEDULED' AND i.scheduled_at >= NOW() \
             ORDER BY i.scheduled_at ASC",
            INTERVIEW_CONTEXT_SELECT
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn pending_interviews(&self, student_id: Uuid) -> Result<Vec<InterviewWithContext>> {
        let rows = sqlx::query_as::<_, InterviewContextRow>(&format!(
            "{} WHERE i.student_id = $1 AND i.status = 'PENDING' ORDER BY i.scheduled_at ASC",
            INTERVIEW_CONTEXT_SELECT
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn interview_history(&self, student_id: Uuid) -> Result<Vec<InterviewWithContext>> {
        let rows = sqlx::query_as::<_, InterviewContextRow>(&format!(
            "{} WHERE i.student_id = $1 AND (i.status IN ('COMPLETED', 'CANCELLED') \
             OR (i.status = 'SCHEDULED' AND i.scheduled_at < NOW())) \
             ORDER BY i.scheduled_at DESC",
            INTERVIEW_CONTEXT_SELECT
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Student accepts a pending interview, flipping it to SCHEDULED.
    pub async fn accept_interview(&self, student_id: Uuid, interview_id: Uuid) -> Result<Interview> {
        let interview = sqlx::query_as::<_, Interview>(&format!(
            "SELECT {} FROM interviews WHERE id = $1 AND student_id = $2",
            INTERVIEW_COLUMNS
        ))
        .bind(interview_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".into()))?;

        if interview.status != InterviewStatus::Pending {
            return Err(Error::BadRequest(
                "Interview is not awaiting acceptance".into(),
            ));
        }

        let updated = sqlx::query_as::<_, Interview>(&format!(
            "UPDATE interviews SET status = 'SCHEDULED', updated_at = NOW() WHERE id = $1 \
             RETURNING {}",
            INTERVIEW_COLUMNS
        ))
        .bind(interview_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}
