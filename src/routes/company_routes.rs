use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::company_dto::{
        CompanyCreateApplicationPayload, CreateInterviewPayload, CreateJobPayload,
        StudentFilterQuery, UpdateApplicationStatusPayload, UpdateCompanyProfilePayload,
        UpdateJobPayload,
    },
    dto::message_dto::CompanySendMessagePayload,
    error::Result,
    middleware::auth::Claims,
    models::company::Company,
    models::message::MessageSender,
    services::analytics_service::empty_chart_data,
    utils::time,
    AppState,
};

/// Resolves the caller's company profile, creating it on first access.
async fn current_company(state: &AppState, claims: &Claims) -> Result<Company> {
    let account = state.auth_service.resolve_account(claims).await?;
    state.company_service.get_or_create_profile(&account).await
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = current_company(&state, &claims).await?;
    let profile = state.company_service.get_profile(company.id).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateCompanyProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let updated = state
        .company_service
        .update_profile(company.id, payload)
        .await?;
    Ok(Json(updated))
}

/// The dashboard never fails outright: a chart query error is logged
/// and an all-zero chart is returned instead.
#[utoipa::path(
    get,
    path = "/company/dashboard/charts",
    responses(
        (status = 200, description = "Six-month application, hiring and visitor series")
    )
)]
#[axum::debug_handler]
pub async fn dashboard_charts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = current_company(&state, &claims).await?;
    let chart = match state.analytics_service.chart_data(company.id).await {
        Ok(chart) => chart,
        Err(err) => {
            tracing::error!("Chart data failed for company {}: {}", company.id, err);
            empty_chart_data(time::now())
        }
    };
    Ok(Json(chart))
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = current_company(&state, &claims).await?;
    let applications = match state.company_service.list_applications(company.id).await {
        Ok(applications) => applications,
        Err(err) => {
            tracing::error!("Listing applications failed for {}: {}", company.id, err);
            Vec::new()
        }
    };
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CompanyCreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let application = state
        .company_service
        .create_application(company.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    put,
    path = "/company/applications/{id}/status",
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Updated application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let application = state
        .company_service
        .update_application_status(company.id, application_id, payload)
        .await?;
    Ok(Json(application))
}

#[axum::debug_handler]
pub async fn filter_students(
    State(state): State<AppState>,
    Query(query): Query<StudentFilterQuery>,
) -> Result<impl IntoResponse> {
    let students = state.company_service.filter_students(query).await?;
    Ok(Json(students))
}

#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = current_company(&state, &claims).await?;
    let jobs = state.company_service.list_jobs(company.id).await?;
    Ok(Json(jobs))
}

#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let job = state.company_service.create_job(company.id, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let job = state
        .company_service
        .update_job(company.id, job_id, payload)
        .await?;
    Ok(Json(job))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let company = current_company(&state, &claims).await?;
    state.company_service.delete_job(company.id, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn propose_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let interview = state
        .company_service
        .propose_interview(company.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = current_company(&state, &claims).await?;
    let messages = match state.message_service.company_inbox(company.id).await {
        Ok(messages) => messages,
        Err(err) => {
            tracing::error!("Inbox query failed for company {}: {}", company.id, err);
            Vec::new()
        }
    };
    Ok(Json(messages))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CompanySendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = current_company(&state, &claims).await?;
    let message = state
        .message_service
        .send(
            payload.student_id,
            company.id,
            MessageSender::Company,
            &payload.content,
        )
        .await?;
    Ok(Json(message))
}
