use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use tokio::fs;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::message_dto::{SendMessagePayload, StudentMessagesQuery},
    dto::student_dto::{
        CompanySearchQuery, CreateApplicationPayload, UpdateStudentProfilePayload,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::message::MessageSender,
    models::student::Student,
    AppState,
};

/// Resolves the caller's student profile, creating it on first access.
async fn current_student(state: &AppState, claims: &Claims) -> Result<Student> {
    let account = state.auth_service.resolve_account(claims).await?;
    state.student_service.get_or_create_profile(&account).await
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let profile = state.student_service.get_profile(student.id).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateStudentProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let student = current_student(&state, &claims).await?;
    let updated = state
        .student_service
        .update_profile(student.id, payload)
        .await?;
    Ok(Json(updated))
}

async fn save_profile_image(filename: &str, data: &bytes::Bytes) -> Result<String> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());

    let allowed_exts = ["jpg", "jpeg", "png", "webp"];
    if !allowed_exts.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }

    if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::BadRequest("Invalid JPEG file content".into()));
    }
    if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Err(Error::BadRequest("Invalid PNG file content".into()));
    }
    if ext == "webp" && !data.starts_with(b"RIFF") {
        return Err(Error::BadRequest("Invalid WebP file content".into()));
    }

    let upload_dir = format!("{}/profile", crate::config::get_config().uploads_dir);
    fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

    let safe_filename = format!("student_{}.{}", Uuid::new_v4(), ext);
    let file_path = format!("{}/{}", upload_dir, safe_filename);

    fs::write(&file_path, data).await.map_err(|e| {
        tracing::error!("Failed to write profile image: {}", e);
        Error::Internal(format!("Failed to save file: {}", e))
    })?;

    Ok(format!("/uploads/profile/{}", safe_filename))
}

#[axum::debug_handler]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;

    let mut url = None;
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name == "file" {
            let filename = field.file_name().unwrap_or("image.jpg").to_string();
            let data = field.bytes().await.map_err(|e| {
                tracing::error!("Failed to read image bytes: {}", e);
                Error::BadRequest("Failed to read file upload".into())
            })?;
            if !data.is_empty() {
                url = Some(save_profile_image(&filename, &data).await?);
            }
        }
    }

    let Some(url) = url else {
        return Err(Error::BadRequest("Image file is required".into()));
    };

    state
        .student_service
        .update_profile(
            student.id,
            UpdateStudentProfilePayload {
                name: None,
                email: None,
                major: None,
                gpa: None,
                year: None,
                skills: None,
                bio: None,
                linkedin: None,
                github: None,
                phone: None,
                resume_pdf_url: None,
                profile_image_url: Some(url.clone()),
            },
        )
        .await?;

    Ok(Json(json!({ "url": url })))
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let data = state.student_service.dashboard(student.id).await?;
    Ok(Json(data))
}

#[axum::debug_handler]
pub async fn search_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanySearchQuery>,
) -> Result<impl IntoResponse> {
    let hits = state.student_service.search_companies(query).await?;
    Ok(Json(hits))
}

#[axum::debug_handler]
pub async fn company_details(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let details = state
        .student_service
        .company_details(company_id, student.id)
        .await?;
    Ok(Json(details))
}

#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let student = current_student(&state, &claims).await?;
    let application = state
        .student_service
        .create_application(student.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let applications = state.student_service.my_applications(student.id).await?;
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let student = current_student(&state, &claims).await?;
    let message = state
        .message_service
        .send(
            student.id,
            payload.company_id,
            MessageSender::Student,
            &payload.content,
        )
        .await?;
    Ok(Json(message))
}

/// Without `company_id`: per-company thread summaries. With it: that
/// conversation, oldest first.
#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<StudentMessagesQuery>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    match query.company_id {
        Some(company_id) => {
            let messages = state
                .message_service
                .conversation(student.id, company_id)
                .await?;
            Ok(Json(messages).into_response())
        }
        None => {
            let threads = state.message_service.student_threads(student.id).await?;
            Ok(Json(threads).into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn mark_messages_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let updated = state
        .message_service
        .mark_thread_read(student.id, company_id)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}

#[axum::debug_handler]
pub async fn upcoming_interviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let interviews = state.student_service.upcoming_interviews(student.id).await?;
    Ok(Json(interviews))
}

#[axum::debug_handler]
pub async fn pending_interviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let interviews = state.student_service.pending_interviews(student.id).await?;
    Ok(Json(interviews))
}

#[axum::debug_handler]
pub async fn accept_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(interview_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let interview = state
        .student_service
        .accept_interview(student.id, interview_id)
        .await?;
    Ok(Json(interview))
}

#[axum::debug_handler]
pub async fn interview_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let student = current_student(&state, &claims).await?;
    let interviews = state.student_service.interview_history(student.id).await?;
    Ok(Json(interviews))
}
