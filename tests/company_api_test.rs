use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use talentlink_backend::dto::auth_dto::{SigninPayload, SignupPayload};
use talentlink_backend::models::account::UserRole;

fn init_test_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("TOKEN_TTL_HOURS", "1");
    env::set_var("PUBLIC_RPS", "1000");
    env::set_var("API_RPS", "1000");
    talentlink_backend::config::init_config().ok();
}

fn company_router(state: talentlink_backend::AppState) -> Router {
    Router::new()
        .route(
            "/company/profile",
            get(talentlink_backend::routes::company_routes::get_profile)
                .put(talentlink_backend::routes::company_routes::update_profile),
        )
        .route(
            "/company/dashboard/charts",
            get(talentlink_backend::routes::company_routes::dashboard_charts),
        )
        .route(
            "/company/applications",
            get(talentlink_backend::routes::company_routes::list_applications)
                .post(talentlink_backend::routes::company_routes::create_application),
        )
        .route(
            "/company/applications/:id/status",
            put(talentlink_backend::routes::company_routes::update_application_status),
        )
        .route(
            "/company/students",
            get(talentlink_backend::routes::company_routes::filter_students),
        )
        .route(
            "/company/jobs",
            get(talentlink_backend::routes::company_routes::list_jobs)
                .post(talentlink_backend::routes::company_routes::create_job),
        )
        .route(
            "/company/jobs/:id",
            put(talentlink_backend::routes::company_routes::update_job)
                .delete(talentlink_backend::routes::company_routes::delete_job),
        )
        .route(
            "/company/interviews",
            post(talentlink_backend::routes::company_routes::propose_interview),
        )
        .route(
            "/company/messages",
            get(talentlink_backend::routes::company_routes::list_messages)
                .post(talentlink_backend::routes::company_routes::send_message),
        )
        .layer(axum::middleware::from_fn(
            talentlink_backend::middleware::auth::require_company,
        ))
        .with_state(state)
}

fn student_router(state: talentlink_backend::AppState) -> Router {
    Router::new()
        .route(
            "/student/profile",
            get(talentlink_backend::routes::student_routes::get_profile),
        )
        .route(
            "/student/interviews/upcoming",
            get(talentlink_backend::routes::student_routes::upcoming_interviews),
        )
        .route(
            "/student/interviews/pending",
            get(talentlink_backend::routes::student_routes::pending_interviews),
        )
        .route(
            "/student/interviews/:id/accept",
            post(talentlink_backend::routes::student_routes::accept_interview),
        )
        .layer(axum::middleware::from_fn(
            talentlink_backend::middleware::auth::require_student,
        ))
        .with_state(state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

async fn signup_and_signin(
    state: &talentlink_backend::AppState,
    name: &str,
    role: UserRole,
) -> String {
    state
        .auth_service
        .signup(SignupPayload {
            name: name.to_string(),
            password: "Str0ng@pass".to_string(),
            role: Some(role),
        })
        .await
        .expect("signup");
    state
        .auth_service
        .signin(SigninPayload {
            name: name.to_string(),
            password: "Str0ng@pass".to_string(),
        })
        .await
        .expect("signin")
}

#[tokio::test]
async fn company_flow_end_to_end() {
    init_test_env();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping company API test");
        return;
    }

    let pool = talentlink_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let state = talentlink_backend::AppState::new(pool.clone());
    let company_app = company_router(state.clone());
    let student_app = student_router(state.clone());

    let tag = Uuid::new_v4().simple().to_string();
    let company_token =
        signup_and_signin(&state, &format!("co_{}", &tag[..8]), UserRole::Company).await;
    let student_token =
        signup_and_signin(&state, &format!("stu_{}", &tag[..8]), UserRole::Student).await;

    // Lazy company profile with defaults.
    let (status, profile) = request(&company_app, "GET", "/company/profile", &company_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["industry"], json!("Technology"));
    assert_eq!(profile["location"], json!("Not specified"));

    let (status, updated) = request(
        &company_app,
        "PUT",
        "/company/profile",
        &company_token,
        Some(json!({"industry": "Fintech", "founded_year": 2015})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["industry"], json!("Fintech"));
    assert_eq!(updated["founded_year"], json!(2015));

    // Jobs CRUD.
    let (status, job) = request(
        &company_app,
        "POST",
        "/company/jobs",
        &company_token,
        Some(json!({
            "title": "Platform Engineer",
            "description": "Own the backend",
            "requirements": ["Rust"],
            "location": "Remote",
            "job_type": "Full-time"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let job_id = job["id"].as_str().expect("job id").to_string();
    assert_eq!(job["is_active"], json!(true));

    let (status, job) = request(
        &company_app,
        "PUT",
        &format!("/company/jobs/{}", job_id),
        &company_token,
        Some(json!({"title": "Senior Platform Engineer"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["title"], json!("Senior Platform Engineer"));

    let (status, jobs) = request(&company_app, "GET", "/company/jobs", &company_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    let (status, doomed) = request(
        &company_app,
        "POST",
        "/company/jobs",
        &company_token,
        Some(json!({
            "title": "Temp Role",
            "description": "Short lived",
            "location": "Remote",
            "job_type": "Intern"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let doomed_id = doomed["id"].as_str().unwrap().to_string();
    let (status, _) = request(
        &company_app,
        "DELETE",
        &format!("/company/jobs/{}", doomed_id),
        &company_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(
        &company_app,
        "DELETE",
        &format!("/company/jobs/{}", doomed_id),
        &company_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Create the student profile, then a company-initiated application.
    let (status, student_profile) =
        request(&student_app, "GET", "/student/profile", &student_token, None).await;
    assert_eq!(status, StatusCode::OK);
    let student_id = student_profile["id"].as_str().expect("student id").to_string();

    let (status, application) = request(
        &company_app,
        "POST",
        "/company/applications",
        &company_token,
        Some(json!({"student_id": student_id, "job_id": job_id, "notes": "Sourced"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let application_id = application["id"].as_str().expect("application id").to_string();
    assert_eq!(application["status"], json!("APPLIED"));

    let (status, body) = request(
        &company_app,
        "POST",
        "/company/applications",
        &company_token,
        Some(json!({"student_id": student_id, "job_id": job_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("This student has already applied for this position")
    );

    let (status, application) = request(
        &company_app,
        "PUT",
        &format!("/company/applications/{}/status", application_id),
        &company_token,
        Some(json!({"status": "REVIEWING"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(application["status"], json!("REVIEWING"));

    // Student filtering by the unique name.
    let (status, students) = request(
        &company_app,
        "GET",
        &format!("/company/students?search=stu_{}", &tag[..8]),
        &company_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students.as_array().unwrap().len(), 1);

    // Interview proposal starts PENDING; the student accepts it.
    let scheduled_at = chrono::Utc::now() + chrono::Duration::days(3);
    let (status, interview) = request(
        &company_app,
        "POST",
        "/company/interviews",
        &company_token,
        Some(json!({
            "application_id": application_id,
            "title": "Technical screen",
            "scheduled_at": scheduled_at,
            "duration_minutes": 45
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(interview["status"], json!("PENDING"));
    let interview_id = interview["id"].as_str().expect("interview id").to_string();

    let (status, pending) = request(
        &student_app,
        "GET",
        "/student/interviews/pending",
        &student_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, accepted) = request(
        &student_app,
        "POST",
        &format!("/student/interviews/{}/accept", interview_id),
        &student_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], json!("SCHEDULED"));

    // Accepting twice is rejected.
    let (status, body) = request(
        &student_app,
        "POST",
        &format!("/student/interviews/{}/accept", interview_id),
        &student_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Interview is not awaiting acceptance"));

    let (status, upcoming) = request(
        &student_app,
        "GET",
        "/student/interviews/upcoming",
        &student_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upcoming.as_array().unwrap().len(), 1);

    // Messaging from the company side.
    let (status, _) = request(
        &company_app,
        "POST",
        "/company/messages",
        &company_token,
        Some(json!({"student_id": student_id, "content": "We liked your profile"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, inbox) = request(&company_app, "GET", "/company/messages", &company_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1);

    // Charts always answer with the fixed bucket shape.
    let (status, charts) = request(
        &company_app,
        "GET",
        "/company/dashboard/charts",
        &company_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(charts["application_data"]["labels"].as_array().unwrap().len(), 6);
    assert_eq!(charts["visitor_data"]["data"].as_array().unwrap().len(), 6);
    assert_eq!(charts["summary"]["total_applications"], json!(1));
    assert_eq!(charts["summary"]["pending_reviews"], json!(1));
    assert_eq!(charts["summary"]["interviews_scheduled"], json!(1));
}
