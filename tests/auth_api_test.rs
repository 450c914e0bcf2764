use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn init_test_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("TOKEN_TTL_HOURS", "1");
    env::set_var("PUBLIC_RPS", "1000");
    env::set_var("API_RPS", "1000");
    talentlink_backend::config::init_config().ok();
}

fn auth_router(state: talentlink_backend::AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(talentlink_backend::routes::auth::signup))
        .route("/auth/signin", post(talentlink_backend::routes::auth::signin))
        .with_state(state)
}

fn student_router(state: talentlink_backend::AppState) -> Router {
    Router::new()
        .route(
            "/student/profile",
            get(talentlink_backend::routes::student_routes::get_profile),
        )
        .layer(axum::middleware::from_fn(
            talentlink_backend::middleware::auth::require_student,
        ))
        .with_state(state)
}

async fn post_json(app: &Router, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, body)
}

#[tokio::test]
async fn signup_signin_and_role_enforcement() {
    init_test_env();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping auth API test");
        return;
    }

    let pool = talentlink_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let state = talentlink_backend::AppState::new(pool);
    let auth = auth_router(state.clone());
    let student = student_router(state);

    let tag = Uuid::new_v4().simple().to_string();
    let student_name = format!("stu_{}", &tag[..8]);
    let company_name = format!("co_{}", &tag[..8]);
    let password = "Str0ng@pass";

    let (status, _) = post_json(
        &auth,
        "/auth/signup",
        json!({"name": student_name, "password": password, "role": "STUDENT"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same username again.
    let (status, body) = post_json(
        &auth,
        "/auth/signup",
        json!({"name": student_name, "password": password, "role": "STUDENT"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    // Password without the required character classes.
    let (status, _) = post_json(
        &auth,
        "/auth/signup",
        json!({"name": format!("weak_{}", &tag[..8]), "password": "weakpassword", "role": "STUDENT"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &auth,
        "/auth/signin",
        json!({"name": student_name, "password": "Wr0ng@pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post_json(
        &auth,
        "/auth/signin",
        json!({"name": student_name, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let student_token = body["access_token"].as_str().expect("token").to_string();

    let (status, _) = post_json(
        &auth,
        "/auth/signup",
        json!({"name": company_name, "password": password, "role": "COMPANY"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = post_json(
        &auth,
        "/auth/signin",
        json!({"name": company_name, "password": password}),
    )
    .await;
    let company_token = body["access_token"].as_str().expect("token").to_string();

    // No token.
    let req = Request::builder()
        .method("GET")
        .uri("/student/profile")
        .body(Body::empty())
        .unwrap();
    let resp = student.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token.
    let req = Request::builder()
        .method("GET")
        .uri("/student/profile")
        .header("authorization", "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let resp = student.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A company token cannot reach student routes.
    let req = Request::builder()
        .method("GET")
        .uri("/student/profile")
        .header("authorization", format!("Bearer {}", company_token))
        .body(Body::empty())
        .unwrap();
    let resp = student.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The student token works and triggers lazy profile creation.
    let req = Request::builder()
        .method("GET")
        .uri("/student/profile")
        .header("authorization", format!("Bearer {}", student_token))
        .body(Body::empty())
        .unwrap();
    let resp = student.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
