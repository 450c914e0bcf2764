use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use talentlink_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, rate_limit},
    routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/signin", post(routes::auth::signin))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let student_api = Router::new()
        .route(
            "/student/profile",
            get(routes::student_routes::get_profile).put(routes::student_routes::update_profile),
        )
        .route(
            "/student/profile/image",
            post(routes::student_routes::upload_profile_image),
        )
        .route("/student/dashboard", get(routes::student_routes::dashboard))
        .route(
            "/student/companies",
            get(routes::student_routes::search_companies),
        )
        .route(
            "/student/companies/:id",
            get(routes::student_routes::company_details),
        )
        .route(
            "/student/applications",
            get(routes::student_routes::my_applications)
                .post(routes::student_routes::create_application),
        )
        .route(
            "/student/messages",
            get(routes::student_routes::get_messages).post(routes::student_routes::send_message),
        )
        .route(
            "/student/messages/:company_id/read",
            put(routes::student_routes::mark_messages_read),
        )
        .route(
            "/student/interviews/upcoming",
            get(routes::student_routes::upcoming_interviews),
        )
        .route(
            "/student/interviews/pending",
            get(routes::student_routes::pending_interviews),
        )
        .route(
            "/student/interviews/history",
            get(routes::student_routes::interview_history),
        )
        .route(
            "/student/interviews/:id/accept",
            post(routes::student_routes::accept_interview),
        )
        .layer(axum::middleware::from_fn(auth::require_student))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    let company_api = Router::new()
        .route(
            "/company/profile",
            get(routes::company_routes::get_profile).put(routes::company_routes::update_profile),
        )
        .route(
            "/company/dashboard/charts",
            get(routes::company_routes::dashboard_charts),
        )
        .route(
            "/company/applications",
            get(routes::company_routes::list_applications)
                .post(routes::company_routes::create_application),
        )
        .route(
            "/company/applications/:id/status",
            put(routes::company_routes::update_application_status),
        )
        .route(
            "/company/students",
            get(routes::company_routes::filter_students),
        )
        .route(
            "/company/jobs",
            get(routes::company_routes::list_jobs).post(routes::company_routes::create_job),
        )
        .route(
            "/company/jobs/:id",
            put(routes::company_routes::update_job).delete(routes::company_routes::delete_job),
        )
        .route(
            "/company/interviews",
            post(routes::company_routes::propose_interview),
        )
        .route(
            "/company/messages",
            get(routes::company_routes::list_messages).post(routes::company_routes::send_message),
        )
        .layer(axum::middleware::from_fn(auth::require_company))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = base_routes
        .merge(auth_api)
        .merge(student_api)
        .merge(company_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(&config.uploads_dir),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
