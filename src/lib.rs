pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    analytics_service::AnalyticsService, auth_service::AuthService,
    company_service::CompanyService, message_service::MessageService,
    student_service::StudentService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub student_service: StudentService,
    pub company_service: CompanyService,
    pub message_service: MessageService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let student_service = StudentService::new(pool.clone());
        let company_service = CompanyService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let analytics_service = AnalyticsService::new(pool.clone());

        Self {
            pool,
            auth_service,
            student_service,
            company_service,
            message_service,
            analytics_service,
        }
    }
}
