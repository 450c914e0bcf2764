pub mod analytics_service;
pub mod auth_service;
pub mod company_service;
pub mod message_service;
pub mod student_service;
