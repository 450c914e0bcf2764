pub mod auth;
pub mod company_routes;
pub mod health;
pub mod student_routes;
