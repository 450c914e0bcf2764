pub mod auth_dto;
pub mod company_dto;
pub mod message_dto;
pub mod student_dto;
