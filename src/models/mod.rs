pub mod account;
pub mod application;
pub mod company;
pub mod interview;
pub mod job;
pub mod message;
pub mod profile_view;
pub mod student;
