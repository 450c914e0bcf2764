use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::account::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupPayload {
    #[validate(length(min = 3, max = 20))]
    pub name: String,
    #[validate(
        length(min = 8, max = 40),
        custom(function = "crate::utils::validation::validate_password_strength")
    )]
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SigninPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
