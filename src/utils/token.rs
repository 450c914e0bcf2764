use crate::config::get_config;
use crate::error::Result;
use crate::middleware::auth::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

/// Issues an HS256 bearer token carrying the account name and role.
/// TTL comes from `TOKEN_TTL_HOURS`.
pub fn issue_token(name: &str, role: &str) -> Result<String> {
    let config = get_config();
    let exp = (Utc::now() + Duration::hours(config.token_ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: name.to_string(),
        exp,
        role: Some(role.to_string()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn init_test_config() {
        std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        std::env::set_var("DATABASE_URL", "postgres://localhost/talentlink_test");
        std::env::set_var("JWT_SECRET", "test_secret_key");
        std::env::set_var("TOKEN_TTL_HOURS", "24");
        std::env::set_var("PUBLIC_RPS", "100");
        std::env::set_var("API_RPS", "100");
        let _ = crate::config::init_config();
    }

    #[test]
    fn issue_then_decode_round_trip() {
        init_test_config();
        let token = issue_token("alice", "STUDENT").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("test_secret_key".as_bytes()),
            &validation,
        )
        .expect("decode");
        assert_eq!(data.claims.sub, "alice");
        assert_eq!(data.claims.role.as_deref(), Some("STUDENT"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        init_test_config();
        let token = issue_token("bob", "COMPANY").unwrap();
        let validation = Validation::new(Algorithm::HS256);
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("other_secret".as_bytes()),
            &validation,
        );
        assert!(result.is_err());
    }
}
