use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{SigninPayload, SignupPayload};
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::Claims;
use crate::models::account::{Account, UserRole};
use crate::utils::{crypto, token};

const ACCOUNT_COLUMNS: &str =
    "id, name, password_hash, role, student_id, company_id, created_at, updated_at";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn signup(&self, payload: SignupPayload) -> Result<()> {
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM accounts WHERE name = $1")
            .bind(&payload.name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict("This username is already taken".into()));
        }

        let password_hash = crypto::hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        let role = payload.role.unwrap_or(UserRole::Student);

        sqlx::query("INSERT INTO accounts (name, password_hash, role) VALUES ($1, $2, $3)")
            .bind(&payload.name)
            .bind(&password_hash)
            .bind(role)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::Conflict("This username is already taken".into())
                } else {
                    Error::from(e)
                }
            })?;

        Ok(())
    }

    pub async fn signin(&self, payload: SigninPayload) -> Result<String> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE name = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(&payload.name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(account) = account else {
            return Err(Error::Unauthorized("Invalid credentials".into()));
        };

        let verified = crypto::verify_password(&payload.password, &account.password_hash)
            .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))?;
        if !verified {
            return Err(Error::Unauthorized("Invalid credentials".into()));
        }

        token::issue_token(&account.name, account.role.as_str())
    }

    /// Resolves the account behind a decoded token. Tokens whose role no
    /// longer matches the stored role are rejected.
    pub async fn resolve_account(&self, claims: &Claims) -> Result<Account> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE name = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(&claims.sub)
        .fetch_optional(&self.pool)
        .await?;

        let Some(account) = account else {
            return Err(Error::Unauthorized("Unknown account".into()));
        };

        let token_role = claims.role.clone().unwrap_or_default();
        if !token_role.eq_ignore_ascii_case(account.role.as_str()) {
            return Err(Error::Unauthorized("Role mismatch".into()));
        }

        Ok(account)
    }
}
