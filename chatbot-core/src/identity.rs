//! Account capability backed by the `users` table.
//!
//! The rest of the platform only sees [`AccountService`]; password policy and
//! hashing stay behind it.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

#[derive(Error, Debug)]
pub enum AccountError {
    /// Every policy failure, joined in the display form.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Email '{0}' is already taken.")]
    DuplicateEmail(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub client_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email_confirmed: bool,
}

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_account(&self, account: NewAccount, password: &str) -> Result<User, AccountError>;

    /// `Ok(None)` for unknown emails, inactive users and wrong passwords alike.
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>, AccountError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub required_unique_chars: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            required_unique_chars: 1,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Returns one description per violated rule; empty when the password passes.
    pub fn validate(&self, password: &str) -> Vec<String> {
        let mut errors = Vec::new();
        if password.chars().count() < self.required_length {
            errors.push(format!(
                "Passwords must be at least {} characters.",
                self.required_length
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            errors.push("Passwords must have at least one non alphanumeric character.".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Passwords must have at least one digit ('0'-'9').".to_string());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            errors.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            errors.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
        }
        let mut unique: Vec<char> = password.chars().collect();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() < self.required_unique_chars {
            errors.push(format!(
                "Passwords must use at least {} different characters.",
                self.required_unique_chars
            ));
        }
        errors
    }
}

pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

fn validate_email(email: &str) -> Option<String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    (!valid).then(|| format!("Email '{}' is invalid.", email))
}

#[derive(Clone)]
pub struct PgAccountService {
    pool: PgPool,
    policy: PasswordPolicy,
}

impl PgAccountService {
    pub fn new(pool: PgPool, policy: PasswordPolicy) -> Self {
        Self { pool, policy }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl AccountService for PgAccountService {
    async fn create_account(&self, account: NewAccount, password: &str) -> Result<User, AccountError> {
        let mut errors: Vec<String> = validate_email(&account.email).into_iter().collect();
        errors.extend(self.policy.validate(password));
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        if self.find_by_email(&account.email).await?.is_some() {
            return Err(AccountError::DuplicateEmail(account.email));
        }

        let password_hash = hash_password(password)?;
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, client_id, email, first_name, last_name, phone_number, email_confirmed, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account.client_id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.phone_number)
        .bind(account.email_confirmed)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                tracing::info!("Created account {} for client {}", user.email, user.client_id);
                Ok(user)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AccountError::DuplicateEmail(account.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>, AccountError> {
        let user = match self.find_by_email(email).await? {
            Some(u) if u.is_active => u,
            _ => return Ok(None),
        };
        if !verify_password(password, &user.password_hash) {
            tracing::debug!("Credential check failed for {}", email);
            return Ok(None);
        }

        let refreshed = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Some(refreshed))
    }
}
