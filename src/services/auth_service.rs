//! Registration, login and bearer tokens.
//!
//! Passwords are hashed with Argon2id on the blocking pool. Tokens are HS256
//! JWTs whose subject is the user's email.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AuthConfig, NewUser, User};
use crate::domain::ports::UserRepository;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest password prefix that is hashed.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const TOKEN_TYPE: &str = "bearer";

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// A freshly issued token and the user it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    pub async fn register(&self, email: &str, password: &str, password_confirm: &str) -> DomainResult<AuthSession> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(DomainError::ValidationFailed(format!("invalid email address: {email}")));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::ValidationFailed(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if password != password_confirm {
            return Err(DomainError::PasswordMismatch);
        }
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(DomainError::EmailExists(email));
        }

        let hashed = hash_password(password.to_string()).await?;
        let user = self
            .users
            .create(&NewUser::new(email.clone(), hashed))
            .await
            .map_err(|e| match e {
                DomainError::Conflict(_) => DomainError::EmailExists(email.clone()),
                other => other,
            })?;
        info!(user_id = user.id, "user registered");

        self.session_for(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        let email = normalize_email(email);
        let Some(user) = self.users.get_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };
        if !user.is_active {
            return Err(DomainError::InvalidCredentials);
        }
        if !verify_password(password.to_string(), user.hashed_password.clone()).await? {
            return Err(DomainError::InvalidCredentials);
        }

        self.session_for(user)
    }

    pub fn create_access_token(&self, email: &str) -> DomainResult<String> {
        let exp = TimeDelta::try_minutes(self.config.access_token_expire_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "token lifetime of {} minutes is out of range",
                    self.config.access_token_expire_minutes
                ))
            })?;
        let claims = Claims {
            sub: email.to_string(),
            exp: exp.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret_key.as_bytes()),
        )
        .map_err(|e| DomainError::SerializationError(format!("token encoding failed: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_key.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| DomainError::Unauthorized(format!("invalid token: {e}")))
    }

    /// The active user a bearer token belongs to.
    pub async fn current_user(&self, token: &str) -> DomainResult<User> {
        let claims = self.verify_token(token)?;
        match self.users.get_by_email(&claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(DomainError::Unauthorized("inactive user".to_string())),
            None => Err(DomainError::Unauthorized("unknown user".to_string())),
        }
    }

    fn session_for(&self, user: User) -> DomainResult<AuthSession> {
        Ok(AuthSession {
            access_token: self.create_access_token(&user.email)?,
            token_type: TOKEN_TYPE,
            user,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email))
}

/// At most [`MAX_PASSWORD_BYTES`] bytes, cut on a character boundary.
pub fn truncate_password(password: &str) -> &str {
    if password.len() <= MAX_PASSWORD_BYTES {
        return password;
    }
    let mut end = MAX_PASSWORD_BYTES;
    while !password.is_char_boundary(end) {
        end -= 1;
    }
    &password[..end]
}

pub async fn hash_password(password: String) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(truncate_password(&password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::SerializationError(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| DomainError::SerializationError(format!("hashing task failed: {e}")))?
}

pub async fn verify_password(password: String, hashed: String) -> DomainResult<bool> {
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&hashed) else {
            return false;
        };
        Argon2::default()
            .verify_password(truncate_password(&password).as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| DomainError::SerializationError(format!("verification task failed: {e}")))
}
