//! User repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a duplicate email is a `Conflict`.
    async fn create(&self, user: &NewUser) -> DomainResult<User>;

    async fn get(&self, id: i64) -> DomainResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>>;
}
