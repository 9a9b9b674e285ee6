use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type UserId = i32;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;
    async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<User, UserRepoError>;
    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError>;
    /// Deletes the user along with all of their categories and transactions.
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError>;
}

#[derive(Clone, PartialEq, Debug)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    pub fn new(id: UserId, username: String, email: String, password_hash: String) -> User {
        User {
            id,
            username,
            email,
            password_hash,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: String, email: String, password_hash: String) -> NewUser {
        NewUser {
            username,
            email,
            password_hash,
        }
    }

    pub fn to_user(self, id: UserId) -> User {
        User::new(id, self.username, self.email, self.password_hash)
    }
}

/// The parts of a [User] that are safe to hand out.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(UserId),
    #[error("No user registered with email {0}")]
    EmailNotRegistered(String),
    #[error("A user with email {0} already exists")]
    EmailAlreadyRegistered(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
