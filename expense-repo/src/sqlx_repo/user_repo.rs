use crate::sqlx_repo::{is_unique_violation, SQLxRepo};
use crate::user_repo::{NewUser, User, UserId, UserRepo, UserRepoError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User::new(value.id, value.username, value.email, value.password_hash)
    }
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let user = query_as::<_, UserEntry>(
            "SELECT id, username, email, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get user {}", user_id))?;
        user.map(User::from)
            .ok_or(UserRepoError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let user = query_as::<_, UserEntry>(
            "SELECT id, username, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get user with email {}", email))?;
        user.map(User::from)
            .ok_or_else(|| UserRepoError::EmailNotRegistered(email.to_owned()))
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let user = query_as::<_, UserEntry>(
            "INSERT INTO users(username, email, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING id, username, email, password_hash",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create user {}", new_user.email))?;
        user.map(User::from)
            .ok_or(UserRepoError::EmailAlreadyRegistered(new_user.email))
    }

    #[instrument(skip(self))]
    async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<User, UserRepoError> {
        let user = query_as::<_, UserEntry>(
            "UPDATE users SET username = $1, email = $2 WHERE id = $3 \
             RETURNING id, username, email, password_hash",
        )
        .bind(username)
        .bind(email)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UserRepoError::EmailAlreadyRegistered(email.to_owned())
            } else {
                UserRepoError::Other(
                    anyhow::Error::new(e).context(format!("Unable to update user {}", user_id)),
                )
            }
        })?;
        user.map(User::from)
            .ok_or(UserRepoError::UserNotFound(user_id))
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError> {
        let result = query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update password for {}", user_id))?;
        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(UserRepoError::UserNotFound(user_id))
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        // categories and transactions go with the user through ON DELETE CASCADE
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete user {}", user_id))?;
        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(UserRepoError::UserNotFound(user_id))
        }
    }
}
