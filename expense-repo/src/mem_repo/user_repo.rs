use super::MemRepo;
use crate::user_repo::UserRepoError::{EmailAlreadyRegistered, EmailNotRegistered, UserNotFound};
use crate::user_repo::{NewUser, User, UserId, UserRepo, UserRepoError};
use async_trait::async_trait;

#[async_trait]
impl UserRepo for MemRepo {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| EmailNotRegistered(email.to_owned()))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.values().any(|u| u.email == new_user.email) {
            return Err(EmailAlreadyRegistered(new_user.email));
        }

        let id = write_guard.next_user_id;
        write_guard.next_user_id += 1;

        let user = new_user.to_user(id);
        write_guard.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        let email_taken = write_guard
            .users
            .values()
            .any(|u| u.id != user_id && u.email == email);
        if email_taken {
            return Err(EmailAlreadyRegistered(email.to_owned()));
        }

        let user = write_guard
            .users
            .get_mut(&user_id)
            .ok_or(UserNotFound(user_id))?;
        user.username = username.to_owned();
        user.email = email.to_owned();
        Ok(user.clone())
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        let user = write_guard
            .users
            .get_mut(&user_id)
            .ok_or(UserNotFound(user_id))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.remove(&user_id).is_none() {
            return Err(UserNotFound(user_id));
        }

        let transaction_ids = write_guard
            .user_transactions
            .remove(&user_id)
            .unwrap_or_default();
        for id in transaction_ids {
            write_guard.transactions.remove(&id);
        }
        let category_ids = write_guard
            .user_categories
            .remove(&user_id)
            .unwrap_or_default();
        for id in category_ids {
            write_guard.categories.remove(&id);
        }
        Ok(())
    }
}
