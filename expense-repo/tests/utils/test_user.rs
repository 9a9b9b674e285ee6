use expense_repo::user_repo::{NewUser, UserId, UserRepo};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: UserId,
    pub email: String,
    repo: Arc<dyn UserRepo>,
}

#[allow(dead_code)]
impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let email = unique_email();
        let new_user = NewUser::new(
            "test-user".to_owned(),
            email.clone(),
            "not a real hash".to_owned(),
        );
        let user = user_repo.create_user(new_user).await.unwrap();
        info!(user_id = user.id, "Created user");
        TestUser {
            id: user.id,
            email,
            repo: user_repo.clone(),
        }
    }

    pub async fn delete(&self) {
        self.repo.delete_user(self.id).await.unwrap()
    }
}

pub fn unique_email() -> String {
    format!("test-user-{}@example.com", Uuid::new_v4())
}
