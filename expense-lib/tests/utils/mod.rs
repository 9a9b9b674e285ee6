use std::sync::Arc;

use expense_lib::user::UserId;
use rstest::*;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use expense_repo::user_repo::{NewUser, UserRepo};
use expense_repo::Repos;

pub mod mock;

/// App with the transaction and category routes, authenticated as `$user_id` without a token.
#[allow(unused_macros)]
macro_rules! build_app {
    ($repos:ident, $user_id:expr) => {{
        let app = App::new()
            .app_data(Data::new($repos.transactions.clone()))
            .app_data(Data::new($repos.categories.clone()))
            .app_data(expense_lib::error::json_config())
            .app_data(expense_lib::error::query_config())
            .app_data(expense_lib::error::path_config())
            .wrap(expense_lib::tracing::create_middleware())
            .service(
                expense_lib::transaction::transaction_service()
                    .wrap(MockAuthentication { user_id: $user_id }),
            )
            .service(
                expense_lib::category::category_service()
                    .wrap(MockAuthentication { user_id: $user_id }),
            );
        tracing::info!("Built app");
        app
    }};
}

#[allow(unused_macros)]
macro_rules! create_transaction {
    (&$service:ident, $new_transaction:expr) => {{
        let request = TestRequest::post()
            .uri("/transactions")
            .set_json(&$new_transaction)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating transaction",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

pub struct TestUser {
    pub user_id: UserId,
    pub email: String,
    repo: Arc<dyn UserRepo>,
}

#[allow(dead_code)]
impl TestUser {
    pub const PASSWORD: &'static str = "pass";

    pub async fn new(user_repo: Arc<dyn UserRepo>) -> TestUser {
        let email = format!("test-user-{}@example.com", Uuid::new_v4());
        let new_user = NewUser::new(
            "test-user".to_owned(),
            email.clone(),
            expense_lib::auth::password::encode_password(Self::PASSWORD).unwrap(),
        );
        let user = user_repo.create_user(new_user).await.unwrap();
        info!(user_id = user.id, "Created user");
        TestUser {
            user_id: user.id,
            email,
            repo: user_repo,
        }
    }

    pub async fn delete(&self) {
        self.repo.delete_user(self.user_id).await.unwrap()
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    expense_repo::mem_repo::create_repos()
}
