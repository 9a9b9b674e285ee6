pub mod generator;
pub mod test_user;

use expense_repo::Repos;
use std::env;
use tracing::warn;

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

/// Builds the repos under test. The SQLx repos need `TEST_DATABASE_URL`; without it those cases
/// are skipped.
pub async fn build_repos(repo_type: RepoType) -> Option<Repos> {
    match repo_type {
        RepoType::SQLx => {
            let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
                warn!("TEST_DATABASE_URL not set, skipping SQLx case");
                return None;
            };
            let repos = expense_repo::sqlx_repo::create_repos(&database_url, 1)
                .await
                .unwrap();
            Some(repos)
        }
        RepoType::Mem => Some(expense_repo::mem_repo::create_repos()),
    }
}
