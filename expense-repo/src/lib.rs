use async_trait::async_trait;
use std::sync::Arc;

use crate::category_repo::CategoryRepo;
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;

pub mod category_repo;
pub mod transaction_repo;
pub mod user_repo;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> bool;
}

/// Handles to every repository, all backed by the same store.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub categories: Arc<dyn CategoryRepo>,
    pub transactions: Arc<dyn TransactionRepo>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repos {
    pub fn from_store<S>(store: Arc<S>) -> Repos
    where
        S: UserRepo + CategoryRepo + TransactionRepo + HealthCheck + 'static,
    {
        Repos {
            users: store.clone(),
            categories: store.clone(),
            transactions: store.clone(),
            health: store,
        }
    }
}
