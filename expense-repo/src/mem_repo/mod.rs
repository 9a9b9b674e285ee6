use crate::category_repo::Category;
use crate::transaction_repo::Transaction;
use crate::user_repo::{User, UserId};
use crate::{HealthCheck, Repos};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod category_repo;
mod transaction_repo;
mod user_repo;

pub fn create_repos() -> Repos {
    Repos::from_store(Arc::new(MemRepo::new()))
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    next_user_id: UserId,
    categories: HashMap<i32, Category>,
    user_categories: HashMap<UserId, HashSet<i32>>,
    next_category_id: i32,
    transactions: HashMap<i32, Transaction>,
    user_transactions: HashMap<UserId, HashSet<i32>>,
    next_transaction_id: i32,
}

impl State {
    fn user_transactions_mut(&mut self, user: UserId) -> impl Iterator<Item = &mut Transaction> {
        let ids = self.user_transactions.get(&user).cloned().unwrap_or_default();
        self.transactions
            .iter_mut()
            .filter(move |(id, _)| ids.contains(*id))
            .map(|(_, t)| t)
    }
}

/// Keeps everything in memory behind a single lock. Ids start at 1.
pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        let state = State {
            next_user_id: 1,
            next_category_id: 1,
            next_transaction_id: 1,
            ..State::default()
        };
        MemRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}

#[async_trait]
impl HealthCheck for MemRepo {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}
