use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use chrono::NaiveDate;
use expense_client::api::{ApiError, CategoryApi, TransactionApi};
use expense_repo::category_repo::{Category, CategoryRepoError};
use expense_repo::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepoError, TransactionType,
};
use expense_repo::user_repo::UserId;
use expense_repo::Repos;
use futures::channel::oneshot;
use rust_decimal::Decimal;

pub const USER: UserId = 1;

/// Answers like the backend would, straight from an in-memory store, and counts the calls made.
pub struct FakeApi {
    pub repos: Repos,
    pub list_calls: Cell<usize>,
    pub delete_calls: Cell<usize>,
    pub category_calls: Cell<usize>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    failing: Cell<bool>,
}

impl FakeApi {
    pub fn new() -> FakeApi {
        FakeApi {
            repos: expense_repo::mem_repo::create_repos(),
            list_calls: Cell::new(0),
            delete_calls: Cell::new(0),
            category_calls: Cell::new(0),
            gate: RefCell::new(None),
            failing: Cell::new(false),
        }
    }

    /// The next list request reads the store, then holds its answer until the returned sender
    /// fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gate.replace(Some(receiver));
        sender
    }

    pub fn fail(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub async fn add(
        &self,
        transaction_type: TransactionType,
        category: &str,
        amount: i64,
        description: Option<&str>,
    ) -> Transaction {
        let new_transaction = NewTransaction::new(
            transaction_type,
            Some(category.to_owned()),
            Decimal::new(amount, 0),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description.map(str::to_owned),
        );
        self.repos
            .transactions
            .create_new_transaction(USER, new_transaction)
            .await
            .unwrap()
    }
}

fn transaction_error(e: TransactionRepoError) -> ApiError {
    match e {
        TransactionRepoError::TransactionNotFound(id) => ApiError::Status {
            status: 404,
            message: format!("Transaction {} not found", id),
        },
        e => ApiError::Status {
            status: 500,
            message: e.to_string(),
        },
    }
}

fn category_error(e: CategoryRepoError) -> ApiError {
    ApiError::Status {
        status: 500,
        message: e.to_string(),
    }
}

#[async_trait(?Send)]
impl TransactionApi for FakeApi {
    async fn list_transactions(&self, filter: &Filter) -> Result<Vec<Transaction>, ApiError> {
        self.list_calls.set(self.list_calls.get() + 1);
        let result = self
            .repos
            .transactions
            .get_all_transactions(USER, filter.clone())
            .await
            .map_err(transaction_error);

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.failing.get() {
            return Err(ApiError::Status {
                status: 500,
                message: "Internal server error".to_owned(),
            });
        }
        result
    }

    async fn delete_transaction(&self, transaction_id: i32) -> Result<Transaction, ApiError> {
        self.delete_calls.set(self.delete_calls.get() + 1);
        self.repos
            .transactions
            .delete_transaction(USER, transaction_id)
            .await
            .map_err(transaction_error)
    }
}

#[async_trait(?Send)]
impl CategoryApi for FakeApi {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.category_calls.set(self.category_calls.get() + 1);
        self.repos
            .categories
            .get_categories(USER)
            .await
            .map_err(category_error)
    }
}
