use std::rc::Rc;

use expense_repo::transaction_repo::{Filter, Transaction};
use tracing::{info, warn};

use crate::api::{ApiError, TransactionApi};
use crate::query::QueryCache;

/// Cached transaction lists, keyed by the filter they were fetched with.
pub type TransactionQueries = QueryCache<Filter, Vec<Transaction>>;

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this transaction?";

/// Asks the user before something destructive happens.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent.
    Cancelled,
    /// Deleted, along with the refetched list.
    Deleted {
        deleted: Transaction,
        transactions: Vec<Transaction>,
    },
    /// The backend no longer had the transaction. The list was refetched anyway.
    AlreadyDeleted { transactions: Vec<Transaction> },
}

/// Case-insensitive substring search over category and description. An empty term matches
/// everything.
pub fn search<'a>(transactions: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
    let term = term.to_lowercase();
    if term.is_empty() {
        return transactions.iter().collect();
    }
    transactions
        .iter()
        .filter(|t| {
            t.category.to_lowercase().contains(&term)
                || t.description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(&term))
                    .unwrap_or(false)
        })
        .collect()
}

/// Fetches the transactions matching `filter` through `cache`.
pub async fn fetch_transactions<A>(
    api: &Rc<A>,
    cache: &TransactionQueries,
    filter: &Filter,
) -> Result<Vec<Transaction>, ApiError>
where
    A: TransactionApi + 'static,
{
    let api = api.clone();
    let request_filter = filter.clone();
    cache
        .fetch(filter.clone(), move || async move {
            api.list_transactions(&request_filter).await
        })
        .await
}

pub struct TransactionList<A> {
    api: Rc<A>,
    cache: Rc<TransactionQueries>,
    search_term: String,
}

impl<A> TransactionList<A>
where
    A: TransactionApi + 'static,
{
    pub fn new(api: Rc<A>, cache: Rc<TransactionQueries>) -> TransactionList<A> {
        TransactionList {
            api,
            cache,
            search_term: String::new(),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Narrows what [TransactionList::visible] shows without fetching again.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub async fn load(&self, filter: &Filter) -> Result<Vec<Transaction>, ApiError> {
        fetch_transactions(&self.api, &self.cache, filter).await
    }

    pub fn visible<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        search(transactions, &self.search_term)
    }

    /// Deletes after confirmation. Once the backend has answered, every cached transaction list
    /// is invalidated and the list for `filter` is fetched again.
    pub async fn delete<C>(
        &self,
        filter: &Filter,
        transaction_id: i32,
        confirm: &C,
    ) -> Result<DeleteOutcome, ApiError>
    where
        C: Confirm + ?Sized,
    {
        if !confirm.confirm(DELETE_CONFIRMATION) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let deleted = match self.api.delete_transaction(transaction_id).await {
            Ok(deleted) => Some(deleted),
            Err(e) if e.is_not_found() => {
                warn!(transaction_id, "Transaction was already deleted");
                None
            }
            Err(e) => return Err(e),
        };

        self.cache.invalidate_all();
        let transactions = self.load(filter).await?;

        Ok(match deleted {
            Some(deleted) => {
                info!(transaction_id, "Deleted transaction");
                DeleteOutcome::Deleted {
                    deleted,
                    transactions,
                }
            }
            None => DeleteOutcome::AlreadyDeleted { transactions },
        })
    }
}
