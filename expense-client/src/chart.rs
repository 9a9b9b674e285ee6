use std::rc::Rc;

use expense_repo::transaction_repo::{Filter, Totals, Transaction};
use rust_decimal::Decimal;
use tracing::warn;

use crate::api::{ApiError, TransactionApi};
use crate::list::{fetch_transactions, TransactionQueries};

pub const INCOME_COLOR: &str = "#36A2EB";
pub const EXPENSE_COLOR: &str = "#FF6384";

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: &'static str,
    pub value: Decimal,
    pub color: &'static str,
}

/// What the income/expense chart draws.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub totals: Totals,
    /// Set when the transactions could not be fetched. The totals are zero in that case.
    pub error: Option<ApiError>,
}

impl ChartData {
    pub fn from_transactions(transactions: &[Transaction]) -> ChartData {
        ChartData {
            totals: Totals::from_transactions(transactions),
            error: None,
        }
    }

    pub fn from_result(result: Result<Vec<Transaction>, ApiError>) -> ChartData {
        match result {
            Ok(transactions) => ChartData::from_transactions(&transactions),
            Err(e) => {
                warn!("Unable to load chart data: {}", e);
                ChartData {
                    totals: Totals::ZERO,
                    error: Some(e),
                }
            }
        }
    }

    pub fn segments(&self) -> [Segment; 2] {
        [
            Segment {
                label: "Income",
                value: self.totals.income,
                color: INCOME_COLOR,
            },
            Segment {
                label: "Expense",
                value: self.totals.expense,
                color: EXPENSE_COLOR,
            },
        ]
    }
}

pub struct TransactionChart<A> {
    api: Rc<A>,
    cache: Rc<TransactionQueries>,
}

impl<A> TransactionChart<A>
where
    A: TransactionApi + 'static,
{
    pub fn new(api: Rc<A>, cache: Rc<TransactionQueries>) -> TransactionChart<A> {
        TransactionChart { api, cache }
    }

    /// Never fails; a fetch error is carried on the returned data.
    pub async fn load(&self, filter: &Filter) -> ChartData {
        ChartData::from_result(fetch_transactions(&self.api, &self.cache, filter).await)
    }
}
