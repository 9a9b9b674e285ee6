use std::rc::Rc;

use expense_repo::category_repo::Category;
use expense_repo::transaction_repo::{Filter, Transaction};

use crate::api::{ApiError, CategoryApi, TransactionApi};
use crate::chart::{ChartData, TransactionChart};
use crate::filter::{FilterError, FilterState};
use crate::list::{Confirm, DeleteOutcome, TransactionList, TransactionQueries};
use crate::query::{QueryCache, QueryState};

/// Everything the dashboard page shows for the current filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub filter: Filter,
    pub transactions: Result<Vec<Transaction>, ApiError>,
    pub chart: ChartData,
}

/// Owns the filter state and hands the current filter to the list and the chart, which share
/// one transaction cache.
pub struct Dashboard<A> {
    api: Rc<A>,
    filters: FilterState,
    transactions: Rc<TransactionQueries>,
    categories: QueryCache<(), Vec<Category>>,
    list: TransactionList<A>,
    chart: TransactionChart<A>,
}

impl<A> Dashboard<A>
where
    A: TransactionApi + CategoryApi + 'static,
{
    pub fn new(api: Rc<A>) -> Dashboard<A> {
        let transactions = Rc::new(TransactionQueries::new());
        Dashboard {
            list: TransactionList::new(api.clone(), transactions.clone()),
            chart: TransactionChart::new(api.clone(), transactions.clone()),
            api,
            filters: FilterState::new(),
            transactions,
            categories: QueryCache::new(),
        }
    }

    pub fn filter(&self) -> &Filter {
        self.filters.filter()
    }

    pub fn set_filters(&mut self, filter: Filter) {
        self.filters.set(filter);
    }

    pub fn update_filter_field(&mut self, name: &str, value: &str) -> Result<(), FilterError> {
        self.filters.update_field(name, value)
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.list.set_search_term(term);
    }

    pub fn list(&self) -> &TransactionList<A> {
        &self.list
    }

    pub fn chart(&self) -> &TransactionChart<A> {
        &self.chart
    }

    /// Loads the list and the chart together. Both go through the same cache key, so a cold load
    /// makes one request.
    pub async fn load(&self) -> DashboardView {
        let filter = self.filters.filter();
        let (transactions, chart) = futures::join!(self.list.load(filter), self.chart.load(filter));
        DashboardView {
            filter: filter.clone(),
            transactions,
            chart,
        }
    }

    pub fn transactions_state(&self) -> QueryState<Vec<Transaction>> {
        self.transactions.state(self.filters.filter())
    }

    pub async fn delete_transaction<C>(
        &self,
        transaction_id: i32,
        confirm: &C,
    ) -> Result<DeleteOutcome, ApiError>
    where
        C: Confirm + ?Sized,
    {
        self.list
            .delete(self.filters.filter(), transaction_id, confirm)
            .await
    }

    /// Categories for the filter's category picker.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let api = self.api.clone();
        self.categories
            .fetch((), move || async move { api.list_categories().await })
            .await
    }

    pub fn invalidate_categories(&self) {
        self.categories.invalidate_all();
    }
}
