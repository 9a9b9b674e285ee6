use crate::user_repo::UserId;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Category assigned to transactions that were created without one, or whose category was deleted.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category filter value the frontend sends for "All Categories".
pub const ALL_CATEGORIES: &str = "All";

/// Category names match regardless of case. Category records are stored lower-cased while
/// transactions keep the name as typed.
pub fn same_category(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn get_all_transactions(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn create_new_transaction(
        &self,
        user: UserId,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn get_totals(&self, user: UserId, filter: Filter)
        -> Result<Totals, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(format!(
                "unknown transaction type '{}', expected 'income' or 'expense'",
                s
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    pub id: i32,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Transaction {
    pub const fn new(
        id: i32,
        transaction_type: TransactionType,
        category: String,
        amount: Decimal,
        date: NaiveDate,
        description: Option<String>,
    ) -> Transaction {
        Transaction {
            id,
            transaction_type,
            category,
            amount,
            date,
            description,
        }
    }
}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTransaction {
    pub const fn new(
        transaction_type: TransactionType,
        category: Option<String>,
        amount: Decimal,
        date: NaiveDate,
        description: Option<String>,
    ) -> NewTransaction {
        NewTransaction {
            transaction_type,
            category,
            amount,
            date,
            description,
        }
    }

    /// Checks the constraints the storage layer enforces on every write.
    pub fn validate(&self) -> Result<(), TransactionRepoError> {
        if self.amount < Decimal::ZERO {
            return Err(TransactionRepoError::InvalidTransaction(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    /// The category name that gets stored, falling back to [UNCATEGORIZED].
    pub fn category_name(&self) -> String {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => UNCATEGORIZED.to_owned(),
            Some(category) => category.to_owned(),
        }
    }

    pub fn to_transaction(self, id: i32) -> Transaction {
        let category = self.category_name();
        Transaction {
            id,
            transaction_type: self.transaction_type,
            category,
            amount: self.amount,
            date: self.date,
            description: self.description,
        }
    }
}

/// Constraints for listing transactions. `None` means unconstrained.
///
/// The serde representation matches the list query string: `startDate`, `endDate`, `type` and
/// `category`, where an empty value (or `All` for the category) means no constraint.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub transaction_type: Option<TransactionType>,
    #[serde(
        default,
        deserialize_with = "category_filter",
        serialize_with = "none_as_empty"
    )]
    pub category: Option<String>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        start_date: None,
        end_date: None,
        transaction_type: None,
        category: None,
    };

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(start_date) = self.start_date {
            if transaction.date < start_date {
                return false;
            }
        }
        if let Some(end_date) = self.end_date {
            if transaction.date > end_date {
                return false;
            }
        }
        if let Some(transaction_type) = self.transaction_type {
            if transaction.transaction_type != transaction_type {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !same_category(&transaction.category, category) {
                return false;
            }
        }
        true
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(D::Error::custom),
    }
}

fn category_filter<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") | Some(ALL_CATEGORIES) => Ok(None),
        Some(category) => Ok(Some(category.to_owned())),
    }
}

fn none_as_empty<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Display,
{
    match value {
        Some(value) => serializer.collect_str(value),
        None => serializer.serialize_str(""),
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Totals {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub income: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub expense: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub balance: Decimal,
}

impl Totals {
    pub const ZERO: Totals = Totals {
        income: Decimal::ZERO,
        expense: Decimal::ZERO,
        balance: Decimal::ZERO,
    };

    pub fn new(income: Decimal, expense: Decimal) -> Totals {
        Totals {
            income,
            expense,
            balance: income - expense,
        }
    }

    /// Sums income and expense in a single pass.
    pub fn from_transactions<'a, I>(transactions: I) -> Totals
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let (income, expense) = transactions.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expense), t| match t.transaction_type {
                TransactionType::Income => (income + t.amount, expense),
                TransactionType::Expense => (income, expense + t.amount),
            },
        );
        Totals::new(income, expense)
    }
}
