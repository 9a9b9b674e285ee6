use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{Filter, Totals};
use crate::transaction_repo::{NewTransaction, Transaction, TransactionRepo, TransactionRepoError};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{query_as, Postgres, QueryBuilder};
use tracing::instrument;

const TRANSACTION_COLUMNS: &str =
    "id, type AS transaction_type, category, amount, date, description";

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    transaction_type: String,
    category: String,
    amount: Decimal,
    date: NaiveDate,
    description: Option<String>,
}

impl TryFrom<TransactionEntry> for Transaction {
    type Error = anyhow::Error;

    fn try_from(value: TransactionEntry) -> Result<Self, Self::Error> {
        let transaction_type = value
            .transaction_type
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Transaction {} has an invalid type", value.id))?;
        Ok(Transaction::new(
            value.id,
            transaction_type,
            value.category,
            value.amount,
            value.date,
            value.description,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct TotalsResult {
    income: Decimal,
    expense: Decimal,
}

fn push_filter(query_builder: &mut QueryBuilder<Postgres>, filter: Filter) {
    if let Some(start_date) = filter.start_date {
        query_builder.push(" AND date >= ").push_bind(start_date);
    }
    if let Some(end_date) = filter.end_date {
        query_builder.push(" AND date <= ").push_bind(end_date);
    }
    if let Some(transaction_type) = filter.transaction_type {
        query_builder
            .push(" AND type = ")
            .push_bind(transaction_type.as_str());
    }
    if let Some(category) = filter.category {
        query_builder
            .push(" AND lower(category) = lower(")
            .push_bind(category)
            .push(")");
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let entry: TransactionEntry = query_as::<_, TransactionEntry>(&format!(
            "SELECT {} FROM transactions WHERE id = $1 AND user_id = $2",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?
        .ok_or(TransactionNotFound(transaction_id))?;
        Ok(entry.try_into()?)
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE user_id = ",
            TRANSACTION_COLUMNS
        ));
        query_builder.push_bind(user);
        push_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY date DESC, id DESC");

        let entries: Vec<TransactionEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get transactions for user {}", user))?;

        let transactions = entries
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<Transaction>, anyhow::Error>>()?;
        Ok(transactions)
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_new_transaction(
        &self,
        user: UserId,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        new_transaction.validate()?;

        let entry: TransactionEntry = query_as::<_, TransactionEntry>(&format!(
            "INSERT INTO transactions(user_id, type, category, amount, date, description) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(user)
        .bind(new_transaction.transaction_type.as_str())
        .bind(new_transaction.category_name())
        .bind(new_transaction.amount)
        .bind(new_transaction.date)
        .bind(new_transaction.description.clone())
        .fetch_one(&self.pool)
        .await
        .context("Unable to insert transaction")?;
        Ok(entry.try_into()?)
    }

    #[instrument(skip(self, updated_transaction))]
    async fn update_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        updated_transaction.validate()?;

        let entry: TransactionEntry = query_as::<_, TransactionEntry>(&format!(
            "UPDATE transactions SET type = $1, category = $2, amount = $3, date = $4, description = $5 \
             WHERE id = $6 AND user_id = $7 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(updated_transaction.transaction_type.as_str())
        .bind(updated_transaction.category_name())
        .bind(updated_transaction.amount)
        .bind(updated_transaction.date)
        .bind(updated_transaction.description.clone())
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to update transaction {}", transaction_id))?
        .ok_or(TransactionNotFound(transaction_id))?;
        Ok(entry.try_into()?)
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let entry: TransactionEntry = query_as::<_, TransactionEntry>(&format!(
            "DELETE FROM transactions WHERE id = $1 AND user_id = $2 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete transaction {}", transaction_id))?
        .ok_or(TransactionNotFound(transaction_id))?;
        Ok(entry.try_into()?)
    }

    #[instrument(skip(self))]
    async fn get_totals(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Totals, TransactionRepoError> {
        let mut query_builder = QueryBuilder::new(
            r#"
            SELECT COALESCE(SUM(amount) FILTER (WHERE type = 'income'), 0)  AS income,
                   COALESCE(SUM(amount) FILTER (WHERE type = 'expense'), 0) AS expense
            FROM transactions
            WHERE user_id = "#,
        );
        query_builder.push_bind(user);
        push_filter(&mut query_builder, filter);

        let totals: TotalsResult = query_builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Unable to get totals for user {}", user))?;

        Ok(Totals::new(totals.income, totals.expense))
    }
}
