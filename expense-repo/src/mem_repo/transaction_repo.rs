use super::MemRepo;
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    Filter, NewTransaction, Totals, Transaction, TransactionRepo, TransactionRepoError,
};
use crate::user_repo::UserId;
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashSet;

impl MemRepo {
    fn owns_transaction(
        transaction_ids: Option<&HashSet<i32>>,
        transaction_id: i32,
    ) -> Result<(), TransactionRepoError> {
        match transaction_ids {
            Some(ids) if ids.contains(&transaction_id) => Ok(()),
            _ => Err(TransactionNotFound(transaction_id)),
        }
    }
}

#[async_trait]
impl TransactionRepo for MemRepo {
    async fn get_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        Self::owns_transaction(read_guard.user_transactions.get(&user), transaction_id)?;

        let transaction = read_guard
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionNotFound(transaction_id))?;
        Ok(transaction)
    }

    async fn get_all_transactions(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let Some(transaction_ids) = read_guard.user_transactions.get(&user) else {
            return Ok(Vec::new());
        };

        let mut transactions: Vec<Transaction> = transaction_ids
            .iter()
            .filter_map(|id| read_guard.transactions.get(id))
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.cmp(a));

        Ok(transactions)
    }

    async fn create_new_transaction(
        &self,
        user: UserId,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        new_transaction.validate()?;

        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_transaction_id;
        write_guard.next_transaction_id += 1;

        let transaction = new_transaction.to_transaction(id);

        write_guard.transactions.insert(id, transaction.clone());
        write_guard
            .user_transactions
            .entry(user)
            .or_default()
            .insert(id);

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        updated_transaction.validate()?;

        let mut write_guard = self.write_lock()?;

        Self::owns_transaction(write_guard.user_transactions.get(&user), transaction_id)?;

        match write_guard.transactions.entry(transaction_id) {
            Entry::Occupied(mut e) => {
                let transaction = updated_transaction.to_transaction(transaction_id);
                e.insert(transaction.clone());
                Ok(transaction)
            }
            Entry::Vacant(_) => Err(TransactionNotFound(transaction_id)),
        }
    }

    async fn delete_transaction(
        &self,
        user: UserId,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let removed = write_guard
            .user_transactions
            .get_mut(&user)
            .map(|ids| ids.remove(&transaction_id))
            .unwrap_or(false);
        if !removed {
            return Err(TransactionNotFound(transaction_id));
        }

        write_guard
            .transactions
            .remove(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_totals(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Totals, TransactionRepoError> {
        let transactions = self.get_all_transactions(user, filter).await?;
        Ok(Totals::from_transactions(&transactions))
    }
}
