//! In-process store, used with `database.kind = "memory"` and by the tests.
//!
//! Records are kept in insertion order and sorted on read, so records
//! created within the same instant still list the most recent first.
use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{GroupStore, GroupUpdate, TransactionFilter, TransactionStore};
use crate::{
    error::StoreError,
    schemas::{Group, NewGroup, NewTransaction, Transaction},
};

#[derive(Default)]
pub struct MemoryStore {
    transactions: RwLock<Vec<Transaction>>,
    groups: RwLock<Vec<Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    ObjectId::new().to_hex()
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .read()
            .await
            .iter()
            .rev()
            .filter(|transaction| filter.matches(transaction))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, StoreError> {
        let transaction = new.into_transaction(new_id());
        self.transactions.write().await.push(transaction.clone());
        Ok(transaction)
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), StoreError> {
        self.transactions
            .write()
            .await
            .retain(|transaction| transaction.id != id);
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError> {
        let group = new.into_group(new_id());
        self.groups.write().await.push(group.clone());
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let mut groups: Vec<Group> = self.groups.read().await.iter().rev().cloned().collect();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>, StoreError> {
        Ok(self
            .groups
            .read()
            .await
            .iter()
            .find(|group| group.id == id)
            .cloned())
    }

    async fn update_group(&self, id: &str, update: GroupUpdate) -> Result<bool, StoreError> {
        let mut groups = self.groups.write().await;
        match groups.iter_mut().find(|group| group.id == id) {
            Some(group) => {
                update.apply(group);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
