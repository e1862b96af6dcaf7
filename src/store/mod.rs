//! Persistence boundary for transactions and groups.
//!
//! Handlers only see these traits. The backend is chosen once at start-up
//! ([`crate::settings::Database`]) and shared by every request.
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::StoreError,
    schemas::{Group, GroupMember, NewGroup, NewTransaction, Transaction},
    settings::{Database, DatabaseKind},
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

pub const TRANSACTIONS: &str = "transacoes";
pub const GROUPS: &str = "grupos";

/// Equality constraints applied when listing transactions. `None` means the
/// field is not filtered on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionFilter {
    pub group_id: Option<String>,
    pub responsible_email: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            wanted.is_none() || wanted == actual
        }

        field_matches(&self.group_id, &transaction.group_id)
            && field_matches(&self.responsible_email, &transaction.responsible_email)
    }
}

/// Fields to overwrite on a stored group. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<GroupMember>>,
}

impl GroupUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.members.is_none()
    }

    pub fn apply(self, group: &mut Group) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(description) = self.description {
            group.description = Some(description);
        }
        if let Some(members) = self.members {
            group.members = members;
        }
    }
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Transactions matching `filter`, newest first.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError>;

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, StoreError>;

    /// Removes the transaction if it exists. Unknown ids are not an error.
    async fn delete_transaction(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError>;

    /// Every group, newest first.
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;

    async fn get_group(&self, id: &str) -> Result<Option<Group>, StoreError>;

    /// Overwrites the fields present in `update` on an existing group.
    /// Returns `false` when no group has that id.
    async fn update_group(&self, id: &str, update: GroupUpdate) -> Result<bool, StoreError>;
}

/// Handles shared by every request, built once at start-up.
#[derive(Clone)]
pub struct Stores {
    pub transactions: Arc<dyn TransactionStore>,
    pub groups: Arc<dyn GroupStore>,
}

impl Stores {
    pub fn new<S>(store: S) -> Self
    where
        S: TransactionStore + GroupStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            transactions: store.clone(),
            groups: store,
        }
    }

    pub async fn connect(database: &Database) -> Result<Self, StoreError> {
        match database.kind {
            DatabaseKind::Memory => {
                tracing::warn!("using the in-memory store, data is lost on exit");
                Ok(Self::new(MemoryStore::new()))
            }
            DatabaseKind::Mongo => {
                tracing::info!("connecting to MongoDB database {}", database.name);
                let store = MongoStore::connect(&database.uri, &database.name).await?;
                Ok(Self::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn group() -> Group {
        Group {
            id: "g1".to_string(),
            name: "Casa".to_string(),
            description: Some("Contas".to_string()),
            members: vec![GroupMember {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
            }],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut updated = group();
        GroupUpdate {
            description: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut updated);

        let original = group();
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.members, original.members);
        assert_eq!(updated.description.as_deref(), Some(""));
    }

    #[test]
    fn empty_update() {
        assert!(GroupUpdate::default().is_empty());
        assert!(!GroupUpdate {
            members: Some(Vec::new()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn filter_composes_conjunctively() {
        let transaction = NewTransaction {
            description: "Pizza".to_string(),
            amount: 10.into(),
            kind: "saida".to_string(),
            category: "comida".to_string(),
            created_at: Utc::now(),
            group_id: Some("g1".to_string()),
            responsible_name: None,
            responsible_email: Some("ana@x.com".to_string()),
        }
        .into_transaction("t1".to_string());

        let both = TransactionFilter {
            group_id: Some("g1".to_string()),
            responsible_email: Some("ana@x.com".to_string()),
        };
        let other_group = TransactionFilter {
            group_id: Some("g2".to_string()),
            ..both.clone()
        };

        assert!(TransactionFilter::default().matches(&transaction));
        assert!(both.matches(&transaction));
        assert!(!other_group.matches(&transaction));
    }
}
