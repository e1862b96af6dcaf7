use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Client, Collection};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::{GroupStore, GroupUpdate, TransactionFilter, TransactionStore, GROUPS, TRANSACTIONS};
use crate::{
    error::StoreError,
    schemas::{Group, GroupMember, NewGroup, NewTransaction, Transaction},
};

/// Groups and transactions as they are laid out in MongoDB.
///
/// `createdAt` is a native BSON datetime so that sorting happens in the
/// database; the API exposes it as RFC 3339.
#[derive(Debug, Deserialize, Serialize)]
struct TransactionDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(rename = "descricao")]
    description: String,
    #[serde(rename = "valor")]
    amount: Number,
    #[serde(rename = "tipo")]
    kind: String,
    #[serde(rename = "categoria")]
    category: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "grupoId", default, skip_serializing_if = "Option::is_none")]
    group_id: Option<String>,
    #[serde(
        rename = "responsavelNome",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    responsible_name: Option<String>,
    #[serde(
        rename = "responsavelEmail",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    responsible_email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GroupDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(rename = "nome")]
    name: String,
    #[serde(
        rename = "descricao",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    description: Option<String>,
    #[serde(rename = "membros", default)]
    members: Vec<GroupMember>,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
}

fn missing_id() -> StoreError {
    StoreError::InvalidDocument("document without _id".to_string())
}

impl From<&NewTransaction> for TransactionDocument {
    fn from(new: &NewTransaction) -> Self {
        Self {
            id: None,
            description: new.description.clone(),
            amount: new.amount.clone(),
            kind: new.kind.clone(),
            category: new.category.clone(),
            created_at: DateTime::from_chrono(new.created_at),
            group_id: new.group_id.clone(),
            responsible_name: new.responsible_name.clone(),
            responsible_email: new.responsible_email.clone(),
        }
    }
}

impl TryFrom<TransactionDocument> for Transaction {
    type Error = StoreError;

    fn try_from(document: TransactionDocument) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: document.id.ok_or_else(missing_id)?.to_hex(),
            description: document.description,
            amount: document.amount,
            kind: document.kind,
            category: document.category,
            created_at: document.created_at.to_chrono(),
            group_id: document.group_id,
            responsible_name: document.responsible_name,
            responsible_email: document.responsible_email,
        })
    }
}

impl From<&NewGroup> for GroupDocument {
    fn from(new: &NewGroup) -> Self {
        Self {
            id: None,
            name: new.name.clone(),
            description: new.description.clone(),
            members: new.members.clone(),
            created_at: DateTime::from_chrono(new.created_at),
        }
    }
}

impl TryFrom<GroupDocument> for Group {
    type Error = StoreError;

    fn try_from(document: GroupDocument) -> Result<Self, Self::Error> {
        Ok(Group {
            id: document.id.ok_or_else(missing_id)?.to_hex(),
            name: document.name,
            description: document.description,
            members: document.members,
            created_at: document.created_at.to_chrono(),
        })
    }
}

fn inserted_id(result: mongodb::results::InsertOneResult) -> Result<String, StoreError> {
    result
        .inserted_id
        .as_object_id()
        .map(|id| id.to_hex())
        .ok_or_else(|| StoreError::InvalidDocument(format!("inserted id {}", result.inserted_id)))
}

fn newest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "createdAt": -1 }).build()
}

fn filter_document(filter: &TransactionFilter) -> Document {
    let mut query = Document::new();
    if let Some(group_id) = &filter.group_id {
        query.insert("grupoId", group_id.as_str());
    }
    if let Some(email) = &filter.responsible_email {
        query.insert("responsavelEmail", email.as_str());
    }
    query
}

fn set_document(update: GroupUpdate) -> Result<Document, StoreError> {
    let mut set = Document::new();
    if let Some(name) = update.name {
        set.insert("nome", name);
    }
    if let Some(description) = update.description {
        set.insert("descricao", description);
    }
    if let Some(members) = update.members {
        set.insert("membros", bson::to_bson(&members)?);
    }
    Ok(set)
}

pub struct MongoStore {
    transactions: Collection<TransactionDocument>,
    groups: Collection<GroupDocument>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database);
        Ok(Self {
            transactions: database.collection(TRANSACTIONS),
            groups: database.collection(GROUPS),
        })
    }
}

#[async_trait]
impl TransactionStore for MongoStore {
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let documents: Vec<TransactionDocument> = self
            .transactions
            .find(filter_document(filter), newest_first())
            .await?
            .try_collect()
            .await?;
        documents.into_iter().map(Transaction::try_from).collect()
    }

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, StoreError> {
        let result = self
            .transactions
            .insert_one(TransactionDocument::from(&new), None)
            .await?;
        Ok(new.into_transaction(inserted_id(result)?))
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), StoreError> {
        // Ids that are not ObjectIds cannot match anything.
        let Ok(id) = ObjectId::parse_str(id) else {
            return Ok(());
        };
        self.transactions
            .delete_one(doc! { "_id": id }, None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MongoStore {
    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError> {
        let result = self
            .groups
            .insert_one(GroupDocument::from(&new), None)
            .await?;
        Ok(new.into_group(inserted_id(result)?))
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let documents: Vec<GroupDocument> = self
            .groups
            .find(None, newest_first())
            .await?
            .try_collect()
            .await?;
        documents.into_iter().map(Group::try_from).collect()
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>, StoreError> {
        let Ok(id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        self.groups
            .find_one(doc! { "_id": id }, None)
            .await?
            .map(Group::try_from)
            .transpose()
    }

    async fn update_group(&self, id: &str, update: GroupUpdate) -> Result<bool, StoreError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let set = set_document(update)?;
        // MongoDB refuses an empty $set.
        if set.is_empty() {
            return Ok(true);
        }

        let result = self
            .groups
            .update_one(doc! { "_id": object_id }, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }
}
