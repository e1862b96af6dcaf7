use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

pub type RecordId = String;

/// Creation time for a new record, at the millisecond precision the store keeps.
pub fn creation_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupMember {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

/// A group as returned by the API, `id` being the one assigned by the store.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: RecordId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(
        rename = "descricao",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(rename = "membros", default)]
    pub members: Vec<GroupMember>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A group that has been validated but not stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<GroupMember>,
    pub created_at: DateTime<Utc>,
}

impl NewGroup {
    pub fn into_group(self, id: RecordId) -> Group {
        Group {
            id,
            name: self.name,
            description: self.description,
            members: self.members,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: RecordId,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor")]
    pub amount: Number,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "grupoId", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(
        rename = "responsavelNome",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub responsible_name: Option<String>,
    #[serde(
        rename = "responsavelEmail",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub responsible_email: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Number,
    pub kind: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub group_id: Option<String>,
    pub responsible_name: Option<String>,
    pub responsible_email: Option<String>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: RecordId) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            created_at: self.created_at,
            group_id: self.group_id,
            responsible_name: self.responsible_name,
            responsible_email: self.responsible_email,
        }
    }
}
