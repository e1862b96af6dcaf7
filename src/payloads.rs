//! Request bodies and query strings accepted by the API.
//!
//! Each field is decoded as [`Typed`]: either a value of the expected type or
//! something else that was sent under that key. Validation then decides what
//! a wrong-typed field means for each endpoint, which is not always an error
//! (members with a numeric `email` still produce a member, for instance).
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize,
};
use serde_json::{Map, Number, Value};

use crate::{
    error::ApiError,
    schemas::{creation_time, GroupMember, NewGroup, NewTransaction},
    store::{GroupUpdate, TransactionFilter},
};

pub const INVALID_TRANSACTION: &str = "Campos obrigatórios inválidos";
pub const MISSING_GROUP_NAME: &str = "Nome do grupo é obrigatório.";
pub const INVALID_BODY: &str = "Corpo da requisição inválido";

/// A JSON object as received in a request body.
pub type Object = Map<String, Value>;

/// Decodes a request body that has already been checked to be a JSON object.
///
/// Derived struct impls also accept arrays and fill fields by position, so
/// bodies go through [`Object`] before reaching the input structs.
pub fn from_object<T: DeserializeOwned>(object: Object) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(object)).map_err(|err| {
        tracing::debug!("rejected request body: {err}");
        ApiError::Validation(INVALID_BODY)
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Typed<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Typed<T> {
    pub fn valid(self) -> Option<T> {
        match self {
            Typed::Valid(value) => Some(value),
            Typed::Invalid(_) => None,
        }
    }
}

/// Trims the field when it is a non-empty string. A string made of blanks
/// passes and comes out empty.
fn required(field: Option<Typed<String>>) -> Option<String> {
    field
        .and_then(Typed::valid)
        .filter(|value| !value.is_empty())
        .map(|value| value.trim().to_string())
}

/// Yields the trimmed string when the field is a string with some content.
fn trimmed(field: Option<Typed<String>>) -> Option<String> {
    field
        .and_then(Typed::valid)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn trimmed_lowercase(field: Option<Typed<String>>) -> Option<String> {
    trimmed(field).map(|value| value.to_lowercase())
}

#[derive(Debug, Default, PartialEq)]
pub struct TransactionListQuery {
    pub group_id: Option<String>,
    pub responsible_email: Option<String>,
}

/// The value of `key` when it appears exactly once in the query string.
fn single_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    let mut values = pairs
        .iter()
        .filter(|(name, _)| name == key)
        .map(|(_, value)| value);
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value.clone()),
        _ => None,
    }
}

impl TransactionListQuery {
    /// Picks the filters out of the raw query pairs. A filter repeated in the
    /// query is not a single value and is ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            group_id: single_value(pairs, "grupoId"),
            responsible_email: single_value(pairs, "responsavelEmail"),
        }
    }

    pub fn into_filter(self) -> TransactionFilter {
        TransactionFilter {
            group_id: trimmed(self.group_id.map(Typed::Valid)),
            responsible_email: trimmed_lowercase(self.responsible_email.map(Typed::Valid)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransactionNew {
    #[serde(rename = "descricao")]
    pub description: Option<Typed<String>>,
    #[serde(rename = "valor")]
    pub amount: Option<Typed<Number>>,
    #[serde(rename = "tipo")]
    pub kind: Option<Typed<String>>,
    #[serde(rename = "categoria")]
    pub category: Option<Typed<String>>,
    #[serde(rename = "grupoId")]
    pub group_id: Option<Typed<String>>,
    #[serde(rename = "responsavelNome")]
    pub responsible_name: Option<Typed<String>>,
    #[serde(rename = "responsavelEmail")]
    pub responsible_email: Option<Typed<String>>,
}

impl TransactionNew {
    pub fn validate(self) -> Result<NewTransaction, ApiError> {
        let invalid = || ApiError::Validation(INVALID_TRANSACTION);

        let description = required(self.description).ok_or_else(invalid)?;
        let amount = self.amount.and_then(Typed::valid).ok_or_else(invalid)?;
        let kind = self
            .kind
            .and_then(Typed::valid)
            .filter(|kind| !kind.is_empty())
            .ok_or_else(invalid)?;
        let category = self
            .category
            .and_then(Typed::valid)
            .filter(|category| !category.is_empty())
            .ok_or_else(invalid)?;

        Ok(NewTransaction {
            description,
            amount,
            kind,
            category,
            created_at: creation_time(),
            group_id: trimmed(self.group_id),
            responsible_name: trimmed(self.responsible_name),
            responsible_email: trimmed_lowercase(self.responsible_email),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MemberInput {
    #[serde(rename = "nome")]
    pub name: Option<Typed<String>>,
    pub email: Option<Typed<String>>,
}

impl MemberInput {
    fn normalize(self) -> GroupMember {
        GroupMember {
            name: self
                .name
                .and_then(Typed::valid)
                .map(|name| name.trim().to_string())
                .unwrap_or_default(),
            email: self
                .email
                .and_then(Typed::valid)
                .map(|email| email.trim().to_lowercase())
                .unwrap_or_default(),
        }
    }
}

pub type MembersInput = Typed<Vec<Typed<Object>>>;

/// Turns whatever was sent as `membros` into a member list.
///
/// Anything that is not an array becomes an empty list. Entries keep their
/// position; entries that are not objects become a member with empty fields.
pub fn normalize_members(input: Option<MembersInput>) -> Vec<GroupMember> {
    input
        .and_then(Typed::valid)
        .map(normalize_entries)
        .unwrap_or_default()
}

fn normalize_entries(entries: Vec<Typed<Object>>) -> Vec<GroupMember> {
    entries
        .into_iter()
        .map(|entry| {
            entry
                .valid()
                .and_then(|object| serde_json::from_value(Value::Object(object)).ok())
                .unwrap_or_else(MemberInput::default)
                .normalize()
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GroupNew {
    #[serde(rename = "nome")]
    pub name: Option<Typed<String>>,
    #[serde(rename = "descricao")]
    pub description: Option<Typed<String>>,
    #[serde(rename = "membros")]
    pub members: Option<MembersInput>,
}

impl GroupNew {
    pub fn validate(self) -> Result<NewGroup, ApiError> {
        let name = required(self.name).ok_or(ApiError::Validation(MISSING_GROUP_NAME))?;

        Ok(NewGroup {
            name,
            description: self
                .description
                .and_then(Typed::valid)
                .map(|description| description.trim().to_string()),
            members: normalize_members(self.members),
            created_at: creation_time(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GroupEdit {
    #[serde(rename = "nome")]
    pub name: Option<Typed<String>>,
    #[serde(rename = "descricao")]
    pub description: Option<Typed<String>>,
    #[serde(rename = "membros")]
    pub members: Option<MembersInput>,
}

impl GroupEdit {
    /// Keeps only the fields that should overwrite the stored group.
    ///
    /// A blank `nome` is dropped, while a blank `descricao` is kept so it
    /// clears the stored description.
    pub fn into_update(self) -> GroupUpdate {
        GroupUpdate {
            name: trimmed(self.name),
            description: self
                .description
                .and_then(Typed::valid)
                .map(|description| description.trim().to_string()),
            members: self
                .members
                .and_then(Typed::valid)
                .map(normalize_entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transaction(body: serde_json::Value) -> Result<NewTransaction, ApiError> {
        serde_json::from_value::<TransactionNew>(body).unwrap().validate()
    }

    fn members(body: serde_json::Value) -> Vec<GroupMember> {
        let group: GroupNew =
            serde_json::from_value(json!({ "nome": "g", "membros": body })).unwrap();
        normalize_members(group.members)
    }

    #[test]
    fn transaction_keeps_required_fields() {
        let tx = transaction(json!({
            "descricao": "  Mercado ",
            "valor": 42.5,
            "tipo": "saida",
            "categoria": "comida",
        }))
        .unwrap();

        assert_eq!(tx.description, "Mercado");
        assert_eq!(tx.amount.as_f64(), Some(42.5));
        assert_eq!(tx.kind, "saida");
        assert_eq!(tx.category, "comida");
        assert_eq!(tx.group_id, None);
        assert_eq!(tx.responsible_name, None);
        assert_eq!(tx.responsible_email, None);
    }

    #[test]
    fn transaction_accepts_integer_amount() {
        let tx = transaction(json!({
            "descricao": "Aluguel",
            "valor": 1200,
            "tipo": "saida",
            "categoria": "casa",
        }))
        .unwrap();

        assert_eq!(tx.amount, Number::from(1200));
        assert_eq!(serde_json::to_string(&tx.amount).unwrap(), "1200");
    }

    #[test]
    fn transaction_normalizes_optional_fields() {
        let tx = transaction(json!({
            "descricao": "Pizza",
            "valor": 80,
            "tipo": "saida",
            "categoria": "comida",
            "grupoId": " g1 ",
            "responsavelNome": " Ana ",
            "responsavelEmail": " Ana@X.com ",
        }))
        .unwrap();

        assert_eq!(tx.group_id.as_deref(), Some("g1"));
        assert_eq!(tx.responsible_name.as_deref(), Some("Ana"));
        assert_eq!(tx.responsible_email.as_deref(), Some("ana@x.com"));
    }

    #[test]
    fn transaction_drops_blank_or_mistyped_optional_fields() {
        let tx = transaction(json!({
            "descricao": "Pizza",
            "valor": 80,
            "tipo": "saida",
            "categoria": "comida",
            "grupoId": "   ",
            "responsavelNome": 7,
            "responsavelEmail": "",
        }))
        .unwrap();

        assert_eq!(tx.group_id, None);
        assert_eq!(tx.responsible_name, None);
        assert_eq!(tx.responsible_email, None);
    }

    #[test]
    fn transaction_rejects_string_amount() {
        let err = transaction(json!({
            "descricao": "Pizza",
            "valor": "80",
            "tipo": "saida",
            "categoria": "comida",
        }))
        .unwrap_err();

        assert!(matches!(err, ApiError::Validation(INVALID_TRANSACTION)));
    }

    #[test]
    fn transaction_rejects_missing_fields() {
        for body in [
            json!({ "valor": 1, "tipo": "a", "categoria": "b" }),
            json!({ "descricao": "x", "tipo": "a", "categoria": "b" }),
            json!({ "descricao": "x", "valor": 1, "categoria": "b" }),
            json!({ "descricao": "x", "valor": 1, "tipo": "a" }),
            json!({ "descricao": "", "valor": 1, "tipo": "a", "categoria": "b" }),
            json!({ "descricao": "x", "valor": 1, "tipo": "", "categoria": "b" }),
            json!({ "descricao": "x", "valor": null, "tipo": "a", "categoria": "b" }),
            json!({ "descricao": 3, "valor": 1, "tipo": "a", "categoria": "b" }),
        ] {
            assert!(transaction(body).is_err());
        }
    }

    #[test]
    fn blank_description_is_accepted_and_trimmed() {
        let tx = transaction(json!({
            "descricao": "   ",
            "valor": 1,
            "tipo": "a",
            "categoria": "b",
        }))
        .unwrap();

        assert_eq!(tx.description, "");
    }

    #[test]
    fn members_are_trimmed_and_lowercased() {
        assert_eq!(
            members(json!([{ "nome": " Ana ", "email": "ANA@X.com" }])),
            vec![GroupMember {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
            }]
        );
    }

    #[test]
    fn members_tolerate_missing_and_mistyped_fields() {
        assert_eq!(
            members(json!([{ "nome": "Bia" }, { "email": 3 }, 12, ["Caio", "c@x.com"]])),
            vec![
                GroupMember {
                    name: "Bia".to_string(),
                    email: String::new(),
                },
                GroupMember {
                    name: String::new(),
                    email: String::new(),
                },
                GroupMember {
                    name: String::new(),
                    email: String::new(),
                },
                GroupMember {
                    name: String::new(),
                    email: String::new(),
                },
            ]
        );
    }

    #[test]
    fn members_from_non_array_are_empty() {
        assert!(members(json!("Ana")).is_empty());
        assert!(members(json!(null)).is_empty());
        assert!(members(json!({ "nome": "Ana" })).is_empty());
        assert!(normalize_members(None).is_empty());
    }

    #[test]
    fn group_requires_a_name() {
        for body in [json!({}), json!({ "nome": "" }), json!({ "nome": 5 })] {
            let group: GroupNew = serde_json::from_value(body).unwrap();
            assert!(matches!(
                group.validate(),
                Err(ApiError::Validation(MISSING_GROUP_NAME))
            ));
        }
    }

    #[test]
    fn blank_group_name_is_accepted_and_trimmed() {
        let group: GroupNew = serde_json::from_value(json!({ "nome": "  " })).unwrap();
        assert_eq!(group.validate().unwrap().name, "");
    }

    #[test]
    fn group_description_is_optional() {
        let group: GroupNew =
            serde_json::from_value(json!({ "nome": " Casa ", "descricao": 1 })).unwrap();
        let group = group.validate().unwrap();

        assert_eq!(group.name, "Casa");
        assert_eq!(group.description, None);
        assert!(group.members.is_empty());
    }

    #[test]
    fn empty_description_clears_on_update() {
        let edit: GroupEdit = serde_json::from_value(json!({ "descricao": "" })).unwrap();

        assert_eq!(
            edit.into_update(),
            GroupUpdate {
                name: None,
                description: Some(String::new()),
                members: None,
            }
        );
    }

    #[test]
    fn update_ignores_blank_name_and_non_array_members() {
        let edit: GroupEdit =
            serde_json::from_value(json!({ "nome": " ", "membros": "Ana" })).unwrap();

        assert_eq!(edit.into_update(), GroupUpdate::default());
    }

    #[test]
    fn update_replaces_members_with_empty_array() {
        let edit: GroupEdit = serde_json::from_value(json!({ "membros": [] })).unwrap();

        assert_eq!(edit.into_update().members, Some(Vec::new()));
    }

    #[test]
    fn object_body_with_wrong_typed_fields_still_decodes() {
        let object = json!({ "nome": ["x"], "extra": true });
        let Value::Object(object) = object else {
            unreachable!()
        };
        let group: GroupNew = from_object(object).unwrap();
        assert!(group.validate().is_err());
    }

    #[test]
    fn repeated_query_filters_are_ignored() {
        let pairs = vec![
            ("grupoId".to_string(), "a".to_string()),
            ("grupoId".to_string(), "b".to_string()),
            ("responsavelEmail".to_string(), "Ana@X.com".to_string()),
        ];

        assert_eq!(
            TransactionListQuery::from_pairs(&pairs).into_filter(),
            TransactionFilter {
                group_id: None,
                responsible_email: Some("ana@x.com".to_string()),
            }
        );
    }

    #[test]
    fn list_query_is_trimmed() {
        let filter = TransactionListQuery {
            group_id: Some("  ".to_string()),
            responsible_email: Some(" Ana@X.com".to_string()),
        }
        .into_filter();

        assert_eq!(filter.group_id, None);
        assert_eq!(filter.responsible_email.as_deref(), Some("ana@x.com"));
    }
}
