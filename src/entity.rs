//! Content entity types and their record serialization.
//!
//! Entities mirror what the content store hands out: nodes, paragraphs and
//! files. Field bags are typed through [`FieldValue`] instead of free-form
//! JSON so the record projection stays predictable.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A serialized entity: property name → list of item objects.
pub type Record = Map<String, Value>;

/// Entity identifier. The store uses integer ids for most entity types,
/// but string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(u64),
    Str(String),
}

impl EntityId {
    /// Canonical string form used as the lookup key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// Pointer from a reference field to another entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub target_type: String,
    pub target_id: EntityId,
}

impl EntityRef {
    pub fn is_type(&self, entity_type: &str) -> bool {
        self.target_type == entity_type
    }
}

#[cfg(test)]
impl EntityRef {
    pub fn paragraph(id: impl Into<EntityId>) -> Self {
        Self {
            target_type: "paragraph".to_string(),
            target_id: id.into(),
        }
    }

    pub fn file(id: impl Into<EntityId>) -> Self {
        Self {
            target_type: "file".to_string(),
            target_id: id.into(),
        }
    }
}

/// Typed value of a single entity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    References(Vec<EntityRef>),
}

impl FieldValue {
    /// Referenced entities, in field order. Scalar fields reference nothing.
    pub fn references(&self) -> &[EntityRef] {
        match self {
            Self::References(refs) => refs.as_slice(),
            _ => &[],
        }
    }

    fn to_items(&self) -> Value {
        match self {
            Self::Text(s) => json!([{ "value": s }]),
            Self::Integer(n) => json!([{ "value": n }]),
            Self::Boolean(b) => json!([{ "value": b }]),
            Self::References(refs) => Value::Array(
                refs.iter()
                    .map(|r| json!({ "target_id": r.target_id, "target_type": r.target_type }))
                    .collect(),
            ),
        }
    }
}

/// Named fields of an entity.
pub type Fields = BTreeMap<String, FieldValue>;

/// Primary content record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub bundle: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "status", default)]
    pub published: bool,
    #[serde(default)]
    pub fields: Fields,
}

impl Node {
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Referenced entities of `name`; empty when the field is absent.
    pub fn referenced(&self, name: &str) -> &[EntityRef] {
        self.fields.get(name).map(FieldValue::references).unwrap_or(&[])
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!([{ "value": self.id }]));
        record.insert("type".to_string(), json!([{ "target_id": self.bundle }]));
        record.insert("title".to_string(), json!([{ "value": self.title }]));
        record.insert("status".to_string(), json!([{ "value": self.published }]));
        append_fields(&mut record, &self.fields);
        record
    }
}

/// Structured sub-record attached to a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub bundle: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Paragraph {
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn referenced(&self, name: &str) -> &[EntityRef] {
        self.fields.get(name).map(FieldValue::references).unwrap_or(&[])
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!([{ "value": self.id }]));
        record.insert("type".to_string(), json!([{ "target_id": self.bundle }]));
        append_fields(&mut record, &self.fields);
        record
    }
}

/// Stored binary asset.
///
/// Only `uri` feeds URL generation. `filename` and `filemime` are carried so
/// fixture and content API payloads deserialize and re-serialize intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: EntityId,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filemime: Option<String>,
}

// Base properties win over same-named fields.
fn append_fields(record: &mut Record, fields: &Fields) {
    for (name, value) in fields {
        record
            .entry(name.clone())
            .or_insert_with(|| value.to_items());
    }
}
