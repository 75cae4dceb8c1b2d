//! Declarative shape validation for upstream GitHub payloads.
//!
//! Untyped JSON enters the system only through these schemas. A payload is
//! checked field by field against a fixed table before it is converted into a
//! typed record, so a shape mismatch is reported with the offending field
//! instead of a generic decode error.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Primitive kind expected for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Required JSON string.
    Text,
    /// JSON string or explicit `null`. The key itself must be present.
    NullableText,
    /// Non-negative whole number.
    Count,
    /// JSON boolean.
    Flag,
    /// JSON array whose elements are all strings.
    TextList,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::NullableText => "string or null",
            FieldKind::Count => "non-negative integer",
            FieldKind::Flag => "boolean",
            FieldKind::TextList => "array of strings",
        }
    }
}

/// One named field of a record schema.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind }
}

/// A fixed record shape.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub record: &'static str,
    pub fields: &'static [Field],
}

/// Shape of `GET /users/{username}`.
pub const USER_SCHEMA: Schema = Schema {
    record: "GitHubUser",
    fields: &[
        field("login", FieldKind::Text),
        field("id", FieldKind::Count),
        field("avatar_url", FieldKind::Text),
        field("html_url", FieldKind::Text),
        field("name", FieldKind::NullableText),
        field("company", FieldKind::NullableText),
        field("blog", FieldKind::NullableText),
        field("location", FieldKind::NullableText),
        field("email", FieldKind::NullableText),
        field("bio", FieldKind::NullableText),
        field("twitter_username", FieldKind::NullableText),
        field("public_repos", FieldKind::Count),
        field("public_gists", FieldKind::Count),
        field("followers", FieldKind::Count),
        field("following", FieldKind::Count),
        field("created_at", FieldKind::Text),
        field("updated_at", FieldKind::Text),
    ],
};

/// Shape of one element of `GET /users/{username}/repos`.
pub const REPO_SCHEMA: Schema = Schema {
    record: "GitHubRepo",
    fields: &[
        field("id", FieldKind::Count),
        field("name", FieldKind::Text),
        field("full_name", FieldKind::Text),
        field("html_url", FieldKind::Text),
        field("description", FieldKind::NullableText),
        field("fork", FieldKind::Flag),
        field("created_at", FieldKind::Text),
        field("updated_at", FieldKind::Text),
        field("pushed_at", FieldKind::Text),
        field("stargazers_count", FieldKind::Count),
        field("watchers_count", FieldKind::Count),
        field("language", FieldKind::NullableText),
        field("forks_count", FieldKind::Count),
        field("open_issues_count", FieldKind::Count),
        field("topics", FieldKind::TextList),
    ],
};

/// Shape validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("expected a JSON object for {record}, found {found}")]
    NotAnObject {
        record: &'static str,
        found: &'static str,
    },

    #[error("expected a JSON array of {record}, found {found}")]
    NotAList {
        record: &'static str,
        found: &'static str,
    },

    #[error("{record}.{field} is missing")]
    Missing {
        record: &'static str,
        field: String,
    },

    #[error("{record}.{field}: expected {expected}, found {found}")]
    WrongType {
        record: &'static str,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("{record} could not be decoded: {message}")]
    Decode {
        record: &'static str,
        message: String,
    },
}

impl SchemaError {
    /// Name of the offending field, if the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::Missing { field, .. } | SchemaError::WrongType { field, .. } => {
                Some(field)
            }
            SchemaError::Element { source, .. } => source.field(),
            _ => None,
        }
    }
}

/// JSON type name used in error messages.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Schema {
    /// Check `value` against this schema without converting it.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        let object = value.as_object().ok_or(SchemaError::NotAnObject {
            record: self.record,
            found: json_kind(value),
        })?;

        for field in self.fields {
            self.check_field(object, field)?;
        }

        Ok(())
    }

    fn check_field(&self, object: &Map<String, Value>, field: &Field) -> Result<(), SchemaError> {
        let value = object.get(field.name).ok_or_else(|| SchemaError::Missing {
            record: self.record,
            field: field.name.to_string(),
        })?;

        let ok = match field.kind {
            FieldKind::Text => value.is_string(),
            FieldKind::NullableText => value.is_string() || value.is_null(),
            FieldKind::Count => value.is_u64(),
            FieldKind::Flag => value.is_boolean(),
            FieldKind::TextList => {
                let Some(items) = value.as_array() else {
                    return Err(self.wrong_type(field.name.to_string(), field.kind, value));
                };
                if let Some((index, item)) = items.iter().enumerate().find(|(_, v)| !v.is_string())
                {
                    return Err(SchemaError::WrongType {
                        record: self.record,
                        field: format!("{}[{}]", field.name, index),
                        expected: "string",
                        found: json_kind(item),
                    });
                }
                true
            }
        };

        if ok {
            Ok(())
        } else {
            Err(self.wrong_type(field.name.to_string(), field.kind, value))
        }
    }

    fn wrong_type(&self, field: String, kind: FieldKind, value: &Value) -> SchemaError {
        SchemaError::WrongType {
            record: self.record,
            field,
            expected: kind.expected(),
            found: json_kind(value),
        }
    }

    /// Validate and convert a single record.
    pub fn parse<T: DeserializeOwned>(&self, value: Value) -> Result<T, SchemaError> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|e| SchemaError::Decode {
            record: self.record,
            message: e.to_string(),
        })
    }

    /// Validate and convert a JSON array of records. Any invalid element
    /// fails the whole list.
    pub fn parse_list<T: DeserializeOwned>(&self, value: Value) -> Result<Vec<T>, SchemaError> {
        let Value::Array(items) = value else {
            return Err(SchemaError::NotAList {
                record: self.record,
                found: json_kind(&value),
            });
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                self.parse(item).map_err(|e| SchemaError::Element {
                    index,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}
