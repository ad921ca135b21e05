//! Existence-check filter predicate.
//!
//! A filter is a `(field, value)` pair used to ask the store whether a chat
//! matching it exists. The field is a closed enum, so a predicate that reaches
//! the store can only ever name one of the allow-listed columns.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::chat::ChatId;
use crate::error::FilterError;

/// Chat fields that may appear in an existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Id,
    Title,
    CreatedAt,
}

impl FilterField {
    /// Every permitted field.
    pub const ALL: [FilterField; 3] = [FilterField::Id, FilterField::Title, FilterField::CreatedAt];

    /// Column name in the chats table.
    pub fn column(self) -> &'static str {
        match self {
            FilterField::Id => "id",
            FilterField::Title => "title",
            FilterField::CreatedAt => "created_at",
        }
    }

    fn expected_kind(self) -> ValueKind {
        match self {
            FilterField::Id => ValueKind::Int,
            FilterField::Title => ValueKind::Text,
            FilterField::CreatedAt => ValueKind::Timestamp,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| FilterError::UnknownField(s.to_string()))
    }
}

/// Comparison value of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Int,
    Text,
    Timestamp,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "integer",
            ValueKind::Text => "text",
            ValueKind::Timestamp => "timestamp",
        }
    }
}

impl FilterValue {
    fn kind(&self) -> ValueKind {
        match self {
            FilterValue::Int(_) => ValueKind::Int,
            FilterValue::Text(_) => ValueKind::Text,
            FilterValue::Timestamp(_) => ValueKind::Timestamp,
        }
    }
}

impl From<ChatId> for FilterValue {
    fn from(id: ChatId) -> Self {
        FilterValue::Int(id.0)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(ts)
    }
}

/// A validated `(field, value)` existence predicate.
///
/// Fields are private: the only way to build one is through the checked
/// constructors below.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParam {
    field: FilterField,
    value: FilterValue,
}

impl FilterParam {
    /// Build a predicate, checking the value kind matches the field.
    ///
    /// Timestamps are stored with microsecond precision, so a timestamp
    /// carrying sub-microsecond digits can never equal a stored one and is
    /// rejected as a mismatch.
    pub fn new(field: FilterField, value: impl Into<FilterValue>) -> Result<Self, FilterError> {
        let value = value.into();
        let expected = field.expected_kind();
        if value.kind() != expected {
            return Err(FilterError::ValueMismatch {
                field: field.column().to_string(),
                expected: expected.name(),
            });
        }
        if matches!(&value, FilterValue::Timestamp(ts) if ts.nanosecond() % 1_000 != 0) {
            return Err(FilterError::ValueMismatch {
                field: field.column().to_string(),
                expected: "timestamp with at most microsecond precision",
            });
        }
        Ok(Self { field, value })
    }

    /// Build a predicate from a free-form field name.
    ///
    /// Names outside the allow-list are rejected with
    /// [`FilterError::UnknownField`].
    pub fn parse(field: &str, value: impl Into<FilterValue>) -> Result<Self, FilterError> {
        let field: FilterField = field.parse()?;
        Self::new(field, value)
    }

    pub fn by_id(id: ChatId) -> Self {
        Self {
            field: FilterField::Id,
            value: FilterValue::Int(id.0),
        }
    }

    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            field: FilterField::Title,
            value: FilterValue::Text(title.into()),
        }
    }

    pub fn field(&self) -> FilterField {
        self.field
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }
}

impl fmt::Display for FilterParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            FilterValue::Int(v) => write!(f, "{} = {v}", self.field),
            FilterValue::Text(v) => write!(f, "{} = '{v}'", self.field),
            FilterValue::Timestamp(v) => write!(f, "{} = {}", self.field, v.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_listed_fields_parse() {
        assert_eq!("id".parse::<FilterField>().unwrap(), FilterField::Id);
        assert_eq!("title".parse::<FilterField>().unwrap(), FilterField::Title);
        assert_eq!(
            "created_at".parse::<FilterField>().unwrap(),
            FilterField::CreatedAt
        );
    }

    #[test]
    fn test_unknown_fields_rejected() {
        for name in ["text", "Title", "id; DROP TABLE chats", "", "chat_id", "1=1"] {
            let err = FilterParam::parse(name, "x").unwrap_err();
            assert!(
                matches!(err, FilterError::UnknownField(ref f) if f == name),
                "expected UnknownField for {name:?}"
            );
        }
    }

    #[test]
    fn test_value_kind_mismatch() {
        let err = FilterParam::new(FilterField::Id, "not a number").unwrap_err();
        assert!(matches!(err, FilterError::ValueMismatch { expected: "integer", .. }));

        let err = FilterParam::parse("title", ChatId(3)).unwrap_err();
        assert!(matches!(err, FilterError::ValueMismatch { expected: "text", .. }));
    }

    #[test]
    fn test_sub_microsecond_timestamp_rejected() {
        let at = DateTime::parse_from_rfc3339("2026-01-01T09:30:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(FilterParam::new(FilterField::CreatedAt, at).is_ok());

        let err =
            FilterParam::new(FilterField::CreatedAt, at + chrono::Duration::nanoseconds(400))
                .unwrap_err();
        assert!(matches!(
            err,
            FilterError::ValueMismatch { ref field, .. } if field == "created_at"
        ));
    }

    #[test]
    fn test_shorthand_constructors() {
        let param = FilterParam::by_id(ChatId(7));
        assert_eq!(param.field(), FilterField::Id);
        assert_eq!(param.value(), &FilterValue::Int(7));

        let param = FilterParam::by_title("standup");
        assert_eq!(param.to_string(), "title = 'standup'");
    }

    #[test]
    fn test_columns_are_the_allow_list() {
        let columns: Vec<&str> = FilterField::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(columns, vec!["id", "title", "created_at"]);
    }
}
