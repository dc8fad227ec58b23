use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{PubSubError, Result};

/// A decoded server reply.
///
/// The wire codec lives in the transport; this is the shape the reducers
/// consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Reply {
    Nil,
    Integer(i64),
    Bulk(String),
    Array(Vec<Reply>),
    Error(String),
}

impl Reply {
    pub fn bulk(value: impl Into<String>) -> Self {
        Self::Bulk(value.into())
    }

    pub fn bulk_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(values.into_iter().map(|v| Self::Bulk(v.into())).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Integer(_) => "integer",
            Self::Bulk(_) => "bulk string",
            Self::Array(_) => "array",
            Self::Error(_) => "error",
        }
    }

    /// Reads an integer reply. Bulk strings holding a decimal integer are
    /// accepted since some servers encode counts that way.
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Bulk(text) => text.trim().parse::<i64>().map_err(|_| {
                PubSubError::Aggregation(format!("expected integer, got bulk string '{}'", text))
            }),
            Self::Error(message) => Err(server_error(message)),
            other => Err(unexpected("integer", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::Bulk(text) => Ok(text.as_str()),
            Self::Error(message) => Err(server_error(message)),
            other => Err(unexpected("bulk string", other)),
        }
    }

    pub fn as_array(&self) -> Result<&[Reply]> {
        match self {
            Self::Array(items) => Ok(items.as_slice()),
            Self::Error(message) => Err(server_error(message)),
            other => Err(unexpected("array", other)),
        }
    }

    /// Reads an array of bulk strings, e.g. a channel listing.
    pub fn to_string_list(&self) -> Result<Vec<String>> {
        self.as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }
}

fn server_error(message: &str) -> PubSubError {
    PubSubError::Aggregation(format!("server replied with error: {}", message))
}

fn unexpected(expected: &str, actual: &Reply) -> PubSubError {
    PubSubError::Aggregation(format!(
        "expected {}, got {}",
        expected,
        actual.type_name()
    ))
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "(nil)"),
            Self::Integer(value) => write!(f, "(integer) {}", value),
            Self::Bulk(text) => write!(f, "\"{}\"", text),
            Self::Array(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Error(message) => write!(f, "(error) {}", message),
        }
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Self::Bulk(value.to_string())
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Self::Bulk(value)
    }
}
