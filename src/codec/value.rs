use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{Error, Result};

/// A decoded protocol value.
///
/// Every replay section decodes into a tree of these. Struct fields keep the
/// order the decoder produced them in; strings arrive as raw blobs because the
/// wire format does not distinguish text from bytes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Blob(Vec<u8>),
    Array(Vec<Value>),
    Struct(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Look up a struct field. Missing fields and explicit nulls both yield `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.get(key).filter(|v| !v.is_null()),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Self::Struct(fields) => fields.get_mut(key),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up a required struct field
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| Error::MissingField(key.to_string()))
    }

    /// Walk a chain of struct fields
    pub fn path(&self, keys: &[&str]) -> Result<&Value> {
        let mut current = self;
        for (depth, key) in keys.iter().enumerate() {
            current = current
                .get(key)
                .ok_or_else(|| Error::MissingField(keys[..=depth].join(".")))?;
        }
        Ok(current)
    }

    /// Insert a struct field, returning false if this value is not a struct
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Self::Struct(fields) => {
                fields.insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    pub fn index(&self, i: usize) -> Option<&Value> {
        self.as_array()?.get(i)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Blob contents as text, replacing invalid UTF-8
    pub fn to_text(&self) -> Option<String> {
        self.as_blob()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Required integer field
    pub fn int_field(&self, key: &str) -> Result<i64> {
        self.field(key)?
            .as_i64()
            .ok_or_else(|| Error::MissingField(key.to_string()))
    }

    /// Optional integer field (absent or null yields `None`)
    pub fn opt_int_field(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Text field; absent or null yields an empty string
    pub fn text_field(&self, key: &str) -> String {
        self.get(key).and_then(Value::to_text).unwrap_or_default()
    }

    pub fn array_field(&self, key: &str) -> Result<&[Value]> {
        self.field(key)?
            .as_array()
            .ok_or_else(|| Error::MissingField(key.to_string()))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Self::Int(v)
                } else {
                    Self::Real(n.as_f64().unwrap_or_default())
                }
            }
            Json::String(s) => Self::Blob(s.into_bytes()),
            Json::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Struct(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Real(v) => serializer.serialize_f64(*v),
            Self::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                Err(_) => {
                    let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                    for b in bytes {
                        seq.serialize_element(b)?;
                    }
                    seq.end()
                }
            },
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
