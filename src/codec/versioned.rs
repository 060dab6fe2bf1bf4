//! Decoder for the self-describing "versioned" replay encoding.
//!
//! Every value is prefixed with a one-byte type tag, so the stream can be
//! walked without the build-specific type tables. Struct fields are keyed by
//! numeric tag; a [`Schema`] turns known tags into field names and anything
//! it does not name is kept under its tag number.

use indexmap::IndexMap;

use super::reader::BinaryReader;
use super::value::Value;
use crate::error::{Error, Result};

const TAG_ARRAY: u8 = 0;
const TAG_BIT_ARRAY: u8 = 1;
const TAG_BLOB: u8 = 2;
const TAG_CHOICE: u8 = 3;
const TAG_OPTIONAL: u8 = 4;
const TAG_STRUCT: u8 = 5;
const TAG_U8: u8 = 6;
const TAG_U32: u8 = 7;
const TAG_U64: u8 = 8;
const TAG_VINT: u8 = 9;

/// Nesting limit for malformed input
const MAX_DEPTH: usize = 64;

/// Field naming for a decoded value
#[derive(Debug, Clone, Copy)]
pub enum Schema {
    /// Decode as-is, numeric keys for struct fields
    Any,
    Struct(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub tag: i64,
    pub name: &'static str,
    pub schema: Schema,
}

const VERSION_FIELDS: &[Field] = &[
    Field { tag: 0, name: "m_flags", schema: Schema::Any },
    Field { tag: 1, name: "m_major", schema: Schema::Any },
    Field { tag: 2, name: "m_minor", schema: Schema::Any },
    Field { tag: 3, name: "m_revision", schema: Schema::Any },
    Field { tag: 4, name: "m_build", schema: Schema::Any },
    Field { tag: 5, name: "m_baseBuild", schema: Schema::Any },
];

const HEADER_FIELDS: &[Field] = &[
    Field { tag: 0, name: "m_signature", schema: Schema::Any },
    Field { tag: 1, name: "m_version", schema: Schema::Struct(VERSION_FIELDS) },
    Field { tag: 2, name: "m_type", schema: Schema::Any },
    Field { tag: 3, name: "m_elapsedGameLoops", schema: Schema::Any },
    Field { tag: 4, name: "m_useScaledTime", schema: Schema::Any },
    Field { tag: 5, name: "m_ngdpRootKey", schema: Schema::Any },
    Field { tag: 6, name: "m_dataBuildNum", schema: Schema::Any },
    Field { tag: 7, name: "m_replayCompatibilityHash", schema: Schema::Any },
    Field { tag: 8, name: "m_ngdpRootKeyIsDevData", schema: Schema::Any },
];

/// Replay header layout. Stable across every shipped build.
pub const HEADER_SCHEMA: Schema = Schema::Struct(HEADER_FIELDS);

pub struct VersionedDecoder<'a> {
    reader: BinaryReader<'a>,
}

impl<'a> VersionedDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(data),
        }
    }

    pub fn is_done(&self) -> bool {
        self.reader.is_empty()
    }

    /// Decode one complete value
    pub fn decode(&mut self, schema: Schema) -> Result<Value> {
        self.decode_at(schema, 0)
    }

    fn decode_at(&mut self, schema: Schema, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(Error::InvalidValue {
                field: "versioned value",
                value: format!("nested deeper than {MAX_DEPTH}"),
            });
        }
        let tag = self.reader.read_u8()?;
        match tag {
            TAG_ARRAY => {
                let len = self.reader.read_len()?;
                let mut items = Vec::with_capacity(len.min(self.reader.remaining()));
                for _ in 0..len {
                    items.push(self.decode_at(Schema::Any, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            TAG_BIT_ARRAY => {
                let bits = self.reader.read_len()?;
                let bytes = self.reader.read_bytes(bits.div_ceil(8))?;
                Ok(Value::Blob(bytes.to_vec()))
            }
            TAG_BLOB => {
                let len = self.reader.read_len()?;
                Ok(Value::Blob(self.reader.read_bytes(len)?.to_vec()))
            }
            TAG_CHOICE => {
                let choice = self.reader.read_vint()?;
                let (name, inner) = lookup(schema, choice);
                let mut fields = IndexMap::with_capacity(1);
                fields.insert(name, self.decode_at(inner, depth + 1)?);
                Ok(Value::Struct(fields))
            }
            TAG_OPTIONAL => {
                if self.reader.read_u8()? != 0 {
                    self.decode_at(schema, depth + 1)
                } else {
                    Ok(Value::Null)
                }
            }
            TAG_STRUCT => {
                let len = self.reader.read_len()?;
                let mut fields = IndexMap::with_capacity(len.min(self.reader.remaining()));
                for _ in 0..len {
                    let field_tag = self.reader.read_vint()?;
                    let (name, inner) = lookup(schema, field_tag);
                    fields.insert(name, self.decode_at(inner, depth + 1)?);
                }
                Ok(Value::Struct(fields))
            }
            TAG_U8 => Ok(Value::Int(i64::from(self.reader.read_u8()?))),
            TAG_U32 => Ok(Value::Int(i64::from(self.reader.read_u32_be()?))),
            TAG_U64 => {
                let v = self.reader.read_u64_be()?;
                Ok(i64::try_from(v).map(Value::Int).unwrap_or(Value::Real(v as f64)))
            }
            TAG_VINT => Ok(Value::Int(self.reader.read_vint()?)),
            other => Err(Error::UnknownTag(other)),
        }
    }
}

fn lookup(schema: Schema, tag: i64) -> (String, Schema) {
    if let Schema::Struct(fields) = schema {
        if let Some(f) = fields.iter().find(|f| f.tag == tag) {
            return (f.name.to_string(), f.schema);
        }
    }
    (tag.to_string(), Schema::Any)
}

/// Decode a replay header blob
pub fn decode_header(data: &[u8]) -> Result<Value> {
    let mut decoder = VersionedDecoder::new(data);
    let header = decoder.decode(HEADER_SCHEMA)?;
    if header.as_struct().is_none() {
        return Err(Error::UnexpectedTag {
            expected: TAG_STRUCT,
            actual: data.first().copied().unwrap_or_default(),
        });
    }
    Ok(header)
}
