use serde_json::Deserializer;

use super::decoder::{Decoder, EventIter, HeaderDecoder};
use crate::codec::Value;
use crate::error::{Error, Result};

/// Decoder for sections stored as JSON dumps.
///
/// Single-value sections hold one JSON document. Event streams are either one
/// JSON array or a sequence of whitespace-separated objects (one per line), the
/// latter decoded lazily.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn factory() -> Box<dyn Decoder> {
        Box::new(Self)
    }

    fn decode_value(data: &[u8]) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_slice(data)?;
        Ok(Value::from(json))
    }

    fn decode_events(data: &[u8]) -> Result<EventIter<'_>> {
        let first = data.iter().find(|b| !b.is_ascii_whitespace());
        if first == Some(&b'[') {
            let items: Vec<serde_json::Value> = serde_json::from_slice(data)?;
            return Ok(Box::new(items.into_iter().map(|json| -> Result<Value> { Ok(Value::from(json)) })));
        }
        let stream = Deserializer::from_slice(data).into_iter::<serde_json::Value>();
        Ok(Box::new(stream.map(|item| item.map(Value::from).map_err(Error::from))))
    }
}

impl HeaderDecoder for JsonDecoder {
    fn decode_header(&self, data: &[u8]) -> Result<Value> {
        Self::decode_value(data)
    }
}

impl Decoder for JsonDecoder {
    fn decode_details(&self, data: &[u8]) -> Result<Value> {
        Self::decode_value(data)
    }

    fn decode_init_data(&self, data: &[u8]) -> Result<Value> {
        Self::decode_value(data)
    }

    fn decode_game_events<'a>(&'a self, data: &'a [u8]) -> Result<EventIter<'a>> {
        Self::decode_events(data)
    }

    fn decode_message_events<'a>(&'a self, data: &'a [u8]) -> Result<EventIter<'a>> {
        Self::decode_events(data)
    }

    fn decode_tracker_events<'a>(&'a self, data: &'a [u8]) -> Result<EventIter<'a>> {
        Self::decode_events(data)
    }

    fn decode_attribute_events(&self, data: &[u8]) -> Result<Value> {
        Self::decode_value(data)
    }
}
