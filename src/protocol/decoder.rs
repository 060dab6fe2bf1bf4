use crate::codec::{versioned, Value};
use crate::error::Result;

/// Lazily decoded event stream
pub type EventIter<'a> = Box<dyn Iterator<Item = Result<Value>> + 'a>;

/// Decodes the replay header. Usable before the replay's build is known.
pub trait HeaderDecoder {
    fn decode_header(&self, data: &[u8]) -> Result<Value>;
}

/// Build-specific decoder for every replay section
pub trait Decoder: HeaderDecoder {
    fn decode_details(&self, data: &[u8]) -> Result<Value>;

    fn decode_init_data(&self, data: &[u8]) -> Result<Value>;

    fn decode_game_events<'a>(&'a self, data: &'a [u8]) -> Result<EventIter<'a>>;

    fn decode_message_events<'a>(&'a self, data: &'a [u8]) -> Result<EventIter<'a>>;

    fn decode_tracker_events<'a>(&'a self, data: &'a [u8]) -> Result<EventIter<'a>>;

    fn decode_attribute_events(&self, data: &[u8]) -> Result<Value>;

    /// Combine a tracker event's unit tag index and recycle counter
    fn unit_tag(&self, index: i64, recycle: i64) -> i64 {
        (index << 18) + recycle
    }
}

/// Header decoder for the self-describing versioned encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionedHeaderDecoder;

impl HeaderDecoder for VersionedHeaderDecoder {
    fn decode_header(&self, data: &[u8]) -> Result<Value> {
        versioned::decode_header(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::versioned::encode;

    #[test]
    fn test_versioned_header_decoder() {
        let blob = encode::header(5, 0, 11, 88500, 88500, 160);
        let header = VersionedHeaderDecoder.decode_header(&blob).unwrap();
        assert_eq!(header.path(&["m_version", "m_build"]).unwrap().as_i64(), Some(88500));
    }
}
