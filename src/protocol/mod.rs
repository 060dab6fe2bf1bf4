pub mod decoder;
pub mod json;
pub mod registry;

pub use decoder::{Decoder, EventIter, HeaderDecoder, VersionedHeaderDecoder};
pub use json::JsonDecoder;
pub use registry::{DecoderFactory, ProtocolRegistry};
