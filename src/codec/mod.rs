pub mod reader;
pub mod value;
pub mod versioned;

pub use reader::BinaryReader;
pub use value::Value;
pub use versioned::{decode_header, VersionedDecoder};
