use std::collections::BTreeMap;

use tracing::debug;

use super::decoder::{Decoder, HeaderDecoder, VersionedHeaderDecoder};
use crate::error::{Error, Result};

/// Constructs a decoder for one build
pub type DecoderFactory = fn() -> Box<dyn Decoder>;

/// Maps replay base builds to their protocol decoders
pub struct ProtocolRegistry {
    builds: BTreeMap<u32, DecoderFactory>,
    header: Box<dyn HeaderDecoder>,
}

impl ProtocolRegistry {
    pub fn new(header: impl HeaderDecoder + 'static) -> Self {
        Self {
            builds: BTreeMap::new(),
            header: Box::new(header),
        }
    }

    /// Register (or replace) the decoder for a base build
    pub fn register(&mut self, base_build: u32, factory: DecoderFactory) -> &mut Self {
        self.builds.insert(base_build, factory);
        self
    }

    pub fn with_build(mut self, base_build: u32, factory: DecoderFactory) -> Self {
        self.register(base_build, factory);
        self
    }

    pub fn with_builds(mut self, base_builds: impl IntoIterator<Item = u32>, factory: DecoderFactory) -> Self {
        for build in base_builds {
            self.register(build, factory);
        }
        self
    }

    /// Decoder for a base build
    pub fn resolve(&self, base_build: u32) -> Result<Box<dyn Decoder>> {
        let factory = self
            .builds
            .get(&base_build)
            .ok_or(Error::UnsupportedBaseBuild(base_build))?;
        debug!(base_build, "resolved protocol decoder");
        Ok(factory())
    }

    pub fn supports(&self, base_build: u32) -> bool {
        self.builds.contains_key(&base_build)
    }

    /// Header decoder that works for every build
    pub fn latest_header_decoder(&self) -> &dyn HeaderDecoder {
        self.header.as_ref()
    }

    pub fn latest_build(&self) -> Option<u32> {
        self.builds.keys().next_back().copied()
    }

    pub fn builds(&self) -> impl Iterator<Item = u32> + '_ {
        self.builds.keys().copied()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new(VersionedHeaderDecoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonDecoder;

    #[test]
    fn test_resolve_registered_build() {
        let registry = ProtocolRegistry::default()
            .with_build(75689, JsonDecoder::factory)
            .with_build(88500, JsonDecoder::factory);

        assert!(registry.supports(75689));
        assert!(registry.resolve(88500).is_ok());
        assert_eq!(registry.latest_build(), Some(88500));
        assert_eq!(registry.builds().collect::<Vec<_>>(), vec![75689, 88500]);
    }

    #[test]
    fn test_unknown_build() {
        let registry = ProtocolRegistry::default().with_build(75689, JsonDecoder::factory);
        match registry.resolve(15405) {
            Err(Error::UnsupportedBaseBuild(build)) => assert_eq!(build, 15405),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("build should not resolve"),
        }
    }
}
