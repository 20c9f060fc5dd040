//! Encoder configuration
//!
//! This module provides the options that control how strictly the annotation writer
//! checks its caller contracts. None of them change the bytes that are produced for a
//! well-formed call sequence.

/// Configuration for annotation encoding
///
/// The encoder trusts its caller: the order of header fields, the number of values
/// and the shape of nested structures are preconditions, not runtime input. These
/// options decide whether violating them aborts the current encoding in release builds
/// as well, or only in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Check caller contracts with `assert!` in every build profile (recommended: true)
    /// When false the checks are `debug_assert!` and release builds skip them
    pub enforce_contracts: bool,

    /// Maximum depth of nested annotation and array writers below a top-level writer
    /// (default: 64)
    pub max_nesting_depth: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            enforce_contracts: true,
            max_nesting_depth: 64,
        }
    }
}

impl EncoderConfig {
    /// Creates a configuration that only checks contracts in debug builds
    ///
    /// **Warning**: a release build fed an invalid call sequence silently produces a
    /// malformed byte stream with this configuration.
    #[must_use]
    pub fn unchecked() -> Self {
        Self {
            enforce_contracts: false,
            max_nesting_depth: usize::MAX,
        }
    }

    /// Creates a configuration with all checks enforced and a shallow nesting limit
    ///
    /// Suitable for encoding annotations that come from untrusted tooling input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            enforce_contracts: true,
            max_nesting_depth: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_config_presets() {
        let unchecked = EncoderConfig::unchecked();
        assert!(!unchecked.enforce_contracts);
        assert_eq!(unchecked.max_nesting_depth, usize::MAX);

        let strict = EncoderConfig::strict();
        assert!(strict.enforce_contracts);
        assert_eq!(strict.max_nesting_depth, 16);
    }

    #[test]
    fn test_default_config() {
        let default = EncoderConfig::default();
        assert!(default.enforce_contracts);
        assert_eq!(default.max_nesting_depth, 64);
        assert_ne!(default, EncoderConfig::strict());
    }
}
