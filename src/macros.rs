#![allow(unused_macros)]

/// Checks a caller contract of the encoder.
///
/// The first argument is anything exposing an `enforce_contracts: bool` field (usually an
/// [`crate::EncoderConfig`]). When enforcement is on the condition is checked with `assert!`
/// in every build profile, otherwise only debug builds check it.
///
/// ```rust, ignore
/// contract!(self.config, self.size < usize::from(u16::MAX), "too many values");
/// ```
macro_rules! contract {
    ($config:expr, $cond:expr, $($arg:tt)+) => {
        if $config.enforce_contracts {
            assert!($cond, $($arg)+);
        } else {
            debug_assert!($cond, $($arg)+);
        }
    };
}
