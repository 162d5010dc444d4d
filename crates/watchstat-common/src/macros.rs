//! Early-return macros for `WatchstatError`

/// Return early with an error.
///
/// A single argument is converted with `From`, so it may be a ready-made
/// `WatchstatError` or a message. Format arguments build a generic error.
///
/// ```rust
/// use watchstat_common::{bail, Result, WatchstatError};
///
/// fn column(name: &str) -> Result<()> {
///     if name.is_empty() {
///         bail!(WatchstatError::data("Empty column name"));
///     }
///     bail!("Unknown column '{}'", name);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err(::core::convert::From::from($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::WatchstatError::new(format!($fmt, $($arg)*)))
    };
}

/// Return early with an error unless `cond` holds
///
/// ```rust
/// use watchstat_common::{ensure, Result, WatchstatError};
///
/// fn positive(value: i32) -> Result<()> {
///     ensure!(value > 0, WatchstatError::validation("Value must be positive"));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            $crate::bail!($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::bail!($fmt, $($arg)*);
        }
    };
}
