//! Extension traits for annotating errors where they propagate.
//!
//! - [`ResultExt`]: call `.annotate()` and friends on any `Result<T, E>`
//! - [`ErrorExt`]: call `.adopt()` / `.annotate()` on any error value
//!
//! The foreign error is adopted first (see [`Error::adopt`]), so an `Error`
//! already in flight keeps its original stack and only gains the annotation.
//! On `Ok` every method is a no-op that returns the value unchanged.
//!
//! ```rust
//! use errtrail::{Error, ResultExt};
//!
//! fn read_config(path: &str) -> Result<String, Error> {
//!     std::fs::read_to_string(path).annotate_with(|| format!("while reading {}", path))
//! }
//!
//! let err = read_config("/definitely/not/here.yaml").unwrap_err();
//! assert_eq!(err.annotations().len(), 1);
//! assert!(err.cause().is_some());
//! ```

use std::borrow::Cow;
use std::error::Error as StdError;

use crate::config;
use crate::error::Error;
use crate::kind::Kind;

// ============================================================================
// ErrorExt - for error values
// ============================================================================

/// Extension trait for adopting error values directly.
///
/// ```rust
/// use errtrail::ErrorExt;
///
/// let err = std::io::Error::other("disk full").annotate("while saving");
/// assert_eq!(err.annotations()[0].message(), "while saving");
/// ```
pub trait ErrorExt: Sized {
    /// Adopt this error, see [`Error::adopt`].
    #[track_caller]
    fn adopt(self) -> Error;

    /// Adopt this error and annotate it at the caller's location.
    #[track_caller]
    fn annotate(self, message: impl Into<Cow<'static, str>>) -> Error;
}

impl<E: StdError + Send + Sync + 'static> ErrorExt for E {
    #[track_caller]
    #[inline(never)]
    fn adopt(self) -> Error {
        Error::adopt_boxed_in(config::global(), Box::new(self))
    }

    #[track_caller]
    #[inline(never)]
    fn annotate(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::adopt_boxed_in(config::global(), Box::new(self)).annotate(message)
    }
}

// ============================================================================
// ResultExt - for Results
// ============================================================================

/// Extension trait for annotating the error side of a `Result`.
///
/// Implemented for every `Result<T, E>` whose error is `Send + Sync + 'static`,
/// including `Result<T, Error>`.
///
/// ## Example
///
/// ```rust
/// use errtrail::{Error, Kind, ResultExt};
///
/// fn save() -> Result<(), std::io::Error> {
///     Err(std::io::Error::other("disk full"))
/// }
///
/// fn run() -> Result<(), Error> {
///     save().annotate("while saving").set_kind(Kind::Io)?;
///     Ok(())
/// }
///
/// let err = run().unwrap_err();
/// assert_eq!(err.kind(), Kind::Io);
/// assert!(err.render().contains("disk full"));
/// ```
pub trait ResultExt<T> {
    /// Adopt the error without annotating it.
    #[track_caller]
    fn adopt(self) -> Result<T, Error>;

    /// Adopt the error and append an annotation at the caller's location.
    #[track_caller]
    fn annotate(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error>;

    /// Like [`annotate`](Self::annotate), building the message only on `Err`.
    #[track_caller]
    fn annotate_with(self, f: impl FnOnce() -> String) -> Result<T, Error>;

    /// Like [`annotate`](Self::annotate), also recording the enclosing
    /// function's name. Pass an empty closure `|| {}`.
    #[track_caller]
    fn annotate_fn<F: Fn()>(
        self,
        marker: F,
        message: impl Into<Cow<'static, str>>,
    ) -> Result<T, Error>;

    /// Adopt the error and remove its stack.
    #[track_caller]
    fn drop_stack(self) -> Result<T, Error>;

    /// Adopt the error and set its kind.
    #[track_caller]
    fn set_kind(self, kind: Kind) -> Result<T, Error>;
}

impl<T, E: StdError + Send + Sync + 'static> ResultExt<T> for Result<T, E> {
    #[track_caller]
    #[inline(never)]
    fn adopt(self) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::adopt_boxed_in(config::global(), Box::new(e))),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn annotate(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::adopt_boxed_in(config::global(), Box::new(e)).annotate(message)),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn annotate_with(self, f: impl FnOnce() -> String) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::adopt_boxed_in(config::global(), Box::new(e)).annotate_with(f)),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn annotate_fn<F: Fn()>(
        self,
        marker: F,
        message: impl Into<Cow<'static, str>>,
    ) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::adopt_boxed_in(config::global(), Box::new(e))
                .annotate_fn(marker, message)),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn drop_stack(self) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::adopt_boxed_in(config::global(), Box::new(e)).drop_stack()),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn set_kind(self, kind: Kind) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::adopt_boxed_in(config::global(), Box::new(e)).set_kind(kind)),
        }
    }
}
