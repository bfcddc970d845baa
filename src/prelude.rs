//! Convenient re-exports for common usage.
//!
//! ## Usage
//!
//! ```rust
//! use errtrail::prelude::*;
//!
//! fn inner() -> Result<(), Error> {
//!     Err(Error::new("not found").set_kind(Kind::Value))
//! }
//!
//! fn outer() -> Result<(), Error> {
//!     inner().annotate("looking up user")?;
//!     Ok(())
//! }
//!
//! assert_eq!(Kind::of(&outer().unwrap_err()), Kind::Value);
//! ```

pub use crate::Error;
pub use crate::ErrorExt;
pub use crate::Kind;
pub use crate::ResultExt;
