//! # errtrail - Diagnostic errors with a stack, a cause and located annotations
//!
//! ```text
//! errtrail::Error[IOError]: disk full
//! app::save [store.rs:88] while saving user 42
//! app::handle [api.rs:31] handling PUT /users/42
//!
//! With Stacktrace:
//! app::store::save [store.rs:87]
//! app::api::handle [api.rs:30]
//! app::main [main.rs:12]
//! ```
//!
//! ## Try It Now
//!
//! Create errors with [`Error::new`], wrap foreign ones with [`Error::adopt`] or
//! the [`ResultExt`] methods, and add context as they propagate:
//!
//! ```rust
//! use errtrail::{Error, ResultExt};
//!
//! fn save() -> Result<(), std::io::Error> {
//!     Err(std::io::Error::other("disk full"))
//! }
//!
//! fn handle() -> Result<(), Error> {
//!     save().annotate("while saving user 42")?;
//!     Ok(())
//! }
//!
//! let err = handle().unwrap_err();
//! let text = err.to_string();
//! assert!(text.starts_with("errtrail::Error: disk full\n"));
//! assert!(text.contains("while saving user 42"));
//! ```
//!
//! ## The Pieces
//!
//! | Part | Captured when | Notes |
//! |------|---------------|-------|
//! | Cause | [`adopt`](Error::adopt) / [`set_cause`](Error::set_cause) | Any `std::error::Error + Send + Sync`; exposed through `source()` |
//! | [`Annotation`]s | [`new`](Error::new), [`annotate`](Error::annotate) and friends | Message + `file:line` of the call, in insertion order |
//! | [`Stack`] | Construction / adoption of a foreign error | Bounded, grows on demand up to [`StackLimits::max_depth`] |
//! | [`Kind`] | [`set_kind`](Error::set_kind) | Coarse category, found anywhere in a chain with [`Kind::of`] |
//!
//! ## Adoption Is Idempotent
//!
//! Adopting an error that already is an [`Error`] returns it untouched, so every
//! layer can call `.annotate()` on whatever it got back without stacking
//! wrappers or re-capturing stacks:
//!
//! ```rust
//! use errtrail::{Error, ResultExt};
//!
//! fn inner() -> Result<(), Error> {
//!     Err(Error::new("bad config"))
//! }
//!
//! fn outer() -> Result<(), Error> {
//!     inner().annotate("while starting")?;
//!     Ok(())
//! }
//!
//! let err = outer().unwrap_err();
//! assert_eq!(err.annotations().len(), 2);
//! assert!(err.cause().is_none());
//! ```
//!
//! ## Output Formats
//!
//! | Formatter | Output |
//! |-----------|--------|
//! | [`TextFormatter`] | Default. `errtrail::Error: ...`, located annotations, `With Stacktrace:` |
//! | [`TreeFormatter`] | `Error:` header, `at file:line` entries with `╰─` context lines |
//! | [`JsonFormatter`] | One JSON object |
//!
//! Pick one per error with [`Error::set_formatter`] or for the whole process
//! with [`config::init`]. `{:#}` selects the compact/pretty variant.
//!
//! ## Configuration
//!
//! Stack capture is on by default and walks up to 200 frames. Turn it off, or
//! change the bounds, through a [`Config`]:
//!
//! ```rust
//! use errtrail::{Config, Error};
//!
//! static NO_STACKS: Config = Config::builder().capture_stack(false).build();
//!
//! let err = Error::new_with(&NO_STACKS, "cheap");
//! assert!(err.stack().is_empty());
//! ```
//!
//! ## Features
//!
//! - `backtrace` (default): capture stacks with the `backtrace` crate. Without
//!   it, stacks are always empty and only annotations carry locations.
//! - `smallvec-annotations`: store the first four annotations inline.
//!
//! ## Logging
//!
//! Internal diagnostics (a formatter falling back, a repeated [`config::init`],
//! a stack capture hitting its cap) go through the `log` facade.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod annotation;
mod chain;
pub mod config;
mod error;
mod ext;
mod format;
mod json;
mod kind;
pub mod prelude;
mod stack;

pub use annotation::Annotation;
pub use chain::{Chain, chain, find_in_chain};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use error::{BoxError, Error};
pub use ext::{ErrorExt, ResultExt};
pub use format::{Formatter, STACK_BANNER, TYPE_MARKER, TextFormatter, TreeFormatter};
pub use json::JsonFormatter;
pub use kind::Kind;
pub use stack::{DEFAULT_INITIAL_DEPTH, DEFAULT_MAX_DEPTH, Frame, Stack, StackLimits};

#[cfg(test)]
mod tests;
