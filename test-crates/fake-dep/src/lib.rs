//! A fake dependency crate for testing cross-crate error propagation.
//!
//! Some functions return `errtrail::Error` directly, others return this crate's
//! own `thiserror` enum with an `errtrail::Error` buried in its source chain.

use errtrail::{Error, Kind, ResultExt};

#[derive(Debug, thiserror::Error)]
pub enum FakeDepError {
    #[error("key not found: {key}")]
    NotFound { key: String },
    #[error("connection failed")]
    ConnectionFailed(#[source] Error),
    #[error("timed out")]
    Timeout,
}

/// Returns an error originating from this crate.
pub fn fetch_data(key: &str) -> Result<String, Error> {
    Err(Error::new(format!("no value for {}", key)).set_kind(Kind::Value))
}

/// Returns an error with an additional annotation from this crate.
pub fn fetch_with_context(key: &str) -> Result<String, Error> {
    fetch_data(key).annotate("fetching from remote")
}

/// Wraps a foreign I/O error.
pub fn read_remote() -> Result<Vec<u8>, Error> {
    Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "remote read timed out"))
        .annotate("reading remote blob")
        .set_kind(Kind::Io)
}

/// Returns this crate's own error type, with an `errtrail::Error` as its source.
pub fn connect() -> Result<(), FakeDepError> {
    let err = Error::new("handshake rejected").annotate("opening connection");
    Err(FakeDepError::ConnectionFailed(err))
}

/// Returns this crate's own error type, with no `errtrail::Error` anywhere.
pub fn lookup(key: &str) -> Result<(), FakeDepError> {
    Err(FakeDepError::NotFound {
        key: key.to_string(),
    })
}

/// Simulates a deeper call stack within this crate.
pub fn deep_operation() -> Result<(), Error> {
    level_one()?;
    Ok(())
}

#[inline(never)]
fn level_one() -> Result<(), Error> {
    level_two().annotate("in level_one")
}

#[inline(never)]
fn level_two() -> Result<(), Error> {
    Err(Error::new("level two failed"))
}
