//! Coarse error categories.

use std::error::Error as StdError;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::chain::chain;
use crate::error::Error;

/// A coarse category attached to an [`Error`].
///
/// Errors start as [`Kind::Unknown`]. Set a kind with
/// [`Error::set_kind`](crate::Error::set_kind) and read it back anywhere in a
/// chain with [`Kind::of`].
///
/// ```rust
/// use errtrail::{Error, Kind};
///
/// let err = Error::new("disk unplugged").set_kind(Kind::Io);
/// assert_eq!(Kind::of(&err), Kind::Io);
/// assert_eq!(Kind::Io.to_string(), "IOError");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Kind {
    /// No category assigned.
    #[default]
    Unknown,
    /// Input/output failures.
    Io,
    /// A value had the wrong type.
    Type,
    /// A value was out of range or otherwise unexpected.
    Value,
    /// Application-defined category.
    Other(&'static str),
}

impl Kind {
    /// Display name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Kind::Unknown => "Unknown",
            Kind::Io => "IOError",
            Kind::Type => "TypeError",
            Kind::Value => "ValueError",
            Kind::Other(name) => *name,
        }
    }

    /// Check if no category is assigned.
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Kind::Unknown)
    }

    /// The first assigned kind of any [`Error`] in `err`'s source chain.
    ///
    /// Errors with [`Kind::Unknown`] are skipped, so an outer error that only
    /// adds context does not hide the category of the one it wraps. Returns
    /// [`Kind::Unknown`] when no error in the chain has a kind.
    pub fn of(err: &(dyn StdError + 'static)) -> Kind {
        chain(err)
            .filter_map(|e| e.downcast_ref::<Error>())
            .map(Error::kind)
            .find(|kind| !kind.is_unknown())
            .unwrap_or_default()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
