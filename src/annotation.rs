//! Located context messages attached to an error as it propagates.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stack::Frame;

/// Annotation storage. Most errors carry one or two annotations.
#[cfg(feature = "smallvec-annotations")]
pub(crate) type AnnotationVec = smallvec::SmallVec<[Annotation; 4]>;

/// Annotation storage (heap, default).
#[cfg(not(feature = "smallvec-annotations"))]
pub(crate) type AnnotationVec = Vec<Annotation>;

/// A context message plus the location of the call that attached it.
///
/// Created by [`Error::new`](crate::Error::new), [`Error::annotate`](crate::Error::annotate)
/// and friends. Never modified after creation.
///
/// ## Example
///
/// ```rust
/// use errtrail::{Annotation, Frame};
///
/// let note = Annotation::new("while loading file.yaml", Frame::new("src/config.rs", 12));
/// assert_eq!(note.to_string(), "[config.rs:12] while loading file.yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    message: Cow<'static, str>,
    location: Frame,
}

impl Annotation {
    /// Create an annotation at an explicit location.
    pub fn new(message: impl Into<Cow<'static, str>>, location: Frame) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    /// Create an annotation located at the caller.
    #[track_caller]
    #[inline]
    pub fn here(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(message, Frame::caller())
    }

    /// The message text.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the annotation was attached.
    #[inline]
    pub fn location(&self) -> &Frame {
        &self.location
    }
}

/// `<location> <message>`. The alternate flag is passed on to the location.
impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#} {}", self.location, self.message)
        } else {
            write!(f, "{} {}", self.location, self.message)
        }
    }
}
