//! Structured JSON rendering.

use std::fmt;

use serde::Serialize;

use crate::annotation::Annotation;
use crate::error::Error;
use crate::format::Formatter;
use crate::kind::Kind;
use crate::stack::Stack;

/// Renders an error as a single JSON object.
///
/// ```json
/// {
///   "kind": "Unknown",
///   "cause": "disk full",
///   "annotations": [
///     { "message": "while saving", "location": { "file": "src/save.rs", "line": 8 } }
///   ],
///   "stack": [
///     { "function": "app::save", "file": "/src/app/src/save.rs", "line": 8 }
///   ]
/// }
/// ```
///
/// `cause` is `null` without a cause, a nested object when the cause is itself
/// an [`Error`], and the cause's message otherwise. `{:#}` pretty-prints.
///
/// ## Example
///
/// ```rust
/// use errtrail::{Error, JsonFormatter};
///
/// let err = Error::new("something sad happened").set_formatter(&JsonFormatter);
/// let value: serde_json::Value = serde_json::from_str(&err.render()).unwrap();
/// assert_eq!(value["annotations"][0]["message"], "something sad happened");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = JsonError::from(err);
        let json = if f.alternate() {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        match json {
            Ok(json) => f.write_str(&json),
            Err(e) => {
                log::debug!("JSON rendering failed: {e}");
                Err(fmt::Error)
            }
        }
    }
}

#[derive(Serialize)]
struct JsonError<'a> {
    kind: Kind,
    cause: Option<JsonCause<'a>>,
    annotations: &'a [Annotation],
    stack: &'a Stack,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonCause<'a> {
    Nested(Box<JsonError<'a>>),
    Message(String),
}

impl<'a> From<&'a Error> for JsonError<'a> {
    fn from(err: &'a Error) -> Self {
        let cause = err.cause().map(|cause| match cause.downcast_ref::<Error>() {
            Some(inner) => JsonCause::Nested(Box::new(JsonError::from(inner))),
            None => JsonCause::Message(cause.to_string()),
        });
        Self {
            kind: err.kind(),
            cause,
            annotations: err.annotations(),
            stack: err.stack(),
        }
    }
}
