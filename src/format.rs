//! Rendering strategies for [`Error`].
//!
//! A [`Formatter`] turns an error's cause, annotations and stack into text.
//! Each error holds a `&'static dyn Formatter`, taken from the [`Config`](crate::config::Config)
//! at construction and replaceable with [`Error::set_formatter`](crate::Error::set_formatter).
//!
//! | Formatter | Output |
//! |-----------|--------|
//! | [`TextFormatter`] | Conventional one-line summary, located annotations, `With Stacktrace:` section (default) |
//! | [`TreeFormatter`] | `Error:` header with `at file:line` entries and `╰─` context lines |
//! | [`JsonFormatter`](crate::JsonFormatter) | One JSON object with named fields |

use std::error::Error as StdError;
use std::fmt;

use crate::chain::chain;
use crate::error::Error;
use crate::stack::Stack;

/// Marker that opens a conventional single-line summary.
pub const TYPE_MARKER: &str = "errtrail::Error";

/// Banner that opens the stack section of [`TextFormatter`] output.
pub const STACK_BANNER: &str = "With Stacktrace:";

/// A strategy that renders an [`Error`].
///
/// Formatters are stateless; the error is passed in on every call. Honour
/// `f.alternate()` if the strategy has a compact or pretty variant.
///
/// Returning `Err` makes the error fall back to the process-wide default
/// formatter, and to [`TextFormatter`] if the default fails too.
///
/// ## Example
///
/// ```rust
/// use errtrail::{Error, Formatter};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct MessagesOnly;
///
/// impl Formatter for MessagesOnly {
///     fn format(&self, err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         for (i, annotation) in err.annotations().iter().enumerate() {
///             if i > 0 {
///                 f.write_str("; ")?;
///             }
///             f.write_str(annotation.message())?;
///         }
///         Ok(())
///     }
/// }
///
/// static MESSAGES_ONLY: MessagesOnly = MessagesOnly;
///
/// let err = Error::new("bad config")
///     .annotate("while starting")
///     .set_formatter(&MESSAGES_ONLY);
/// assert_eq!(err.render(), "bad config; while starting");
/// ```
pub trait Formatter: fmt::Debug + Send + Sync {
    /// Write `err` to `f`.
    fn format(&self, err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Write the type marker, with the kind in brackets when one is set.
fn write_marker(err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(TYPE_MARKER)?;
    if !err.kind().is_unknown() {
        write!(f, "[{}]", err.kind())?;
    }
    Ok(())
}

/// One-line description of any error in a chain.
fn summary(err: &(dyn StdError + 'static)) -> String {
    match err.downcast_ref::<Error>() {
        Some(inner) => inner.message().unwrap_or(TYPE_MARKER).to_string(),
        None => err.to_string(),
    }
}

// ============================================================================
// TextFormatter
// ============================================================================

/// The default plain-text formatter.
///
/// Output is built from up to three sections:
///
/// 1. **Cause.** A cause that is itself an [`Error`] renders through its own
///    formatter, after a line holding just the outer marker when the outer
///    error has a kind. If that inner report ends in a stack, a blank line
///    separates it from the outer annotations. Any other cause renders as
///    `errtrail::Error: <cause message>`.
/// 2. **Annotations.** One `<location> <message>` line each, in insertion order.
///    When there is no cause, the first annotation instead renders inline as
///    `errtrail::Error: <message>`, like a conventional one-line error.
/// 3. **Stack.** When non-empty: a blank line, `With Stacktrace:`, then one
///    `function [file.rs:line]` per line, with no trailing newline.
///
/// The marker becomes `errtrail::Error[IOError]` and so on when a
/// [`Kind`](crate::Kind) is set. `{:#}` drops function names from locations.
///
/// ```text
/// errtrail::Error: bad config
/// app::load [main.rs:14] while loading file.yaml
///
/// With Stacktrace:
/// app::load [main.rs:9]
/// app::main [main.rs:3]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut annotations = err.annotations().iter();

        match err.cause() {
            Some(cause) => match cause.downcast_ref::<Error>() {
                Some(inner) => {
                    if !err.kind().is_unknown() {
                        write_marker(err, f)?;
                        f.write_str("\n")?;
                    }
                    if f.alternate() {
                        write!(f, "{:#}", inner)?;
                    } else {
                        write!(f, "{}", inner)?;
                    }
                    // Keep the outer annotations apart from the inner stack
                    if !inner.stack().is_empty() && !annotations.as_slice().is_empty() {
                        f.write_str("\n")?;
                    }
                }
                None => {
                    write_marker(err, f)?;
                    write!(f, ": {}", cause)?;
                }
            },
            None => {
                write_marker(err, f)?;
                if let Some(first) = annotations.next() {
                    write!(f, ": {}", first.message())?;
                }
            }
        }

        for annotation in annotations {
            f.write_str("\n")?;
            if f.alternate() {
                write!(f, "{:#}", annotation)?;
            } else {
                write!(f, "{}", annotation)?;
            }
        }

        write_stack(err.stack(), f)
    }
}

fn write_stack(stack: &Stack, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if stack.is_empty() {
        return Ok(());
    }
    write!(f, "\n\n{}\n", STACK_BANNER)?;
    if f.alternate() {
        write!(f, "{:#}", stack)
    } else {
        write!(f, "{}", stack)
    }
}

// ============================================================================
// TreeFormatter
// ============================================================================

/// A tree layout with one `at file:line` entry per annotation.
///
/// ```text
/// Error: bad config
///     at src/main.rs:14
///        ╰─ bad config
///     at src/main.rs:20
///        ╰─ while loading file.yaml
///        ╰─ caused by: No such file or directory (os error 2)
///
///     With Stacktrace:
///       app::load [main.rs:9]
/// ```
///
/// The header is the first annotation's message, or the cause's message when
/// there are no annotations. The cause and its own sources are listed under the
/// last entry, each one indented further.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeFormatter;

impl Formatter for TreeFormatter {
    fn format(&self, err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header
        match (err.message(), err.cause()) {
            (Some(message), _) => write!(f, "Error: {}", message)?,
            (None, Some(cause)) => write!(f, "Error: {}", summary(cause))?,
            (None, None) => write!(f, "Error: {}", TYPE_MARKER)?,
        }
        if !err.kind().is_unknown() {
            write!(f, " [{}]", err.kind())?;
        }

        for annotation in err.annotations() {
            let loc = annotation.location();
            write!(f, "\n    at {}:{}", loc.file(), loc.line())?;
            if let Some(function) = loc.function() {
                write!(f, "\n       ╰─ in {}", function)?;
            }
            write!(f, "\n       ╰─ {}", annotation.message())?;
        }

        if let Some(cause) = err.cause() {
            let cause: &(dyn StdError + 'static) = cause;
            for (depth, source) in chain(cause).enumerate() {
                let indent = "   ".repeat(depth);
                write!(f, "\n       {}╰─ caused by: {}", indent, summary(source))?;
            }
        }

        if !err.stack().is_empty() {
            write!(f, "\n\n    {}", STACK_BANNER)?;
            for frame in err.stack() {
                if f.alternate() {
                    write!(f, "\n      {:#}", frame)?;
                } else {
                    write!(f, "\n      {}", frame)?;
                }
            }
        }

        Ok(())
    }
}
