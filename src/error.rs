//! The diagnostic [`Error`] type.
//!
//! An [`Error`] owns an optional cause, an ordered list of located
//! [`Annotation`]s and a captured [`Stack`]. It renders through a
//! [`Formatter`] chosen at construction.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use crate::annotation::{Annotation, AnnotationVec};
use crate::chain::find_in_chain;
use crate::config::{self, Config};
use crate::format::{Formatter, TextFormatter};
use crate::kind::Kind;
use crate::stack::{self, Frame, Stack};

/// Boxed foreign error held as a cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// Error - core type
// ============================================================================

/// A diagnostic error: cause, located annotations, captured stack.
///
/// ## Size
///
/// `Error` is one pointer wide. Everything lives in a single heap allocation,
/// so `Result<T, Error>` stays small on the `Ok` path.
///
/// ## Building
///
/// All builder methods take `self` and return it, so calls chain:
///
/// ```rust
/// use errtrail::{Error, Kind};
///
/// let err = Error::new("bad config")
///     .annotate("while loading file.yaml")
///     .set_kind(Kind::Value);
///
/// let text = err.render();
/// assert!(text.starts_with("errtrail::Error[ValueError]: bad config\n"));
/// assert!(text.contains("while loading file.yaml"));
/// ```
///
/// ## Adoption
///
/// [`Error::adopt`] wraps a foreign error. Adopting a value that already is an
/// `Error` returns it unchanged, so adoption can be applied at every layer
/// without piling up wrappers or stacks:
///
/// ```rust
/// use errtrail::Error;
///
/// let err = Error::adopt(std::io::Error::other("disk full"));
/// let again = Error::adopt(err);
/// assert_eq!(again.cause().map(|c| c.to_string()), Some("disk full".into()));
/// ```
///
/// ## Threads
///
/// `Error` is `Send + Sync`. Mutation needs ownership (or `&mut`), so sharing
/// one error between threads that modify it needs the caller's own
/// synchronization.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    cause: Option<BoxError>,
    annotations: AnnotationVec,
    stack: Stack,
    kind: Kind,
    formatter: &'static dyn Formatter,
}

impl Error {
    // ========================================================================
    // Construction
    // ========================================================================
    //
    // Every public constructor is `#[inline(never)]` and reaches the stack
    // capture through `#[inline(always)]` helpers only, so exactly one frame
    // (the constructor's) sits between the capture and the caller.

    /// Create an error with one annotation at the caller's location.
    ///
    /// Captures a stack starting at the caller unless capture is disabled in the
    /// process-wide [`Config`].
    ///
    /// ```rust
    /// use errtrail::Error;
    ///
    /// fn load() -> Result<(), Error> {
    ///     Err(Error::new("bad config"))
    /// }
    ///
    /// let err = load().unwrap_err();
    /// assert_eq!(err.message(), Some("bad config"));
    /// ```
    #[track_caller]
    #[inline(never)]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self::build(config::global(), Some(message.into()), None, true)
    }

    /// Like [`new`](Self::new) with an explicit configuration.
    #[track_caller]
    #[inline(never)]
    pub fn new_with(config: &Config, message: impl Into<Cow<'static, str>>) -> Self {
        Self::build(config, Some(message.into()), None, true)
    }

    /// Wrap a foreign error, or return it unchanged if it already is an `Error`.
    ///
    /// - `err` is an `Error`: returned as is (no new stack, no wrapping).
    /// - `err`'s `source()` chain contains an `Error`: `err` becomes the cause of
    ///   a new `Error`, but no stack is captured, since the inner one already
    ///   has it.
    /// - Otherwise: a new `Error` with `err` as its cause and a fresh stack.
    ///
    /// No annotation is added; chain [`annotate`](Self::annotate) for that.
    #[track_caller]
    #[inline(never)]
    pub fn adopt<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::adopt_boxed_in(config::global(), Box::new(err))
    }

    /// Like [`adopt`](Self::adopt) with an explicit configuration.
    #[track_caller]
    #[inline(never)]
    pub fn adopt_with<E>(config: &Config, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::adopt_boxed_in(config, Box::new(err))
    }

    /// Like [`adopt`](Self::adopt) for an already boxed error.
    #[track_caller]
    #[inline(never)]
    pub fn adopt_boxed(err: BoxError) -> Self {
        Self::adopt_boxed_in(config::global(), err)
    }

    /// Adopt an optional error. `None` stays `None`.
    ///
    /// ```rust
    /// use errtrail::Error;
    ///
    /// assert!(Error::adopt_opt(None::<std::io::Error>).is_none());
    /// ```
    #[track_caller]
    #[inline(never)]
    pub fn adopt_opt<E>(err: Option<E>) -> Option<Self>
    where
        E: StdError + Send + Sync + 'static,
    {
        match err {
            Some(err) => Some(Self::adopt_boxed_in(config::global(), Box::new(err))),
            None => None,
        }
    }

    /// Assemble an error from parts, without capturing anything.
    ///
    /// Uses the process-wide default formatter.
    pub fn from_parts(
        cause: Option<BoxError>,
        annotations: Vec<Annotation>,
        stack: Stack,
    ) -> Self {
        Self {
            inner: Box::new(ErrorImpl {
                cause,
                annotations: AnnotationVec::from(annotations),
                stack,
                kind: Kind::Unknown,
                formatter: config::global().formatter(),
            }),
        }
    }

    #[track_caller]
    #[inline(always)]
    pub(crate) fn adopt_boxed_in(config: &Config, err: BoxError) -> Self {
        let err = match err.downcast::<Error>() {
            Ok(existing) => return *existing,
            Err(other) => other,
        };
        let nested = config.inspect_chain() && find_in_chain(&*err, |e| e.is::<Error>()).is_some();
        Self::build(config, None, Some(err), !nested)
    }

    #[track_caller]
    #[inline(always)]
    fn build(
        config: &Config,
        message: Option<Cow<'static, str>>,
        cause: Option<BoxError>,
        capture: bool,
    ) -> Self {
        let mut annotations = AnnotationVec::new();
        if let Some(message) = message {
            annotations.push(Annotation::new(message, Frame::caller()));
        }
        let stack = if capture && config.capture_stack() {
            // Skip the public constructor's frame
            stack::capture_frames(config.stack_limits(), 1)
        } else {
            Stack::empty()
        };
        Self {
            inner: Box::new(ErrorImpl {
                cause,
                annotations,
                stack,
                kind: Kind::Unknown,
                formatter: config.formatter(),
            }),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Append an annotation located at the caller.
    ///
    /// Annotations are kept in the order they were added, duplicates included.
    #[track_caller]
    #[inline]
    pub fn annotate(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.inner
            .annotations
            .push(Annotation::new(message, Frame::caller()));
        self
    }

    /// Append a lazily built annotation located at the caller.
    ///
    /// ```rust
    /// use errtrail::Error;
    ///
    /// let path = "file.yaml";
    /// let err = Error::new("bad config").annotate_with(|| format!("while loading {}", path));
    /// assert_eq!(err.annotations()[1].message(), "while loading file.yaml");
    /// ```
    #[track_caller]
    #[inline]
    pub fn annotate_with(mut self, f: impl FnOnce() -> String) -> Self {
        let location = Frame::caller();
        self.inner.annotations.push(Annotation::new(f(), location));
        self
    }

    /// Append an annotation that also records the enclosing function's name.
    ///
    /// Pass an empty closure `|| {}`: its type name contains the function it
    /// was written in.
    ///
    /// ```rust
    /// use errtrail::Error;
    ///
    /// fn load_config() -> Error {
    ///     Error::new("bad config").annotate_fn(|| {}, "while loading")
    /// }
    ///
    /// let err = load_config();
    /// let function = err.annotations()[1].location().function().unwrap();
    /// assert!(function.ends_with("load_config"));
    /// ```
    #[track_caller]
    #[inline]
    pub fn annotate_fn<F: Fn()>(
        mut self,
        _marker: F,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_name = core::any::type_name::<F>();
        // "crate::module::function::{{closure}}"
        let name = full_name.strip_suffix("::{{closure}}").unwrap_or(full_name);
        let location = Frame::caller().with_function(name);
        self.inner
            .annotations
            .push(Annotation::new(message, location));
        self
    }

    /// Remove the captured stack.
    ///
    /// Use on errors whose origin is uninteresting even when capture is on.
    #[inline]
    pub fn drop_stack(mut self) -> Self {
        self.inner.stack.clear();
        self
    }

    /// Replace the cause. Any previous cause is dropped.
    pub fn set_cause<E>(mut self, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.inner.cause = Some(Box::new(err));
        self
    }

    /// Replace the cause with an already boxed error.
    pub fn set_cause_boxed(mut self, err: BoxError) -> Self {
        self.inner.cause = Some(err);
        self
    }

    /// Set the category.
    #[inline]
    pub fn set_kind(mut self, kind: Kind) -> Self {
        self.inner.kind = kind;
        self
    }

    /// Render this error with a different formatter.
    #[inline]
    pub fn set_formatter(mut self, formatter: &'static dyn Formatter) -> Self {
        self.inner.formatter = formatter;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The wrapped cause, one level down.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.cause.as_deref()
    }

    /// Consume the error and return its cause.
    pub fn into_cause(self) -> Option<BoxError> {
        self.inner.cause
    }

    /// Annotations, oldest first.
    #[inline]
    pub fn annotations(&self) -> &[Annotation] {
        &self.inner.annotations
    }

    /// The first annotation's message, if any.
    pub fn message(&self) -> Option<&str> {
        self.inner.annotations.first().map(Annotation::message)
    }

    /// The captured stack (possibly empty).
    #[inline]
    pub fn stack(&self) -> &Stack {
        &self.inner.stack
    }

    /// The category.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// The formatter this error renders with.
    #[inline]
    pub fn formatter(&self) -> &'static dyn Formatter {
        self.inner.formatter
    }

    /// Render through the active formatter.
    ///
    /// Same as `to_string()`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    // ========================================================================
    // Chain inspection
    // ========================================================================

    /// Find the first `Error` in `err`'s `source()` chain, including `err` itself.
    ///
    /// ```rust
    /// use errtrail::Error;
    ///
    /// let err: Box<dyn std::error::Error + Send + Sync> = Box::new(Error::new("inner"));
    /// let found = Error::find(err.as_ref()).unwrap();
    /// assert_eq!(found.message(), Some("inner"));
    /// ```
    pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
        find_in_chain(err, |e| e.is::<Error>()).and_then(|e| e.downcast_ref::<Error>())
    }

    /// Check if `err`'s chain contains an `Error`.
    pub fn is_in(err: &(dyn StdError + 'static)) -> bool {
        Self::find(err).is_some()
    }

    #[cfg(test)]
    pub(crate) fn id(&self) -> *const () {
        &*self.inner as *const ErrorImpl as *const ()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Adapter that renders an error with a specific formatter.
struct Rendered<'a> {
    err: &'a Error,
    formatter: &'a dyn Formatter,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.formatter.format(self.err, f)
    }
}

/// Render into a buffer so a failing formatter leaves no partial output.
fn render_with(err: &Error, formatter: &dyn Formatter, alternate: bool) -> Option<String> {
    let mut out = String::new();
    let rendered = Rendered { err, formatter };
    let result = if alternate {
        write!(out, "{:#}", rendered)
    } else {
        write!(out, "{}", rendered)
    };
    result.ok().map(|()| out)
}

/// Render with the error's own formatter, then `default`, then [`TextFormatter`].
///
/// Each step runs only when the previous one failed. Returns `None` only if
/// all three fail.
pub(crate) fn render_or_fallback(
    err: &Error,
    default: &'static dyn Formatter,
    alternate: bool,
) -> Option<String> {
    let own = err.inner.formatter;
    if let Some(text) = render_with(err, own, alternate) {
        return Some(text);
    }

    log::warn!("{own:?} failed to render an error; falling back to {default:?}");
    if let Some(text) = render_with(err, default, alternate) {
        return Some(text);
    }

    log::warn!("{default:?} failed as well; falling back to TextFormatter");
    render_with(err, &TextFormatter, alternate)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match render_or_fallback(self, config::global().formatter(), f.alternate()) {
            Some(text) => f.write_str(&text),
            None => Err(fmt::Error),
        }
    }
}

/// Same as `Display`, so `fn main() -> Result<(), Error>` prints the full report.
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}
