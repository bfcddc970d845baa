//! Call-stack capture.
//!
//! This module provides [`Frame`] (one resolved location), [`Stack`] (the ordered
//! frames captured when an error is created) and [`StackLimits`] (how deep a
//! capture may go).
//!
//! Capture walks the native stack with the `backtrace` crate. The first walk
//! collects [`StackLimits::initial_depth`] frames; when the buffer fills up the
//! depth doubles and the stack is walked again, until either the whole stack fits
//! or [`StackLimits::max_depth`] is reached. Symbols are resolved once, after the
//! final walk, so discarded walks never pay for symbolication.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

use crate::config::{self, ConfigError};

/// Frames collected by the first walk.
pub const DEFAULT_INITIAL_DEPTH: usize = 10;

/// Ceiling on the number of frames a capture collects.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// File name used when a symbol has no debug info.
#[cfg(feature = "backtrace")]
const UNKNOWN_FILE: &str = "<unknown>";

// ============================================================================
// Frame - one resolved location
// ============================================================================

/// One call-stack location: function, source file and line.
///
/// Frames come from two places: stack captures (function name resolved from
/// debug info) and annotation call sites (`#[track_caller]` locations, which
/// carry no function name unless one is supplied).
///
/// ## Display
///
/// `{}` renders `function [file.rs:42]`, using only the last path segment of the
/// file. `{:#}` renders just `[file.rs:42]`. A frame without a function name
/// always uses the short form.
///
/// ```rust
/// use errtrail::Frame;
///
/// let frame = Frame::new("src/db/query.rs", 42).with_function("app::db::query");
/// assert_eq!(frame.to_string(), "app::db::query [query.rs:42]");
/// assert_eq!(format!("{:#}", frame), "[query.rs:42]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function: Option<Cow<'static, str>>,
    file: Cow<'static, str>,
    line: u32,
}

impl Frame {
    /// Create a frame for a file and line, with no function name.
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            function: None,
            file: file.into(),
            line,
        }
    }

    /// Create a frame from the caller's source location.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    /// Create a frame from a `core::panic::Location`.
    pub fn from_location(loc: &'static Location<'static>) -> Self {
        Self {
            function: None,
            file: Cow::Borrowed(loc.file()),
            line: loc.line(),
        }
    }

    /// Attach a function name.
    pub fn with_function(mut self, function: impl Into<Cow<'static, str>>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Function or symbol name, if known.
    #[inline]
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Full source file path as recorded.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Source file name without directory components.
    ///
    /// Both `/` and `\` are treated as separators so Windows paths shorten too.
    pub fn file_name(&self) -> &str {
        self.file.rsplit(['/', '\\']).next().unwrap_or(&self.file)
    }

    /// Line number, or 0 when it could not be resolved.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[cfg(feature = "backtrace")]
    fn from_symbol(symbol: &backtrace::Symbol) -> Self {
        Self {
            // `{:#}` drops the trailing `::h0123abcd` hash
            function: symbol.name().map(|name| Cow::Owned(format!("{name:#}"))),
            file: symbol.filename().map_or(Cow::Borrowed(UNKNOWN_FILE), |path| {
                Cow::Owned(path.display().to_string())
            }),
            line: symbol.lineno().unwrap_or(0),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) if !f.alternate() => {
                write!(f, "{} [{}:{}]", function, self.file_name(), self.line)
            }
            _ => write!(f, "[{}:{}]", self.file_name(), self.line),
        }
    }
}

// ============================================================================
// StackLimits
// ============================================================================

/// Bounds for a stack capture.
///
/// ```rust
/// use errtrail::StackLimits;
///
/// const SHALLOW: StackLimits = StackLimits::new().with_initial_depth(4).with_max_depth(32);
/// assert_eq!(SHALLOW.max_depth(), 32);
/// assert!(SHALLOW.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackLimits {
    initial_depth: usize,
    max_depth: usize,
}

impl StackLimits {
    /// Default limits: probe 10 frames, never collect more than 200.
    pub const fn new() -> Self {
        Self {
            initial_depth: DEFAULT_INITIAL_DEPTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the number of frames collected by the first walk.
    pub const fn with_initial_depth(mut self, depth: usize) -> Self {
        self.initial_depth = depth;
        self
    }

    /// Set the ceiling on collected frames.
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Frames collected by the first walk.
    #[inline]
    pub const fn initial_depth(&self) -> usize {
        self.initial_depth
    }

    /// Ceiling on collected frames.
    #[inline]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check that the limits describe a usable capture.
    ///
    /// Capture itself never fails: invalid limits are clamped. This is for
    /// configuration code that wants to reject them up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_depth == 0 {
            return Err(ConfigError::ZeroInitialDepth);
        }
        if self.initial_depth > self.max_depth {
            return Err(ConfigError::InitialExceedsMax {
                initial: self.initial_depth,
                max: self.max_depth,
            });
        }
        Ok(())
    }
}

impl Default for StackLimits {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Stack
// ============================================================================

/// Ordered call-stack frames, nearest to the capture site first.
///
/// A stack may be empty: capture disabled, [`Error::drop_stack`](crate::Error::drop_stack)
/// called, or no resolvable symbols.
///
/// ## Example
///
/// ```rust
/// use errtrail::Stack;
///
/// fn where_am_i() -> Stack {
///     Stack::capture(0)
/// }
///
/// let stack = where_am_i();
/// for frame in &stack {
///     println!("{}", frame);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    /// An empty stack.
    #[inline]
    pub const fn empty() -> Self {
        Self { frames: Vec::new() }
    }

    /// Capture the current call stack using the process-wide [`StackLimits`].
    ///
    /// `skip` is the number of frames to omit above this call: `0` starts the
    /// stack at the function that called `capture`.
    #[inline(never)]
    pub fn capture(skip: usize) -> Self {
        capture_frames(config::global().stack_limits(), skip.saturating_add(1))
    }

    /// Capture the current call stack with explicit limits.
    ///
    /// `skip` has the same meaning as in [`capture`](Self::capture).
    #[inline(never)]
    pub fn capture_with(limits: &StackLimits, skip: usize) -> Self {
        capture_frames(limits, skip.saturating_add(1))
    }

    /// The captured frames.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate over frames, nearest to the capture site first.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Remove all frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl From<Vec<Frame>> for Stack {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<Frame> for Stack {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// One frame per line, no trailing newline. `{:#}` uses the short frame form.
impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            if f.alternate() {
                write!(f, "{:#}", frame)?;
            } else {
                write!(f, "{}", frame)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Capture
// ============================================================================
//
// `capture_frames` is the anchor: every frame up to and including it belongs to
// the capture machinery. `skip` then counts frames above the anchor, so callers
// pass 1 to hide their own frame. Entry points that call this must not be
// inlined into their callers, or the count is off by one.

/// Frames tolerated before the anchor is found. Bounds the walk when the
/// platform cannot report symbol addresses.
#[cfg(feature = "backtrace")]
const MAX_PREAMBLE: usize = 16;

#[cfg(feature = "backtrace")]
#[inline(never)]
pub(crate) fn capture_frames(limits: &StackLimits, skip: usize) -> Stack {
    let max = limits.max_depth();
    if max == 0 {
        return Stack::empty();
    }

    let anchor = capture_frames as usize;
    let mut depth = limits.initial_depth().clamp(1, max);
    let raw = loop {
        let raw = walk(anchor, skip, depth);
        if raw.len() < depth {
            break raw;
        }
        if depth >= max {
            log::debug!("stack capture stopped at the {max}-frame limit");
            break raw;
        }
        depth = depth.saturating_mul(2).min(max);
    };

    let mut stack = resolve(&raw);
    stack.frames.truncate(max);
    stack
}

#[cfg(not(feature = "backtrace"))]
#[inline]
pub(crate) fn capture_frames(_limits: &StackLimits, _skip: usize) -> Stack {
    Stack::empty()
}

/// Collect up to `depth` raw frames above the anchor, after skipping `skip`.
#[cfg(feature = "backtrace")]
fn walk(anchor: usize, skip: usize, depth: usize) -> Vec<backtrace::Frame> {
    let limit = depth.saturating_add(MAX_PREAMBLE);
    // Huge limits are legal; the stack itself is what bounds the buffer
    let mut frames = Vec::with_capacity(depth.min(DEFAULT_MAX_DEPTH).saturating_add(MAX_PREAMBLE));
    let mut start: Option<usize> = None;

    backtrace::trace(|frame| {
        if start.is_none() && frame.symbol_address() as usize == anchor {
            start = Some(frames.len().saturating_add(1).saturating_add(skip));
        }
        frames.push(frame.clone());
        match start {
            Some(start) => frames.len().saturating_sub(start) < depth,
            None => frames.len() < limit,
        }
    });

    match start {
        Some(start) => {
            frames.drain(..start.min(frames.len()));
        }
        // Anchor never seen: keep what we have, internals included
        None => frames.truncate(depth),
    }
    frames
}

#[cfg(feature = "backtrace")]
fn resolve(raw: &[backtrace::Frame]) -> Stack {
    let mut frames = Vec::with_capacity(raw.len());
    for frame in raw {
        // Inlined calls resolve to several symbols for one address
        backtrace::resolve_frame(frame, |symbol| frames.push(Frame::from_symbol(symbol)));
    }
    Stack { frames }
}
