//! Construction-time configuration.
//!
//! A [`Config`] decides whether new errors capture a stack, how deep, which
//! formatter they render with, and whether adoption looks through wrapper
//! errors. Pass one explicitly to [`Error::new_with`](crate::Error::new_with) /
//! [`Error::adopt_with`](crate::Error::adopt_with), or install one process-wide
//! with [`init`] before any errors are created.
//!
//! ## Example
//!
//! ```rust
//! use errtrail::config::{self, Config};
//! use errtrail::{Error, JsonFormatter, StackLimits};
//!
//! static QUIET: Config = Config::builder()
//!     .capture_stack(false)
//!     .build();
//!
//! let err = Error::new_with(&QUIET, "no stack here");
//! assert!(err.stack().is_empty());
//!
//! // Once, at startup:
//! let _ = config::init(
//!     Config::builder()
//!         .stack_limits(StackLimits::new().with_max_depth(64))
//!         .formatter(&JsonFormatter)
//!         .build(),
//! );
//! ```

use std::sync::OnceLock;

use crate::format::{Formatter, TextFormatter};
use crate::stack::StackLimits;

static GLOBAL: OnceLock<Config> = OnceLock::new();
static DEFAULT: Config = Config::new();

// ============================================================================
// ConfigError
// ============================================================================

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// [`init`] was already called.
    #[error("errtrail is already configured; config::init may only be called once")]
    AlreadyInitialized,
    /// [`StackLimits::initial_depth`] is zero.
    #[error("initial stack depth must be at least 1")]
    ZeroInitialDepth,
    /// [`StackLimits::initial_depth`] is larger than [`StackLimits::max_depth`].
    #[error("initial stack depth {initial} exceeds the maximum of {max}")]
    InitialExceedsMax {
        /// Requested initial depth.
        initial: usize,
        /// Requested maximum depth.
        max: usize,
    },
}

// ============================================================================
// Config
// ============================================================================

/// Settings read when an error is constructed.
///
/// Build with [`Config::builder()`]; every builder method is `const fn`, so a
/// config can live in a `static`.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    capture_stack: bool,
    stack_limits: StackLimits,
    formatter: &'static dyn Formatter,
    inspect_chain: bool,
}

impl Config {
    /// The default configuration: capture on, default [`StackLimits`],
    /// [`TextFormatter`], chain inspection on.
    pub const fn new() -> Self {
        Self {
            capture_stack: true,
            stack_limits: StackLimits::new(),
            formatter: &TextFormatter,
            inspect_chain: true,
        }
    }

    /// Start building a configuration from the defaults.
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Whether new errors capture a stack.
    #[inline]
    pub const fn capture_stack(&self) -> bool {
        self.capture_stack
    }

    /// Bounds for stack captures.
    #[inline]
    pub const fn stack_limits(&self) -> &StackLimits {
        &self.stack_limits
    }

    /// Formatter new errors render with.
    #[inline]
    pub const fn formatter(&self) -> &'static dyn Formatter {
        self.formatter
    }

    /// Whether adoption searches the whole `source()` chain for an existing
    /// [`Error`](crate::Error), or only looks at the adopted value itself.
    #[inline]
    pub const fn inspect_chain(&self) -> bool {
        self.inspect_chain
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the default configuration.
    pub const fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    /// Enable or disable stack capture.
    pub const fn capture_stack(mut self, enabled: bool) -> Self {
        self.config.capture_stack = enabled;
        self
    }

    /// Set stack capture bounds.
    pub const fn stack_limits(mut self, limits: StackLimits) -> Self {
        self.config.stack_limits = limits;
        self
    }

    /// Set the formatter new errors render with.
    pub const fn formatter(mut self, formatter: &'static dyn Formatter) -> Self {
        self.config.formatter = formatter;
        self
    }

    /// Enable or disable searching the whole chain during adoption.
    pub const fn inspect_chain(mut self, enabled: bool) -> Self {
        self.config.inspect_chain = enabled;
        self
    }

    /// Finish building.
    pub const fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Process-wide configuration
// ============================================================================

/// Install the process-wide configuration.
///
/// May succeed only once. Call it at startup, before other threads create
/// errors; errors created earlier used the defaults. The stack limits are
/// validated first.
pub fn init(config: Config) -> Result<(), ConfigError> {
    config.stack_limits.validate()?;
    GLOBAL.set(config).map_err(|_| {
        log::warn!("ignoring repeated errtrail configuration; the first config::init wins");
        ConfigError::AlreadyInitialized
    })
}

/// The process-wide configuration, or the defaults if [`init`] was never called.
#[inline]
pub fn global() -> &'static Config {
    GLOBAL.get().unwrap_or(&DEFAULT)
}
