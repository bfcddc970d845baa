//! Unit tests for errtrail.
//!
//! These tests are in a separate file for organization but remain in the `src/`
//! directory to retain access to `pub(crate)` items like `Error::id`.
//!
//! Nothing here calls `config::init`; the process-wide configuration is tested
//! in its own integration test binary.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::config::Config;
use crate::{
    Annotation, Error, ErrorExt, Formatter, Frame, JsonFormatter, Kind, ResultExt, Stack,
    StackLimits, TreeFormatter, chain,
};

#[derive(Debug)]
struct Wrapper(Error);

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wrapped")
    }
}

impl StdError for Wrapper {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

fn disk_full() -> io::Error {
    io::Error::other("disk full")
}

// ============================================================================
// Layout
// ============================================================================

static_assertions::assert_eq_size!(Error, usize);
static_assertions::assert_eq_size!(Result<(), Error>, usize);
static_assertions::assert_impl_all!(Error: Send, Sync, StdError, fmt::Debug, fmt::Display);
static_assertions::assert_impl_all!(Frame: Send, Sync, Clone, Eq);

// ============================================================================
// Construction and adoption
// ============================================================================

#[test]
fn test_new_records_message_and_location() {
    let line = line!() + 1;
    let err = Error::new("bad config");

    assert_eq!(err.message(), Some("bad config"));
    assert_eq!(err.annotations().len(), 1);
    let loc = err.annotations()[0].location();
    assert!(loc.file().ends_with("tests.rs"));
    assert_eq!(loc.line(), line);
    assert!(err.cause().is_none());
    assert_eq!(err.kind(), Kind::Unknown);
}

#[test]
fn test_adopt_is_identity_for_errors() {
    let err = Error::new("original");
    let id = err.id();
    let stack_len = err.stack().len();

    let again = Error::adopt(err);
    assert_eq!(again.id(), id);
    assert_eq!(again.stack().len(), stack_len);

    let via_ext = again.adopt();
    assert_eq!(via_ext.id(), id);
}

#[test]
fn test_adopt_wraps_foreign_error() {
    let err = Error::adopt(disk_full());

    assert!(err.annotations().is_empty());
    assert_eq!(err.cause().map(|c| c.to_string()), Some("disk full".into()));
    assert!(err.cause().is_some_and(|c| c.is::<io::Error>()));
    assert!(!err.stack().is_empty());
}

#[test]
fn test_adopt_wrapped_error_skips_new_stack() {
    let err = Error::adopt(Wrapper(Error::new("inner")));

    assert!(err.stack().is_empty());
    assert_eq!(err.cause().map(|c| c.to_string()), Some("wrapped".into()));
    assert_eq!(Error::find(&err).map(Error::message), Some(None));

    let inner = chain(&err)
        .filter_map(|e| e.downcast_ref::<Error>())
        .nth(1)
        .unwrap();
    assert_eq!(inner.message(), Some("inner"));
}

#[test]
fn test_adopt_without_chain_inspection_captures() {
    static SHALLOW_ADOPT: Config = Config::builder().inspect_chain(false).build();

    let err = Error::adopt_with(&SHALLOW_ADOPT, Wrapper(Error::new("inner")));
    assert!(!err.stack().is_empty());
}

#[test]
fn test_adopt_opt() {
    assert!(Error::adopt_opt(None::<io::Error>).is_none());

    let err = Error::adopt_opt(Some(disk_full())).unwrap();
    assert_eq!(err.cause().map(|c| c.to_string()), Some("disk full".into()));
}

#[test]
fn test_capture_disabled() {
    static NO_STACKS: Config = Config::builder().capture_stack(false).build();

    let err = Error::new_with(&NO_STACKS, "cheap");
    assert!(err.stack().is_empty());
    assert_eq!(err.message(), Some("cheap"));

    let adopted = Error::adopt_with(&NO_STACKS, disk_full());
    assert!(adopted.stack().is_empty());
}

// ============================================================================
// Annotations
// ============================================================================

#[test]
fn test_annotations_keep_order_and_duplicates() {
    let err = Error::new("first")
        .annotate("second")
        .annotate("second")
        .annotate_with(|| format!("{}", "third"));

    let messages: Vec<_> = err.annotations().iter().map(Annotation::message).collect();
    assert_eq!(messages, ["first", "second", "second", "third"]);
}

#[test]
fn test_annotate_with_is_lazy_on_ok() {
    let mut called = false;
    let ok: Result<u32, io::Error> = Ok(5);
    let value = ok
        .annotate_with(|| {
            called = true;
            String::from("never")
        })
        .unwrap();

    assert_eq!(value, 5);
    assert!(!called);
}

#[test]
fn test_annotate_fn_records_function() {
    fn load_config() -> Error {
        Error::new("bad config").annotate_fn(|| {}, "while loading")
    }

    let err = load_config();
    let location = err.annotations()[1].location();
    let function = location.function().unwrap();
    assert!(function.ends_with("load_config"), "got {}", function);
    assert!(!function.contains("{{closure}}"));
    assert!(err.render().contains("load_config [tests.rs:"));
}

#[test]
fn test_result_ext_annotates_foreign_error() {
    fn save() -> Result<(), io::Error> {
        Err(disk_full())
    }

    fn handle() -> Result<(), Error> {
        save().annotate("while saving")?;
        Ok(())
    }

    let err = handle().unwrap_err();
    assert_eq!(err.annotations().len(), 1);
    assert_eq!(err.annotations()[0].message(), "while saving");
    assert!(err.cause().is_some_and(|c| c.is::<io::Error>()));
}

#[test]
fn test_result_ext_keeps_existing_error() {
    fn inner() -> Result<(), Error> {
        Err(Error::new("bad config"))
    }

    fn middle() -> Result<(), Error> {
        inner().annotate("in middle")
    }

    fn outer() -> Result<(), Error> {
        middle().annotate("in outer").set_kind(Kind::Value)
    }

    let err = outer().unwrap_err();
    let messages: Vec<_> = err.annotations().iter().map(Annotation::message).collect();
    assert_eq!(messages, ["bad config", "in middle", "in outer"]);
    assert!(err.cause().is_none());
    assert_eq!(err.kind(), Kind::Value);

    let lines: Vec<_> = err.annotations().iter().map(|a| a.location().line()).collect();
    assert!(lines[0] < lines[1] && lines[1] < lines[2]);
}

#[test]
fn test_error_ext_on_values() {
    let err = disk_full().annotate("while saving");
    assert_eq!(err.message(), Some("while saving"));
    assert!(err.cause().is_some());
}

// ============================================================================
// Builders
// ============================================================================

#[test]
fn test_drop_stack() {
    let err = Error::adopt(disk_full());
    assert!(!err.stack().is_empty());
    assert!(err.render().contains("With Stacktrace:"));

    let err = err.drop_stack();
    assert!(err.stack().is_empty());
    assert!(!err.render().contains("With Stacktrace:"));

    let dropped: Result<(), Error> = Err(disk_full()).drop_stack();
    assert!(dropped.unwrap_err().stack().is_empty());
}

#[test]
fn test_drop_stack_keeps_everything_else() {
    let err = Error::adopt(disk_full()).annotate("first").annotate("second");
    let before = err.render();
    let after = err.drop_stack().render();

    let (head, _) = before.split_once("\n\nWith Stacktrace:\n").unwrap();
    assert_eq!(head, after);
    assert_eq!(after.lines().count(), 3, "{}", after);
}

#[test]
fn test_set_cause_replaces() {
    let err = Error::new("outer")
        .set_cause(io::Error::other("first"))
        .set_cause(io::Error::other("second"));

    assert_eq!(err.cause().map(|c| c.to_string()), Some("second".into()));
    assert_eq!(err.source().map(|c| c.to_string()), Some("second".into()));
    assert_eq!(chain(&err).count(), 2);
}

#[test]
fn test_into_cause() {
    let err = Error::adopt(disk_full());
    let cause = err.into_cause().unwrap();
    assert_eq!(cause.downcast::<io::Error>().unwrap().to_string(), "disk full");

    assert!(Error::new("no cause").into_cause().is_none());
}

// ============================================================================
// Kind
// ============================================================================

#[test]
fn test_kind_names() {
    assert_eq!(Kind::Unknown.to_string(), "Unknown");
    assert_eq!(Kind::Io.to_string(), "IOError");
    assert_eq!(Kind::Type.to_string(), "TypeError");
    assert_eq!(Kind::Value.to_string(), "ValueError");
    assert_eq!(Kind::Other("QuotaError").to_string(), "QuotaError");
    assert_eq!(Kind::default(), Kind::Unknown);
}

#[test]
fn test_kind_of_looks_through_chain() {
    let inner = Error::new("disk unplugged").set_kind(Kind::Io);
    let outer = Error::adopt(Wrapper(inner));

    assert_eq!(outer.kind(), Kind::Unknown);
    assert_eq!(Kind::of(&outer), Kind::Io);
    assert_eq!(Kind::of(&disk_full()), Kind::Unknown);
}

#[test]
fn test_kind_in_marker() {
    let err = Error::new("bad value").set_kind(Kind::Value).drop_stack();
    assert!(err.render().starts_with("errtrail::Error[ValueError]: bad value"));

    let err = Error::new("over quota")
        .set_kind(Kind::Other("QuotaError"))
        .drop_stack();
    assert_eq!(err.render(), "errtrail::Error[QuotaError]: over quota");
}

// ============================================================================
// Text output
// ============================================================================

#[test]
fn test_text_from_parts_exact() {
    let site = Frame::new("src/file.rs", 1).with_function("SomeOtherFunctionName");
    let err = Error::from_parts(
        None,
        vec![
            Annotation::new("bad error", site.clone()),
            Annotation::new("oh no!", site),
        ],
        Stack::from(vec![Frame::new("src/file.rs", 0).with_function("FunctionName")]),
    );

    assert_eq!(
        err.to_string(),
        "errtrail::Error: bad error\n\
         SomeOtherFunctionName [file.rs:1] oh no!\n\
         \n\
         With Stacktrace:\n\
         FunctionName [file.rs:0]"
    );
    assert_eq!(
        format!("{:#}", err),
        "errtrail::Error: bad error\n\
         [file.rs:1] oh no!\n\
         \n\
         With Stacktrace:\n\
         [file.rs:0]"
    );
}

#[test]
fn test_text_two_lines_without_stack() {
    let line = line!() + 1;
    let err = Error::new("bad config").annotate("while loading file.yaml");
    let err = err.drop_stack();

    assert_eq!(
        err.to_string(),
        format!("errtrail::Error: bad config\n[tests.rs:{line}] while loading file.yaml")
    );
}

#[test]
fn test_text_disk_full() {
    let err: Error = Err::<(), _>(disk_full())
        .annotate("while saving")
        .unwrap_err();
    let text = err.to_string();

    assert!(text.starts_with("errtrail::Error: disk full\n"), "{}", text);
    assert!(text.contains("] while saving"));
    assert!(text.contains("\n\nWith Stacktrace:\n"));
    assert!(!text.ends_with('\n'));
}

#[test]
fn test_text_nested_error_cause() {
    let inner = Error::new("inner failure").drop_stack();
    let outer = Error::from_parts(
        Some(Box::new(inner)),
        vec![Annotation::new("retrying", Frame::new("src/retry.rs", 7))],
        Stack::empty(),
    );

    assert_eq!(
        outer.to_string(),
        "errtrail::Error: inner failure\n[retry.rs:7] retrying"
    );
}

#[test]
fn test_text_nested_error_with_stack() {
    let inner = Error::from_parts(
        None,
        vec![Annotation::new("inner failure", Frame::new("src/io.rs", 3))],
        Stack::from(vec![Frame::new("src/io.rs", 2).with_function("read")]),
    );
    let outer = Error::from_parts(
        Some(Box::new(inner)),
        vec![Annotation::new("retrying", Frame::new("src/retry.rs", 7))],
        Stack::empty(),
    );

    assert_eq!(
        format!("{:#}", outer),
        "errtrail::Error: inner failure\n\
         \n\
         With Stacktrace:\n\
         [io.rs:2]\n\
         \n\
         [retry.rs:7] retrying"
    );
}

#[test]
fn test_text_nested_error_keeps_outer_kind() {
    let inner = Error::new("inner failure").drop_stack();
    let outer = Error::from_parts(
        Some(Box::new(inner)),
        vec![Annotation::new("retrying", Frame::new("src/retry.rs", 7))],
        Stack::empty(),
    )
    .set_kind(Kind::Io);

    assert_eq!(
        outer.to_string(),
        "errtrail::Error[IOError]\n\
         errtrail::Error: inner failure\n\
         [retry.rs:7] retrying"
    );
}

#[test]
fn test_debug_matches_display() {
    let err = Error::new("same").annotate("either way");
    assert_eq!(format!("{:?}", err), format!("{}", err));
    assert_eq!(err.render(), err.to_string());
}

#[test]
fn test_empty_error_renders_marker() {
    let err = Error::from_parts(None, Vec::new(), Stack::empty());
    assert_eq!(err.to_string(), "errtrail::Error");
}

// ============================================================================
// Other formatters
// ============================================================================

#[test]
fn test_tree_formatter() {
    let err = Error::new("bad config")
        .annotate("while loading file.yaml")
        .set_cause(disk_full())
        .drop_stack()
        .set_formatter(&TreeFormatter);
    let text = err.render();

    assert!(text.starts_with("Error: bad config\n    at "), "{}", text);
    assert!(text.contains("tests.rs:"));
    assert!(text.contains("\n       ╰─ while loading file.yaml"));
    assert!(text.contains("╰─ caused by: disk full"));
    assert!(!text.contains("With Stacktrace:"));
}

#[test]
fn test_json_formatter() {
    let inner = Error::new("inner").set_kind(Kind::Io).drop_stack();
    let err = Error::new("outer")
        .set_cause(inner)
        .drop_stack()
        .set_formatter(&JsonFormatter);

    let value: serde_json::Value = serde_json::from_str(&err.render()).unwrap();
    assert_eq!(value["kind"], "Unknown");
    assert_eq!(value["annotations"][0]["message"], "outer");
    assert_eq!(value["cause"]["kind"], "IOError");
    assert_eq!(value["cause"]["annotations"][0]["message"], "inner");
    assert!(value["cause"]["cause"].is_null());
    assert_eq!(value["stack"], serde_json::json!([]));

    let pretty = format!("{:#}", err);
    assert!(pretty.contains("\n  \"kind\""));
}

#[test]
fn test_json_foreign_cause_is_message() {
    let err = Error::adopt(disk_full()).set_formatter(&JsonFormatter);
    let value: serde_json::Value = serde_json::from_str(&err.render()).unwrap();

    assert_eq!(value["cause"], "disk full");
    assert!(value["stack"].as_array().is_some_and(|s| !s.is_empty()));
}

#[derive(Debug)]
struct Failing;

impl Formatter for Failing {
    fn format(&self, _err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("partial output")?;
        Err(fmt::Error)
    }
}

static FAILING: Failing = Failing;

#[test]
fn test_failing_formatter_falls_back() {
    let err = Error::new("bad config").drop_stack();
    let expected = err.render();

    let err = err.set_formatter(&FAILING);
    assert_eq!(err.render(), expected);
    assert!(!err.render().contains("partial output"));
}

#[test]
fn test_failing_default_falls_back_to_text() {
    let err = Error::new("bad config").drop_stack().set_formatter(&FAILING);

    let text = crate::error::render_or_fallback(&err, &FAILING, false);
    assert_eq!(text.as_deref(), Some("errtrail::Error: bad config"));
}

// ============================================================================
// Stack capture
// ============================================================================

#[inline(never)]
fn recurse(depth: usize, config: &Config) -> Error {
    if depth == 0 {
        Error::new_with(config, "bottom")
    } else {
        let err = recurse(depth - 1, config);
        std::hint::black_box(err)
    }
}

fn recurse_frames(err: &Error) -> usize {
    err.stack()
        .iter()
        .filter(|f| f.function().is_some_and(|name| name.contains("recurse")))
        .count()
}

#[test]
fn test_deep_recursion_is_captured() {
    let err = recurse(12, &Config::new());
    assert!(err.stack().len() >= 12, "only {} frames", err.stack().len());
    assert!(recurse_frames(&err) >= 12);
}

#[test]
fn test_small_initial_depth_grows() {
    static PROBE_TWO: Config = Config::builder()
        .stack_limits(StackLimits::new().with_initial_depth(2))
        .build();

    let err = recurse(12, &PROBE_TWO);
    assert!(recurse_frames(&err) >= 12);
}

#[test]
fn test_max_depth_caps_stack() {
    static CAPPED: Config = Config::builder()
        .stack_limits(StackLimits::new().with_initial_depth(2).with_max_depth(5))
        .build();

    let err = recurse(20, &CAPPED);
    assert!(!err.stack().is_empty());
    assert!(err.stack().len() <= 5);
}

#[test]
fn test_stack_starts_at_caller() {
    #[inline(never)]
    fn origin() -> Error {
        Error::new("here")
    }

    let err = origin();
    let frames = err.stack().frames();
    assert!(frames.iter().any(|f| f.function().is_some_and(|n| n.contains("origin"))));
    let first = frames[0].function().unwrap_or_default();
    assert!(!first.contains("capture_frames"), "{}", first);
    assert!(!first.contains("Error::new"), "{}", first);
}

#[test]
fn test_limits_validation() {
    use crate::ConfigError;

    assert_eq!(StackLimits::new().validate(), Ok(()));
    assert_eq!(
        StackLimits::new().with_initial_depth(0).validate(),
        Err(ConfigError::ZeroInitialDepth)
    );
    assert_eq!(
        StackLimits::new()
            .with_initial_depth(50)
            .with_max_depth(10)
            .validate(),
        Err(ConfigError::InitialExceedsMax {
            initial: 50,
            max: 10
        })
    );
}

// ============================================================================
// Chain inspection
// ============================================================================

#[test]
fn test_find_and_is_in() {
    let wrapped = Wrapper(Error::new("deep"));
    assert!(Error::is_in(&wrapped));
    assert_eq!(Error::find(&wrapped).and_then(Error::message), Some("deep"));

    assert!(!Error::is_in(&disk_full()));
}

#[test]
fn test_frame_file_name() {
    assert_eq!(Frame::new("src/a/b.rs", 1).file_name(), "b.rs");
    assert_eq!(Frame::new(r"C:\src\b.rs", 1).file_name(), "b.rs");
    assert_eq!(Frame::new("b.rs", 1).file_name(), "b.rs");
}
