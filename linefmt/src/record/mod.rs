mod __test__;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::error::Error;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::thread_name;

/// Process-wide counter backing [`LogRecord`] sequence numbers.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Defines the severity or importance level of a log record.
///
/// The levels are ordered from the most detailed to the most severe:
/// `Trace < Debug < Info < Warn < Error`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum LogLevel {
  /// Very detailed information, mostly useful for debugging
  Trace,
  /// Debug-level information, used for development or troubleshooting
  Debug,
  /// General informational messages, typically useful in production
  #[default]
  Info,
  /// Warning messages that indicate potential issues
  Warn,
  /// Error messages that indicate a failure or critical problem
  Error,
}

impl LogLevel {
  /// Returns the display name of the level as it appears in formatted output.
  pub fn display_name(&self) -> &'static str {
    match self {
      LogLevel::Trace => "TRACE",
      LogLevel::Debug => "DEBUG",
      LogLevel::Info => "INFO",
      LogLevel::Warn => "WARN",
      LogLevel::Error => "ERROR",
    }
  }
}

impl FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "trace" => Ok(LogLevel::Trace),
      "debug" => Ok(LogLevel::Debug),
      "info" => Ok(LogLevel::Info),
      "warn" => Ok(LogLevel::Warn),
      "error" => Ok(LogLevel::Error),
      _ => Err(format!("invalid log level: {}", s)),
    }
  }
}

impl std::fmt::Display for LogLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.display_name())
  }
}

/// A captured error associated with a log record.
///
/// `Thrown` is the renderable form of an error: the error kind, an optional
/// message, backtrace frames, and an optional cause chain. The formatter never
/// holds the live error value, so records stay `Clone` and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thrown {
  /// Short name of the error type (e.g. `"ParseIntError"`).
  pub kind: String,
  /// The error's message, if it carries one.
  pub message: Option<String>,
  /// Backtrace frames, one entry per frame, outermost first.
  ///
  /// Empty when the error source provides no frame information; hosts that
  /// capture backtraces attach them with [`Thrown::with_frames`].
  pub frames: Vec<String>,
  /// The underlying cause, if any.
  pub cause: Option<Box<Thrown>>,
}

impl Thrown {
  /// Creates a new `Thrown` with the given kind and optional message.
  pub fn new(kind: impl Into<String>, message: Option<String>) -> Self {
    Self {
      kind: kind.into(),
      message,
      frames: Vec::new(),
      cause: None,
    }
  }

  /// Captures an error and its source chain.
  ///
  /// The outermost entry takes its kind from the concrete error type; sources
  /// are only available as trait objects, so cause entries carry their display
  /// text alone.
  ///
  /// # Example
  ///
  /// ```rust
  /// use linefmt::record::Thrown;
  /// let err = "nope".parse::<i32>().unwrap_err();
  /// let thrown = Thrown::from_error(&err);
  /// assert_eq!(thrown.kind, "ParseIntError");
  /// ```
  pub fn from_error<E: Error>(err: &E) -> Self {
    let mut root = Thrown::new(short_type_name::<E>(), Some(err.to_string()));
    root.cause = err.source().map(|src| Box::new(capture_cause(src)));
    root
  }

  /// Attaches backtrace frames, replacing any existing ones.
  pub fn with_frames(mut self, frames: Vec<String>) -> Self {
    self.frames = frames;
    self
  }

  /// Attaches a cause.
  pub fn with_cause(mut self, cause: Thrown) -> Self {
    self.cause = Some(Box::new(cause));
    self
  }

  /// Renders the full textual form: `kind: message`, one indented `at` line
  /// per frame, then the cause chain prefixed with `Caused by:`.
  pub fn render(&self) -> String {
    let mut out = String::with_capacity(64 + self.frames.len() * 32);
    self.render_into(&mut out);
    out
  }

  fn render_into(&self, out: &mut String) {
    match (self.kind.is_empty(), &self.message) {
      (true, Some(message)) => out.push_str(message),
      (true, None) => {},
      (false, Some(message)) => {
        out.push_str(&self.kind);
        out.push_str(": ");
        out.push_str(message);
      },
      (false, None) => out.push_str(&self.kind),
    }
    for frame in &self.frames {
      out.push_str("\n    at ");
      out.push_str(frame);
    }
    if let Some(cause) = &self.cause {
      out.push_str("\nCaused by: ");
      cause.render_into(out);
    }
  }
}

/// Captures a source-chain entry; only the display text is available through
/// the trait object.
fn capture_cause(err: &dyn Error) -> Thrown {
  let mut thrown = Thrown::new("", Some(err.to_string()));
  thrown.cause = err.source().map(|src| Box::new(capture_cause(src)));
  thrown
}

/// Strips the module path from a type name, keeping the final segment.
fn short_type_name<T: ?Sized>() -> &'static str {
  let name = std::any::type_name::<T>();
  name.rsplit("::").next().unwrap_or(name)
}

/// A single log event as supplied by the host logging framework.
///
/// Records are created once per logging call and read once per format call;
/// the formatter retains nothing beyond the duration of one format operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
  /// Event time in milliseconds since the Unix epoch.
  pub millis: u64,
  /// Monotonically increasing sequence number, assigned at construction.
  pub sequence: u64,
  /// Name of the logger that produced the record.
  pub logger: String,
  /// Module that issued the logging call, if known.
  pub source_module: Option<String>,
  /// Method or function that issued the logging call, if known.
  pub source_method: Option<String>,
  /// Severity of the record.
  pub level: LogLevel,
  /// Raw message; may contain `{0}`-style parameter placeholders.
  pub message: String,
  /// Parameters substituted into the message placeholders.
  pub parameters: SmallVec<[String; 4]>,
  /// Error associated with the record, if any.
  pub thrown: Option<Thrown>,
  /// Numeric identifier of the thread that created the record.
  pub thread_id: u64,
}

impl LogRecord {
  /// Creates a new record for the calling thread.
  ///
  /// The timestamp is taken from the system clock, the sequence number from a
  /// process-wide counter, and the thread ID from the thread registry
  /// (registering the calling thread on first use).
  pub fn new(level: LogLevel, logger: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      millis: now_millis(),
      sequence: SEQUENCE.fetch_add(1, Ordering::Relaxed),
      logger: logger.into(),
      source_module: None,
      source_method: None,
      level,
      message: message.into(),
      parameters: SmallVec::new(),
      thrown: None,
      thread_id: thread_name::current_thread_id(),
    }
  }

  /// Sets the source location (module and method).
  pub fn with_source(mut self, module: impl Into<String>, method: impl Into<String>) -> Self {
    self.source_module = Some(module.into());
    self.source_method = Some(method.into());
    self
  }

  /// Sets the source module only.
  pub fn with_source_module(mut self, module: impl Into<String>) -> Self {
    self.source_module = Some(module.into());
    self
  }

  /// Appends a message parameter.
  pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
    self.parameters.push(parameter.into());
    self
  }

  /// Attaches a captured error.
  pub fn with_thrown(mut self, thrown: Thrown) -> Self {
    self.thrown = Some(thrown);
    self
  }

  /// Overrides the event time.
  pub fn with_millis(mut self, millis: u64) -> Self {
    self.millis = millis;
    self
  }

  /// Overrides the sequence number.
  pub fn with_sequence(mut self, sequence: u64) -> Self {
    self.sequence = sequence;
    self
  }

  /// Overrides the thread ID.
  pub fn with_thread_id(mut self, thread_id: u64) -> Self {
    self.thread_id = thread_id;
    self
  }

  /// Applies the host framework's message-formatting convention.
  ///
  /// When parameters are present, `{N}` placeholders are replaced by the N-th
  /// parameter. Placeholders without a matching parameter, and messages
  /// without placeholders, pass through verbatim.
  ///
  /// # Example
  ///
  /// ```rust
  /// use linefmt::record::{LogLevel, LogRecord};
  /// let record = LogRecord::new(LogLevel::Info, "app", "user {0} logged in")
  ///   .with_parameter("alice");
  /// assert_eq!(record.formatted_message(), "user alice logged in");
  /// ```
  pub fn formatted_message(&self) -> String {
    if self.parameters.is_empty() || !self.message.contains('{') {
      return self.message.clone();
    }

    let mut out = String::with_capacity(self.message.len() + 16);
    let mut rest = self.message.as_str();
    while let Some(pos) = rest.find('{') {
      out.push_str(&rest[..pos]);
      let tail = &rest[pos..];
      if let Some(substituted) = self.substitute_placeholder(tail, &mut out) {
        rest = substituted;
        continue;
      }
      out.push('{');
      rest = &tail[1..];
    }
    out.push_str(rest);
    out
  }

  /// Substitutes one `{N}` placeholder at the start of `tail`, returning the
  /// remainder on success.
  fn substitute_placeholder<'a>(&self, tail: &'a str, out: &mut String) -> Option<&'a str> {
    let end = tail.find('}')?;
    let inner = &tail[1..end];
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
      return None;
    }
    let index = inner.parse::<usize>().ok()?;
    let parameter = self.parameters.get(index)?;
    out.push_str(parameter);
    Some(&tail[end + 1..])
  }
}

impl Default for LogRecord {
  fn default() -> Self {
    Self {
      millis: 0,
      sequence: 0,
      logger: String::new(),
      source_module: None,
      source_method: None,
      level: LogLevel::default(),
      message: String::new(),
      parameters: SmallVec::new(),
      thrown: None,
      thread_id: 0,
    }
  }
}

fn now_millis() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}
