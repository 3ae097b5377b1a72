//! # Line Formatter
//!
//! Turns one [`LogRecord`] into one human-readable string, typically one or
//! two lines, according to the resolved [`FormatConfig`]. The formatter is
//! a leaf component: it plugs into a host logging framework and owns no
//! transport, routing or destination handling.


use chrono::{DateTime, Local, Utc};

use crate::config::{FormatConfig, ThreadIdMode};
use crate::record::LogRecord;
use crate::template::TemplateArgs;
use crate::thread_name;

/// The host framework's formatter seam: one record in, one string out.
pub trait LogFormatter: Send + Sync {
  fn format(&self, record: &LogRecord) -> String;
}

/// Formats records against a configurable positional template.
///
/// A single instance may be shared and invoked concurrently: the
/// configuration is immutable, the timestamp value is built fresh per call,
/// and thread-name caching is per-calling-thread. `format` never fails for
/// a validly-constructed record; the worst outcome is the default template
/// or an unknown-thread placeholder.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
  config: FormatConfig,
}

impl LineFormatter {
  /// Creates a formatter with an explicit configuration snapshot.
  pub fn new(config: FormatConfig) -> Self {
    Self { config }
  }

  /// The configuration this formatter was built with.
  pub fn config(&self) -> &FormatConfig {
    &self.config
  }
}

impl LogFormatter for LineFormatter {
  /// Formats the given record.
  ///
  /// The template receives, in slot order: timestamp, source, logger name,
  /// level display name, formatted message, thrown text, thread display,
  /// sequence number.
  ///
  /// - `source` is the source module (plus a space and the source method
  ///   when present); records without a source location use the logger name.
  /// - The thrown text starts with a newline and a single leading space so
  ///   backtraces indent one column, making the logs easier to search.
  ///   Records without an error contribute an empty string.
  fn format(&self, record: &LogRecord) -> String {
    let source = match record.source_module.as_deref() {
      Some(module) => match record.source_method.as_deref() {
        Some(method) => format!("{} {}", module, method),
        None => module.to_owned(),
      },
      None => record.logger.clone(),
    };

    let message = record.formatted_message();

    let thrown = match &record.thrown {
      Some(thrown) => format!("\n {}", thrown.render()),
      None => String::new(),
    };

    let thread = match self.config.thread_id_mode() {
      ThreadIdMode::Name => thread_name::resolve_thread_name(record.thread_id),
      ThreadIdMode::Id => record.thread_id.to_string(),
    };

    let timestamp = DateTime::<Utc>::from_timestamp_millis(record.millis as i64)
      .unwrap_or_default()
      .with_timezone(&Local);

    self.config.template().render(&TemplateArgs {
      timestamp,
      source: &source,
      logger: &record.logger,
      level: record.level.display_name(),
      message: &message,
      thrown: &thrown,
      thread: &thread,
      sequence: record.sequence,
    })
  }
}
