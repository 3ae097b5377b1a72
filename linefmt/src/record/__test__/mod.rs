#[cfg(test)]
mod __test__ {

  use std::str::FromStr;

  use crate::record::{LogLevel, LogRecord, Thrown};

  #[test]
  fn test_level_display_name() {
    assert_eq!(LogLevel::Trace.display_name(), "TRACE");
    assert_eq!(LogLevel::Debug.display_name(), "DEBUG");
    assert_eq!(LogLevel::Info.display_name(), "INFO");
    assert_eq!(LogLevel::Warn.display_name(), "WARN");
    assert_eq!(LogLevel::Error.display_name(), "ERROR");
  }

  #[test]
  fn test_level_from_str() {
    assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
    assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
    assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
    assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
    assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
    assert!(LogLevel::from_str("fatal").is_err());
  }

  #[test]
  fn test_level_ordering() {
    assert!(LogLevel::Error > LogLevel::Warn);
    assert!(LogLevel::Warn > LogLevel::Info);
    assert!(LogLevel::Info > LogLevel::Debug);
    assert!(LogLevel::Debug > LogLevel::Trace);
  }

  #[test]
  fn test_record_new() {
    let record = LogRecord::new(LogLevel::Info, "app", "hello");

    assert_eq!(record.level, LogLevel::Info);
    assert_eq!(record.logger, "app");
    assert_eq!(record.message, "hello");
    assert!(record.source_module.is_none());
    assert!(record.source_method.is_none());
    assert!(record.parameters.is_empty());
    assert!(record.thrown.is_none());
    assert!(record.millis > 0);
    assert!(record.thread_id > 0);
  }

  #[test]
  fn test_record_sequence_is_monotonic() {
    let first = LogRecord::new(LogLevel::Info, "app", "one");
    let second = LogRecord::new(LogLevel::Info, "app", "two");

    assert!(second.sequence > first.sequence);
  }

  #[test]
  fn test_record_builder() {
    let record = LogRecord::new(LogLevel::Warn, "app", "msg")
      .with_source("app::db", "connect")
      .with_millis(42)
      .with_sequence(7)
      .with_thread_id(3);

    assert_eq!(record.source_module.as_deref(), Some("app::db"));
    assert_eq!(record.source_method.as_deref(), Some("connect"));
    assert_eq!(record.millis, 42);
    assert_eq!(record.sequence, 7);
    assert_eq!(record.thread_id, 3);
  }

  #[test]
  fn test_formatted_message_plain() {
    let record = LogRecord::new(LogLevel::Info, "app", "no placeholders here");
    assert_eq!(record.formatted_message(), "no placeholders here");
  }

  #[test]
  fn test_formatted_message_substitutes_parameters() {
    let record = LogRecord::new(LogLevel::Info, "app", "user {0} logged in from {1}")
      .with_parameter("alice")
      .with_parameter("10.0.0.7");

    assert_eq!(
      record.formatted_message(),
      "user alice logged in from 10.0.0.7"
    );
  }

  #[test]
  fn test_formatted_message_without_parameters_keeps_placeholders() {
    let record = LogRecord::new(LogLevel::Info, "app", "user {0} logged in");
    assert_eq!(record.formatted_message(), "user {0} logged in");
  }

  #[test]
  fn test_formatted_message_out_of_range_placeholder_is_literal() {
    let record = LogRecord::new(LogLevel::Info, "app", "{0} and {5}").with_parameter("first");
    assert_eq!(record.formatted_message(), "first and {5}");
  }

  #[test]
  fn test_formatted_message_non_numeric_braces_are_literal() {
    let record = LogRecord::new(LogLevel::Info, "app", "set {key} to {0}").with_parameter("1");
    assert_eq!(record.formatted_message(), "set {key} to 1");
  }

  #[test]
  fn test_formatted_message_unterminated_brace() {
    let record = LogRecord::new(LogLevel::Info, "app", "dangling {0").with_parameter("x");
    assert_eq!(record.formatted_message(), "dangling {0");
  }

  #[test]
  fn test_thrown_render_kind_and_message() {
    let thrown = Thrown::new("IoError", Some("connection reset".to_string()));
    assert_eq!(thrown.render(), "IoError: connection reset");
  }

  #[test]
  fn test_thrown_render_without_message() {
    let thrown = Thrown::new("Timeout", None);
    assert_eq!(thrown.render(), "Timeout");
  }

  #[test]
  fn test_thrown_render_frames() {
    let thrown = Thrown::new("IoError", Some("boom".to_string())).with_frames(vec![
      "app::db::connect (db.rs:40)".to_string(),
      "app::main (main.rs:12)".to_string(),
    ]);

    assert_eq!(
      thrown.render(),
      "IoError: boom\n    at app::db::connect (db.rs:40)\n    at app::main (main.rs:12)"
    );
  }

  #[test]
  fn test_thrown_render_cause_chain() {
    let cause = Thrown::new("", Some("disk full".to_string()));
    let thrown = Thrown::new("WriteError", Some("flush failed".to_string())).with_cause(cause);

    assert_eq!(
      thrown.render(),
      "WriteError: flush failed\nCaused by: disk full"
    );
  }

  #[test]
  fn test_thrown_from_error() {
    let err = "nope".parse::<i32>().unwrap_err();
    let thrown = Thrown::from_error(&err);

    assert_eq!(thrown.kind, "ParseIntError");
    assert_eq!(thrown.message.as_deref(), Some("invalid digit found in string"));
    assert!(thrown.frames.is_empty());
    assert!(thrown.cause.is_none());
  }

  #[test]
  fn test_thrown_from_error_captures_source_chain() {
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(std::num::ParseIntError);

    impl fmt::Display for Outer {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bad config value")
      }
    }

    impl Error for Outer {
      fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
      }
    }

    let outer = Outer("x".parse::<i32>().unwrap_err());
    let thrown = Thrown::from_error(&outer);

    assert_eq!(thrown.kind, "Outer");
    let cause = thrown.cause.as_ref().expect("cause captured");
    assert_eq!(cause.message.as_deref(), Some("invalid digit found in string"));
    assert!(
      thrown.render().contains("Caused by: invalid digit found in string"),
      "render: {}",
      thrown.render()
    );
  }

  #[test]
  fn test_record_serialize_round_trip() {
    let record = LogRecord::new(LogLevel::Error, "app", "boom {0}")
      .with_parameter("now")
      .with_source("app::main", "run")
      .with_thrown(Thrown::new("Oops", Some("bad".to_string())));

    let json = serde_json::to_string(&record).unwrap();
    let decoded: LogRecord = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.level, LogLevel::Error);
    assert_eq!(decoded.logger, "app");
    assert_eq!(decoded.message, "boom {0}");
    assert_eq!(decoded.parameters.as_slice(), ["now"]);
    assert_eq!(decoded.source_module.as_deref(), Some("app::main"));
    assert_eq!(decoded.thrown, record.thrown);
    assert_eq!(decoded.sequence, record.sequence);
  }
}
