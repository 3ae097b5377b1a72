//! # Positional Template Engine
//!
//! Parses and renders the `%<index>$<conversion>` template language used to
//! lay out one formatted log line. A template addresses eight positional
//! slots, in order:
//!
//! | Slot | Value                |
//! |------|----------------------|
//! | `1$` | timestamp            |
//! | `2$` | source               |
//! | `3$` | logger name          |
//! | `4$` | level display name   |
//! | `5$` | message              |
//! | `6$` | thrown text          |
//! | `7$` | thread display       |
//! | `8$` | sequence number      |
//!
//! Conversions are `s` (string form, any slot), `d` (decimal, sequence slot
//! only) and `t<X>` (date/time, timestamp slot only) where `<X>` is one of
//! the supported date conversion characters. `%%` emits a literal percent
//! and `%n` a line separator. An optional `-` flag and minimum width may
//! precede the conversion, e.g. `%4$-7s`.
//!
//! Validation is structural: [`Template::parse`] rejects out-of-range slot
//! indices, unknown conversions and conversions applied to the wrong slot,
//! so [`Template::render`] can never fail.


use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Number of positional slots a template may address.
pub const SLOT_COUNT: usize = 8;

/// Date format equivalent to the `c` date conversion; also used when the
/// timestamp slot is rendered with a plain `s` conversion.
const FULL_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

/// Reasons a template fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("template ends in the middle of a '%' directive")]
  TruncatedDirective,
  #[error("expected '$' after the argument index in a '%' directive")]
  MissingIndexTerminator,
  #[error("argument index {0} is out of range (1..=8)")]
  IndexOutOfRange(usize),
  #[error("unknown conversion '{0}'")]
  UnknownConversion(char),
  #[error("unknown date conversion '{0}'")]
  UnknownDateConversion(char),
  #[error("conversion '{conversion}' cannot be applied to argument {index}")]
  SlotMismatch { index: usize, conversion: char },
}

/// The values substituted into a template, one per slot.
#[derive(Debug, Clone, Copy)]
pub struct TemplateArgs<'a> {
  pub timestamp: DateTime<Local>,
  pub source: &'a str,
  pub logger: &'a str,
  pub level: &'a str,
  pub message: &'a str,
  pub thrown: &'a str,
  pub thread: &'a str,
  pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
  Literal(String),
  Newline,
  Arg(Arg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Arg {
  /// Zero-based slot index.
  slot: usize,
  left_justify: bool,
  width: Option<usize>,
  conversion: Conversion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
  Str,
  Decimal,
  Date(DateConversion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateConversion {
  Strftime(&'static str),
  EpochSeconds,
  EpochMillis,
}

/// A parsed, validated format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  text: String,
  pieces: Vec<Piece>,
}

impl Template {
  /// Parses and validates a template string.
  ///
  /// Any directive the renderer could not honor is rejected here, which makes
  /// rendering infallible.
  ///
  /// # Example
  ///
  /// ```rust
  /// use linefmt::template::Template;
  /// let template = Template::parse("%4$s: %5$s%n").unwrap();
  /// assert!(Template::parse("%9$s").is_err());
  /// let _ = template;
  /// ```
  pub fn parse(input: &str) -> Result<Self, TemplateError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
      if c != '%' {
        literal.push(c);
        continue;
      }
      let next = *chars.peek().ok_or(TemplateError::TruncatedDirective)?;
      match next {
        '%' => {
          chars.next();
          literal.push('%');
        },
        'n' => {
          chars.next();
          flush_literal(&mut literal, &mut pieces);
          pieces.push(Piece::Newline);
        },
        '0'..='9' => {
          flush_literal(&mut literal, &mut pieces);
          pieces.push(Piece::Arg(parse_arg(&mut chars)?));
        },
        other => return Err(TemplateError::UnknownConversion(other)),
      }
    }
    flush_literal(&mut literal, &mut pieces);

    Ok(Self {
      text: input.to_string(),
      pieces,
    })
  }

  /// Returns the original template text.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Renders the template with the given argument values.
  pub fn render(&self, args: &TemplateArgs) -> String {
    let capacity = self.text.len()
      + args.source.len()
      + args.logger.len()
      + args.message.len()
      + args.thrown.len()
      + 48;
    let mut out = String::with_capacity(capacity);
    for piece in &self.pieces {
      match piece {
        Piece::Literal(text) => out.push_str(text),
        Piece::Newline => out.push('\n'),
        Piece::Arg(arg) => render_arg(arg, args, &mut out),
      }
    }
    out
  }
}

impl fmt::Display for Template {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.text)
  }
}

fn flush_literal(literal: &mut String, pieces: &mut Vec<Piece>) {
  if !literal.is_empty() {
    pieces.push(Piece::Literal(std::mem::take(literal)));
  }
}

/// Parses one `<index>$[-][width]<conversion>` directive body. The leading
/// `%` has been consumed and the first index digit is still pending.
fn parse_arg(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Arg, TemplateError> {
  let index = parse_number(chars).ok_or(TemplateError::TruncatedDirective)?;
  match chars.next() {
    Some('$') => {},
    Some(_) => return Err(TemplateError::MissingIndexTerminator),
    None => return Err(TemplateError::TruncatedDirective),
  }
  if !(1..=SLOT_COUNT).contains(&index) {
    return Err(TemplateError::IndexOutOfRange(index));
  }

  let left_justify = if chars.peek() == Some(&'-') {
    chars.next();
    true
  } else {
    false
  };
  let width = match chars.peek() {
    Some('0'..='9') => parse_number(chars),
    _ => None,
  };

  let conversion = match chars.next().ok_or(TemplateError::TruncatedDirective)? {
    's' => Conversion::Str,
    'd' => {
      if index != SLOT_COUNT {
        return Err(TemplateError::SlotMismatch {
          index,
          conversion: 'd',
        });
      }
      Conversion::Decimal
    },
    't' => {
      if index != 1 {
        return Err(TemplateError::SlotMismatch {
          index,
          conversion: 't',
        });
      }
      let date_char = chars.next().ok_or(TemplateError::TruncatedDirective)?;
      Conversion::Date(parse_date_conversion(date_char)?)
    },
    other => return Err(TemplateError::UnknownConversion(other)),
  };

  Ok(Arg {
    slot: index - 1,
    left_justify,
    width,
    conversion,
  })
}

/// Reads a run of ASCII digits, saturating well past any sensible value so
/// out-of-range indices still report their magnitude.
fn parse_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
  let mut value: Option<usize> = None;
  while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
    chars.next();
    let current = value.unwrap_or(0);
    value = Some(current.saturating_mul(10).saturating_add(digit as usize));
  }
  value
}

/// Maps a date conversion character onto its chrono rendering.
fn parse_date_conversion(c: char) -> Result<DateConversion, TemplateError> {
  let format = match c {
    'c' => FULL_DATE_FORMAT,
    'F' => "%Y-%m-%d",
    'D' => "%m/%d/%y",
    'T' => "%H:%M:%S",
    'R' => "%H:%M",
    'r' => "%I:%M:%S %p",
    'a' => "%a",
    'A' => "%A",
    'b' | 'h' => "%b",
    'B' => "%B",
    'd' => "%d",
    'e' => "%e",
    'm' => "%m",
    'y' => "%y",
    'Y' => "%Y",
    'H' => "%H",
    'I' => "%I",
    'k' => "%-H",
    'l' => "%-I",
    'M' => "%M",
    'S' => "%S",
    'L' => "%3f",
    'N' => "%9f",
    'p' => "%P",
    'z' => "%z",
    'Z' => "%Z",
    's' => return Ok(DateConversion::EpochSeconds),
    'Q' => return Ok(DateConversion::EpochMillis),
    other => return Err(TemplateError::UnknownDateConversion(other)),
  };
  Ok(DateConversion::Strftime(format))
}

fn render_arg(arg: &Arg, args: &TemplateArgs, out: &mut String) {
  let value: Cow<str> = match arg.conversion {
    Conversion::Str => match arg.slot {
      0 => Cow::Owned(args.timestamp.format(FULL_DATE_FORMAT).to_string()),
      1 => Cow::Borrowed(args.source),
      2 => Cow::Borrowed(args.logger),
      3 => Cow::Borrowed(args.level),
      4 => Cow::Borrowed(args.message),
      5 => Cow::Borrowed(args.thrown),
      6 => Cow::Borrowed(args.thread),
      _ => Cow::Owned(args.sequence.to_string()),
    },
    Conversion::Decimal => Cow::Owned(args.sequence.to_string()),
    Conversion::Date(date) => match date {
      DateConversion::Strftime(format) => Cow::Owned(args.timestamp.format(format).to_string()),
      DateConversion::EpochSeconds => Cow::Owned(args.timestamp.timestamp().to_string()),
      DateConversion::EpochMillis => Cow::Owned(args.timestamp.timestamp_millis().to_string()),
    },
  };

  match arg.width {
    None => out.push_str(&value),
    Some(width) => {
      let len = value.chars().count();
      let padding = width.saturating_sub(len);
      if arg.left_justify {
        out.push_str(&value);
        for _ in 0..padding {
          out.push(' ');
        }
      } else {
        for _ in 0..padding {
          out.push(' ');
        }
        out.push_str(&value);
      }
    },
  }
}
