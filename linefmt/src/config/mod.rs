
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::template::Template;

/// Property key carrying the format template.
pub const FORMAT_KEY: &str = "linefmt.format";

/// Property key carrying the thread identifier mode.
pub const THREAD_ID_FORMAT_KEY: &str = "linefmt.threadIDFormat";

/// Template used when no custom format is configured or the custom format
/// fails validation.
pub const DEFAULT_FORMAT: &str = "[%1$tc] [%8$d] [%7$s] %3$s %2$s %4$s: %5$s%6$s%n";

/// A framework-managed store of configuration properties.
///
/// The host logging framework owns configuration loading; this trait is the
/// seam through which the resolver reads it.
pub trait PropertySource {
  fn get(&self, key: &str) -> Option<String>;
}

impl PropertySource for HashMap<String, String> {
  fn get(&self, key: &str) -> Option<String> {
    HashMap::get(self, key).cloned()
  }
}

/// The empty property source.
impl PropertySource for () {
  fn get(&self, _key: &str) -> Option<String> {
    None
  }
}

/// Process environment as a property source; this is the process-wide
/// override that takes precedence over the framework-managed store.
struct EnvSource;

impl PropertySource for EnvSource {
  fn get(&self, key: &str) -> Option<String> {
    env::var(key).ok()
  }
}

/// How the thread slot of the template is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadIdMode {
  /// Resolve the thread ID to a thread name through the per-thread cache.
  #[default]
  Name,
  /// Print the decimal thread ID directly.
  Id,
}

impl ThreadIdMode {
  /// Maps a property value onto a mode. `"name"` selects [`ThreadIdMode::Name`];
  /// every other value selects [`ThreadIdMode::Id`].
  pub fn from_property(value: &str) -> Self {
    if value == "name" {
      ThreadIdMode::Name
    } else {
      ThreadIdMode::Id
    }
  }
}

/// Immutable snapshot of the formatter configuration.
///
/// Resolved once at formatter construction; there is no runtime
/// reconfiguration.
#[derive(Debug, Clone)]
pub struct FormatConfig {
  template: Template,
  thread_id_mode: ThreadIdMode,
}

impl FormatConfig {
  /// Builds a configuration from already-validated parts.
  pub fn new(template: Template, thread_id_mode: ThreadIdMode) -> Self {
    Self {
      template,
      thread_id_mode,
    }
  }

  /// Resolves the configuration from process-wide settings.
  ///
  /// Each key is looked up first in the process environment, then in the
  /// given property source; missing keys fall back to the defaults. A custom
  /// template that fails to parse is discarded silently in favor of
  /// [`DEFAULT_FORMAT`].
  pub fn resolve(properties: &dyn PropertySource) -> Self {
    Self::resolve_with(&EnvSource, properties)
  }

  pub(crate) fn resolve_with(
    overrides: &dyn PropertySource,
    properties: &dyn PropertySource,
  ) -> Self {
    let template = lookup(overrides, properties, FORMAT_KEY)
      .and_then(|custom| Template::parse(&custom).ok())
      .unwrap_or_else(default_template);
    let thread_id_mode = lookup(overrides, properties, THREAD_ID_FORMAT_KEY)
      .map(|value| ThreadIdMode::from_property(&value))
      .unwrap_or_default();
    Self {
      template,
      thread_id_mode,
    }
  }

  /// The resolved template.
  pub fn template(&self) -> &Template {
    &self.template
  }

  /// The resolved thread identifier mode.
  pub fn thread_id_mode(&self) -> ThreadIdMode {
    self.thread_id_mode
  }
}

impl Default for FormatConfig {
  fn default() -> Self {
    Self::resolve(&())
  }
}

/// The parsed form of [`DEFAULT_FORMAT`].
pub fn default_template() -> Template {
  Template::parse(DEFAULT_FORMAT).expect("default template is valid")
}

fn lookup(
  overrides: &dyn PropertySource,
  properties: &dyn PropertySource,
  key: &str,
) -> Option<String> {
  overrides.get(key).or_else(|| properties.get(key))
}
