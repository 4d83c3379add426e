//! Override configuration for query generation
//!
//! Overrides substitute concrete values for named elements, bound how many
//! times lists and repeats are unrolled, and supply values for regex
//! terminals depending on the elements expanded before them. They are
//! usually loaded from a TOML file:
//!
//! ```toml
//! default_list_count = 2
//! unresolved = "warn"
//!
//! [replace]
//! r_comment = ""
//!
//! [list_count]
//! series_match = 2
//!
//! [terminal_values.r_integer]
//! k_limit = 10
//! k_before = 60
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing override files
#[derive(Error, Debug)]
pub enum OverridesError {
    #[error("Failed to read overrides file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse overrides TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A configured concrete value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideValue::Integer(n) => write!(f, "{}", n),
            // Debug keeps the fractional part, so 10.0 stays "10.0"
            OverrideValue::Float(x) => write!(f, "{:?}", x),
            OverrideValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for OverrideValue {
    fn from(s: &str) -> Self {
        OverrideValue::Text(s.to_string())
    }
}

impl From<String> for OverrideValue {
    fn from(s: String) -> Self {
        OverrideValue::Text(s)
    }
}

impl From<i64> for OverrideValue {
    fn from(n: i64) -> Self {
        OverrideValue::Integer(n)
    }
}

impl From<i32> for OverrideValue {
    fn from(n: i32) -> Self {
        OverrideValue::Integer(n.into())
    }
}

impl From<f64> for OverrideValue {
    fn from(x: f64) -> Self {
        OverrideValue::Float(x)
    }
}

/// What to do when a regex terminal has no configured value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Prune the branch silently
    #[default]
    Skip,
    /// Prune the branch and log a warning
    Warn,
    /// Stop generation with an error
    Error,
}

/// Override configuration, read-only during generation
#[derive(Debug, Clone, PartialEq)]
pub struct Overrides {
    /// Element name -> fixed literal, empty omits the element
    pub replace: HashMap<String, OverrideValue>,
    /// List name -> occurrence count
    pub list_count: HashMap<String, usize>,
    pub default_list_count: usize,
    /// Repeat name -> occurrence count
    pub repeat_count: HashMap<String, usize>,
    pub default_repeat_count: usize,
    /// Terminal name -> ancestor name -> value
    pub terminal_values: HashMap<String, HashMap<String, OverrideValue>>,
    /// Re-entries of an element inside itself allowed on one branch
    /// before it is pruned; plain nesting is never limited
    pub max_depth: usize,
    pub unresolved: UnresolvedPolicy,
}

/// TOML structure for deserializing override files
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlOverrides {
    #[serde(default)]
    replace: HashMap<String, OverrideValue>,
    #[serde(default)]
    list_count: HashMap<String, usize>,
    default_list_count: Option<usize>,
    #[serde(default)]
    repeat_count: HashMap<String, usize>,
    default_repeat_count: Option<usize>,
    #[serde(default)]
    terminal_values: HashMap<String, HashMap<String, OverrideValue>>,
    max_depth: Option<usize>,
    #[serde(default)]
    unresolved: UnresolvedPolicy,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            replace: HashMap::new(),
            list_count: HashMap::new(),
            default_list_count: 2,
            repeat_count: HashMap::new(),
            default_repeat_count: 1,
            terminal_values: HashMap::new(),
            max_depth: 32,
            unresolved: UnresolvedPolicy::Skip,
        }
    }
}

impl Overrides {
    /// Create an empty configuration with default counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from TOML file
    pub fn from_file(path: &Path) -> Result<Self, OverridesError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load overrides from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, OverridesError> {
        let parsed: TomlOverrides = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(Overrides {
            replace: parsed.replace,
            list_count: parsed.list_count,
            default_list_count: parsed
                .default_list_count
                .unwrap_or(defaults.default_list_count),
            repeat_count: parsed.repeat_count,
            default_repeat_count: parsed
                .default_repeat_count
                .unwrap_or(defaults.default_repeat_count),
            terminal_values: parsed.terminal_values,
            max_depth: parsed.max_depth.unwrap_or(defaults.max_depth),
            unresolved: parsed.unresolved,
        })
    }

    /// Replace the named element with a fixed literal
    pub fn with_replacement(mut self, name: impl Into<String>, value: impl Into<OverrideValue>) -> Self {
        self.replace.insert(name.into(), value.into());
        self
    }

    /// Set the occurrence count for a named list
    pub fn with_list_count(mut self, name: impl Into<String>, count: usize) -> Self {
        self.list_count.insert(name.into(), count);
        self
    }

    /// Set the count used for lists without their own entry
    pub fn with_default_list_count(mut self, count: usize) -> Self {
        self.default_list_count = count;
        self
    }

    /// Set the occurrence count for a named repeat
    pub fn with_repeat_count(mut self, name: impl Into<String>, count: usize) -> Self {
        self.repeat_count.insert(name.into(), count);
        self
    }

    /// Set the count used for repeats without their own entry
    pub fn with_default_repeat_count(mut self, count: usize) -> Self {
        self.default_repeat_count = count;
        self
    }

    /// Set the value of `terminal` when `ancestor` is its nearest configured ancestor
    pub fn with_terminal_value(
        mut self,
        terminal: impl Into<String>,
        ancestor: impl Into<String>,
        value: impl Into<OverrideValue>,
    ) -> Self {
        self.set_terminal_value(terminal, ancestor, value);
        self
    }

    /// In-place form of [`with_terminal_value`](Self::with_terminal_value),
    /// for refreshing values between generation runs
    pub fn set_terminal_value(
        &mut self,
        terminal: impl Into<String>,
        ancestor: impl Into<String>,
        value: impl Into<OverrideValue>,
    ) {
        self.terminal_values
            .entry(terminal.into())
            .or_default()
            .insert(ancestor.into(), value.into());
    }

    /// Set the recursion depth limit
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the policy for terminals without a configured value
    pub fn with_unresolved(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    /// Fixed literal configured for the named element
    pub fn replacement(&self, name: &str) -> Option<&OverrideValue> {
        self.replace.get(name)
    }

    /// Resolve a regex terminal's value
    ///
    /// `ancestors` must yield names from the most recently expanded to the
    /// oldest; the first one configured under `terminal` wins.
    pub fn resolve_terminal<'a, I>(&self, terminal: &str, ancestors: I) -> Option<&OverrideValue>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values = self.terminal_values.get(terminal)?;
        ancestors.into_iter().find_map(|name| values.get(name))
    }
}
