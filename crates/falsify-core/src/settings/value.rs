//! Dynamically typed setting values.
//!
//! Settings are declared at runtime by name, so their values cannot be plain
//! Rust fields.  [`SettingValue`] is the small closed set of shapes a setting
//! may take: integers, floats, booleans, text, or nothing at all.
//!
//! # Rendering
//!
//! The [`Display`](std::fmt::Display) form is the one used inside a snapshot
//! representation such as `Settings(max_examples=5, database_file="a.db")`:
//! text is quoted, floats always carry a decimal point and the absent value
//! renders as `None`.
//!
//! Floats use Rust's shortest round-trip form: `60.0`, `0.25`, `1e20`,
//! `1e-7`.  Non-finite floats render as `NaN`, `inf` and `-inf`.  Every
//! finite float renders as text that [`FromStr`](std::str::FromStr) reads
//! back to the same value.  Non-finite ones do not: the parser only accepts
//! finite numbers.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A single resolved setting value.
///
/// Equality is structural: `Int(0)` and `Float(0.0)` are different values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// No value.  Used by settings such as `database_file` that may be unset.
    Absent,
}

impl SettingValue {
    /// Returns `false` for the absent value, `false`, zero, and empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            SettingValue::Bool(b) => *b,
            SettingValue::Int(i) => *i != 0,
            SettingValue::Float(f) => *f != 0.0,
            SettingValue::Text(s) => !s.is_empty(),
            SettingValue::Absent => false,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SettingValue::Absent)
    }

    /// Short name of the value's shape, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Int(_) => "integer",
            SettingValue::Float(_) => "float",
            SettingValue::Text(_) => "text",
            SettingValue::Absent => "none",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view: integers are widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(i) => Some(*i as f64),
            SettingValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Int(i) => write!(f, "{i}"),
            SettingValue::Float(x) => write!(f, "{x:?}"),
            SettingValue::Text(s) => write!(f, "{s:?}"),
            SettingValue::Absent => f.write_str("None"),
        }
    }
}

/// Parses a command-line literal.
///
/// `None`/`null` give [`SettingValue::Absent`], `true`/`false` give booleans,
/// anything that parses as an integer or finite float becomes numeric,
/// quoted text has its quotes removed, and everything else is taken as bare
/// text.  `inf`, `nan` and `infinity` are therefore text, not floats.
impl FromStr for SettingValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = match trimmed {
            "None" | "none" | "null" => SettingValue::Absent,
            "true" | "True" => SettingValue::Bool(true),
            "false" | "False" => SettingValue::Bool(false),
            _ => {
                if let Ok(i) = trimmed.parse::<i64>() {
                    SettingValue::Int(i)
                } else if let Some(x) = trimmed.parse::<f64>().ok().filter(|x| x.is_finite()) {
                    SettingValue::Float(x)
                } else {
                    SettingValue::Text(unquote(trimmed).to_string())
                }
            }
        };
        Ok(value)
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Int(i64::from(value))
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Int(i64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl<T: Into<SettingValue>> From<Option<T>> for SettingValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SettingValue::Absent, Into::into)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
