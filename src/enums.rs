//! Enumerated values of scalar-backed enum types.
//!
//! A package exposes its constants as [`ConstGroup`]s: the variants of one `enum`, or the
//! typed `const` items of one module. [`enum_values`] walks those groups and picks out the
//! constants declared with the requested type.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal enum value, emitted as-is into the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnumValue::Int(value) => write!(f, "{}", value),
            EnumValue::Float(value) => write!(f, "{}", value),
            EnumValue::Str(value) => write!(f, "{:?}", value),
        }
    }
}

/// Value expression of one constant entry
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// Explicit literal; used verbatim
    Literal(EnumValue),
    /// Explicit integer start; the implicit counter restarts from here.
    /// `Restart(0)` is the plain reset sentinel.
    Restart(i64),
    /// Expression that cannot be evaluated statically
    Unsupported(String),
}

/// One constant declaration entry
#[derive(Debug, Clone, PartialEq)]
pub struct ConstEntry {
    pub names: Vec<String>,
    /// Declared type; `None` inherits the previous entry's type within the group
    pub type_name: Option<String>,
    /// Empty when the value is implicit
    pub values: Vec<ConstValue>,
}

impl ConstEntry {
    pub fn new(name: impl Into<String>, type_name: Option<&str>, values: Vec<ConstValue>) -> Self {
        Self {
            names: vec![name.into()],
            type_name: type_name.map(str::to_string),
            values,
        }
    }
}

/// A block of constants sharing one implicit counter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstGroup {
    pub entries: Vec<ConstEntry>,
}

impl ConstGroup {
    pub fn new(entries: Vec<ConstEntry>) -> Self {
        Self { entries }
    }
}

/// Collect the values of every constant declared with type `type_name`.
///
/// Entries with several names or several values are skipped with a warning.
pub fn enum_values(groups: &[ConstGroup], type_name: &str) -> Vec<EnumValue> {
    let mut values = Vec::new();

    for group in groups {
        let mut current_type: Option<&str> = None;
        // `None` once the counter has run past `i64::MAX`
        let mut next: Option<i64> = Some(0);

        for entry in &group.entries {
            if let Some(declared) = entry.type_name.as_deref() {
                current_type = Some(declared);
            }
            if current_type != Some(type_name) {
                continue;
            }

            if entry.names.len() != 1 {
                warn!(
                    "A possible constant of {} declares {} names; skipping it",
                    type_name,
                    entry.names.len()
                );
                continue;
            }

            match entry.values.as_slice() {
                [] => match next {
                    Some(value) => {
                        values.push(EnumValue::Int(value));
                        next = advance(value, type_name);
                    }
                    None => warn!(
                        "Constant {} of {} has no value left after the counter overflowed; skipping it",
                        entry.names[0], type_name
                    ),
                },
                [ConstValue::Restart(start)] => {
                    values.push(EnumValue::Int(*start));
                    next = advance(*start, type_name);
                }
                [ConstValue::Literal(value)] => {
                    values.push(value.clone());
                    next = next.and_then(|value| advance(value, type_name));
                }
                [ConstValue::Unsupported(reason)] => {
                    warn!(
                        "Constant {} of {} is not a literal ({}); skipping it",
                        entry.names[0], type_name, reason
                    );
                }
                _ => {
                    warn!(
                        "A possible constant of {} declares {} values; skipping it",
                        type_name,
                        entry.values.len()
                    );
                }
            }
        }
    }

    debug!("Found {} enum values for {}", values.len(), type_name);
    values
}

/// The implicit value after `value`, if it fits in an `i64`
fn advance(value: i64, type_name: &str) -> Option<i64> {
    let next = value.checked_add(1);
    if next.is_none() {
        warn!(
            "Implicit values of {} overflow after {}; later implicit constants are skipped",
            type_name, value
        );
    }
    next
}
