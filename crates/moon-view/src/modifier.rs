//! Formatting modifiers applied to slot values before render.
//!
//! Built-in modifiers:
//!
//! | Name      | Effect                                              |
//! |-----------|-----------------------------------------------------|
//! | `time`    | timestamp → local `HH:MM`, zero-padded              |
//! | `date`    | timestamp → UTC `D/M`, month 1-based, no padding    |
//! | `ucwords` | uppercase the first letter of every space-separated word |
//!
//! Applications can register their own with [`ModifierRegistry::register`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ModifierError;
use crate::value::{SlotValue, format_number};

/// A named formatting function.
pub trait Modifier: Send + Sync {
    /// Transform a value before it is rendered.
    fn apply(&self, value: SlotValue) -> Result<SlotValue, ModifierError>;
}

impl<F> Modifier for F
where
    F: Fn(SlotValue) -> Result<SlotValue, ModifierError> + Send + Sync,
{
    fn apply(&self, value: SlotValue) -> Result<SlotValue, ModifierError> {
        self(value)
    }
}

/// Modifiers available to views, by name.
#[derive(Clone)]
pub struct ModifierRegistry {
    modifiers: HashMap<String, Arc<dyn Modifier>>,
}

impl ModifierRegistry {
    /// Registry with no modifiers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            modifiers: HashMap::new(),
        }
    }

    /// Registry with `time`, `date` and `ucwords`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("time", |value: SlotValue| {
            time(&value).map(SlotValue::Markup)
        });
        registry.register("date", |value: SlotValue| {
            date(&value).map(SlotValue::Markup)
        });
        registry.register("ucwords", |value: SlotValue| -> Result<SlotValue, ModifierError> {
            Ok(ucwords(value))
        });
        registry
    }

    /// Register a modifier, replacing any existing one with the same name.
    pub fn register(&mut self, name: impl Into<String>, modifier: impl Modifier + 'static) {
        self.modifiers.insert(name.into(), Arc::new(modifier));
    }

    /// Whether a modifier is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.modifiers.contains_key(name)
    }

    /// Apply the named modifier.
    pub fn apply(&self, name: &str, value: SlotValue) -> Result<SlotValue, ModifierError> {
        let modifier = self
            .modifiers
            .get(name)
            .ok_or_else(|| ModifierError::Unknown(name.to_owned()))?;
        modifier.apply(value)
    }
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.modifiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ModifierRegistry")
            .field("modifiers", &names)
            .finish()
    }
}

/// Format a timestamp as zero-padded local `HH:MM`.
pub fn time(value: &SlotValue) -> Result<String, ModifierError> {
    let ts = parse_timestamp(value)?;
    Ok(ts.with_timezone(&Local).format("%H:%M").to_string())
}

/// Format a timestamp as UTC `D/M`.
pub fn date(value: &SlotValue) -> Result<String, ModifierError> {
    let ts = parse_timestamp(value)?;
    Ok(format!("{}/{}", ts.day(), ts.month()))
}

/// Uppercase the first letter of every word; node sets pass through unchanged.
pub fn ucwords(value: SlotValue) -> SlotValue {
    match value {
        SlotValue::Markup(text) => SlotValue::Markup(capitalize_words(&text)),
        other => other,
    }
}

/// Uppercase the first character of each single-space-separated word.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read a slot value as a point in time.
///
/// Accepts numbers and integer strings (milliseconds since the epoch),
/// RFC 3339 strings, `YYYY-MM-DD` (UTC midnight) and
/// `YYYY-MM-DDTHH:MM[:SS]` (local time).
pub fn parse_timestamp(value: &SlotValue) -> Result<DateTime<Utc>, ModifierError> {
    match value {
        SlotValue::Number(ms) => from_millis(*ms)
            .ok_or_else(|| ModifierError::InvalidTimestamp(format_number(*ms))),
        SlotValue::Markup(text) => parse_timestamp_str(text.trim())
            .ok_or_else(|| ModifierError::InvalidTimestamp(text.clone())),
        SlotValue::Nodes(_) => Err(ModifierError::InvalidTimestamp("<nodes>".to_owned())),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.trunc() as i64)
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ms) = text.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn local_millis(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("hello world"), "Hello World");
        assert_eq!(capitalize_words("mIxed CASE"), "MIxed CASE");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_capitalize_words_keeps_double_spaces() {
        assert_eq!(capitalize_words("a  b"), "A  B");
    }

    #[test]
    fn test_capitalize_words_unicode() {
        assert_eq!(capitalize_words("élan ßtraße"), "Élan SStraße");
    }

    #[test]
    fn test_ucwords_leaves_nodes_untouched() {
        let nodes = SlotValue::Nodes(Vec::new());
        assert_eq!(ucwords(nodes.clone()), nodes);
        assert_eq!(ucwords(SlotValue::Number(3.0)), SlotValue::Number(3.0));
    }

    #[test]
    fn test_time_zero_padded_local() {
        let ms = local_millis(2024, 3, 3, 9, 5);
        #[allow(clippy::cast_precision_loss)]
        let value = SlotValue::Number(ms as f64);
        assert_eq!(time(&value).unwrap(), "09:05");
    }

    #[test]
    fn test_time_from_integer_string() {
        let ms = local_millis(2024, 12, 31, 23, 59);
        assert_eq!(time(&SlotValue::Markup(ms.to_string())).unwrap(), "23:59");
    }

    #[test]
    fn test_time_from_local_datetime_string() {
        let value = SlotValue::Markup("2024-03-03T07:30".to_owned());
        assert_eq!(time(&value).unwrap(), "07:30");
    }

    #[test]
    fn test_date_utc_unpadded() {
        let ms = Utc
            .with_ymd_and_hms(2024, 3, 3, 12, 0, 0)
            .unwrap()
            .timestamp_millis();
        #[allow(clippy::cast_precision_loss)]
        let value = SlotValue::Number(ms as f64);
        assert_eq!(date(&value).unwrap(), "3/3");
    }

    #[test]
    fn test_date_from_strings() {
        assert_eq!(
            date(&SlotValue::Markup("2024-11-25".to_owned())).unwrap(),
            "25/11"
        );
        assert_eq!(
            date(&SlotValue::Markup("2024-01-09T23:30:00-02:00".to_owned())).unwrap(),
            "10/1"
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = time(&SlotValue::Markup("yesterday".to_owned())).unwrap_err();
        assert!(matches!(err, ModifierError::InvalidTimestamp(ref s) if s == "yesterday"));

        assert!(date(&SlotValue::Number(f64::NAN)).is_err());
        assert!(date(&SlotValue::Nodes(Vec::new())).is_err());
    }

    #[test]
    fn test_registry_builtins() {
        let registry = ModifierRegistry::default();
        assert!(registry.contains("time"));
        assert!(registry.contains("date"));
        assert!(registry.contains("ucwords"));

        let out = registry
            .apply("ucwords", SlotValue::from("hello world"))
            .unwrap();
        assert_eq!(out, SlotValue::from("Hello World"));
    }

    #[test]
    fn test_registry_custom_and_unknown() {
        let mut registry = ModifierRegistry::empty();
        registry.register("shout", |value: SlotValue| match value {
            SlotValue::Markup(s) => Ok(SlotValue::Markup(s.to_uppercase())),
            _ => Err(ModifierError::Custom("text only".to_owned())),
        });

        assert_eq!(
            registry.apply("shout", SlotValue::from("hey")).unwrap(),
            SlotValue::from("HEY")
        );
        assert!(matches!(
            registry.apply("time", SlotValue::from("1")),
            Err(ModifierError::Unknown(_))
        ));
        assert_eq!(format!("{registry:?}"), r#"ModifierRegistry { modifiers: ["shout"] }"#);
    }
}
