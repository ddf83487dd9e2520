//! Values pushed into slots.

use moon_dom::NodeId;
use serde_json::Value;

/// A value assigned to a slot.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotValue {
    /// Markup rendered as HTML.
    Markup(String),
    /// A number; timestamps are milliseconds since the Unix epoch.
    Number(f64),
    /// Ready-made nodes of the view's document.
    Nodes(Vec<NodeId>),
}

impl SlotValue {
    /// Whether this is empty markup, which restores the slot's initial content.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Markup(markup) if markup.is_empty())
    }

    /// Whether this is a structured value (a node set).
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Nodes(_))
    }
}

/// Format a number the way it reads in markup (`5`, not `5.0`).
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let int = n as i64;
        int.to_string()
    } else {
        n.to_string()
    }
}

impl From<&str> for SlotValue {
    fn from(value: &str) -> Self {
        Self::Markup(value.to_owned())
    }
}

impl From<String> for SlotValue {
    fn from(value: String) -> Self {
        Self::Markup(value)
    }
}

impl From<f64> for SlotValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for SlotValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<Vec<NodeId>> for SlotValue {
    fn from(value: Vec<NodeId>) -> Self {
        Self::Nodes(value)
    }
}

impl From<&Value> for SlotValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Markup(s.clone()),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Markup(n.to_string()), Self::Number),
            Value::Bool(b) => Self::Markup(b.to_string()),
            Value::Null => Self::Markup(String::new()),
            Value::Array(_) | Value::Object(_) => Self::Markup(value.to_string()),
        }
    }
}

impl From<Value> for SlotValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Markup(s),
            other => Self::from(&other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_only_for_empty_markup() {
        assert!(SlotValue::from("").is_empty());
        assert!(!SlotValue::from(" ").is_empty());
        assert!(!SlotValue::Number(0.0).is_empty());
        assert!(!SlotValue::Nodes(Vec::new()).is_empty());
    }

    #[test]
    fn test_from_json() {
        assert_eq!(SlotValue::from(json!("hi")), SlotValue::Markup("hi".to_owned()));
        assert_eq!(SlotValue::from(json!(1_700_000_000_000_i64)), SlotValue::Number(1.7e12));
        assert_eq!(SlotValue::from(json!(true)), SlotValue::Markup("true".to_owned()));
        assert_eq!(SlotValue::from(json!(null)), SlotValue::Markup(String::new()));
        assert_eq!(
            SlotValue::from(json!({"a": 1})),
            SlotValue::Markup(r#"{"a":1}"#.to_owned())
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(1.5), "1.5");
    }
}
