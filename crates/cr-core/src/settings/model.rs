use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A confirmed or candidate setting value. Always a JSON scalar on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SettingValue {
    pub fn as_json(&self) -> Value {
        match self {
            SettingValue::Bool(b) => Value::from(*b),
            SettingValue::Number(n) => Value::from(*n),
            SettingValue::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Interpret a raw JSON scalar. Non-scalar values are rejected.
    pub fn from_json(value: &Value) -> Option<SettingValue> {
        match value {
            Value::Bool(b) => Some(SettingValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(SettingValue::Number),
            Value::String(s) => Some(SettingValue::Text(s.clone())),
            _ => None,
        }
    }
}

/// Logical group a setting belongs to; commits are scoped to one category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SettingCategory {
    Recording,
    Audio,
    Storage,
    Shortcuts,
    Interface,
}

/// Shape of a setting's editor widget. Each kind owns its validation; the
/// panel dispatches on this instead of sniffing value shapes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Boolean,
    Text,
    Number,
    Select,
}

impl SettingKind {
    /// Validate a raw text edit into a candidate value.
    ///
    /// Numeric kinds parse the input; a failed parse yields `None` and the
    /// caller keeps the previously effective value (the observed original
    /// behavior: garbage is dropped silently, never stored).
    pub fn coerce_text(&self, raw: &str) -> Option<SettingValue> {
        match self {
            SettingKind::Number => raw.trim().parse::<f64>().ok().map(SettingValue::Number),
            SettingKind::Boolean => match raw.trim() {
                "true" => Some(SettingValue::Bool(true)),
                "false" => Some(SettingValue::Bool(false)),
                _ => None,
            },
            SettingKind::Text | SettingKind::Select => {
                Some(SettingValue::Text(raw.to_string()))
            }
        }
    }

    /// Whether an already-typed value fits this kind.
    pub fn accepts(&self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (SettingKind::Boolean, SettingValue::Bool(_))
                | (SettingKind::Number, SettingValue::Number(_))
                | (SettingKind::Text, SettingValue::Text(_))
                | (SettingKind::Select, SettingValue::Text(_))
        )
    }
}

/// Static description of one setting: where it lives in the panel, how it is
/// edited, and what its default and last-confirmed values are.
///
/// Descriptors are loaded once when the settings view mounts; `confirmed`
/// changes only after a successful category-scoped commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingDescriptor {
    pub key: String,
    pub category: SettingCategory,
    pub kind: SettingKind,
    pub default: SettingValue,
    pub confirmed: SettingValue,
    /// Bounded option set for `Select` kinds. May be populated at runtime
    /// (the microphone picker fills in enumerated devices).
    pub options: Option<Vec<String>>,
    pub tooltip: Option<String>,
}

impl SettingDescriptor {
    pub fn new(
        key: &str,
        category: SettingCategory,
        kind: SettingKind,
        default: SettingValue,
    ) -> Self {
        Self {
            key: key.to_string(),
            category,
            kind,
            confirmed: default.clone(),
            default,
            options: None,
            tooltip: None,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_value_serializes_as_scalar() {
        assert_eq!(
            serde_json::to_value(SettingValue::Number(60.0)).unwrap(),
            serde_json::json!(60.0)
        );
        assert_eq!(
            serde_json::to_value(SettingValue::Bool(true)).unwrap(),
            serde_json::json!(true)
        );
        assert_eq!(
            serde_json::to_value(SettingValue::Text("h264".into())).unwrap(),
            serde_json::json!("h264")
        );
    }

    #[test]
    fn number_kind_rejects_garbage() {
        assert_eq!(SettingKind::Number.coerce_text("abc"), None);
        assert_eq!(SettingKind::Number.coerce_text(""), None);
        assert_eq!(
            SettingKind::Number.coerce_text(" 120 "),
            Some(SettingValue::Number(120.0))
        );
    }

    #[test]
    fn kind_accepts_matching_shapes_only() {
        assert!(SettingKind::Boolean.accepts(&SettingValue::Bool(false)));
        assert!(!SettingKind::Boolean.accepts(&SettingValue::Number(1.0)));
        assert!(SettingKind::Select.accepts(&SettingValue::Text("opus".into())));
        assert!(!SettingKind::Number.accepts(&SettingValue::Text("60".into())));
    }
}
