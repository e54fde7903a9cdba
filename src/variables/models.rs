use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A resolved placeholder value: either text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Number(f64),
    Text(String),
}

impl VariableValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// Flat placeholder-keyed bag consumed by generation and rendering.
///
/// Backed by a `BTreeMap` so iteration (and anything serialised from it) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Variables(BTreeMap<String, VariableValue>);

impl Variables {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<VariableValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&VariableValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String form of a value, or `fallback` when the key is absent.
    pub fn text_or(&self, key: &str, fallback: &str) -> String {
        self.0
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariableValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<String>,
    V: Into<VariableValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display_drops_trailing_zero() {
        assert_eq!(VariableValue::Number(42.0).to_string(), "42");
        assert_eq!(VariableValue::Number(10.5).to_string(), "10.5");
        assert_eq!(VariableValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_untagged_deserialization() {
        let vars: Variables =
            serde_json::from_str(r#"{"client_name": "Maria Silva", "weekly_amount": 650}"#)
                .unwrap();
        assert_eq!(
            vars.get("client_name"),
            Some(&VariableValue::Text("Maria Silva".to_string()))
        );
        assert_eq!(vars.get("weekly_amount").and_then(|v| v.as_number()), Some(650.0));
    }

    #[test]
    fn test_text_or_fallback() {
        let vars: Variables = [("a", "1")].into_iter().collect();
        assert_eq!(vars.text_or("a", "-"), "1");
        assert_eq!(vars.text_or("b", "-"), "-");
    }
}
