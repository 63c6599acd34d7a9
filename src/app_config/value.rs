// This file is part of the terraform-provider-ibm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::{Number, Value as JsonValue};

use crate::utils::DisplayJoinable;

pub const VALUE_TYPES: [&str; 3] = ["BOOLEAN", "STRING", "NUMERIC"];

/// Type of the values of a property or a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Boolean,
    String,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("`{0}` is not a supported type, expected one of {types}", types = VALUE_TYPES.iter().join_with(", "))]
    UnknownType(String),
    #[error("`{0}` is not a boolean, expected `true` or `false`")]
    NotABoolean(String),
    #[error("`{0}` is not a number")]
    NotANumber(String),
}

impl FromStr for ValueType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOLEAN" => Ok(Self::Boolean),
            "STRING" => Ok(Self::String),
            "NUMERIC" => Ok(Self::Numeric),
            _ => Err(ValueError::UnknownType(s.to_owned())),
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::Numeric => "NUMERIC",
        })
    }
}

impl ValueType {
    /// Convert the textual value stored in state into the typed JSON value sent to the API
    pub fn to_json(self, value: &str) -> Result<JsonValue, ValueError> {
        match self {
            Self::String => Ok(JsonValue::String(value.to_owned())),
            Self::Boolean => match value {
                "true" => Ok(JsonValue::Bool(true)),
                "false" => Ok(JsonValue::Bool(false)),
                _ => Err(ValueError::NotABoolean(value.to_owned())),
            },
            Self::Numeric => {
                if let Ok(n) = value.parse::<i64>() {
                    return Ok(JsonValue::Number(n.into()));
                }
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(JsonValue::Number)
                    .ok_or_else(|| ValueError::NotANumber(value.to_owned()))
            }
        }
    }
}

/// Textual representation of a value returned by the API
pub fn from_json(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Text to store for `value`, preferring `current` when it means the same thing
///
/// This keeps `1.50` in state when the API answers `1.5`.
pub fn render(value: &JsonValue, value_type: Option<ValueType>, current: Option<&str>) -> String {
    if let (Some(value_type), Some(current)) = (value_type, current) {
        if let Ok(parsed) = value_type.to_json(current) {
            if same_value(&parsed, value) {
                return current.to_owned();
            }
        }
    }
    from_json(value)
}

fn same_value(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => match (a.as_u64(), b.as_u64()) {
                (Some(a), Some(b)) => a == b,
                _ => a.as_f64() == b.as_f64(),
            },
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_types() {
        assert_eq!("BOOLEAN".parse(), Ok(ValueType::Boolean));
        assert_eq!("NUMERIC".parse(), Ok(ValueType::Numeric));
        assert_eq!("STRING".parse(), Ok(ValueType::String));
        let err = "boolean".parse::<ValueType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "`boolean` is not a supported type, expected one of BOOLEAN, STRING, NUMERIC"
        );
    }

    #[test]
    fn coerce_values() {
        assert_eq!(ValueType::Boolean.to_json("true"), Ok(json!(true)));
        assert_eq!(ValueType::Boolean.to_json("false"), Ok(json!(false)));
        assert_eq!(
            ValueType::Boolean.to_json("yes"),
            Err(ValueError::NotABoolean("yes".to_owned()))
        );
        assert_eq!(ValueType::Numeric.to_json("42"), Ok(json!(42)));
        assert_eq!(ValueType::Numeric.to_json("-4.5"), Ok(json!(-4.5)));
        assert_eq!(
            ValueType::Numeric.to_json("ten"),
            Err(ValueError::NotANumber("ten".to_owned()))
        );
        assert_eq!(ValueType::String.to_json("ten"), Ok(json!("ten")));
    }

    #[test]
    fn values_read_back_as_text() {
        assert_eq!(from_json(&json!("blue")), "blue");
        assert_eq!(from_json(&json!(true)), "true");
        assert_eq!(from_json(&json!(30)), "30");
        assert_eq!(from_json(&json!(4.5)), "4.5");
        assert_eq!(from_json(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn render_prefers_equivalent_state() {
        assert_eq!(
            render(&json!(1.5), Some(ValueType::Numeric), Some("1.50")),
            "1.50"
        );
        assert_eq!(render(&json!(2), Some(ValueType::Numeric), Some("1.50")), "2");
        assert_eq!(render(&json!(true), Some(ValueType::Boolean), None), "true");
        assert_eq!(render(&json!("x"), None, Some("y")), "x");
    }

    #[test]
    fn render_compares_large_integers_exactly() {
        assert_eq!(
            render(
                &json!(9_007_199_254_740_993_i64),
                Some(ValueType::Numeric),
                Some("9007199254740992")
            ),
            "9007199254740993"
        );
        assert_eq!(
            render(&json!(2), Some(ValueType::Numeric), Some("2.0")),
            "2.0"
        );
    }
}
