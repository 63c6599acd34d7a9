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

use std::borrow::Cow;
use std::cell::RefCell;

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics};

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

pub(crate) trait WithValidate {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

pub(crate) trait WithNormalize {
    /// Mark the attributes computed by the API as unknown
    fn normalize(&mut self, diags: &mut Diagnostics);
}

pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub(crate) fn sensitive(attribute: Attribute) -> Attribute {
    Attribute {
        sensitive: true,
        ..attribute
    }
}

pub(crate) fn list_of(attr_type: AttributeType) -> AttributeType {
    AttributeType::List(Box::new(attr_type))
}

/// Non-empty string of a value
///
/// Empty strings are considered unset, like absent optional attributes.
pub(crate) fn get_str<'v>(value: &'v ValueString<'_>) -> Option<&'v str> {
    match value {
        Value::Value(s) if !s.is_empty() => Some(s.as_ref()),
        _ => None,
    }
}

pub(crate) fn get_string(value: &ValueString<'_>) -> Option<String> {
    get_str(value).map(str::to_owned)
}

/// Optional string of a request body
///
/// A full update sends null values as empty strings so the API clears them.
pub(crate) fn optional_string(value: &ValueString<'_>, complete: bool) -> Option<String> {
    match value {
        Value::Unknown => None,
        _ if complete => Some(get_string(value).unwrap_or_default()),
        _ => get_string(value),
    }
}

pub(crate) fn get_bool(value: &ValueBool) -> Option<bool> {
    match value {
        Value::Value(b) => Some(*b),
        _ => None,
    }
}

pub(crate) fn get_number(value: &ValueNumber) -> Option<i64> {
    match value {
        Value::Value(n) => Some(*n),
        _ => None,
    }
}

pub(crate) fn get_strings(value: &ValueList<ValueString<'_>>) -> Vec<String> {
    match value {
        Value::Value(list) => list.iter().filter_map(get_string).collect(),
        _ => Vec::new(),
    }
}

/// Known elements of a list
pub(crate) fn known_items<'v, T>(value: &'v ValueList<Value<T>>) -> impl Iterator<Item = &'v T> {
    let items: &'v [Value<T>] = match value {
        Value::Value(list) => list.as_slice(),
        _ => &[],
    };
    items.iter().filter_map(|item| match item {
        Value::Value(item) => Some(item),
        _ => None,
    })
}

pub(crate) fn string_value<'a>(value: Option<String>) -> ValueString<'a> {
    value.map_or(Value::Null, |s| Value::Value(Cow::Owned(s)))
}

pub(crate) fn strings_value<'a>(values: Vec<String>) -> ValueList<ValueString<'a>> {
    Value::Value(
        values
            .into_iter()
            .map(|s| Value::Value(Cow::Owned(s)))
            .collect(),
    )
}

pub(crate) fn bool_value(value: Option<bool>) -> ValueBool {
    value.map_or(Value::Null, Value::Value)
}

pub(crate) fn number_value(value: Option<i64>) -> ValueNumber {
    value.map_or(Value::Null, Value::Value)
}

/// Update `target` from an API answer
///
/// A missing answer keeps the current value, unless it is unknown.
pub(crate) fn merge<T>(target: &mut Value<T>, value: Option<Value<T>>) {
    match value {
        Some(value) => *target = value,
        None if target.is_unknown() => *target = Value::Null,
        None => (),
    }
}

/// Empty strings returned by the API are stored as null
pub(crate) fn merge_string<'a>(target: &mut ValueString<'a>, value: Option<String>) {
    merge(
        target,
        value.map(|s| {
            if s.is_empty() {
                Value::Null
            } else {
                Value::Value(Cow::Owned(s))
            }
        }),
    );
}

pub(crate) fn merge_bool(target: &mut ValueBool, value: Option<bool>) {
    merge(target, value.map(Value::Value));
}

pub(crate) fn mark_unknown<T>(value: &mut Value<T>) {
    *value = Value::Unknown;
}

/// Report a failed API call as a diagnostic
pub(crate) fn report_error(diags: &mut Diagnostics, summary: &str, err: &anyhow::Error) {
    tracing::error!("{summary}: {err:#}");
    diags.root_error(summary.to_owned(), format!("{err:#}"));
}

pub(crate) trait OrDiagnostic<T> {
    fn or_diagnostic(self, diags: &mut Diagnostics, summary: &str) -> Option<T>;
}

impl<T> OrDiagnostic<T> for anyhow::Result<T> {
    fn or_diagnostic(self, diags: &mut Diagnostics, summary: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                report_error(diags, summary, &err);
                None
            }
        }
    }
}

/// Paths of the attributes that differ between two states
pub(crate) fn changed<'p, T: PartialEq + ?Sized>(
    attributes: &[(&'p str, &T, &T)],
) -> Vec<AttributePath> {
    attributes
        .iter()
        .filter(|(_, prior, proposed)| prior != proposed)
        .map(|(name, _, _)| AttributePath::new(name.to_string()))
        .collect()
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_unset() {
        assert_eq!(get_str(&Value::Value(Cow::Borrowed(""))), None);
        assert_eq!(get_str(&Value::Value(Cow::Borrowed("dev"))), Some("dev"));
        assert_eq!(get_str(&Value::Null), None);
        assert_eq!(get_str(&Value::Unknown), None);
    }

    #[test]
    fn full_updates_clear_null_strings() {
        let null: ValueString = Value::Null;
        assert_eq!(optional_string(&null, false), None);
        assert_eq!(optional_string(&null, true), Some(String::new()));
        assert_eq!(optional_string(&Value::Unknown, true), None);
        assert_eq!(
            optional_string(&Value::Value(Cow::Borrowed("dev")), true),
            Some("dev".to_owned())
        );
    }

    #[test]
    fn merge_keeps_known_values() {
        let mut known: ValueString = Value::Value(Cow::Borrowed("kept"));
        merge_string(&mut known, None);
        assert_eq!(known, Value::Value(Cow::Borrowed("kept")));

        let mut unknown: ValueString = Value::Unknown;
        merge_string(&mut unknown, None);
        assert!(unknown.is_null());

        merge_string(&mut unknown, Some("new".to_owned()));
        assert_eq!(unknown, Value::Value(Cow::Borrowed("new")));

        merge_string(&mut unknown, Some(String::new()));
        assert!(unknown.is_null());
    }

    #[test]
    fn changed_lists_differing_attributes() {
        let a: ValueString = Value::Value(Cow::Borrowed("a"));
        let b: ValueString = Value::Value(Cow::Borrowed("b"));
        let paths = changed(&[("guid", &a, &a), ("environment_id", &a, &b)]);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn join() {
        assert_eq!(
            ["BOOLEAN", "STRING", "NUMERIC"]
                .iter()
                .join_with(", ")
                .to_string(),
            "BOOLEAN, STRING, NUMERIC"
        );
    }
}
