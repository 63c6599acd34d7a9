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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};

use crate::app_config::flatten::{
    collection_items_type, collections_block, expand_collections, expand_segment_rules,
    flatten_collection_items, flatten_collections, flatten_segment_rules, pagination_type,
    segment_rules_block, segment_rules_type, validate_typed_values, CollectionItems, Collections,
    PageAttributes, PaginationLinks, SegmentRules, WithPagination,
};
use crate::app_config::value::{from_json, render, ValueType};
use crate::app_config::{GUID_DESCRIPTION, INCLUDES_DESCRIPTION, LIMIT_DESCRIPTION, OFFSET_DESCRIPTION};
use crate::client::app_config::Property;
use crate::utils::{
    attribute, bool_value, get_str, get_string, list_of, mark_unknown, merge, merge_bool,
    merge_string, optional_string, string_value, WithNormalize, WithSchema, WithValidate,
};

const TYPE_DESCRIPTION: &str = "Type of the property (BOOLEAN, STRING, NUMERIC).";
const VALUE_DESCRIPTION: &str = "Value of the property. The value can be Boolean, String or a Numeric value as per the `type` attribute.";
const SEGMENT_RULE_VALUE_DESCRIPTION: &str = "Value to be used for evaluation for this rule. The value can be Boolean, String or a Numeric value as per the `type` attribute.";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub property_id: ValueString<'a>,
    pub name: ValueString<'a>,
    #[serde(rename = "type")]
    pub value_type: ValueString<'a>,
    pub value: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub segment_rules: SegmentRules<'a>,
    pub collections: Collections<'a>,
    pub segment_exists: ValueBool,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for PropertyState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the property, `{guid}/{environment_id}/{property_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "property_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Property id."),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Required, "Property name."),
                    "type" => attribute(AttributeType::String, AttributeConstraint::Required, TYPE_DESCRIPTION),
                    "value" => attribute(AttributeType::String, AttributeConstraint::Required, VALUE_DESCRIPTION),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Optional, "Property description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Tags associated with the property."),
                    "segment_exists" => attribute(AttributeType::Bool, AttributeConstraint::Computed, "Denotes if the targeting rules are specified for the property."),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the property."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the property data."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Property URL."),
                },
                blocks: map! {
                    "segment_rules" => segment_rules_block(SEGMENT_RULE_VALUE_DESCRIPTION),
                    "collections" => collections_block(),
                },
                description: Description::plain("App Configuration property"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for PropertyState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_typed_values(
            diags,
            &attr_path,
            &self.value_type,
            &[("value", &self.value)],
            &self.segment_rules,
        );
    }
}

impl<'a> WithNormalize for PropertyState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            mark_unknown(&mut self.id);
        }
        mark_unknown(&mut self.segment_exists);
        mark_unknown(&mut self.updated_time);
        for computed in [&mut self.created_time, &mut self.href] {
            if computed.is_null() {
                mark_unknown(computed);
            }
        }
    }
}

impl<'a> PropertyState<'a> {
    pub(super) fn value_type(&self) -> Option<ValueType> {
        get_str(&self.value_type)?.parse().ok()
    }

    /// Build the request body
    ///
    /// When `complete` is false, unset descriptions, tags, targeting rules and
    /// collections are omitted.
    pub(super) fn to_property(&self, diags: &mut Diagnostics, complete: bool) -> Option<Property> {
        let value_type = self.value_type()?;

        let value = match value_type.to_json(get_str(&self.value).unwrap_or_default()) {
            Ok(value) => value,
            Err(err) => {
                diags.error("Invalid `value`", err.to_string(), AttributePath::new("value"));
                return None;
            }
        };
        let segment_rules = expand_segment_rules(
            diags,
            AttributePath::new("segment_rules"),
            Some(value_type),
            &self.segment_rules,
        )?;
        let collections = expand_collections(&self.collections);

        Some(Property {
            name: get_string(&self.name),
            property_id: get_string(&self.property_id),
            description: optional_string(&self.description, complete),
            value_type: Some(value_type.to_string()),
            value: Some(value),
            tags: optional_string(&self.tags, complete),
            segment_rules: (complete || !segment_rules.is_empty()).then_some(segment_rules),
            collections: (complete || !collections.is_empty()).then_some(collections),
            ..Default::default()
        })
    }

    pub(super) fn apply(&mut self, property: Property) {
        merge_string(&mut self.property_id, property.property_id);
        merge_string(&mut self.name, property.name);
        merge_string(&mut self.value_type, property.value_type);
        let value_type = self.value_type();

        let value = property
            .value
            .map(|value| Value::Value(Cow::Owned(render(&value, value_type, get_str(&self.value)))));
        merge(&mut self.value, value);
        merge_string(&mut self.description, property.description);
        merge_string(&mut self.tags, property.tags);

        let segment_rules = property
            .segment_rules
            .map(|rules| flatten_segment_rules(rules, value_type, &self.segment_rules));
        merge(&mut self.segment_rules, segment_rules);
        merge(
            &mut self.collections,
            property.collections.map(flatten_collections),
        );

        merge_bool(&mut self.segment_exists, property.segment_exists);
        merge_string(&mut self.created_time, property.created_time);
        merge_string(&mut self.updated_time, property.updated_time);
        merge_string(&mut self.href, property.href);
    }

    /// Check if the attributes sent on update differ
    pub(super) fn differs(&self, other: &Self) -> bool {
        self.name != other.name
            || self.value != other.value
            || self.description != other.description
            || self.tags != other.tags
            || self.segment_rules != other.segment_rules
            || self.collections != other.collections
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyItemState<'a> {
    pub name: ValueString<'a>,
    pub property_id: ValueString<'a>,
    pub description: ValueString<'a>,
    #[serde(rename = "type")]
    pub value_type: ValueString<'a>,
    pub value: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub segment_rules: SegmentRules<'a>,
    pub segment_exists: ValueBool,
    pub collections: CollectionItems<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub evaluation_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> From<Property> for PropertyItemState<'a> {
    fn from(property: Property) -> Self {
        let value_type = property
            .value_type
            .as_deref()
            .and_then(|value_type| value_type.parse().ok());
        Self {
            name: string_value(property.name),
            property_id: string_value(property.property_id),
            description: string_value(property.description),
            value_type: string_value(property.value_type),
            value: string_value(property.value.as_ref().map(from_json)),
            tags: string_value(property.tags),
            segment_rules: flatten_segment_rules(
                property.segment_rules.unwrap_or_default(),
                value_type,
                &Value::Null,
            ),
            segment_exists: bool_value(property.segment_exists),
            collections: flatten_collection_items(property.collections),
            created_time: string_value(property.created_time),
            updated_time: string_value(property.updated_time),
            evaluation_time: string_value(property.evaluation_time),
            href: string_value(property.href),
        }
    }
}

fn property_item_fields() -> std::collections::HashMap<String, AttributeType> {
    map! {
        "name" => AttributeType::String,
        "property_id" => AttributeType::String,
        "description" => AttributeType::String,
        "type" => AttributeType::String,
        "value" => AttributeType::String,
        "tags" => AttributeType::String,
        "segment_rules" => segment_rules_type(),
        "segment_exists" => AttributeType::Bool,
        "collections" => collection_items_type(),
        "created_time" => AttributeType::String,
        "updated_time" => AttributeType::String,
        "evaluation_time" => AttributeType::String,
        "href" => AttributeType::String,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub property_id: ValueString<'a>,
    pub includes: ValueList<ValueString<'a>>,
    pub name: ValueString<'a>,
    #[serde(rename = "type")]
    pub value_type: ValueString<'a>,
    pub value: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub segment_rules: SegmentRules<'a>,
    pub segment_exists: ValueBool,
    pub collections: CollectionItems<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub evaluation_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for PropertyDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the property, `{guid}/{environment_id}/{property_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "property_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Property id."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, INCLUDES_DESCRIPTION),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Computed, "Property name."),
                    "type" => attribute(AttributeType::String, AttributeConstraint::Computed, TYPE_DESCRIPTION),
                    "value" => attribute(AttributeType::String, AttributeConstraint::Computed, VALUE_DESCRIPTION),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Computed, "Property description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Computed, "Tags associated with the property."),
                    "segment_rules" => attribute(segment_rules_type(), AttributeConstraint::Computed, "Targeting rules that are used to set different property values for different segments."),
                    "segment_exists" => attribute(AttributeType::Bool, AttributeConstraint::Computed, "Denotes if the targeting rules are specified for the property."),
                    "collections" => attribute(collection_items_type(), AttributeConstraint::Computed, "List of collection id representing the collections that are associated with the specified property."),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the property."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the property data."),
                    "evaluation_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "The last occurrence of the property value evaluation."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Property URL."),
                },
                description: Description::plain("Read an App Configuration property"),
                ..Default::default()
            },
        }
    }
}

impl<'a> PropertyDataSourceState<'a> {
    pub(super) fn apply(&mut self, property: Property) {
        let item = PropertyItemState::from(property);
        self.name = item.name;
        self.value_type = item.value_type;
        self.value = item.value;
        self.description = item.description;
        self.tags = item.tags;
        self.segment_rules = item.segment_rules;
        self.segment_exists = item.segment_exists;
        self.collections = item.collections;
        self.created_time = item.created_time;
        self.updated_time = item.updated_time;
        self.evaluation_time = item.evaluation_time;
        self.href = item.href;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub sort: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub collections: ValueList<ValueString<'a>>,
    pub segments: ValueList<ValueString<'a>>,
    pub expand: ValueBool,
    pub includes: ValueList<ValueString<'a>>,
    pub limit: ValueNumber,
    pub offset: ValueNumber,
    pub properties: ValueList<Value<PropertyItemState<'a>>>,
    pub total_count: ValueNumber,
    pub first: PaginationLinks<'a>,
    pub previous: PaginationLinks<'a>,
    pub next: PaginationLinks<'a>,
    pub last: PaginationLinks<'a>,
}

impl<'a> WithSchema for PropertiesDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the list, `{guid}/{environment_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "sort" => attribute(AttributeType::String, AttributeConstraint::Optional, "Sort the property details based on the specified attribute."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Filter the resources to be returned based on the associated tags. Specify the parameter as a list of comma separated tags. Returns resources associated with any of the specified tags."),
                    "collections" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, "Filter properties by a list of collections."),
                    "segments" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, "Filter properties by a list of segments."),
                    "expand" => attribute(AttributeType::Bool, AttributeConstraint::Optional, "If set to `true`, returns expanded view of the resource details."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, INCLUDES_DESCRIPTION),
                    "limit" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, LIMIT_DESCRIPTION),
                    "offset" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, OFFSET_DESCRIPTION),
                    "properties" => attribute(list_of(AttributeType::Object(property_item_fields())), AttributeConstraint::Computed, "Array of properties."),
                    "total_count" => attribute(AttributeType::Number, AttributeConstraint::Computed, "Number of records returned in the current response."),
                    "first" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the first page of records."),
                    "previous" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the previous list of records."),
                    "next" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the next list of records."),
                    "last" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the last page of records."),
                },
                description: Description::plain("List the properties of an App Configuration environment"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithPagination<'a> for PropertiesDataSourceState<'a> {
    fn page_attributes(&mut self) -> PageAttributes<'_, 'a> {
        PageAttributes {
            total_count: &mut self.total_count,
            limit: &mut self.limit,
            offset: &mut self.offset,
            first: &mut self.first,
            previous: &mut self.previous,
            next: &mut self.next,
            last: &mut self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::app_config::flatten::{CollectionState, SegmentRuleState, TargetSegmentsState};
    use crate::client::app_config::{CollectionRef, SegmentRule, TargetSegments};
    use crate::utils::known_items;

    use super::*;

    fn string(s: &str) -> ValueString<'_> {
        Value::Value(Cow::Borrowed(s))
    }

    fn property_state<'a>(value_type: &'a str, value: &'a str) -> PropertyState<'a> {
        PropertyState {
            guid: string("guid"),
            environment_id: string("dev"),
            property_id: string("timeout"),
            name: string("Timeout"),
            value_type: string(value_type),
            value: string(value),
            segment_rules: Value::Value(vec![]),
            collections: Value::Value(vec![Value::Value(CollectionState {
                collection_id: string("web"),
            })]),
            ..Default::default()
        }
    }

    #[test]
    fn validate_rejects_unknown_type() {
        let mut diags = Diagnostics::default();
        property_state("INTEGER", "1").validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn validate_checks_values_against_type() {
        let mut diags = Diagnostics::default();
        let mut state = property_state("BOOLEAN", "yes");
        state.segment_rules = Value::Value(vec![Value::Value(SegmentRuleState {
            rules: Value::Value(vec![]),
            value: string("maybe"),
            order: Value::Value(1),
        })]);
        state.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 2);

        let mut diags = Diagnostics::default();
        property_state("BOOLEAN", "true").validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn validate_skips_unknown_values() {
        let mut diags = Diagnostics::default();
        let mut state = property_state("NUMERIC", "");
        state.value = Value::Unknown;
        state.validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn create_body_omits_empty_rules() {
        let mut diags = Diagnostics::default();
        let property = property_state("NUMERIC", "30")
            .to_property(&mut diags, false)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({
                "name": "Timeout",
                "property_id": "timeout",
                "type": "NUMERIC",
                "value": 30,
                "collections": [{"collection_id": "web"}],
            })
        );

        let property = property_state("NUMERIC", "30")
            .to_property(&mut diags, true)
            .unwrap();
        assert_eq!(property.segment_rules, Some(vec![]));
    }

    #[test]
    fn update_body_clears_optional_fields() {
        let mut diags = Diagnostics::default();
        let mut state = property_state("STRING", "x");
        state.tags = string("web");
        let body = serde_json::to_value(state.to_property(&mut diags, true).unwrap()).unwrap();
        assert_eq!(body["description"], "");
        assert_eq!(body["tags"], "web");
        assert_eq!(body["segment_rules"], json!([]));
    }

    #[test]
    fn apply_flattens_response() {
        let mut state = property_state("STRING", "blue");
        state.normalize(&mut Diagnostics::default());
        state.apply(Property {
            name: Some("Timeout".to_owned()),
            property_id: Some("timeout".to_owned()),
            value_type: Some("STRING".to_owned()),
            value: Some(json!("blue")),
            segment_rules: Some(vec![SegmentRule {
                rules: vec![TargetSegments {
                    segments: vec!["beta".to_owned()],
                }],
                value: json!("green"),
                order: 1,
            }]),
            segment_exists: Some(true),
            collections: Some(vec![CollectionRef {
                collection_id: "web".to_owned(),
                name: Some("Web".to_owned()),
            }]),
            created_time: Some("2021-05-26T06:42:48Z".to_owned()),
            updated_time: Some("2021-05-26T06:42:48Z".to_owned()),
            href: Some("https://x/properties/timeout".to_owned()),
            ..Default::default()
        });

        assert_eq!(state.value, string("blue"));
        assert_eq!(state.segment_exists, Value::Value(true));
        assert_eq!(state.href, string("https://x/properties/timeout"));
        let rules: Vec<_> = known_items(&state.segment_rules).collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].value, string("green"));
        assert_eq!(
            rules[0].rules,
            Value::Value(vec![Value::Value(TargetSegmentsState {
                segments: Value::Value(vec![string("beta")]),
            })])
        );
    }

    #[test]
    fn numeric_values_read_back_as_text() {
        let item = PropertyItemState::from(Property {
            value_type: Some("NUMERIC".to_owned()),
            value: Some(json!(42)),
            ..Default::default()
        });
        assert_eq!(item.value, string("42"));
        assert_eq!(item.segment_rules, Value::Value(vec![]));
        assert_eq!(item.collections, Value::Value(vec![]));
    }

    #[test]
    fn update_detection_ignores_computed() {
        let prior = property_state("STRING", "blue");
        let mut proposed = prior.clone();
        proposed.href = string("https://x");
        assert!(!proposed.differs(&prior));
        proposed.tags = string("prod");
        assert!(proposed.differs(&prior));
    }
}
