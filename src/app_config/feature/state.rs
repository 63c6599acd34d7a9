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
use std::collections::HashMap;

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
use crate::client::app_config::Feature;
use crate::utils::{
    attribute, bool_value, get_str, get_string, list_of, mark_unknown, merge, merge_bool,
    merge_string, optional_string, string_value, WithNormalize, WithSchema, WithValidate,
};

const TYPE_DESCRIPTION: &str = "Type of the feature (BOOLEAN, STRING, NUMERIC).";
const ENABLED_VALUE_DESCRIPTION: &str = "Value of the feature when it is enabled. The value can be Boolean, String or a Numeric value as per the `type` attribute.";
const DISABLED_VALUE_DESCRIPTION: &str = "Value of the feature when it is disabled. The value can be Boolean, String or a Numeric value as per the `type` attribute.";
const SEGMENT_RULE_VALUE_DESCRIPTION: &str = "Value to be used for evaluation for this rule. The value can be Boolean, String or a Numeric value as per the `type` attribute.";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub feature_id: ValueString<'a>,
    pub name: ValueString<'a>,
    #[serde(rename = "type")]
    pub value_type: ValueString<'a>,
    pub enabled_value: ValueString<'a>,
    pub disabled_value: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub segment_rules: SegmentRules<'a>,
    pub collections: Collections<'a>,
    pub enabled: ValueBool,
    pub segment_exists: ValueBool,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for FeatureState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the feature flag, `{guid}/{environment_id}/{feature_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "feature_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Feature id."),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Required, "Feature name."),
                    "type" => attribute(AttributeType::String, AttributeConstraint::Required, TYPE_DESCRIPTION),
                    "enabled_value" => attribute(AttributeType::String, AttributeConstraint::Required, ENABLED_VALUE_DESCRIPTION),
                    "disabled_value" => attribute(AttributeType::String, AttributeConstraint::Required, DISABLED_VALUE_DESCRIPTION),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Optional, "Feature description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Tags associated with the feature."),
                    "enabled" => attribute(AttributeType::Bool, AttributeConstraint::Computed, "The state of the feature flag."),
                    "segment_exists" => attribute(AttributeType::Bool, AttributeConstraint::Computed, "Denotes if the targeting rules are specified for the feature flag."),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the feature flag."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the feature flag data."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Feature flag URL."),
                },
                blocks: map! {
                    "segment_rules" => segment_rules_block(SEGMENT_RULE_VALUE_DESCRIPTION),
                    "collections" => collections_block(),
                },
                description: Description::plain("App Configuration feature flag"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for FeatureState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_typed_values(
            diags,
            &attr_path,
            &self.value_type,
            &[
                ("enabled_value", &self.enabled_value),
                ("disabled_value", &self.disabled_value),
            ],
            &self.segment_rules,
        );
    }
}

impl<'a> WithNormalize for FeatureState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            mark_unknown(&mut self.id);
        }
        mark_unknown(&mut self.segment_exists);
        mark_unknown(&mut self.updated_time);
        if self.enabled.is_null() {
            mark_unknown(&mut self.enabled);
        }
        for computed in [&mut self.created_time, &mut self.href] {
            if computed.is_null() {
                mark_unknown(computed);
            }
        }
    }
}

fn coerce(
    diags: &mut Diagnostics,
    value_type: ValueType,
    name: &str,
    value: &ValueString<'_>,
) -> Option<serde_json::Value> {
    match value_type.to_json(get_str(value).unwrap_or_default()) {
        Ok(value) => Some(value),
        Err(err) => {
            diags.error(
                format!("Invalid `{name}`"),
                err.to_string(),
                AttributePath::new(name.to_owned()),
            );
            None
        }
    }
}

impl<'a> FeatureState<'a> {
    pub(super) fn value_type(&self) -> Option<ValueType> {
        get_str(&self.value_type)?.parse().ok()
    }

    /// Build the request body
    ///
    /// When `complete` is false, unset descriptions, tags, targeting rules and
    /// collections are omitted.
    pub(super) fn to_feature(&self, diags: &mut Diagnostics, complete: bool) -> Option<Feature> {
        let value_type = self.value_type()?;

        let enabled_value = coerce(diags, value_type, "enabled_value", &self.enabled_value);
        let disabled_value = coerce(diags, value_type, "disabled_value", &self.disabled_value);
        let segment_rules = expand_segment_rules(
            diags,
            AttributePath::new("segment_rules"),
            Some(value_type),
            &self.segment_rules,
        )?;
        let collections = expand_collections(&self.collections);

        Some(Feature {
            name: get_string(&self.name),
            feature_id: get_string(&self.feature_id),
            description: optional_string(&self.description, complete),
            value_type: Some(value_type.to_string()),
            enabled_value: Some(enabled_value?),
            disabled_value: Some(disabled_value?),
            tags: optional_string(&self.tags, complete),
            segment_rules: (complete || !segment_rules.is_empty()).then_some(segment_rules),
            collections: (complete || !collections.is_empty()).then_some(collections),
            ..Default::default()
        })
    }

    pub(super) fn apply(&mut self, feature: Feature) {
        merge_string(&mut self.feature_id, feature.feature_id);
        merge_string(&mut self.name, feature.name);
        merge_string(&mut self.value_type, feature.value_type);
        let value_type = self.value_type();

        let enabled_value = feature.enabled_value.map(|value| {
            Value::Value(Cow::Owned(render(
                &value,
                value_type,
                get_str(&self.enabled_value),
            )))
        });
        merge(&mut self.enabled_value, enabled_value);
        let disabled_value = feature.disabled_value.map(|value| {
            Value::Value(Cow::Owned(render(
                &value,
                value_type,
                get_str(&self.disabled_value),
            )))
        });
        merge(&mut self.disabled_value, disabled_value);
        merge_string(&mut self.description, feature.description);
        merge_string(&mut self.tags, feature.tags);

        let segment_rules = feature
            .segment_rules
            .map(|rules| flatten_segment_rules(rules, value_type, &self.segment_rules));
        merge(&mut self.segment_rules, segment_rules);
        merge(
            &mut self.collections,
            feature.collections.map(flatten_collections),
        );

        merge_bool(&mut self.enabled, feature.enabled);
        merge_bool(&mut self.segment_exists, feature.segment_exists);
        merge_string(&mut self.created_time, feature.created_time);
        merge_string(&mut self.updated_time, feature.updated_time);
        merge_string(&mut self.href, feature.href);
    }

    /// Check if the attributes sent on update differ
    pub(super) fn differs(&self, other: &Self) -> bool {
        self.name != other.name
            || self.enabled_value != other.enabled_value
            || self.disabled_value != other.disabled_value
            || self.description != other.description
            || self.tags != other.tags
            || self.segment_rules != other.segment_rules
            || self.collections != other.collections
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureItemState<'a> {
    pub name: ValueString<'a>,
    pub feature_id: ValueString<'a>,
    pub description: ValueString<'a>,
    #[serde(rename = "type")]
    pub value_type: ValueString<'a>,
    pub enabled_value: ValueString<'a>,
    pub disabled_value: ValueString<'a>,
    pub enabled: ValueBool,
    pub tags: ValueString<'a>,
    pub segment_rules: SegmentRules<'a>,
    pub segment_exists: ValueBool,
    pub collections: CollectionItems<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub evaluation_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> From<Feature> for FeatureItemState<'a> {
    fn from(feature: Feature) -> Self {
        let value_type = feature
            .value_type
            .as_deref()
            .and_then(|value_type| value_type.parse().ok());
        Self {
            name: string_value(feature.name),
            feature_id: string_value(feature.feature_id),
            description: string_value(feature.description),
            value_type: string_value(feature.value_type),
            enabled_value: string_value(feature.enabled_value.as_ref().map(from_json)),
            disabled_value: string_value(feature.disabled_value.as_ref().map(from_json)),
            enabled: bool_value(feature.enabled),
            tags: string_value(feature.tags),
            segment_rules: flatten_segment_rules(
                feature.segment_rules.unwrap_or_default(),
                value_type,
                &Value::Null,
            ),
            segment_exists: bool_value(feature.segment_exists),
            collections: flatten_collection_items(feature.collections),
            created_time: string_value(feature.created_time),
            updated_time: string_value(feature.updated_time),
            evaluation_time: string_value(feature.evaluation_time),
            href: string_value(feature.href),
        }
    }
}

fn feature_item_fields() -> HashMap<String, AttributeType> {
    map! {
        "name" => AttributeType::String,
        "feature_id" => AttributeType::String,
        "description" => AttributeType::String,
        "type" => AttributeType::String,
        "enabled_value" => AttributeType::String,
        "disabled_value" => AttributeType::String,
        "enabled" => AttributeType::Bool,
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
pub struct FeatureDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub feature_id: ValueString<'a>,
    pub includes: ValueList<ValueString<'a>>,
    pub name: ValueString<'a>,
    #[serde(rename = "type")]
    pub value_type: ValueString<'a>,
    pub enabled_value: ValueString<'a>,
    pub disabled_value: ValueString<'a>,
    pub enabled: ValueBool,
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

impl<'a> WithSchema for FeatureDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the feature flag, `{guid}/{environment_id}/{feature_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "feature_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Feature id."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, INCLUDES_DESCRIPTION),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Computed, "Feature name."),
                    "type" => attribute(AttributeType::String, AttributeConstraint::Computed, TYPE_DESCRIPTION),
                    "enabled_value" => attribute(AttributeType::String, AttributeConstraint::Computed, ENABLED_VALUE_DESCRIPTION),
                    "disabled_value" => attribute(AttributeType::String, AttributeConstraint::Computed, DISABLED_VALUE_DESCRIPTION),
                    "enabled" => attribute(AttributeType::Bool, AttributeConstraint::Computed, "The state of the feature flag."),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Computed, "Feature description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Computed, "Tags associated with the feature."),
                    "segment_rules" => attribute(segment_rules_type(), AttributeConstraint::Computed, "Targeting rules that are used to set different values for different segments."),
                    "segment_exists" => attribute(AttributeType::Bool, AttributeConstraint::Computed, "Denotes if the targeting rules are specified for the feature flag."),
                    "collections" => attribute(collection_items_type(), AttributeConstraint::Computed, "List of collection id representing the collections that are associated with the specified feature flag."),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the feature flag."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the feature flag data."),
                    "evaluation_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "The last occurrence of the feature flag value evaluation."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Feature flag URL."),
                },
                description: Description::plain("Read an App Configuration feature flag"),
                ..Default::default()
            },
        }
    }
}

impl<'a> FeatureDataSourceState<'a> {
    pub(super) fn apply(&mut self, feature: Feature) {
        let item = FeatureItemState::from(feature);
        self.name = item.name;
        self.value_type = item.value_type;
        self.enabled_value = item.enabled_value;
        self.disabled_value = item.disabled_value;
        self.enabled = item.enabled;
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
pub struct FeaturesDataSourceState<'a> {
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
    pub features: ValueList<Value<FeatureItemState<'a>>>,
    pub total_count: ValueNumber,
    pub first: PaginationLinks<'a>,
    pub previous: PaginationLinks<'a>,
    pub next: PaginationLinks<'a>,
    pub last: PaginationLinks<'a>,
}

impl<'a> WithSchema for FeaturesDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the list, `{guid}/{environment_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "sort" => attribute(AttributeType::String, AttributeConstraint::Optional, "Sort the feature details based on the specified attribute."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Filter the resources to be returned based on the associated tags."),
                    "collections" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, "Filter features by a list of collections."),
                    "segments" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, "Filter features by a list of segments."),
                    "expand" => attribute(AttributeType::Bool, AttributeConstraint::Optional, "If set to `true`, returns expanded view of the resource details."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, INCLUDES_DESCRIPTION),
                    "limit" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, LIMIT_DESCRIPTION),
                    "offset" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, OFFSET_DESCRIPTION),
                    "features" => attribute(list_of(AttributeType::Object(feature_item_fields())), AttributeConstraint::Computed, "Array of feature flags."),
                    "total_count" => attribute(AttributeType::Number, AttributeConstraint::Computed, "Number of records returned in the current response."),
                    "first" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the first page of records."),
                    "previous" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the previous list of records."),
                    "next" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the next list of records."),
                    "last" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the last page of records."),
                },
                description: Description::plain("List the feature flags of an App Configuration environment"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithPagination<'a> for FeaturesDataSourceState<'a> {
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
