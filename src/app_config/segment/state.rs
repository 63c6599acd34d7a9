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
use tf_provider::schema::{
    AttributeConstraint, AttributeType, Block, Description, NestedBlock, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};

use crate::app_config::flatten::{
    pagination_type, PageAttributes, PaginationLinks, WithPagination,
};
use crate::app_config::{GUID_DESCRIPTION, INCLUDES_DESCRIPTION, LIMIT_DESCRIPTION, OFFSET_DESCRIPTION};
use crate::client::app_config::{Rule, Segment};
use crate::utils::{
    attribute, get_str, get_string, get_strings, known_items, list_of, mark_unknown, merge,
    merge_string, optional_string, string_value, strings_value, DisplayJoinable, WithNormalize,
    WithSchema, WithValidate,
};

pub const OPERATORS: [&str; 8] = [
    "is",
    "contains",
    "startsWith",
    "endsWith",
    "greaterThan",
    "lesserThan",
    "greaterThanEquals",
    "lesserThanEquals",
];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleState<'a> {
    pub attribute_name: ValueString<'a>,
    pub operator: ValueString<'a>,
    pub values: ValueList<ValueString<'a>>,
}

pub type Rules<'a> = ValueList<Value<RuleState<'a>>>;

fn rule_fields() -> HashMap<String, AttributeType> {
    map! {
        "attribute_name" => AttributeType::String,
        "operator" => AttributeType::String,
        "values" => list_of(AttributeType::String),
    }
}

fn expand_rules(rules: &Rules<'_>) -> Vec<Rule> {
    known_items(rules)
        .map(|rule| Rule {
            attribute_name: get_string(&rule.attribute_name).unwrap_or_default(),
            operator: get_string(&rule.operator).unwrap_or_default(),
            values: get_strings(&rule.values),
        })
        .collect()
}

fn flatten_rules<'a>(rules: Vec<Rule>) -> Rules<'a> {
    Value::Value(
        rules
            .into_iter()
            .map(|rule| {
                Value::Value(RuleState {
                    attribute_name: Value::Value(Cow::Owned(rule.attribute_name)),
                    operator: Value::Value(Cow::Owned(rule.operator)),
                    values: strings_value(rule.values),
                })
            })
            .collect(),
    )
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub segment_id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub rules: Rules<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for SegmentState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the segment, `{guid}/{segment_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "segment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Segment id."),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Required, "Segment name."),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Optional, "Segment description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Tags associated with the segments."),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the segment."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the segment data."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Segment URL."),
                },
                blocks: map! {
                    "rules" => NestedBlock::List(Block {
                        attributes: map! {
                            "attribute_name" => attribute(AttributeType::String, AttributeConstraint::Required, "Attribute name."),
                            "operator" => attribute(AttributeType::String, AttributeConstraint::Required, "Operator to be used for the evaluation if the attribute is present in the segment."),
                            "values" => attribute(list_of(AttributeType::String), AttributeConstraint::Required, "List of values. Entities matching any of the given values will be considered to be part of the segment."),
                        },
                        description: Description::plain("List of rules that determine if the entity belongs to the segment during feature / property evaluation."),
                        ..Default::default()
                    }),
                },
                description: Description::plain("App Configuration segment"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for SegmentState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        let Value::Value(rules) = &self.rules else {
            return;
        };
        if rules.is_empty() {
            diags.error(
                "Missing segment rules",
                "A segment requires at least one `rules` block",
                attr_path.attribute("rules"),
            );
            return;
        }

        for (i, rule) in rules.iter().enumerate() {
            let Value::Value(rule) = rule else {
                continue;
            };
            if let Some(operator) = get_str(&rule.operator) {
                if !OPERATORS.contains(&operator) {
                    diags.error(
                        "Invalid segment rule operator",
                        format!(
                            "`{operator}` is not one of: {}",
                            OPERATORS.iter().join_with(", ")
                        ),
                        attr_path
                            .clone()
                            .attribute("rules")
                            .index(i as i64)
                            .attribute("operator"),
                    );
                }
            }
        }
    }
}

impl<'a> WithNormalize for SegmentState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            mark_unknown(&mut self.id);
        }
        mark_unknown(&mut self.updated_time);
        for computed in [&mut self.created_time, &mut self.href] {
            if computed.is_null() {
                mark_unknown(computed);
            }
        }
    }
}

impl<'a> SegmentState<'a> {
    pub(super) fn to_segment(&self, complete: bool) -> Segment {
        Segment {
            name: get_string(&self.name),
            segment_id: get_string(&self.segment_id),
            description: optional_string(&self.description, complete),
            tags: optional_string(&self.tags, complete),
            rules: Some(expand_rules(&self.rules)),
            ..Default::default()
        }
    }

    pub(super) fn apply(&mut self, segment: Segment) {
        merge_string(&mut self.segment_id, segment.segment_id);
        merge_string(&mut self.name, segment.name);
        merge_string(&mut self.description, segment.description);
        merge_string(&mut self.tags, segment.tags);
        merge(&mut self.rules, segment.rules.map(flatten_rules));
        merge_string(&mut self.created_time, segment.created_time);
        merge_string(&mut self.updated_time, segment.updated_time);
        merge_string(&mut self.href, segment.href);
    }

    pub(super) fn differs(&self, other: &Self) -> bool {
        self.name != other.name
            || self.description != other.description
            || self.tags != other.tags
            || self.rules != other.rules
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentItemState<'a> {
    pub name: ValueString<'a>,
    pub segment_id: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub rules: Rules<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> From<Segment> for SegmentItemState<'a> {
    fn from(segment: Segment) -> Self {
        Self {
            name: string_value(segment.name),
            segment_id: string_value(segment.segment_id),
            description: string_value(segment.description),
            tags: string_value(segment.tags),
            rules: flatten_rules(segment.rules.unwrap_or_default()),
            created_time: string_value(segment.created_time),
            updated_time: string_value(segment.updated_time),
            href: string_value(segment.href),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub segment_id: ValueString<'a>,
    pub includes: ValueList<ValueString<'a>>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub rules: Rules<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for SegmentDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the segment, `{guid}/{segment_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "segment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Segment id."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, "Include feature and property details in the response."),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Computed, "Segment name."),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Computed, "Segment description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Computed, "Tags associated with the segments."),
                    "rules" => attribute(list_of(AttributeType::Object(rule_fields())), AttributeConstraint::Computed, "List of rules that determine if the entity belongs to the segment during feature / property evaluation."),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the segment."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the segment data."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Segment URL."),
                },
                description: Description::plain("Read an App Configuration segment"),
                ..Default::default()
            },
        }
    }
}

impl<'a> SegmentDataSourceState<'a> {
    pub(super) fn apply(&mut self, segment: Segment) {
        let item = SegmentItemState::from(segment);
        self.name = item.name;
        self.description = item.description;
        self.tags = item.tags;
        self.rules = item.rules;
        self.created_time = item.created_time;
        self.updated_time = item.updated_time;
        self.href = item.href;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentsDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub sort: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub expand: ValueBool,
    pub includes: ValueList<ValueString<'a>>,
    pub limit: ValueNumber,
    pub offset: ValueNumber,
    pub segments: ValueList<Value<SegmentItemState<'a>>>,
    pub total_count: ValueNumber,
    pub first: PaginationLinks<'a>,
    pub previous: PaginationLinks<'a>,
    pub next: PaginationLinks<'a>,
    pub last: PaginationLinks<'a>,
}

impl<'a> WithSchema for SegmentsDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the list, the App Configuration guid."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "sort" => attribute(AttributeType::String, AttributeConstraint::Optional, "Sort the segment details based on the specified attribute."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Filter the resources to be returned based on the associated tags."),
                    "expand" => attribute(AttributeType::Bool, AttributeConstraint::Optional, "If set to `true`, returns expanded view of the resource details."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, INCLUDES_DESCRIPTION),
                    "limit" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, LIMIT_DESCRIPTION),
                    "offset" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, OFFSET_DESCRIPTION),
                    "segments" => attribute(list_of(AttributeType::Object(map! {
                        "name" => AttributeType::String,
                        "segment_id" => AttributeType::String,
                        "description" => AttributeType::String,
                        "tags" => AttributeType::String,
                        "rules" => list_of(AttributeType::Object(rule_fields())),
                        "created_time" => AttributeType::String,
                        "updated_time" => AttributeType::String,
                        "href" => AttributeType::String,
                    })), AttributeConstraint::Computed, "Array of segments."),
                    "total_count" => attribute(AttributeType::Number, AttributeConstraint::Computed, "Number of records returned in the current response."),
                    "first" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the first page of records."),
                    "previous" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the previous list of records."),
                    "next" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the next list of records."),
                    "last" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the last page of records."),
                },
                description: Description::plain("List the segments of an App Configuration instance"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithPagination<'a> for SegmentsDataSourceState<'a> {
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
