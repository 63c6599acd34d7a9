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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics};

use crate::app_config::flatten::{
    pagination_type, PageAttributes, PaginationLinks, WithPagination,
};
use crate::app_config::{GUID_DESCRIPTION, INCLUDES_DESCRIPTION, LIMIT_DESCRIPTION, OFFSET_DESCRIPTION};
use crate::client::app_config::Environment;
use crate::utils::{
    attribute, get_string, list_of, mark_unknown, merge_string, optional_string, string_value,
    WithNormalize, WithSchema,
};

const COLOR_CODE_DESCRIPTION: &str = "Color code to distinguish the environment. The Hex code for the color. For example `#FF0000` for `red`.";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub color_code: ValueString<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for EnvironmentState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the environment, `{guid}/{environment_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment name."),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Optional, "Environment description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Tags associated with the environment."),
                    "color_code" => attribute(AttributeType::String, AttributeConstraint::OptionalComputed, COLOR_CODE_DESCRIPTION),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the environment."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the environment data."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Environment URL."),
                },
                description: Description::plain("App Configuration environment"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithNormalize for EnvironmentState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            mark_unknown(&mut self.id);
        }
        if self.color_code.is_null() {
            mark_unknown(&mut self.color_code);
        }
        for computed in [&mut self.created_time, &mut self.href] {
            if computed.is_null() {
                mark_unknown(computed);
            }
        }
        mark_unknown(&mut self.updated_time);
    }
}

impl<'a> EnvironmentState<'a> {
    /// Build the request body, clearing unset fields when `complete`
    pub(super) fn to_environment(&self, complete: bool) -> Environment {
        Environment {
            name: get_string(&self.name),
            environment_id: get_string(&self.environment_id),
            description: optional_string(&self.description, complete),
            tags: optional_string(&self.tags, complete),
            color_code: get_string(&self.color_code),
            ..Default::default()
        }
    }

    pub(super) fn apply(&mut self, environment: Environment) {
        merge_string(&mut self.environment_id, environment.environment_id);
        merge_string(&mut self.name, environment.name);
        merge_string(&mut self.description, environment.description);
        merge_string(&mut self.tags, environment.tags);
        merge_string(&mut self.color_code, environment.color_code);
        merge_string(&mut self.created_time, environment.created_time);
        merge_string(&mut self.updated_time, environment.updated_time);
        merge_string(&mut self.href, environment.href);
    }

    /// Check if the attributes sent on update differ
    pub(super) fn differs(&self, other: &Self) -> bool {
        self.name != other.name
            || self.description != other.description
            || self.tags != other.tags
            || self.color_code != other.color_code
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub expand: ValueBool,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub color_code: ValueString<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> WithSchema for EnvironmentDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the environment, `{guid}/{environment_id}`."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "environment_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Environment id."),
                    "expand" => attribute(AttributeType::Bool, AttributeConstraint::Optional, "If set to `true`, returns expanded view of the resource details."),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Computed, "Environment name."),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Computed, "Environment description."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Computed, "Tags associated with the environment."),
                    "color_code" => attribute(AttributeType::String, AttributeConstraint::Computed, COLOR_CODE_DESCRIPTION),
                    "created_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Creation time of the environment."),
                    "updated_time" => attribute(AttributeType::String, AttributeConstraint::Computed, "Last modified time of the environment data."),
                    "href" => attribute(AttributeType::String, AttributeConstraint::Computed, "Environment URL."),
                },
                description: Description::plain("Read an App Configuration environment"),
                ..Default::default()
            },
        }
    }
}

impl<'a> EnvironmentDataSourceState<'a> {
    pub(super) fn apply(&mut self, environment: Environment) {
        self.name = string_value(environment.name);
        self.description = string_value(environment.description);
        self.tags = string_value(environment.tags);
        self.color_code = string_value(environment.color_code);
        self.created_time = string_value(environment.created_time);
        self.updated_time = string_value(environment.updated_time);
        self.href = string_value(environment.href);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentItemState<'a> {
    pub name: ValueString<'a>,
    pub environment_id: ValueString<'a>,
    pub description: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub color_code: ValueString<'a>,
    pub created_time: ValueString<'a>,
    pub updated_time: ValueString<'a>,
    pub href: ValueString<'a>,
}

impl<'a> From<Environment> for EnvironmentItemState<'a> {
    fn from(environment: Environment) -> Self {
        Self {
            name: string_value(environment.name),
            environment_id: string_value(environment.environment_id),
            description: string_value(environment.description),
            tags: string_value(environment.tags),
            color_code: string_value(environment.color_code),
            created_time: string_value(environment.created_time),
            updated_time: string_value(environment.updated_time),
            href: string_value(environment.href),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentsDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub guid: ValueString<'a>,
    pub sort: ValueString<'a>,
    pub tags: ValueString<'a>,
    pub expand: ValueBool,
    pub includes: ValueList<ValueString<'a>>,
    pub limit: ValueNumber,
    pub offset: ValueNumber,
    pub environments: ValueList<Value<EnvironmentItemState<'a>>>,
    pub total_count: ValueNumber,
    pub first: PaginationLinks<'a>,
    pub previous: PaginationLinks<'a>,
    pub next: PaginationLinks<'a>,
    pub last: PaginationLinks<'a>,
}

impl<'a> WithSchema for EnvironmentsDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "GUID of the App Configuration service."),
                    "guid" => attribute(AttributeType::String, AttributeConstraint::Required, GUID_DESCRIPTION),
                    "sort" => attribute(AttributeType::String, AttributeConstraint::Optional, "Sort the environment details based on the specified attribute."),
                    "tags" => attribute(AttributeType::String, AttributeConstraint::Optional, "Filter the resources to be returned based on the associated tags. Specify the parameter as a list of comma separated tags. Returns resources associated with any of the specified tags."),
                    "expand" => attribute(AttributeType::Bool, AttributeConstraint::Optional, "If set to `true`, returns expanded view of the resource details."),
                    "includes" => attribute(list_of(AttributeType::String), AttributeConstraint::Optional, INCLUDES_DESCRIPTION),
                    "limit" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, LIMIT_DESCRIPTION),
                    "offset" => attribute(AttributeType::Number, AttributeConstraint::OptionalComputed, OFFSET_DESCRIPTION),
                    "environments" => attribute(
                        list_of(AttributeType::Object(map! {
                            "name" => AttributeType::String,
                            "environment_id" => AttributeType::String,
                            "description" => AttributeType::String,
                            "tags" => AttributeType::String,
                            "color_code" => AttributeType::String,
                            "created_time" => AttributeType::String,
                            "updated_time" => AttributeType::String,
                            "href" => AttributeType::String,
                        })),
                        AttributeConstraint::Computed,
                        "Array of environments.",
                    ),
                    "total_count" => attribute(AttributeType::Number, AttributeConstraint::Computed, "Number of records returned in the current response."),
                    "first" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the first page of records."),
                    "previous" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the previous list of records."),
                    "next" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the next list of records."),
                    "last" => attribute(pagination_type(), AttributeConstraint::Computed, "URL to navigate to the last page of records."),
                },
                description: Description::plain("List the environments of an App Configuration instance"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithPagination<'a> for EnvironmentsDataSourceState<'a> {
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
