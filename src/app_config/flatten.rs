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
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, NestedBlock};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};

use crate::client::app_config::{CollectionRef, Page, PaginationLink, SegmentRule, TargetSegments};
use crate::utils::{
    attribute, get_number, get_str, get_strings, known_items, list_of, number_value,
    string_value, strings_value,
};

use super::value::{render, ValueType};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSegmentsState<'a> {
    pub segments: ValueList<ValueString<'a>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRuleState<'a> {
    pub rules: ValueList<Value<TargetSegmentsState<'a>>>,
    pub value: ValueString<'a>,
    pub order: ValueNumber,
}

/// Collection reference, as configured on a resource
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState<'a> {
    pub collection_id: ValueString<'a>,
}

/// Collection reference, as returned by a data source
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionItemState<'a> {
    pub collection_id: ValueString<'a>,
    pub name: ValueString<'a>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinkState<'a> {
    pub href: ValueString<'a>,
}

pub type SegmentRules<'a> = ValueList<Value<SegmentRuleState<'a>>>;
pub type Collections<'a> = ValueList<Value<CollectionState<'a>>>;
pub type CollectionItems<'a> = ValueList<Value<CollectionItemState<'a>>>;
pub type PaginationLinks<'a> = ValueList<Value<PaginationLinkState<'a>>>;

pub(crate) fn segment_rules_block(value_description: &str) -> NestedBlock {
    NestedBlock::List(Block {
        attributes: map! {
            "value" => attribute(AttributeType::String, AttributeConstraint::Required, value_description),
            "order" => attribute(
                AttributeType::Number,
                AttributeConstraint::Required,
                "Order of the rule, used during evaluation. The evaluation is performed in the order defined and the value associated with the first matching rule is used for evaluation.",
            ),
        },
        blocks: map! {
            "rules" => NestedBlock::List(Block {
                attributes: map! {
                    "segments" => attribute(
                        list_of(AttributeType::String),
                        AttributeConstraint::Required,
                        "List of segment ids that are used for targeting using the rule.",
                    ),
                },
                description: Description::plain("Rules array."),
                ..Default::default()
            }),
        },
        description: Description::plain(
            "Specify the targeting rules that is used to set different values for different segments.",
        ),
        ..Default::default()
    })
}

pub(crate) fn collections_block() -> NestedBlock {
    NestedBlock::List(Block {
        attributes: map! {
            "collection_id" => attribute(AttributeType::String, AttributeConstraint::Required, "Collection id."),
        },
        description: Description::plain(
            "List of collection id representing the collections that are associated with the specified resource.",
        ),
        ..Default::default()
    })
}

pub(crate) fn segment_rules_type() -> AttributeType {
    list_of(AttributeType::Object(map! {
        "rules" => list_of(AttributeType::Object(map! {
            "segments" => list_of(AttributeType::String),
        })),
        "value" => AttributeType::String,
        "order" => AttributeType::Number,
    }))
}

pub(crate) fn collection_items_type() -> AttributeType {
    list_of(AttributeType::Object(map! {
        "collection_id" => AttributeType::String,
        "name" => AttributeType::String,
    }))
}

pub(crate) fn pagination_type() -> AttributeType {
    list_of(AttributeType::Object(map! {
        "href" => AttributeType::String,
    }))
}

/// Convert configured targeting rules into their API representation
///
/// Values are coerced according to `value_type`; on error, a diagnostic is attached to the faulty rule.
pub(crate) fn expand_segment_rules(
    diags: &mut Diagnostics,
    attr_path: AttributePath,
    value_type: Option<ValueType>,
    rules: &SegmentRules<'_>,
) -> Option<Vec<SegmentRule>> {
    let mut expanded = Vec::new();
    let mut valid = true;

    for (i, rule) in known_items(rules).enumerate() {
        let value = get_str(&rule.value).unwrap_or_default();
        let value = match value_type {
            Some(value_type) => match value_type.to_json(value) {
                Ok(value) => value,
                Err(err) => {
                    diags.error(
                        "Invalid segment rule value",
                        err.to_string(),
                        attr_path.clone().index(i as i64).attribute("value"),
                    );
                    valid = false;
                    continue;
                }
            },
            None => serde_json::Value::String(value.to_owned()),
        };

        expanded.push(SegmentRule {
            rules: known_items(&rule.rules)
                .map(|target| TargetSegments {
                    segments: get_strings(&target.segments),
                })
                .collect(),
            value,
            order: get_number(&rule.order).unwrap_or_default(),
        });
    }

    valid.then_some(expanded)
}

/// Convert targeting rules returned by the API into state
///
/// `current` is used to keep the configured spelling of equivalent values.
pub(crate) fn flatten_segment_rules<'a>(
    rules: Vec<SegmentRule>,
    value_type: Option<ValueType>,
    current: &SegmentRules<'_>,
) -> SegmentRules<'a> {
    let current: Vec<_> = known_items(current).collect();
    Value::Value(
        rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| {
                let current_value = current.get(i).and_then(|rule| get_str(&rule.value));
                Value::Value(SegmentRuleState {
                    rules: Value::Value(
                        rule.rules
                            .into_iter()
                            .map(|target| {
                                Value::Value(TargetSegmentsState {
                                    segments: strings_value(target.segments),
                                })
                            })
                            .collect(),
                    ),
                    value: Value::Value(Cow::Owned(render(
                        &rule.value,
                        value_type,
                        current_value,
                    ))),
                    order: Value::Value(rule.order),
                })
            })
            .collect(),
    )
}

pub(crate) fn expand_collections(collections: &Collections<'_>) -> Vec<CollectionRef> {
    known_items(collections)
        .filter_map(|collection| {
            Some(CollectionRef {
                collection_id: get_str(&collection.collection_id)?.to_owned(),
                name: None,
            })
        })
        .collect()
}

pub(crate) fn flatten_collections<'a>(collections: Vec<CollectionRef>) -> Collections<'a> {
    Value::Value(
        collections
            .into_iter()
            .map(|collection| {
                Value::Value(CollectionState {
                    collection_id: Value::Value(Cow::Owned(collection.collection_id)),
                })
            })
            .collect(),
    )
}

pub(crate) fn flatten_collection_items<'a>(
    collections: Option<Vec<CollectionRef>>,
) -> CollectionItems<'a> {
    Value::Value(
        collections
            .unwrap_or_default()
            .into_iter()
            .map(|collection| {
                Value::Value(CollectionItemState {
                    collection_id: Value::Value(Cow::Owned(collection.collection_id)),
                    name: string_value(collection.name),
                })
            })
            .collect(),
    )
}

/// A pagination link is stored as a list holding at most one element
pub(crate) fn flatten_pagination<'a>(link: Option<PaginationLink>) -> PaginationLinks<'a> {
    Value::Value(
        link.into_iter()
            .map(|link| {
                Value::Value(PaginationLinkState {
                    href: string_value(link.href),
                })
            })
            .collect(),
    )
}

/// Pagination attributes of a list data source
pub(crate) struct PageAttributes<'s, 'a> {
    pub total_count: &'s mut ValueNumber,
    pub limit: &'s mut ValueNumber,
    pub offset: &'s mut ValueNumber,
    pub first: &'s mut PaginationLinks<'a>,
    pub previous: &'s mut PaginationLinks<'a>,
    pub next: &'s mut PaginationLinks<'a>,
    pub last: &'s mut PaginationLinks<'a>,
}

pub(crate) trait WithPagination<'a> {
    fn page_attributes(&mut self) -> PageAttributes<'_, 'a>;
}

/// Store the metadata of the last page fetched and flatten its items
///
/// A configured `limit` or `offset` is kept as is.
pub(crate) fn store_page<'a, S, T, U>(state: &mut S, page: Page<T>) -> ValueList<Value<U>>
where
    S: WithPagination<'a>,
    U: From<T>,
{
    let attributes = state.page_attributes();
    *attributes.total_count = number_value(page.total_count);
    if attributes.limit.is_null() {
        *attributes.limit = number_value(page.limit);
    }
    if attributes.offset.is_null() {
        *attributes.offset = number_value(page.offset);
    }
    *attributes.first = flatten_pagination(page.first);
    *attributes.previous = flatten_pagination(page.previous);
    *attributes.next = flatten_pagination(page.next);
    *attributes.last = flatten_pagination(page.last);

    Value::Value(
        page.items
            .into_iter()
            .map(|item| Value::Value(item.into()))
            .collect(),
    )
}

/// Check `type` and every value it constrains
pub(crate) fn validate_typed_values(
    diags: &mut Diagnostics,
    attr_path: &AttributePath,
    value_type: &ValueString<'_>,
    values: &[(&str, &ValueString<'_>)],
    segment_rules: &SegmentRules<'_>,
) {
    let Some(value_type) = get_str(value_type) else {
        return;
    };
    let value_type: ValueType = match value_type.parse() {
        Ok(value_type) => value_type,
        Err(err) => {
            diags.error(
                "Invalid type",
                err.to_string(),
                attr_path.clone().attribute("type"),
            );
            return;
        }
    };

    for (name, value) in values {
        if let Value::Value(value) = value {
            if let Err(err) = value_type.to_json(value) {
                diags.error(
                    format!("Invalid `{name}`"),
                    err.to_string(),
                    attr_path.clone().attribute(name.to_string()),
                );
            }
        }
    }

    if let Value::Value(rules) = segment_rules {
        for (i, rule) in rules.iter().enumerate() {
            let Value::Value(rule) = rule else {
                continue;
            };
            if let Value::Value(value) = &rule.value {
                if let Err(err) = value_type.to_json(value) {
                    diags.error(
                        "Invalid segment rule value",
                        err.to_string(),
                        attr_path
                            .clone()
                            .attribute("segment_rules")
                            .index(i as i64)
                            .attribute("value"),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rule<'a>(segments: &[&'a str], value: &'a str, order: i64) -> Value<SegmentRuleState<'a>> {
        Value::Value(SegmentRuleState {
            rules: Value::Value(vec![Value::Value(TargetSegmentsState {
                segments: Value::Value(
                    segments
                        .iter()
                        .map(|s| Value::Value(Cow::Borrowed(*s)))
                        .collect(),
                ),
            })]),
            value: Value::Value(Cow::Borrowed(value)),
            order: Value::Value(order),
        })
    }

    #[derive(Default)]
    struct ListState<'a> {
        total_count: ValueNumber,
        limit: ValueNumber,
        offset: ValueNumber,
        first: PaginationLinks<'a>,
        previous: PaginationLinks<'a>,
        next: PaginationLinks<'a>,
        last: PaginationLinks<'a>,
    }

    impl<'a> WithPagination<'a> for ListState<'a> {
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

    #[test]
    fn store_page_keeps_configured_limit() {
        let mut state = ListState {
            limit: Value::Value(5),
            ..Default::default()
        };
        let page = Page {
            items: vec!["dev".to_owned(), "prod".to_owned()],
            limit: Some(10),
            offset: Some(20),
            total_count: Some(22),
            first: Some(PaginationLink {
                href: Some("/environments?offset=0".to_owned()),
            }),
            ..Default::default()
        };

        let items: ValueList<Value<String>> = store_page(&mut state, page);

        assert_eq!(
            items,
            Value::Value(vec![
                Value::Value("dev".to_owned()),
                Value::Value("prod".to_owned())
            ])
        );
        assert_eq!(state.limit, Value::Value(5));
        assert_eq!(state.offset, Value::Value(20));
        assert_eq!(state.total_count, Value::Value(22));
        assert_eq!(
            state.first,
            Value::Value(vec![Value::Value(PaginationLinkState {
                href: Value::Value(Cow::Borrowed("/environments?offset=0")),
            })])
        );
        assert_eq!(state.next, Value::Value(vec![]));
    }

    #[test]
    fn expand_rules_coerces_values() {
        let mut diags = Diagnostics::default();
        let rules = Value::Value(vec![rule(&["beta", "internal"], "25", 1), rule(&[], "5", 2)]);

        let expanded = expand_segment_rules(
            &mut diags,
            AttributePath::new("segment_rules"),
            Some(ValueType::Numeric),
            &rules,
        )
        .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].value, json!(25));
        assert_eq!(expanded[0].order, 1);
        assert_eq!(expanded[0].rules[0].segments, vec!["beta", "internal"]);
        assert_eq!(expanded[1].rules[0].segments, Vec::<String>::new());
    }

    #[test]
    fn expand_rules_reports_invalid_values() {
        let mut diags = Diagnostics::default();
        let rules = Value::Value(vec![rule(&["beta"], "maybe", 1)]);

        let expanded = expand_segment_rules(
            &mut diags,
            AttributePath::new("segment_rules"),
            Some(ValueType::Boolean),
            &rules,
        );

        assert!(expanded.is_none());
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn flatten_rules_keeps_configured_spelling() {
        let current = Value::Value(vec![rule(&["beta"], "1.50", 1)]);
        let flattened = flatten_segment_rules(
            vec![
                SegmentRule {
                    rules: vec![TargetSegments {
                        segments: vec!["beta".to_owned()],
                    }],
                    value: json!(1.5),
                    order: 1,
                },
                SegmentRule {
                    rules: vec![],
                    value: json!(3),
                    order: 2,
                },
            ],
            Some(ValueType::Numeric),
            &current,
        );

        let flattened: Vec<_> = known_items(&flattened).collect();
        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[0].value, Value::Value(Cow::Borrowed("1.50")));
        assert_eq!(flattened[1].value, Value::Value(Cow::Borrowed("3")));
        assert_eq!(flattened[1].order, Value::Value(2));
    }

    #[test]
    fn collections_round_through_state() {
        let state = flatten_collections(vec![CollectionRef {
            collection_id: "web".to_owned(),
            name: Some("Web app".to_owned()),
        }]);
        let expanded = expand_collections(&state);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].collection_id, "web");
        assert_eq!(expanded[0].name, None);
    }

    #[test]
    fn pagination_link_is_a_singleton_list() {
        let links = flatten_pagination(Some(PaginationLink {
            href: Some("https://x?offset=10".to_owned()),
        }));
        assert_eq!(known_items(&links).count(), 1);

        let links = flatten_pagination(None);
        assert_eq!(links, Value::Value(vec![]));
    }
}
