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

use std::future::Future;

use anyhow::{anyhow, Context, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::utils::DisplayJoinable;

use super::http::HttpClient;

/// Page size used by the service when no limit is given
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,
    #[serde(skip_serializing)]
    pub created_time: Option<String>,
    #[serde(skip_serializing)]
    pub updated_time: Option<String>,
    #[serde(skip_serializing)]
    pub href: Option<String>,
}

/// Segments a targeting rule applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSegments {
    #[serde(default)]
    pub segments: Vec<String>,
}

/// Targeting rule of a property or a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentRule {
    #[serde(default)]
    pub rules: Vec<TargetSegments>,
    #[serde(default)]
    pub value: JsonValue,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub collection_id: String,
    #[serde(skip_serializing)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_rules: Option<Vec<SegmentRule>>,
    #[serde(skip_serializing)]
    pub segment_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<CollectionRef>>,
    #[serde(skip_serializing)]
    pub created_time: Option<String>,
    #[serde(skip_serializing)]
    pub updated_time: Option<String>,
    #[serde(skip_serializing)]
    pub evaluation_time: Option<String>,
    #[serde(skip_serializing)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_value: Option<JsonValue>,
    #[serde(skip_serializing)]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_rules: Option<Vec<SegmentRule>>,
    #[serde(skip_serializing)]
    pub segment_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<CollectionRef>>,
    #[serde(skip_serializing)]
    pub created_time: Option<String>,
    #[serde(skip_serializing)]
    pub updated_time: Option<String>,
    #[serde(skip_serializing)]
    pub evaluation_time: Option<String>,
    #[serde(skip_serializing)]
    pub href: Option<String>,
}

/// Condition a user must match to belong to a segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub attribute_name: String,
    pub operator: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
    #[serde(skip_serializing)]
    pub created_time: Option<String>,
    #[serde(skip_serializing)]
    pub updated_time: Option<String>,
    #[serde(skip_serializing)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLink {
    pub href: Option<String>,
}

impl PaginationLink {
    /// Offset the link points at, if any
    pub fn offset(&self) -> Option<i64> {
        let href = self.href.as_deref()?;
        // Links may be relative to the instance
        let url = Url::parse(href)
            .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(href)))
            .ok()?;
        let (_, offset) = url.query_pairs().find(|(key, _)| key == "offset")?;
        offset.parse().ok()
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(
        default = "Vec::new",
        alias = "environments",
        alias = "properties",
        alias = "segments",
        alias = "features"
    )]
    pub items: Vec<T>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub total_count: Option<i64>,
    pub first: Option<PaginationLink>,
    pub previous: Option<PaginationLink>,
    pub next: Option<PaginationLink>,
    pub last: Option<PaginationLink>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
            offset: None,
            total_count: None,
            first: None,
            previous: None,
            next: None,
            last: None,
        }
    }
}

impl<T> Page<T> {
    /// Offset of the following page, `None` when this page is the last one
    pub fn next_offset(&self) -> Option<i64> {
        self.next
            .as_ref()
            .and_then(PaginationLink::offset)
            .filter(|offset| *offset != 0)
    }
}

/// Filters shared by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub expand: Option<bool>,
    pub sort: Option<String>,
    pub tags: Option<String>,
    pub collections: Vec<String>,
    pub segments: Vec<String>,
    pub include: Vec<String>,
    /// Explicit page size; disables page traversal
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListOptions {
    fn apply(&self, url: &mut Url, limit: i64, offset: i64) {
        let mut query = url.query_pairs_mut();
        if let Some(expand) = self.expand {
            query.append_pair("expand", if expand { "true" } else { "false" });
        }
        if let Some(sort) = &self.sort {
            query.append_pair("sort", sort);
        }
        if let Some(tags) = &self.tags {
            query.append_pair("tags", tags);
        }
        for (key, values) in [
            ("collections", &self.collections),
            ("segments", &self.segments),
            ("include", &self.include),
        ] {
            if !values.is_empty() {
                query.append_pair(key, &values.iter().join_with(",").to_string());
            }
        }
        query.append_pair("limit", &limit.to_string());
        query.append_pair("offset", &offset.to_string());
    }
}

/// Fetch all the pages of a list endpoint
///
/// When `options.limit` is set, only one page is fetched.
/// Otherwise, pages are fetched until the `next` link is exhausted.
/// The pagination metadata of the returned page is the one of the last page fetched.
pub async fn list_all<T, F, Fut>(options: &ListOptions, mut fetch: F) -> Result<Page<T>>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let limit = options.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let mut offset = options.offset.unwrap_or(0);
    let mut items = Vec::new();

    loop {
        let mut page = fetch(limit, offset).await?;
        items.append(&mut page.items);

        let next = if options.limit.is_some() {
            None
        } else {
            page.next_offset()
        };

        match next {
            // A link pointing backward would loop forever
            Some(next) if next > offset => offset = next,
            _ => {
                page.items = items;
                return Ok(page);
            }
        }
    }
}

/// Client for the App Configuration admin API of one service instance
#[derive(Debug, Clone)]
pub struct AppConfigClient {
    http: HttpClient,
    base: Url,
}

impl AppConfigClient {
    pub fn new(http: HttpClient, endpoint: &str, guid: &str) -> Result<Self> {
        let mut base = Url::parse(endpoint)
            .with_context(|| format!("Invalid App Configuration endpoint: {endpoint}"))?;
        base.path_segments_mut()
            .map_err(|_| anyhow!("Invalid App Configuration endpoint: {endpoint}"))?
            .pop_if_empty()
            .extend(["apprapp", "feature", "v1", "instances", guid]);
        Ok(Self { http, base })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn url_with_include(&self, segments: &[&str], include: &[String]) -> Url {
        let mut url = self.url(segments);
        if !include.is_empty() {
            url.query_pairs_mut()
                .append_pair("include", &include.iter().join_with(",").to_string());
        }
        url
    }

    pub async fn create_environment(&self, environment: &Environment) -> Result<Environment> {
        self.http
            .send(Method::POST, self.url(&["environments"]), environment)
            .await
    }

    pub async fn get_environment(
        &self,
        environment_id: &str,
        expand: Option<bool>,
    ) -> Result<Environment> {
        let mut url = self.url(&["environments", environment_id]);
        if let Some(expand) = expand {
            url.query_pairs_mut()
                .append_pair("expand", if expand { "true" } else { "false" });
        }
        self.http.get(url).await
    }

    pub async fn update_environment(
        &self,
        environment_id: &str,
        environment: &Environment,
    ) -> Result<Environment> {
        self.http
            .send(
                Method::PUT,
                self.url(&["environments", environment_id]),
                environment,
            )
            .await
    }

    pub async fn delete_environment(&self, environment_id: &str) -> Result<()> {
        self.http
            .delete(self.url(&["environments", environment_id]))
            .await
    }

    pub async fn list_environments(&self, options: &ListOptions) -> Result<Page<Environment>> {
        list_all(options, move |limit, offset| {
            let mut url = self.url(&["environments"]);
            options.apply(&mut url, limit, offset);
            self.http.get(url)
        })
        .await
    }

    pub async fn create_property(
        &self,
        environment_id: &str,
        property: &Property,
    ) -> Result<Property> {
        self.http
            .send(
                Method::POST,
                self.url(&["environments", environment_id, "properties"]),
                property,
            )
            .await
    }

    pub async fn get_property(
        &self,
        environment_id: &str,
        property_id: &str,
        include: &[String],
    ) -> Result<Property> {
        self.http
            .get(self.url_with_include(
                &["environments", environment_id, "properties", property_id],
                include,
            ))
            .await
    }

    pub async fn update_property(
        &self,
        environment_id: &str,
        property_id: &str,
        property: &Property,
    ) -> Result<Property> {
        self.http
            .send(
                Method::PUT,
                self.url(&["environments", environment_id, "properties", property_id]),
                property,
            )
            .await
    }

    pub async fn delete_property(&self, environment_id: &str, property_id: &str) -> Result<()> {
        self.http
            .delete(self.url(&["environments", environment_id, "properties", property_id]))
            .await
    }

    pub async fn list_properties(
        &self,
        environment_id: &str,
        options: &ListOptions,
    ) -> Result<Page<Property>> {
        list_all(options, move |limit, offset| {
            let mut url = self.url(&["environments", environment_id, "properties"]);
            options.apply(&mut url, limit, offset);
            self.http.get(url)
        })
        .await
    }

    pub async fn create_feature(&self, environment_id: &str, feature: &Feature) -> Result<Feature> {
        self.http
            .send(
                Method::POST,
                self.url(&["environments", environment_id, "features"]),
                feature,
            )
            .await
    }

    pub async fn get_feature(
        &self,
        environment_id: &str,
        feature_id: &str,
        include: &[String],
    ) -> Result<Feature> {
        self.http
            .get(self.url_with_include(
                &["environments", environment_id, "features", feature_id],
                include,
            ))
            .await
    }

    pub async fn update_feature(
        &self,
        environment_id: &str,
        feature_id: &str,
        feature: &Feature,
    ) -> Result<Feature> {
        self.http
            .send(
                Method::PUT,
                self.url(&["environments", environment_id, "features", feature_id]),
                feature,
            )
            .await
    }

    pub async fn delete_feature(&self, environment_id: &str, feature_id: &str) -> Result<()> {
        self.http
            .delete(self.url(&["environments", environment_id, "features", feature_id]))
            .await
    }

    pub async fn list_features(
        &self,
        environment_id: &str,
        options: &ListOptions,
    ) -> Result<Page<Feature>> {
        list_all(options, move |limit, offset| {
            let mut url = self.url(&["environments", environment_id, "features"]);
            options.apply(&mut url, limit, offset);
            self.http.get(url)
        })
        .await
    }

    pub async fn create_segment(&self, segment: &Segment) -> Result<Segment> {
        self.http
            .send(Method::POST, self.url(&["segments"]), segment)
            .await
    }

    pub async fn get_segment(&self, segment_id: &str, include: &[String]) -> Result<Segment> {
        self.http
            .get(self.url_with_include(&["segments", segment_id], include))
            .await
    }

    pub async fn update_segment(&self, segment_id: &str, segment: &Segment) -> Result<Segment> {
        self.http
            .send(Method::PUT, self.url(&["segments", segment_id]), segment)
            .await
    }

    pub async fn delete_segment(&self, segment_id: &str) -> Result<()> {
        self.http.delete(self.url(&["segments", segment_id])).await
    }

    pub async fn list_segments(&self, options: &ListOptions) -> Result<Page<Segment>> {
        list_all(options, move |limit, offset| {
            let mut url = self.url(&["segments"]);
            options.apply(&mut url, limit, offset);
            self.http.get(url)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn link(href: &str) -> Option<PaginationLink> {
        Some(PaginationLink {
            href: Some(href.to_owned()),
        })
    }

    fn page(items: &[i64], next: Option<&str>) -> Page<i64> {
        Page {
            items: items.to_vec(),
            total_count: Some(5),
            next: next.and_then(link),
            ..Default::default()
        }
    }

    #[test]
    fn offset_from_absolute_and_relative_links() {
        assert_eq!(
            link("https://us-south.apprapp.cloud.ibm.com/apprapp/feature/v1/instances/x/segments?limit=10&offset=20")
                .unwrap()
                .offset(),
            Some(20)
        );
        assert_eq!(
            link("/apprapp/feature/v1/instances/x/segments?offset=3&limit=1")
                .unwrap()
                .offset(),
            Some(3)
        );
        assert_eq!(link("/segments?limit=1").unwrap().offset(), None);
        assert_eq!(link("/segments?offset=abc").unwrap().offset(), None);
        assert_eq!(PaginationLink { href: None }.offset(), None);
    }

    #[test]
    fn page_parses_any_collection_key() {
        let page: Page<Environment> = serde_json::from_str(
            r#"{"environments":[{"name":"Dev","environment_id":"dev"}],"limit":10,"offset":0,"total_count":1,
                "first":{"href":"https://x/environments?offset=0"},"last":{"href":"https://x/environments?offset=0"}}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].environment_id.as_deref(), Some("dev"));
        assert_eq!(page.total_count, Some(1));
        assert!(page.next.is_none());

        let page: Page<Property> =
            serde_json::from_str(r#"{"properties":[],"total_count":0}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn list_all_follows_next_links() {
        let calls = RefCell::new(Vec::new());
        let result = list_all(&ListOptions::default(), |limit, offset| {
            calls.borrow_mut().push((limit, offset));
            let page = match offset {
                0 => page(&[1, 2], Some("/x?offset=2&limit=2")),
                2 => page(&[3, 4], Some("/x?offset=4&limit=2")),
                _ => page(&[5], None),
            };
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.into_inner(), vec![(10, 0), (10, 2), (10, 4)]);
    }

    #[tokio::test]
    async fn list_all_fetches_a_single_page_with_limit() {
        let options = ListOptions {
            limit: Some(2),
            offset: Some(4),
            ..Default::default()
        };
        let calls = RefCell::new(Vec::new());
        let result = list_all(&options, |limit, offset| {
            calls.borrow_mut().push((limit, offset));
            let page = page(&[5, 6], Some("/x?offset=6&limit=2"));
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![5, 6]);
        assert_eq!(calls.into_inner(), vec![(2, 4)]);
    }

    #[tokio::test]
    async fn list_all_stops_on_zero_or_backward_offset() {
        let result = list_all(&ListOptions::default(), |_, offset| {
            let page = if offset == 0 {
                page(&[1], Some("/x?offset=0"))
            } else {
                page(&[], None)
            };
            async move { Ok(page) }
        })
        .await
        .unwrap();
        assert_eq!(result.items, vec![1]);

        let options = ListOptions {
            offset: Some(5),
            ..Default::default()
        };
        let result = list_all(&options, |_, _| {
            let page = page(&[7], Some("/x?offset=1"));
            async move { Ok(page) }
        })
        .await
        .unwrap();
        assert_eq!(result.items, vec![7]);
    }

    #[test]
    fn list_options_query() {
        let options = ListOptions {
            expand: Some(true),
            tags: Some("prod".to_owned()),
            collections: vec!["web".to_owned(), "mobile".to_owned()],
            include: vec!["rules".to_owned()],
            ..Default::default()
        };
        let mut url = Url::parse("https://x/properties").unwrap();
        options.apply(&mut url, 10, 20);
        assert_eq!(
            url.query(),
            Some("expand=true&tags=prod&collections=web%2Cmobile&include=rules&limit=10&offset=20")
        );
    }

    #[test]
    fn request_body_skips_server_fields() {
        let property = Property {
            name: Some("Timeout".to_owned()),
            property_id: Some("timeout".to_owned()),
            value_type: Some("NUMERIC".to_owned()),
            value: Some(serde_json::json!(30)),
            collections: Some(vec![CollectionRef {
                collection_id: "web".to_owned(),
                name: Some("Web".to_owned()),
            }]),
            href: Some("https://x".to_owned()),
            created_time: Some("2021-01-01T00:00:00Z".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            serde_json::json!({
                "name": "Timeout",
                "property_id": "timeout",
                "type": "NUMERIC",
                "value": 30,
                "collections": [{"collection_id": "web"}],
            })
        );
    }
}
