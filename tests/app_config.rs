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

mod common;

use serde_json::json;
use terraform_provider_ibm::client::app_config::{
    CollectionRef, Environment, ListOptions, Property, SegmentRule, TargetSegments,
};
use terraform_provider_ibm::client::is_not_found;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{instance_path, mount_token, session, GUID, TOKEN};

fn environment(id: &str) -> serde_json::Value {
    json!({
        "name": id.to_uppercase(),
        "environment_id": id,
        "tags": "",
        "color_code": "#FDD13A",
        "created_time": "2021-05-26T06:42:48Z",
        "updated_time": "2021-05-26T06:42:48Z",
        "href": format!("https://us-south.apprapp.cloud.ibm.com/apprapp/feature/v1/instances/{GUID}/environments/{id}"),
    })
}

fn link(offset: i64) -> serde_json::Value {
    json!({
        "href": format!("https://us-south.apprapp.cloud.ibm.com/apprapp/feature/v1/instances/{GUID}/environments?limit=10&offset={offset}"),
    })
}

#[tokio::test]
async fn create_property() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(instance_path("environments/dev/properties")))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({
            "name": "Timeout",
            "property_id": "timeout",
            "type": "NUMERIC",
            "value": 30,
            "segment_rules": [{
                "rules": [{"segments": ["beta"]}],
                "value": 60,
                "order": 1,
            }],
            "collections": [{"collection_id": "web"}],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "Timeout",
            "property_id": "timeout",
            "type": "NUMERIC",
            "value": 30,
            "segment_rules": [{
                "rules": [{"segments": ["beta"]}],
                "value": 60,
                "order": 1,
            }],
            "segment_exists": true,
            "collections": [{"collection_id": "web", "name": "Web"}],
            "created_time": "2021-05-26T06:42:48Z",
            "updated_time": "2021-05-26T06:42:48Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let created = client
        .create_property(
            "dev",
            &Property {
                name: Some("Timeout".to_owned()),
                property_id: Some("timeout".to_owned()),
                value_type: Some("NUMERIC".to_owned()),
                value: Some(json!(30)),
                segment_rules: Some(vec![SegmentRule {
                    rules: vec![TargetSegments {
                        segments: vec!["beta".to_owned()],
                    }],
                    value: json!(60),
                    order: 1,
                }]),
                collections: Some(vec![CollectionRef {
                    collection_id: "web".to_owned(),
                    name: None,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(created.segment_exists, Some(true));
    assert_eq!(
        created.collections.unwrap()[0].name.as_deref(),
        Some("Web")
    );
}

#[tokio::test]
async fn update_and_delete_property() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path(instance_path("environments/dev/properties/timeout")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Timeout",
            "property_id": "timeout",
            "type": "NUMERIC",
            "value": 45,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(instance_path("environments/dev/properties/timeout")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let updated = client
        .update_property(
            "dev",
            "timeout",
            &Property {
                name: Some("Timeout".to_owned()),
                value_type: Some("NUMERIC".to_owned()),
                value: Some(json!(45)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.value, Some(json!(45)));

    client.delete_property("dev", "timeout").await.unwrap();
}

#[tokio::test]
async fn missing_property_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(instance_path("environments/dev/properties/gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"code": "not_found", "message": "Requested resource not found"}],
            "trace": "a1b2c3",
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(instance_path("environments/dev/properties/gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();

    let err = client.get_property("dev", "gone", &[]).await.unwrap_err();
    assert!(is_not_found(&err));
    assert!(format!("{err:#}").contains("Requested resource not found"));

    let err = client.delete_property("dev", "gone").await.unwrap_err();
    assert!(is_not_found(&err));
}

#[tokio::test]
async fn other_errors_are_not_not_found() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(instance_path("segments/beta")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let err = client.get_segment("beta", &[]).await.unwrap_err();
    assert!(!is_not_found(&err));
    assert!(format!("{err:#}").contains("internal error"));
}

#[tokio::test]
async fn include_is_forwarded() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(instance_path("environments/dev/features/dark-mode")))
        .and(query_param("include", "collections,rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Dark mode",
            "feature_id": "dark-mode",
            "type": "BOOLEAN",
            "enabled_value": true,
            "disabled_value": false,
            "enabled": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let feature = client
        .get_feature(
            "dev",
            "dark-mode",
            &["collections".to_owned(), "rules".to_owned()],
        )
        .await
        .unwrap();
    assert_eq!(feature.enabled, Some(true));
    assert_eq!(feature.enabled_value, Some(json!(true)));
}

#[tokio::test]
async fn list_follows_next_links() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(instance_path("environments")))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "environments": [environment("dev"), environment("test")],
            "limit": 10,
            "offset": 0,
            "total_count": 3,
            "first": link(0),
            "next": link(10),
            "last": link(10),
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(instance_path("environments")))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "environments": [environment("prod")],
            "limit": 10,
            "offset": 10,
            "total_count": 3,
            "first": link(0),
            "previous": link(0),
            "last": link(10),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let page = client
        .list_environments(&ListOptions::default())
        .await
        .unwrap();

    let ids: Vec<_> = page
        .items
        .iter()
        .filter_map(|environment: &Environment| environment.environment_id.as_deref())
        .collect();
    assert_eq!(ids, ["dev", "test", "prod"]);
    assert_eq!(page.offset, Some(10));
    assert!(page.next.is_none());
    assert!(page.previous.is_some());
}

#[tokio::test]
async fn explicit_limit_fetches_one_page() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(instance_path("environments")))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "4"))
        .and(query_param("sort", "created_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "environments": [environment("dev"), environment("test")],
            "limit": 2,
            "offset": 4,
            "total_count": 10,
            "next": link(6),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let page = client
        .list_environments(&ListOptions {
            sort: Some("created_time".to_owned()),
            limit: Some(2),
            offset: Some(4),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_count, Some(10));
    assert!(page.next.is_some());
}

#[tokio::test]
async fn list_filters_are_sent() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(instance_path("environments/dev/properties")))
        .and(query_param("collections", "web,mobile"))
        .and(query_param("segments", "beta"))
        .and(query_param("expand", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": [{
                "name": "Timeout",
                "property_id": "timeout",
                "type": "NUMERIC",
                "value": 30,
            }],
            "limit": 10,
            "offset": 0,
            "total_count": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).app_config(GUID).unwrap();
    let page = client
        .list_properties(
            "dev",
            &ListOptions {
                expand: Some(true),
                collections: vec!["web".to_owned(), "mobile".to_owned()],
                segments: vec!["beta".to_owned()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].value, Some(json!(30)));
}
