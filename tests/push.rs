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
use terraform_provider_ibm::client::is_not_found;
use terraform_provider_ibm::client::push::{ChromeWebPushCredentials, GcmCredentials};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{mount_token, session, TOKEN};

#[tokio::test]
async fn save_chrome_web_conf() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/imfpush/v1/apps/app-1/settings/chromeWebConf"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({
            "apiKey": "sender",
            "webSiteUrl": "https://example.com",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiKey": "sender",
            "webSiteUrl": "https://example.com",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).push().unwrap();
    let saved = client
        .save_chrome_web_conf(
            "app-1",
            &ChromeWebPushCredentials {
                api_key: "sender".to_owned(),
                web_site_url: "https://example.com".to_owned(),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.web_site_url, "https://example.com");
}

#[tokio::test]
async fn gcm_conf_lifecycle() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/imfpush/v1/apps/guid-1/settings/gcmConf"))
        .and(body_json(json!({"apiKey": "server-key", "senderId": "1234"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiKey": "server-key",
            "senderId": "1234",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/imfpush/v1/apps/guid-1/settings/gcmConf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiKey": "server-key",
            "senderId": "1234",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/imfpush/v1/apps/guid-1/settings/gcmConf"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server).push().unwrap();
    let credentials = GcmCredentials {
        api_key: "server-key".to_owned(),
        sender_id: "1234".to_owned(),
    };
    client.save_gcm_conf("guid-1", &credentials).await.unwrap();
    assert_eq!(client.get_gcm_conf("guid-1").await.unwrap(), credentials);
    client.delete_gcm_conf("guid-1").await.unwrap();
}

#[tokio::test]
async fn missing_gcm_conf() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/imfpush/v1/apps/guid-1/settings/gcmConf"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "FPWSE0004E",
            "message": "The GCM credentials for application guid-1 are not set.",
        })))
        .mount(&server)
        .await;

    let client = session(&server).push().unwrap();
    let err = client.get_gcm_conf("guid-1").await.unwrap_err();
    assert!(is_not_found(&err));
}
