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

use reqwest::Client;
use serde_json::json;
use terraform_provider_ibm::client::{ApiError, IamAuthenticator};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{mount_token, API_KEY, TOKEN};

#[tokio::test]
async fn exchanges_api_key_for_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey",
        ))
        .and(body_string_contains(format!("apikey={API_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expiration": 4_102_444_800i64,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = IamAuthenticator::new(Client::new(), &server.uri(), API_KEY).unwrap();
    assert_eq!(auth.token().await.unwrap(), TOKEN);
}

#[tokio::test]
async fn token_is_cached() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let auth = IamAuthenticator::new(Client::new(), &server.uri(), API_KEY).unwrap();
    for _ in 0..3 {
        assert_eq!(auth.token().await.unwrap(), TOKEN);
    }
}

#[tokio::test]
async fn expired_token_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 30,
        })))
        .expect(2)
        .mount(&server)
        .await;

    // Lifetime below the refresh margin: every call exchanges the key again
    let auth = IamAuthenticator::new(Client::new(), &server.uri(), API_KEY).unwrap();
    auth.token().await.unwrap();
    auth.token().await.unwrap();
}

#[tokio::test]
async fn rejected_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "BXNIM0415E",
            "errorMessage": "Provided API key could not be found.",
            "message": "Provided API key could not be found.",
        })))
        .mount(&server)
        .await;

    let auth = IamAuthenticator::new(Client::new(), &server.uri(), "wrong").unwrap();
    let err = auth.token().await.unwrap_err();
    let api_error = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.status, 400);
    assert_eq!(api_error.message, "Provided API key could not be found.");
}
