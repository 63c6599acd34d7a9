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

use serde_json::json;
use terraform_provider_ibm::client::{ClientConfig, Session};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const TOKEN: &str = "test-token";
pub const GUID: &str = "36401ffc-6280-459a-ba98-456aba10d0c7";

/// Session pointing every endpoint at the mock server
pub fn session(server: &MockServer) -> Session {
    Session::new(ClientConfig {
        api_key: API_KEY.to_owned(),
        region: "us-south".to_owned(),
        iam_url: server.uri(),
        app_config_endpoint: Some(server.uri()),
        push_endpoint: Some(server.uri()),
    })
    .unwrap()
}

/// Answer IAM token requests, expecting exactly `times` exchanges
pub async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "refresh_token": "not-used",
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(times)
        .mount(server)
        .await;
}

pub fn instance_path(suffix: &str) -> String {
    format!("/apprapp/feature/v1/instances/{GUID}/{suffix}")
}
