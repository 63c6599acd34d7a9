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
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{ClientConfig, Session, SessionHandle};

pub(crate) const GUID: &str = "36401ffc-6280-459a-ba98-456aba10d0c7";

/// Configured handle whose endpoints all point at `server`
pub(crate) async fn mock_session(server: &MockServer) -> SessionHandle {
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600,
        })))
        .mount(server)
        .await;

    let handle = SessionHandle::default();
    handle
        .install(
            Session::new(ClientConfig {
                api_key: "test-api-key".to_owned(),
                region: "us-south".to_owned(),
                iam_url: server.uri(),
                app_config_endpoint: Some(server.uri()),
                push_endpoint: Some(server.uri()),
            })
            .unwrap(),
        )
        .await;
    handle
}

pub(crate) fn instance_path(suffix: &str) -> String {
    format!("/apprapp/feature/v1/instances/{GUID}/{suffix}")
}
