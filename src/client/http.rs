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

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::iam::IamAuthenticator;

/// Longest slice of a response body kept in errors and logs
const MAX_BODY_EXCERPT: usize = 200;

/// Non-success answer from an IBM Cloud API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API request failed with status {status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            errors: Vec<ErrorItem>,
            message: Option<String>,
        }
        #[derive(Deserialize)]
        struct ErrorItem {
            message: Option<String>,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| {
                parsed
                    .errors
                    .into_iter()
                    .find_map(|item| item.message)
                    .or(parsed.message)
            })
            .unwrap_or_else(|| excerpt(body));

        Self { status, message }
    }
}

/// Check if an error was caused by a 404 answer
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(|err| err.status == StatusCode::NOT_FOUND)
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((end, _)) => format!("{}... [truncated, {} bytes total]", &body[..end], body.len()),
        None => body.to_owned(),
    }
}

/// JSON client authenticated with IAM bearer tokens
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    auth: Arc<IamAuthenticator>,
}

impl HttpClient {
    pub fn new(client: Client, auth: Arc<IamAuthenticator>) -> Self {
        Self { client, auth }
    }

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.execute(self.client.request(Method::GET, url)).await?;
        serde_json::from_str(&body).context("Failed to parse response JSON")
    }

    pub async fn send<B, T>(&self, method: Method, url: Url, payload: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .execute(self.client.request(method, url).json(payload))
            .await?;
        if body.trim().is_empty() {
            return serde_json::from_value(serde_json::Value::Null)
                .context("Expected a response body but the API returned none");
        }
        serde_json::from_str(&body).context("Failed to parse response JSON")
    }

    pub async fn delete(&self, url: Url) -> Result<()> {
        self.execute(self.client.request(Method::DELETE, url))
            .await
            .map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let token = self.auth.token().await?;
        let request = request.bearer_auth(token).build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!("{method} {url}");

        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("Failed to send {method} request to {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                tracing::debug!("{method} {url}: not found");
            } else {
                tracing::error!("{method} {url}: {status} - {}", excerpt(&body));
            }
            return Err(ApiError::from_body(status, &body).into());
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_errors_array() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"errors":[{"code":"bad_request","message":"Invalid property type"}],"trace":"x"}"#,
        );
        assert_eq!(err.message, "Invalid property type");
    }

    #[test]
    fn error_message_from_plain_body() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "  upstream down\n");
        assert_eq!(err.message, "upstream down");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.message.starts_with(&"x".repeat(MAX_BODY_EXCERPT)));
        assert!(err.message.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn not_found_survives_context() {
        let err: anyhow::Error = ApiError::from_body(StatusCode::NOT_FOUND, "").into();
        assert!(is_not_found(&err));
        let err = err.context("Failed to read property");
        assert!(is_not_found(&err));

        let err: anyhow::Error = ApiError::from_body(StatusCode::FORBIDDEN, "").into();
        assert!(!is_not_found(&err));
    }
}
