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

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use url::Url;

use super::http::ApiError;

const GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this many seconds before they expire
const EXPIRY_MARGIN: i64 = 60;

/// Lifetime assumed when IAM does not say
const DEFAULT_TTL: i64 = 30 * 60;

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    /// Unix timestamp after which the token must not be used anymore
    refresh_at: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expiration: Option<i64>,
    expires_in: Option<i64>,
}

/// Exchanges an IBM Cloud API key for IAM bearer tokens
pub struct IamAuthenticator {
    client: Client,
    token_url: Url,
    api_key: String,
    cache: RwLock<Option<CachedToken>>,
}

impl std::fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

impl IamAuthenticator {
    pub fn new(client: Client, iam_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let mut token_url =
            Url::parse(iam_url).with_context(|| format!("Invalid IAM url: {iam_url}"))?;
        token_url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid IAM url: {iam_url}"))?
            .pop_if_empty()
            .extend(["identity", "token"]);

        Ok(Self {
            client,
            token_url,
            api_key: api_key.into(),
            cache: RwLock::new(None),
        })
    }

    /// Get a valid access token, requesting a new one if needed
    pub async fn token(&self) -> Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        if let Some(cached) = self.cache.read().await.as_ref() {
            if now < cached.refresh_at {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while we were waiting for the lock
        if let Some(cached) = cache.as_ref() {
            if now < cached.refresh_at {
                return Ok(cached.access_token.clone());
            }
        }

        tracing::debug!("Requesting IAM token from {}", self.token_url);
        let response = self
            .client
            .post(self.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to contact IAM")?;

        let status = response.status();
        let body = response.text().await.context("Failed to read IAM response")?;
        if !status.is_success() {
            return Err(ApiError::from_body(status, &body))
                .context("Failed to exchange the API key for an IAM token");
        }

        let token: TokenResponse =
            serde_json::from_str(&body).context("Failed to parse IAM token response")?;
        let expires_at = token
            .expiration
            .or_else(|| token.expires_in.map(|ttl| now + ttl))
            .unwrap_or(now + DEFAULT_TTL);

        let cached = CachedToken {
            access_token: token.access_token,
            refresh_at: expires_at - EXPIRY_MARGIN,
        };
        let access_token = cached.access_token.clone();
        *cache = Some(cached);

        Ok(access_token)
    }
}
