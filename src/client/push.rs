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

use anyhow::{anyhow, Context, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use super::http::HttpClient;

/// Firebase Cloud Messaging credentials of a push application
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcmCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub sender_id: String,
}

/// Chrome web push credentials of a push application
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeWebPushCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, rename = "webSiteUrl")]
    pub web_site_url: String,
}

impl std::fmt::Debug for GcmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcmCredentials")
            .field("sender_id", &self.sender_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ChromeWebPushCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeWebPushCredentials")
            .field("web_site_url", &self.web_site_url)
            .finish_non_exhaustive()
    }
}

/// Client for the Push Notifications settings API
#[derive(Debug, Clone)]
pub struct PushClient {
    http: HttpClient,
    base: Url,
}

impl PushClient {
    pub fn new(http: HttpClient, endpoint: &str) -> Result<Self> {
        let mut base = Url::parse(endpoint)
            .with_context(|| format!("Invalid Push Notifications endpoint: {endpoint}"))?;
        base.path_segments_mut()
            .map_err(|_| anyhow!("Invalid Push Notifications endpoint: {endpoint}"))?
            .pop_if_empty()
            .extend(["imfpush", "v1", "apps"]);
        Ok(Self { http, base })
    }

    fn settings_url(&self, application_id: &str, settings: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend([application_id, "settings", settings]);
        }
        url
    }

    pub async fn get_gcm_conf(&self, application_id: &str) -> Result<GcmCredentials> {
        self.http
            .get(self.settings_url(application_id, "gcmConf"))
            .await
    }

    pub async fn save_gcm_conf(
        &self,
        application_id: &str,
        credentials: &GcmCredentials,
    ) -> Result<GcmCredentials> {
        self.http
            .send(
                Method::PUT,
                self.settings_url(application_id, "gcmConf"),
                credentials,
            )
            .await
    }

    pub async fn delete_gcm_conf(&self, application_id: &str) -> Result<()> {
        self.http
            .delete(self.settings_url(application_id, "gcmConf"))
            .await
    }

    pub async fn get_chrome_web_conf(
        &self,
        application_id: &str,
    ) -> Result<ChromeWebPushCredentials> {
        self.http
            .get(self.settings_url(application_id, "chromeWebConf"))
            .await
    }

    pub async fn save_chrome_web_conf(
        &self,
        application_id: &str,
        credentials: &ChromeWebPushCredentials,
    ) -> Result<ChromeWebPushCredentials> {
        self.http
            .send(
                Method::PUT,
                self.settings_url(application_id, "chromeWebConf"),
                credentials,
            )
            .await
    }

    pub async fn delete_chrome_web_conf(&self, application_id: &str) -> Result<()> {
        self.http
            .delete(self.settings_url(application_id, "chromeWebConf"))
            .await
    }
}
