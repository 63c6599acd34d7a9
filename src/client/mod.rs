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
use tokio::sync::RwLock;

pub mod app_config;
pub mod http;
pub mod iam;
pub mod push;

pub use app_config::AppConfigClient;
pub use http::{is_not_found, ApiError, HttpClient};
pub use iam::IamAuthenticator;
pub use push::PushClient;

#[cfg(test)]
pub(crate) mod testing;

pub const DEFAULT_REGION: &str = "us-south";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

/// Resolved provider configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub region: String,
    pub iam_url: String,
    pub app_config_endpoint: Option<String>,
    pub push_endpoint: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("region", &self.region)
            .field("iam_url", &self.iam_url)
            .field("app_config_endpoint", &self.app_config_endpoint)
            .field("push_endpoint", &self.push_endpoint)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    pub fn app_config_endpoint(&self) -> String {
        self.app_config_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.apprapp.cloud.ibm.com", self.region))
    }

    pub fn push_endpoint(&self) -> String {
        self.push_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.imfpush.cloud.ibm.com", self.region))
    }
}

/// Authenticated clients shared by every resource of the provider
#[derive(Debug)]
pub struct Session {
    config: ClientConfig,
    http: HttpClient,
}

impl Session {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("Failed to create HTTP client")?;
        let auth = IamAuthenticator::new(client.clone(), &config.iam_url, config.api_key.clone())?;

        Ok(Self {
            config,
            http: HttpClient::new(client, Arc::new(auth)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Client for the App Configuration instance `guid`
    pub fn app_config(&self, guid: &str) -> Result<AppConfigClient> {
        AppConfigClient::new(self.http.clone(), &self.config.app_config_endpoint(), guid)
    }

    pub fn push(&self) -> Result<PushClient> {
        PushClient::new(self.http.clone(), &self.config.push_endpoint())
    }
}

/// Slot filled once the provider has been configured
#[derive(Debug, Default, Clone)]
pub struct SessionHandle(Arc<RwLock<Option<Arc<Session>>>>);

impl SessionHandle {
    pub async fn install(&self, session: Session) {
        *self.0.write().await = Some(Arc::new(session));
    }

    pub async fn get(&self) -> Result<Arc<Session>> {
        self.0
            .read()
            .await
            .clone()
            .context("The provider has not been configured, set `ibmcloud_api_key` or the IC_API_KEY environment variable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            api_key: "secret-key".to_owned(),
            region: "eu-de".to_owned(),
            iam_url: DEFAULT_IAM_URL.to_owned(),
            app_config_endpoint: None,
            push_endpoint: None,
        }
    }

    #[test]
    fn endpoints_follow_region() {
        let config = config();
        assert_eq!(
            config.app_config_endpoint(),
            "https://eu-de.apprapp.cloud.ibm.com"
        );
        assert_eq!(config.push_endpoint(), "https://eu-de.imfpush.cloud.ibm.com");
    }

    #[test]
    fn debug_hides_api_key() {
        assert!(!format!("{:?}", config()).contains("secret-key"));
    }

    #[tokio::test]
    async fn handle_requires_configuration() {
        let handle = SessionHandle::default();
        assert!(handle.get().await.is_err());

        handle.install(Session::new(config()).unwrap()).await;
        let session = handle.get().await.unwrap();
        assert_eq!(session.config().region, "eu-de");
    }
}
