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

use std::borrow::Cow;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, DataSource, Diagnostics, Resource};

use crate::client::push::ChromeWebPushCredentials;
use crate::client::{is_not_found, SessionHandle};
use crate::utils::{
    attribute, changed, get_string, merge_string, report_error, sensitive, string_value,
    OrDiagnostic, WithSchema,
};

use super::push_client;

const APPLICATION_ID_DESCRIPTION: &str = "Unique guid of the application using the push service.";
const SENDER_ID_DESCRIPTION: &str = "An senderId that gives the push service an authorized access to Google services that is used for Chrome Web Push.";
const WEB_SITE_URL_DESCRIPTION: &str =
    "The URL of the WebSite / WebApp that should be permitted to subscribe to WebPush.";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeState<'a> {
    pub id: ValueString<'a>,
    pub application_id: ValueString<'a>,
    pub sender_id: ValueString<'a>,
    pub web_site_url: ValueString<'a>,
}

impl<'a> ChromeState<'a> {
    fn schema_with(computed: bool, description: &str) -> Schema {
        let constraint = || {
            if computed {
                AttributeConstraint::Computed
            } else {
                AttributeConstraint::Required
            }
        };
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the settings, the application id."),
                    "application_id" => attribute(AttributeType::String, AttributeConstraint::Required, APPLICATION_ID_DESCRIPTION),
                    "sender_id" => sensitive(attribute(AttributeType::String, constraint(), SENDER_ID_DESCRIPTION)),
                    "web_site_url" => attribute(AttributeType::String, constraint(), WEB_SITE_URL_DESCRIPTION),
                },
                description: Description::plain(description),
                ..Default::default()
            },
        }
    }

    fn to_credentials(&self) -> ChromeWebPushCredentials {
        ChromeWebPushCredentials {
            api_key: get_string(&self.sender_id).unwrap_or_default(),
            web_site_url: get_string(&self.web_site_url).unwrap_or_default(),
        }
    }

    fn apply(&mut self, credentials: ChromeWebPushCredentials) {
        merge_string(&mut self.sender_id, Some(credentials.api_key));
        merge_string(&mut self.web_site_url, Some(credentials.web_site_url));
    }
}

/// Credentials in state, as required by the resource
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChromeResourceState<'a>(pub ChromeState<'a>);

impl<'a> WithSchema for ChromeResourceState<'a> {
    fn schema() -> Schema {
        ChromeState::schema_with(
            false,
            "Chrome web push settings of a Push Notifications application",
        )
    }
}

/// Credentials in state, as computed by the data source
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChromeDataSourceState<'a>(pub ChromeState<'a>);

impl<'a> WithSchema for ChromeDataSourceState<'a> {
    fn schema() -> Schema {
        ChromeState::schema_with(
            true,
            "Read the Chrome web push settings of a Push Notifications application",
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct PnApplicationChromeResource {
    session: SessionHandle,
}

impl PnApplicationChromeResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    async fn save<'a>(
        &self,
        diags: &mut Diagnostics,
        state: ChromeState<'a>,
        summary: &str,
    ) -> Option<ChromeState<'a>> {
        let application_id = get_string(&state.application_id).unwrap_or_default();
        let client = push_client(&self.session, diags).await?;

        client
            .save_chrome_web_conf(&application_id, &state.to_credentials())
            .await
            .or_diagnostic(diags, summary)?;

        let mut state = state;
        state.id = Value::Value(Cow::Owned(application_id));
        Some(state)
    }
}

#[async_trait]
impl Resource for PnApplicationChromeResource {
    type State<'a> = ChromeResourceState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ChromeResourceState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let application_id = state.0.id.as_str().to_owned();
        let client = push_client(&self.session, diags).await?;

        match client.get_chrome_web_conf(&application_id).await {
            Ok(credentials) => {
                let mut state = state.0;
                state.application_id = Value::Value(Cow::Owned(application_id));
                state.apply(credentials);
                Some((ChromeResourceState(state), private_state))
            }
            Err(err) if is_not_found(&err) => {
                tracing::warn!(
                    "Chrome web push settings of {application_id} not found, removing them from state"
                );
                None
            }
            Err(err) => {
                report_error(diags, "Failed to read Chrome web push settings", &err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state.0;
        state.id = state.application_id.clone();

        Some((ChromeResourceState(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(
        Self::State<'a>,
        Self::PrivateState<'a>,
        Vec<AttributePath>,
    )> {
        let trigger_replace = changed(&[(
            "application_id",
            &prior_state.0.application_id,
            &proposed_state.0.application_id,
        )]);

        let mut state = proposed_state.0;
        state.id = state.application_id.clone();

        Some((ChromeResourceState(state), prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        _prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        Some(())
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = self
            .save(diags, planned_state.0, "Failed to save Chrome web push settings")
            .await?;
        tracing::info!("Saved Chrome web push settings of {}", state.id.as_str());

        Some((ChromeResourceState(state), private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        if planned_state == prior_state {
            return Some((planned_state, private_state));
        }
        let state = self
            .save(diags, planned_state.0, "Failed to update Chrome web push settings")
            .await?;

        Some((ChromeResourceState(state), private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let application_id = state.0.id.as_str();
        let client = push_client(&self.session, diags).await?;

        match client.delete_chrome_web_conf(application_id).await {
            Ok(()) => Some(()),
            Err(err) if is_not_found(&err) => {
                tracing::warn!("Chrome web push settings of {application_id} were already deleted");
                Some(())
            }
            Err(err) => {
                report_error(diags, "Failed to delete Chrome web push settings", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = ChromeState {
            id: Value::Value(Cow::Owned(id.clone())),
            application_id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };

        Some((ChromeResourceState(state), Default::default()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct PnApplicationChromeDataSource {
    session: SessionHandle,
}

impl PnApplicationChromeDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for PnApplicationChromeDataSource {
    type State<'a> = ChromeDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ChromeDataSourceState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let application_id = get_string(&config.0.application_id).unwrap_or_default();
        let client = push_client(&self.session, diags).await?;

        let credentials = client
            .get_chrome_web_conf(&application_id)
            .await
            .or_diagnostic(diags, "Failed to read Chrome web push settings")?;

        let mut state = config.0;
        state.id = Value::Value(Cow::Owned(application_id));
        state.sender_id = string_value(Some(credentials.api_key));
        state.web_site_url = string_value(Some(credentials.web_site_url));

        Some(ChromeDataSourceState(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_id_is_the_api_key() {
        let state = ChromeState {
            application_id: Value::Value(Cow::Borrowed("app")),
            sender_id: Value::Value(Cow::Borrowed("sender")),
            web_site_url: Value::Value(Cow::Borrowed("https://example.com")),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(state.to_credentials()).unwrap(),
            serde_json::json!({"apiKey": "sender", "webSiteUrl": "https://example.com"})
        );
    }

    #[test]
    fn resource_schema_hides_sender_id() {
        let schema = ChromeResourceState::schema();
        let sender_id = &schema.block.attributes["sender_id"];
        assert!(sender_id.sensitive);
        assert!(matches!(
            sender_id.constraint,
            AttributeConstraint::Required
        ));
        assert!(matches!(
            ChromeDataSourceState::schema().block.attributes["web_site_url"].constraint,
            AttributeConstraint::Computed
        ));
    }
}
