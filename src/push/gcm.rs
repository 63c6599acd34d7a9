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

use crate::client::push::GcmCredentials;
use crate::client::{is_not_found, SessionHandle};
use crate::utils::{
    attribute, changed, get_string, merge_string, report_error, sensitive, string_value,
    OrDiagnostic, WithSchema,
};

use super::push_client;

const SERVICE_INSTANCE_GUID_DESCRIPTION: &str = "Instance guid of the push notifications instance";
const SENDER_ID_DESCRIPTION: &str = "Sender ID or Project Number from the Google Developer Console";
const SERVER_KEY_DESCRIPTION: &str = "Server key/Legacy server key for the Sender ID";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcmState<'a> {
    pub id: ValueString<'a>,
    pub service_instance_guid: ValueString<'a>,
    pub sender_id: ValueString<'a>,
    pub server_key: ValueString<'a>,
}

impl<'a> WithSchema for GcmState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the settings, the service instance guid."),
                    "service_instance_guid" => attribute(AttributeType::String, AttributeConstraint::Required, SERVICE_INSTANCE_GUID_DESCRIPTION),
                    "sender_id" => attribute(AttributeType::String, AttributeConstraint::Required, SENDER_ID_DESCRIPTION),
                    "server_key" => sensitive(attribute(AttributeType::String, AttributeConstraint::Optional, SERVER_KEY_DESCRIPTION)),
                },
                description: Description::plain("GCM settings of a Push Notifications application"),
                ..Default::default()
            },
        }
    }
}

impl<'a> GcmState<'a> {
    fn to_credentials(&self) -> GcmCredentials {
        GcmCredentials {
            api_key: get_string(&self.server_key).unwrap_or_default(),
            sender_id: get_string(&self.sender_id).unwrap_or_default(),
        }
    }

    fn apply(&mut self, credentials: GcmCredentials) {
        merge_string(&mut self.server_key, Some(credentials.api_key));
        merge_string(&mut self.sender_id, Some(credentials.sender_id));
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcmDataSourceState<'a> {
    pub id: ValueString<'a>,
    pub service_instance_guid: ValueString<'a>,
    pub sender_id: ValueString<'a>,
    pub server_key: ValueString<'a>,
}

impl<'a> WithSchema for GcmDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Id of the settings, the service instance guid."),
                    "service_instance_guid" => attribute(AttributeType::String, AttributeConstraint::Required, SERVICE_INSTANCE_GUID_DESCRIPTION),
                    "sender_id" => attribute(AttributeType::String, AttributeConstraint::Computed, SENDER_ID_DESCRIPTION),
                    "server_key" => sensitive(attribute(AttributeType::String, AttributeConstraint::Computed, SERVER_KEY_DESCRIPTION)),
                },
                description: Description::plain("Read the GCM settings of a Push Notifications application"),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct PnApplicationGcmResource {
    session: SessionHandle,
}

impl PnApplicationGcmResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    async fn save<'a>(
        &self,
        diags: &mut Diagnostics,
        state: GcmState<'a>,
        summary: &str,
    ) -> Option<GcmState<'a>> {
        let guid = get_string(&state.service_instance_guid).unwrap_or_default();
        let client = push_client(&self.session, diags).await?;

        client
            .save_gcm_conf(&guid, &state.to_credentials())
            .await
            .or_diagnostic(diags, summary)?;

        let mut state = state;
        state.id = Value::Value(Cow::Owned(guid));
        Some(state)
    }
}

#[async_trait]
impl Resource for PnApplicationGcmResource {
    type State<'a> = GcmState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(GcmState::schema())
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
        let guid = state.id.as_str().to_owned();
        let client = push_client(&self.session, diags).await?;

        match client.get_gcm_conf(&guid).await {
            Ok(credentials) => {
                let mut state = state;
                state.service_instance_guid = Value::Value(Cow::Owned(guid));
                state.apply(credentials);
                Some((state, private_state))
            }
            Err(err) if is_not_found(&err) => {
                tracing::warn!("GCM settings of {guid} not found, removing them from state");
                None
            }
            Err(err) => {
                report_error(diags, "Failed to read GCM settings", &err);
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
        let mut state = proposed_state;
        state.id = state.service_instance_guid.clone();

        Some((state, Default::default()))
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
            "service_instance_guid",
            &prior_state.service_instance_guid,
            &proposed_state.service_instance_guid,
        )]);

        let mut state = proposed_state;
        state.id = state.service_instance_guid.clone();

        Some((state, prior_private_state, trigger_replace))
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
            .save(diags, planned_state, "Failed to save GCM settings")
            .await?;
        tracing::info!("Saved GCM settings of {}", state.id.as_str());

        Some((state, private_state))
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
        if planned_state.sender_id == prior_state.sender_id
            && planned_state.server_key == prior_state.server_key
        {
            return Some((planned_state, private_state));
        }
        let state = self
            .save(diags, planned_state, "Failed to update GCM settings")
            .await?;

        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let guid = state.id.as_str();
        let client = push_client(&self.session, diags).await?;

        match client.delete_gcm_conf(guid).await {
            Ok(()) => Some(()),
            Err(err) if is_not_found(&err) => {
                tracing::warn!("GCM settings of {guid} were already deleted");
                Some(())
            }
            Err(err) => {
                report_error(diags, "Failed to delete GCM settings", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = GcmState {
            id: Value::Value(Cow::Owned(id.clone())),
            service_instance_guid: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };

        Some((state, Default::default()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct PnApplicationGcmDataSource {
    session: SessionHandle,
}

impl PnApplicationGcmDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for PnApplicationGcmDataSource {
    type State<'a> = GcmDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(GcmDataSourceState::schema())
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
        let guid = get_string(&config.service_instance_guid).unwrap_or_default();
        let client = push_client(&self.session, diags).await?;

        let credentials = client
            .get_gcm_conf(&guid)
            .await
            .or_diagnostic(diags, "Failed to read GCM settings")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(guid));
        state.sender_id = string_value(Some(credentials.sender_id));
        state.server_key = string_value(Some(credentials.api_key));

        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_server_key_is_sent_empty() {
        let state = GcmState {
            service_instance_guid: Value::Value(Cow::Borrowed("guid")),
            sender_id: Value::Value(Cow::Borrowed("1234")),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(state.to_credentials()).unwrap(),
            serde_json::json!({"apiKey": "", "senderId": "1234"})
        );
    }

    #[test]
    fn read_back_empty_key_is_null() {
        let mut state = GcmState::default();
        state.apply(GcmCredentials {
            api_key: String::new(),
            sender_id: "1234".to_owned(),
        });
        assert_eq!(state.server_key, Value::Null);
        assert_eq!(state.sender_id, Value::Value(Cow::Borrowed("1234")));
    }

    #[test]
    fn server_key_is_sensitive() {
        assert!(GcmState::schema().block.attributes["server_key"].sensitive);
        assert!(GcmDataSourceState::schema().block.attributes["server_key"].sensitive);
    }
}
