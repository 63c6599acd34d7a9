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

use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::app_config::{app_config_client, parse_id};
use crate::client::{is_not_found, SessionHandle};
use crate::utils::{
    changed, get_string, mark_unknown, report_error, OrDiagnostic, WithNormalize, WithSchema,
};

use super::state::EnvironmentState;

const ID_LAYOUT: &str = "{guid}/{environment_id}";

#[derive(Debug, Default, Clone)]
pub struct AppConfigEnvironmentResource {
    session: SessionHandle,
}

impl AppConfigEnvironmentResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Resource for AppConfigEnvironmentResource {
    type State<'a> = EnvironmentState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(EnvironmentState::schema())
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
        let [guid, environment_id] = parse_id(diags, state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        match client.get_environment(&environment_id, None).await {
            Ok(environment) => {
                let mut state = state;
                state.guid = Value::Value(Cow::Owned(guid));
                state.environment_id = Value::Value(Cow::Owned(environment_id));
                state.apply(environment);
                Some((state, private_state))
            }
            Err(err) if is_not_found(&err) => {
                tracing::warn!(
                    "Environment {} not found, removing it from state",
                    state.id.as_str()
                );
                None
            }
            Err(err) => {
                report_error(diags, "Failed to read environment", &err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        state.id = Value::Unknown;
        state.normalize(diags);

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
        let trigger_replace = changed(&[
            ("guid", &prior_state.guid, &proposed_state.guid),
            (
                "environment_id",
                &prior_state.environment_id,
                &proposed_state.environment_id,
            ),
        ]);

        let mut state = proposed_state;
        if !trigger_replace.is_empty() {
            state.id = Value::Unknown;
        }
        if state.color_code.is_null() {
            mark_unknown(&mut state.color_code);
        }
        if state.differs(&prior_state) {
            mark_unknown(&mut state.updated_time);
        }

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
        let guid = get_string(&planned_state.guid).unwrap_or_default();
        let client = app_config_client(&self.session, diags, &guid).await?;

        let created = client
            .create_environment(&planned_state.to_environment(false))
            .await
            .or_diagnostic(diags, "Failed to create environment")?;

        let environment_id = created
            .environment_id
            .clone()
            .or_else(|| get_string(&planned_state.environment_id))
            .unwrap_or_default();
        tracing::info!("Created environment {environment_id} in {guid}");

        let mut state = planned_state;
        state.id = Value::Value(Cow::Owned(format!("{guid}/{environment_id}")));
        state.apply(created);

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
        let [guid, environment_id] = parse_id(diags, prior_state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        let updated = client
            .update_environment(&environment_id, &planned_state.to_environment(true))
            .await
            .or_diagnostic(diags, "Failed to update environment")?;

        let mut state = planned_state;
        state.id = prior_state.id;
        state.apply(updated);

        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let [guid, environment_id] = parse_id(diags, state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        match client.delete_environment(&environment_id).await {
            Ok(()) => Some(()),
            Err(err) if is_not_found(&err) => {
                tracing::warn!("Environment {} was already deleted", state.id.as_str());
                Some(())
            }
            Err(err) => {
                report_error(diags, "Failed to delete environment", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [guid, environment_id] = parse_id(diags, &id, ID_LAYOUT)?;

        let state = EnvironmentState {
            id: Value::Value(Cow::Owned(id)),
            guid: Value::Value(Cow::Owned(guid)),
            environment_id: Value::Value(Cow::Owned(environment_id)),
            ..Default::default()
        };

        Some((state, Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::testing::{instance_path, mock_session, GUID};

    use super::*;

    fn dev_state<'a>() -> EnvironmentState<'a> {
        EnvironmentState {
            id: Value::Value(Cow::Owned(format!("{GUID}/dev"))),
            guid: Value::Value(Cow::Borrowed(GUID)),
            environment_id: Value::Value(Cow::Borrowed("dev")),
            name: Value::Value(Cow::Borrowed("Dev")),
            description: Value::Value(Cow::Borrowed("Development")),
            color_code: Value::Value(Cow::Borrowed("#FDD13A")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn read_drops_missing_environment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(instance_path("environments/dev")))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        let resource = AppConfigEnvironmentResource::new(mock_session(&server).await);

        let mut diags = Diagnostics::default();
        let state = resource
            .read(&mut diags, dev_state(), ValueEmpty::default(), ValueEmpty::default())
            .await;
        assert!(state.is_none());
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn update_clears_description() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(instance_path("environments/dev")))
            .and(body_partial_json(json!({"name": "Dev", "description": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Dev",
                "environment_id": "dev",
                "color_code": "#FDD13A",
                "created_time": "2021-05-12T06:12:36Z",
                "updated_time": "2021-05-13T08:01:42Z",
            })))
            .expect(1)
            .mount(&server)
            .await;
        let resource = AppConfigEnvironmentResource::new(mock_session(&server).await);

        let mut planned = dev_state();
        planned.description = Value::Null;
        planned.updated_time = Value::Unknown;

        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .update(
                &mut diags,
                dev_state(),
                planned.clone(),
                planned,
                ValueEmpty::default(),
                ValueEmpty::default(),
            )
            .await
            .unwrap();
        assert!(diags.errors.is_empty());
        assert!(state.description.is_null());
        assert_eq!(
            state.updated_time,
            Value::Value(Cow::Borrowed("2021-05-13T08:01:42Z"))
        );
    }

    #[tokio::test]
    async fn destroy_accepts_missing_environment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(instance_path("environments/dev")))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        let resource = AppConfigEnvironmentResource::new(mock_session(&server).await);

        let mut diags = Diagnostics::default();
        let deleted = resource
            .destroy(&mut diags, dev_state(), ValueEmpty::default())
            .await;
        assert_eq!(deleted, Some(()));
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_error() {
        let resource = AppConfigEnvironmentResource::default();

        let mut diags = Diagnostics::default();
        let state = resource
            .read(&mut diags, dev_state(), ValueEmpty::default(), ValueEmpty::default())
            .await;
        assert!(state.is_none());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "Failed to get App Configuration client");
        assert!(diags.errors[0].detail.contains("ibmcloud_api_key"));
    }
}
