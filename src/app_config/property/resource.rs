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
    WithValidate,
};

use super::state::PropertyState;

const ID_LAYOUT: &str = "{guid}/{environment_id}/{property_id}";

#[derive(Debug, Default, Clone)]
pub struct AppConfigPropertyResource {
    session: SessionHandle,
}

impl AppConfigPropertyResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Resource for AppConfigPropertyResource {
    type State<'a> = PropertyState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(PropertyState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [guid, environment_id, property_id] =
            parse_id(diags, state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        match client
            .get_property(&environment_id, &property_id, &[])
            .await
        {
            Ok(property) => {
                let mut state = state;
                state.guid = Value::Value(Cow::Owned(guid));
                state.environment_id = Value::Value(Cow::Owned(environment_id));
                state.apply(property);
                Some((state, private_state))
            }
            Err(err) if is_not_found(&err) => {
                tracing::warn!(
                    "Property {} not found, removing it from state",
                    state.id.as_str()
                );
                None
            }
            Err(err) => {
                report_error(diags, "Failed to read property", &err);
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
            (
                "property_id",
                &prior_state.property_id,
                &proposed_state.property_id,
            ),
            ("type", &prior_state.value_type, &proposed_state.value_type),
        ]);

        let mut state = proposed_state;
        if !trigger_replace.is_empty() {
            state.id = Value::Unknown;
        }
        if state.differs(&prior_state) {
            mark_unknown(&mut state.segment_exists);
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
        let environment_id = get_string(&planned_state.environment_id).unwrap_or_default();
        let property = planned_state.to_property(diags, false)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        let created = client
            .create_property(&environment_id, &property)
            .await
            .or_diagnostic(diags, "Failed to create property")?;

        let property_id = created
            .property_id
            .clone()
            .or(property.property_id)
            .unwrap_or_default();
        tracing::info!("Created property {property_id} in {guid}/{environment_id}");

        let mut state = planned_state;
        state.id = Value::Value(Cow::Owned(format!(
            "{guid}/{environment_id}/{property_id}"
        )));
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
        let [guid, environment_id, property_id] =
            parse_id(diags, prior_state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        let mut state = planned_state;
        state.id = prior_state.id.clone();

        if state.differs(&prior_state) {
            let property = state.to_property(diags, true)?;
            let updated = client
                .update_property(&environment_id, &property_id, &property)
                .await
                .or_diagnostic(diags, "Failed to update property")?;
            state.apply(updated);
        } else {
            let current = client
                .get_property(&environment_id, &property_id, &[])
                .await
                .or_diagnostic(diags, "Failed to read property")?;
            state.apply(current);
        }

        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let [guid, environment_id, property_id] =
            parse_id(diags, state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        match client.delete_property(&environment_id, &property_id).await {
            Ok(()) => Some(()),
            Err(err) if is_not_found(&err) => {
                tracing::warn!("Property {} was already deleted", state.id.as_str());
                Some(())
            }
            Err(err) => {
                report_error(diags, "Failed to delete property", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [guid, environment_id, property_id] = parse_id(diags, &id, ID_LAYOUT)?;

        let state = PropertyState {
            id: Value::Value(Cow::Owned(id)),
            guid: Value::Value(Cow::Owned(guid)),
            environment_id: Value::Value(Cow::Owned(environment_id)),
            property_id: Value::Value(Cow::Owned(property_id)),
            ..Default::default()
        };

        Some((state, Default::default()))
    }
}
