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

use super::state::SegmentState;

const ID_LAYOUT: &str = "{guid}/{segment_id}";

#[derive(Debug, Default, Clone)]
pub struct AppConfigSegmentResource {
    session: SessionHandle,
}

impl AppConfigSegmentResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Resource for AppConfigSegmentResource {
    type State<'a> = SegmentState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(SegmentState::schema())
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
        let [guid, segment_id] = parse_id(diags, state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        match client.get_segment(&segment_id, &[]).await {
            Ok(segment) => {
                let mut state = state;
                state.guid = Value::Value(Cow::Owned(guid));
                state.apply(segment);
                Some((state, private_state))
            }
            Err(err) if is_not_found(&err) => {
                tracing::warn!(
                    "Segment {} not found, removing it from state",
                    state.id.as_str()
                );
                None
            }
            Err(err) => {
                report_error(diags, "Failed to read segment", &err);
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
                "segment_id",
                &prior_state.segment_id,
                &proposed_state.segment_id,
            ),
        ]);

        let mut state = proposed_state;
        if !trigger_replace.is_empty() {
            state.id = Value::Unknown;
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
            .create_segment(&planned_state.to_segment(false))
            .await
            .or_diagnostic(diags, "Failed to create segment")?;

        let segment_id = created
            .segment_id
            .clone()
            .or_else(|| get_string(&planned_state.segment_id))
            .unwrap_or_default();
        tracing::info!("Created segment {segment_id} in {guid}");

        let mut state = planned_state;
        state.id = Value::Value(Cow::Owned(format!("{guid}/{segment_id}")));
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
        let [guid, segment_id] = parse_id(diags, prior_state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        let updated = client
            .update_segment(&segment_id, &planned_state.to_segment(true))
            .await
            .or_diagnostic(diags, "Failed to update segment")?;

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
        let [guid, segment_id] = parse_id(diags, state.id.as_str(), ID_LAYOUT)?;
        let client = app_config_client(&self.session, diags, &guid).await?;

        match client.delete_segment(&segment_id).await {
            Ok(()) => Some(()),
            Err(err) if is_not_found(&err) => {
                tracing::warn!("Segment {} was already deleted", state.id.as_str());
                Some(())
            }
            Err(err) => {
                report_error(diags, "Failed to delete segment", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [guid, segment_id] = parse_id(diags, &id, ID_LAYOUT)?;

        let state = SegmentState {
            id: Value::Value(Cow::Owned(id)),
            guid: Value::Value(Cow::Owned(guid)),
            segment_id: Value::Value(Cow::Owned(segment_id)),
            ..Default::default()
        };

        Some((state, Default::default()))
    }
}
