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

use tf_provider::{DataSource, Diagnostics, Schema, Value, ValueEmpty};

use crate::app_config::app_config_client;
use crate::app_config::flatten::store_page;
use crate::client::app_config::ListOptions;
use crate::client::SessionHandle;
use crate::utils::{
    get_bool, get_number, get_string, get_strings, OrDiagnostic, WithSchema,
};

use super::state::{FeaturesDataSourceState, FeatureDataSourceState};

#[derive(Debug, Default, Clone)]
pub struct AppConfigFeatureDataSource {
    session: SessionHandle,
}

impl AppConfigFeatureDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for AppConfigFeatureDataSource {
    type State<'a> = FeatureDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(FeatureDataSourceState::schema())
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
        let guid = get_string(&config.guid).unwrap_or_default();
        let environment_id = get_string(&config.environment_id).unwrap_or_default();
        let feature_id = get_string(&config.feature_id).unwrap_or_default();
        let client = app_config_client(&self.session, diags, &guid).await?;

        let feature = client
            .get_feature(&environment_id, &feature_id, &get_strings(&config.includes))
            .await
            .or_diagnostic(diags, "Failed to read feature flag")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(format!(
            "{guid}/{environment_id}/{feature_id}"
        )));
        state.apply(feature);

        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AppConfigFeaturesDataSource {
    session: SessionHandle,
}

impl AppConfigFeaturesDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for AppConfigFeaturesDataSource {
    type State<'a> = FeaturesDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(FeaturesDataSourceState::schema())
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
        let guid = get_string(&config.guid).unwrap_or_default();
        let environment_id = get_string(&config.environment_id).unwrap_or_default();
        let client = app_config_client(&self.session, diags, &guid).await?;

        let options = ListOptions {
            expand: get_bool(&config.expand),
            sort: get_string(&config.sort),
            tags: get_string(&config.tags),
            collections: get_strings(&config.collections),
            segments: get_strings(&config.segments),
            include: get_strings(&config.includes),
            limit: get_number(&config.limit),
            offset: get_number(&config.offset),
        };
        let page = client
            .list_features(&environment_id, &options)
            .await
            .or_diagnostic(diags, "Failed to list features")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(format!("{guid}/{environment_id}")));
        state.features = store_page(&mut state, page);

        Some(state)
    }
}
