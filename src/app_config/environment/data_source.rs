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

use super::state::{EnvironmentDataSourceState, EnvironmentsDataSourceState};

#[derive(Debug, Default, Clone)]
pub struct AppConfigEnvironmentDataSource {
    session: SessionHandle,
}

impl AppConfigEnvironmentDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for AppConfigEnvironmentDataSource {
    type State<'a> = EnvironmentDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(EnvironmentDataSourceState::schema())
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

        let environment = client
            .get_environment(&environment_id, get_bool(&config.expand))
            .await
            .or_diagnostic(diags, "Failed to read environment")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(format!("{guid}/{environment_id}")));
        state.apply(environment);

        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AppConfigEnvironmentsDataSource {
    session: SessionHandle,
}

impl AppConfigEnvironmentsDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for AppConfigEnvironmentsDataSource {
    type State<'a> = EnvironmentsDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(EnvironmentsDataSourceState::schema())
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
        let client = app_config_client(&self.session, diags, &guid).await?;

        let options = ListOptions {
            expand: get_bool(&config.expand),
            sort: get_string(&config.sort),
            tags: get_string(&config.tags),
            include: get_strings(&config.includes),
            limit: get_number(&config.limit),
            offset: get_number(&config.offset),
            ..Default::default()
        };
        let page = client
            .list_environments(&options)
            .await
            .or_diagnostic(diags, "Failed to list environments")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(guid));
        state.environments = store_page(&mut state, page);

        Some(state)
    }
}
