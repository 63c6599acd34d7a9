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

use super::state::{PropertiesDataSourceState, PropertyDataSourceState};

#[derive(Debug, Default, Clone)]
pub struct AppConfigPropertyDataSource {
    session: SessionHandle,
}

impl AppConfigPropertyDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for AppConfigPropertyDataSource {
    type State<'a> = PropertyDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(PropertyDataSourceState::schema())
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
        let property_id = get_string(&config.property_id).unwrap_or_default();
        let client = app_config_client(&self.session, diags, &guid).await?;

        let property = client
            .get_property(&environment_id, &property_id, &get_strings(&config.includes))
            .await
            .or_diagnostic(diags, "Failed to read property")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(format!(
            "{guid}/{environment_id}/{property_id}"
        )));
        state.apply(property);

        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AppConfigPropertiesDataSource {
    session: SessionHandle,
}

impl AppConfigPropertiesDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for AppConfigPropertiesDataSource {
    type State<'a> = PropertiesDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(PropertiesDataSourceState::schema())
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
            .list_properties(&environment_id, &options)
            .await
            .or_diagnostic(diags, "Failed to list properties")?;

        let mut state = config;
        state.id = Value::Value(Cow::Owned(format!("{guid}/{environment_id}")));
        state.properties = store_page(&mut state, page);

        Some(state)
    }
}
