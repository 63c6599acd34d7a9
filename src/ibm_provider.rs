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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{AttributeConstraint, AttributeType};
use tf_provider::value::ValueString;
use tf_provider::{map, Block, Description, Diagnostics, Provider, Schema, ValueEmpty};

use crate::app_config::{
    AppConfigEnvironmentDataSource, AppConfigEnvironmentResource, AppConfigEnvironmentsDataSource,
    AppConfigFeatureDataSource, AppConfigFeatureResource, AppConfigFeaturesDataSource,
    AppConfigPropertiesDataSource, AppConfigPropertyDataSource, AppConfigPropertyResource,
    AppConfigSegmentDataSource, AppConfigSegmentResource, AppConfigSegmentsDataSource,
};
use crate::client::{ClientConfig, Session, SessionHandle, DEFAULT_IAM_URL, DEFAULT_REGION};
use crate::push::{
    PnApplicationChromeDataSource, PnApplicationChromeResource, PnApplicationGcmDataSource,
    PnApplicationGcmResource,
};
use crate::utils::{attribute, get_string, sensitive, OrDiagnostic};

const API_KEY_VARS: [&str; 2] = ["IC_API_KEY", "IBMCLOUD_API_KEY"];
const REGION_VARS: [&str; 2] = ["IC_REGION", "IBMCLOUD_REGION"];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbmProviderConfig<'a> {
    pub ibmcloud_api_key: ValueString<'a>,
    pub region: ValueString<'a>,
    pub iam_url: ValueString<'a>,
    pub app_config_endpoint: ValueString<'a>,
    pub push_endpoint: ValueString<'a>,
}

impl<'a> IbmProviderConfig<'a> {
    /// Resolve the configuration, falling back to environment variables
    ///
    /// Returns `None` when no API key is available.
    pub fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Option<ClientConfig> {
        let lookup = |vars: &[&str]| {
            vars.iter()
                .find_map(|var| env(var).filter(|value| !value.is_empty()))
        };

        let api_key = get_string(&self.ibmcloud_api_key)
            .filter(|key| !key.is_empty())
            .or_else(|| lookup(&API_KEY_VARS[..]))?;
        let region = get_string(&self.region)
            .or_else(|| lookup(&REGION_VARS[..]))
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());

        Some(ClientConfig {
            api_key,
            region,
            iam_url: get_string(&self.iam_url).unwrap_or_else(|| DEFAULT_IAM_URL.to_owned()),
            app_config_endpoint: get_string(&self.app_config_endpoint),
            push_endpoint: get_string(&self.push_endpoint),
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct IbmProvider {
    session: SessionHandle,
}

#[async_trait]
impl Provider for IbmProvider {
    type Config<'a> = IbmProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "ibmcloud_api_key" => sensitive(attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "The IBM Cloud API Key. Defaults to the IC_API_KEY or IBMCLOUD_API_KEY environment variables.",
                    )),
                    "region" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "The IBM Cloud region. Defaults to the IC_REGION or IBMCLOUD_REGION environment variables, then `us-south`.",
                    ),
                    "iam_url" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "IAM endpoint used to exchange the API key for a token.",
                    ),
                    "app_config_endpoint" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "App Configuration endpoint. Defaults to the regional endpoint.",
                    ),
                    "push_endpoint" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Push Notifications endpoint. Defaults to the regional endpoint.",
                    ),
                },
                description: Description::plain("IBM Cloud App Configuration and Push Notifications"),
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::Config<'a>) -> Option<()> {
        Some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        tracing::debug!("Configuring provider for Terraform {terraform_version}");

        let Some(config) = config.resolve(|var| std::env::var(var).ok()) else {
            tracing::warn!("No IBM Cloud API key configured");
            return Some(());
        };
        tracing::debug!("Resolved configuration: {config:?}");

        let session = Session::new(config).or_diagnostic(diags, "Failed to configure provider")?;
        self.session.install(session).await;

        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<std::collections::HashMap<String, Box<dyn tf_provider::resource::DynamicResource>>>
    {
        let session = &self.session;
        Some(map! {
            "app_config_environment" => AppConfigEnvironmentResource::new(session.clone()),
            "app_config_property"    => AppConfigPropertyResource::new(session.clone()),
            "app_config_segment"     => AppConfigSegmentResource::new(session.clone()),
            "app_config_feature"     => AppConfigFeatureResource::new(session.clone()),
            "pn_application_chrome"  => PnApplicationChromeResource::new(session.clone()),
            "pn_application_gcm"     => PnApplicationGcmResource::new(session.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<
        std::collections::HashMap<String, Box<dyn tf_provider::data_source::DynamicDataSource>>,
    > {
        let session = &self.session;
        Some(map! {
            "app_config_environment"  => AppConfigEnvironmentDataSource::new(session.clone()),
            "app_config_environments" => AppConfigEnvironmentsDataSource::new(session.clone()),
            "app_config_property"     => AppConfigPropertyDataSource::new(session.clone()),
            "app_config_properties"   => AppConfigPropertiesDataSource::new(session.clone()),
            "app_config_segment"      => AppConfigSegmentDataSource::new(session.clone()),
            "app_config_segments"     => AppConfigSegmentsDataSource::new(session.clone()),
            "app_config_feature"      => AppConfigFeatureDataSource::new(session.clone()),
            "app_config_features"     => AppConfigFeaturesDataSource::new(session.clone()),
            "pn_application_chrome"   => PnApplicationChromeDataSource::new(session.clone()),
            "pn_application_gcm"      => PnApplicationGcmDataSource::new(session.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::collections::HashMap;

    use tf_provider::value::Value;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn api_key_is_required() {
        let config = IbmProviderConfig::default();
        assert!(config.resolve(env(&[])).is_none());
        assert!(config.resolve(env(&[("IC_API_KEY", "")])).is_none());
    }

    #[test]
    fn environment_fallbacks() {
        let config = IbmProviderConfig::default()
            .resolve(env(&[
                ("IBMCLOUD_API_KEY", "second"),
                ("IBMCLOUD_REGION", "eu-de"),
            ]))
            .unwrap();
        assert_eq!(config.api_key, "second");
        assert_eq!(config.region, "eu-de");
        assert_eq!(config.iam_url, DEFAULT_IAM_URL);
        assert_eq!(config.app_config_endpoint(), "https://eu-de.apprapp.cloud.ibm.com");

        let config = IbmProviderConfig::default()
            .resolve(env(&[("IC_API_KEY", "first"), ("IBMCLOUD_API_KEY", "second")]))
            .unwrap();
        assert_eq!(config.api_key, "first");
        assert_eq!(config.region, DEFAULT_REGION);
    }

    #[test]
    fn explicit_configuration_wins() {
        let config = IbmProviderConfig {
            ibmcloud_api_key: Value::Value(Cow::Borrowed("explicit")),
            region: Value::Value(Cow::Borrowed("jp-tok")),
            push_endpoint: Value::Value(Cow::Borrowed("http://127.0.0.1:8080")),
            ..Default::default()
        }
        .resolve(env(&[("IC_API_KEY", "env"), ("IC_REGION", "us-east")]))
        .unwrap();
        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.region, "jp-tok");
        assert_eq!(config.push_endpoint(), "http://127.0.0.1:8080");
    }

    #[test]
    fn registers_every_resource() {
        let provider = IbmProvider::default();
        let mut diags = Diagnostics::default();
        let resources = provider.get_resources(&mut diags).unwrap();
        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        assert_eq!(resources.len(), 6);
        assert_eq!(data_sources.len(), 10);
        assert!(resources.contains_key("app_config_property"));
        assert!(data_sources.contains_key("app_config_properties"));
    }
}
