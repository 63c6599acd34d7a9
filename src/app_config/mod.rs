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

use tf_provider::Diagnostics;

use crate::client::{AppConfigClient, SessionHandle};
use crate::utils::OrDiagnostic;

mod environment;
mod feature;
mod flatten;
mod property;
mod segment;
mod value;

pub use environment::{
    AppConfigEnvironmentDataSource, AppConfigEnvironmentResource, AppConfigEnvironmentsDataSource,
};
pub use feature::{AppConfigFeatureDataSource, AppConfigFeatureResource, AppConfigFeaturesDataSource};
pub use property::{
    AppConfigPropertiesDataSource, AppConfigPropertyDataSource, AppConfigPropertyResource,
};
pub use segment::{AppConfigSegmentDataSource, AppConfigSegmentResource, AppConfigSegmentsDataSource};
pub use value::{ValueError, ValueType, VALUE_TYPES};

pub(crate) const GUID_DESCRIPTION: &str = "GUID of the App Configuration service. Get it from the service instance credentials section of the dashboard.";
pub(crate) const INCLUDES_DESCRIPTION: &str =
    "Include the associated collections or targeting rules details in the response.";
pub(crate) const LIMIT_DESCRIPTION: &str = "The number of records to retrieve. By default, the list operation return the first 10 records. To retrieve different set of records, use `limit` with `offset` to page through the available records.";
pub(crate) const OFFSET_DESCRIPTION: &str = "The number of records to skip. By specifying `offset`, you retrieve a subset of items that starts with the `offset` value. Use `offset` with `limit` to page through the available records.";

/// Malformed composite resource id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid id `{id}`, expected `{layout}`")]
pub struct IdError {
    pub id: String,
    pub layout: &'static str,
}

/// Split a composite id into exactly `N` non-empty parts
pub fn split_id<const N: usize>(id: &str, layout: &'static str) -> Result<[String; N], IdError> {
    let parts: Vec<String> = id.split('/').map(str::to_owned).collect();
    if parts.iter().any(String::is_empty) {
        return Err(IdError {
            id: id.to_owned(),
            layout,
        });
    }
    parts.try_into().map_err(|_| IdError {
        id: id.to_owned(),
        layout,
    })
}

pub(crate) fn parse_id<const N: usize>(
    diags: &mut Diagnostics,
    id: &str,
    layout: &'static str,
) -> Option<[String; N]> {
    match split_id(id, layout) {
        Ok(parts) => Some(parts),
        Err(err) => {
            diags.root_error("Invalid resource id", err.to_string());
            None
        }
    }
}

pub(crate) async fn app_config_client(
    session: &SessionHandle,
    diags: &mut Diagnostics,
    guid: &str,
) -> Option<AppConfigClient> {
    let session = session
        .get()
        .await
        .or_diagnostic(diags, "Failed to get App Configuration client")?;
    session
        .app_config(guid)
        .or_diagnostic(diags, "Failed to get App Configuration client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_composite_ids() {
        assert_eq!(
            split_id::<3>("guid/dev/timeout", "{guid}/{environment_id}/{property_id}"),
            Ok(["guid".to_owned(), "dev".to_owned(), "timeout".to_owned()])
        );
        assert_eq!(
            split_id::<2>("guid/segment", "{guid}/{segment_id}"),
            Ok(["guid".to_owned(), "segment".to_owned()])
        );
    }

    #[test]
    fn reject_malformed_ids() {
        let err = split_id::<3>("guid/dev", "{guid}/{environment_id}/{property_id}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid id `guid/dev`, expected `{guid}/{environment_id}/{property_id}`"
        );
        assert!(split_id::<2>("guid//", "{guid}/{segment_id}").is_err());
        assert!(split_id::<2>("guid/a/b", "{guid}/{segment_id}").is_err());
        assert!(split_id::<2>("", "{guid}/{segment_id}").is_err());
    }
}
