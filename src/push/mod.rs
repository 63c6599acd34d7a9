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

use crate::client::{PushClient, SessionHandle};
use crate::utils::OrDiagnostic;

mod chrome;
mod gcm;

pub use chrome::{PnApplicationChromeDataSource, PnApplicationChromeResource};
pub use gcm::{PnApplicationGcmDataSource, PnApplicationGcmResource};

pub(crate) async fn push_client(
    session: &SessionHandle,
    diags: &mut Diagnostics,
) -> Option<PushClient> {
    let session = session
        .get()
        .await
        .or_diagnostic(diags, "Failed to get Push Notifications client")?;
    session
        .push()
        .or_diagnostic(diags, "Failed to get Push Notifications client")
}
