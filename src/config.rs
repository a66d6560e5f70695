// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller configuration.
//!
//! Loading and persisting configuration belongs to the embedding system.
//! [`ControllerConfig`] deserializes from the same camelCase keys the module
//! configuration file uses.

use serde::{Deserialize, Serialize};

use crate::types::{Credential, GroupId};

/// Default `devicetype` sent when creating a bridge user.
pub const DEFAULT_DEVICE_TYPE: &str = "hue_trigger#controller";

/// Configuration applied by [`Controller::update_config`](crate::Controller::update_config).
///
/// # Examples
///
/// ```
/// use hue_trigger::ControllerConfig;
///
/// // Static host with an existing credential
/// let config = ControllerConfig::with_host("192.168.1.2")
///     .with_user("existing-username")
///     .with_group("1");
///
/// // Discover the bridge and pair on first start
/// let config = ControllerConfig::discover().with_group("1");
/// assert!(config.discover_bridge);
///
/// // From the module configuration file
/// let config: ControllerConfig =
///     serde_json::from_str(r#"{"host": "192.168.1.2", "group": "4"}"#).unwrap();
/// assert_eq!(config.group.unwrap().as_str(), "4");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Existing bridge username; pairing runs when absent.
    pub user: Option<Credential>,
    /// Group whose scenes are exposed.
    pub group: Option<GroupId>,
    /// Static bridge host, used when discovery is off.
    pub host: Option<String>,
    /// Find the bridge by LAN discovery instead of `host`.
    pub discover_bridge: bool,
    /// `devicetype` used when pairing.
    pub device_type: Option<String>,
}

impl ControllerConfig {
    /// Creates a configuration for a bridge at a static host.
    #[must_use]
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration that discovers the bridge.
    #[must_use]
    pub fn discover() -> Self {
        Self {
            discover_bridge: true,
            ..Self::default()
        }
    }

    /// Sets the bridge username.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<Credential>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the pairing `devicetype`.
    #[must_use]
    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Returns the pairing `devicetype`.
    #[must_use]
    pub fn device_type(&self) -> &str {
        self.device_type.as_deref().unwrap_or(DEFAULT_DEVICE_TYPE)
    }
}
