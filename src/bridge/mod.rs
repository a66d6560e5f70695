// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge client abstraction.
//!
//! The controller talks to the bridge only through [`BridgeClient`]. The
//! default implementation, [`HttpBridge`], speaks the Hue v1 REST API; tests
//! and embedders can supply their own.
//!
//! Every method is a suspension point. Returned futures are `Send` so the
//! controller can run its pipeline and delayed pushes on spawned tasks.

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
mod wire;

#[cfg(feature = "http")]
pub use http::{HttpBridge, HttpConfig, HueSession};

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::types::{Credential, GroupId, LightSample, SceneId};

/// A bridge found by LAN discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    /// Bridge identifier, if the discovery service reports one.
    pub id: Option<String>,
    /// Reachable IP address or hostname.
    pub host: String,
}

impl DiscoveredBridge {
    /// Creates a discovered bridge entry.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            id: None,
            host: host.into(),
        }
    }

    /// Sets the bridge identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Basic bridge configuration returned by the connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeInfo {
    /// Bridge display name.
    pub name: String,
    /// IP address reported by the bridge.
    pub ip_address: String,
}

/// Summary entry from the scene listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    /// Scene identifier.
    pub id: SceneId,
    /// Scene name as shown in the Hue app.
    pub name: String,
    /// Owning group; `None` for light scenes.
    pub group: Option<GroupId>,
}

/// Full scene detail including per-light states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDetail {
    /// Scene identifier.
    pub id: SceneId,
    /// Scene name.
    pub name: String,
    /// Light states in the scene's light order.
    pub light_states: Vec<LightSample>,
}

/// Kind of bridge group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// A physical room.
    Room,
    /// A zone spanning rooms.
    Zone,
    /// A plain light group.
    LightGroup,
    /// An entertainment area.
    Entertainment,
    /// Anything else the bridge reports.
    Other(String),
}

impl GroupKind {
    /// Parses the bridge's `type` field.
    #[must_use]
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "Room" => Self::Room,
            "Zone" => Self::Zone,
            "LightGroup" => Self::LightGroup,
            "Entertainment" => Self::Entertainment,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room => f.write_str("Room"),
            Self::Zone => f.write_str("Zone"),
            Self::LightGroup => f.write_str("LightGroup"),
            Self::Entertainment => f.write_str("Entertainment"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Summary entry from the group listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group identifier.
    pub id: GroupId,
    /// Group name.
    pub name: String,
    /// Group kind.
    pub kind: GroupKind,
}

/// Network capability the controller needs from a bridge.
///
/// `Session` is the client's own connection handle; the controller treats it
/// as opaque and clones it into delayed tasks.
pub trait BridgeClient: Send + Sync + 'static {
    /// Connection handle produced by `open_*`.
    type Session: Clone + fmt::Debug + Send + Sync + 'static;

    /// Searches the LAN for bridges.
    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredBridge>, BridgeError>> + Send;

    /// Opens a session that can only create users.
    fn open_unauthenticated(
        &self,
        host: &str,
    ) -> impl Future<Output = Result<Self::Session, BridgeError>> + Send;

    /// Opens a session authenticated with `credential`.
    fn open_authenticated(
        &self,
        host: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<Self::Session, BridgeError>> + Send;

    /// Creates a bridge user. Fails with code 101 until the link button is pressed.
    fn create_user(
        &self,
        session: &Self::Session,
        device_type: &str,
    ) -> impl Future<Output = Result<Credential, BridgeError>> + Send;

    /// Fetches the bridge configuration.
    fn get_configuration(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<BridgeInfo, BridgeError>> + Send;

    /// Lists all scenes (summary data only).
    fn list_scenes(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<Vec<SceneSummary>, BridgeError>> + Send;

    /// Fetches one scene with its light states.
    fn get_scene_detail(
        &self,
        session: &Self::Session,
        id: &SceneId,
    ) -> impl Future<Output = Result<SceneDetail, BridgeError>> + Send;

    /// Lists all groups.
    fn list_groups(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<Vec<GroupSummary>, BridgeError>> + Send;

    /// Recalls `scene` on `group` with the given transition.
    fn push_group_state(
        &self,
        session: &Self::Session,
        group: &GroupId,
        scene: &SceneId,
        transition: Duration,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
