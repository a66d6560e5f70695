// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller event types.

use chrono::{DateTime, Utc};

use crate::session::SessionState;
use crate::types::{CommandId, Credential, GroupId};

/// Events emitted by the controller.
///
/// [`CredentialCreated`](Self::CredentialCreated) is the hook for the
/// configuration collaborator: the controller never writes the new
/// credential anywhere itself.
///
/// # Examples
///
/// ```
/// use hue_trigger::event::ControllerEvent;
/// use hue_trigger::types::Credential;
///
/// let event = ControllerEvent::credential_created(Credential::new("abc"), "192.168.1.2");
/// assert!(event.is_credential_created());
/// ```
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The session lifecycle moved to a new state.
    StateChanged {
        /// The new state.
        state: SessionState,
    },

    /// Pairing produced a new credential that should be persisted.
    CredentialCreated {
        /// The new bridge username.
        credential: Credential,
        /// Host of the bridge that issued it.
        bridge_host: String,
        /// When pairing completed.
        created_at: DateTime<Utc>,
    },

    /// A new scene catalog was published.
    CatalogRebuilt {
        /// The configured group, if any.
        group: Option<GroupId>,
        /// Number of scenes in the catalog.
        scene_count: usize,
    },

    /// A scene push failed and was dropped.
    PushFailed {
        /// The invocation that failed.
        command_id: CommandId,
        /// Requested scene name.
        scene: String,
        /// Rendered error.
        error: String,
    },
}

impl ControllerEvent {
    /// Returns `true` if this is a credential event.
    #[must_use]
    pub fn is_credential_created(&self) -> bool {
        matches!(self, Self::CredentialCreated { .. })
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(state: SessionState) -> Self {
        Self::StateChanged { state }
    }

    /// Creates a credential event stamped with the current time.
    #[must_use]
    pub fn credential_created(credential: Credential, bridge_host: impl Into<String>) -> Self {
        Self::CredentialCreated {
            credential,
            bridge_host: bridge_host.into(),
            created_at: Utc::now(),
        }
    }

    /// Creates a catalog rebuilt event.
    #[must_use]
    pub fn catalog_rebuilt(group: Option<GroupId>, scene_count: usize) -> Self {
        Self::CatalogRebuilt { group, scene_count }
    }

    /// Creates a push failed event.
    #[must_use]
    pub fn push_failed(command_id: CommandId, scene: impl Into<String>, error: impl Into<String>) -> Self {
        Self::PushFailed {
            command_id,
            scene: scene.into(),
            error: error.into(),
        }
    }
}
