// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene command dispatch.
//!
//! Each accepted invocation becomes one detached task that optionally sleeps
//! and then issues exactly one group-state push. Tasks are independent: they
//! are never coalesced, cancelled or retried, and they keep running across
//! reconfiguration with the session they were scheduled against.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::bridge::BridgeClient;
use crate::error::DispatchError;
use crate::event::{ControllerEvent, EventBus};
use crate::scene::SceneCatalog;
use crate::session::Session;
use crate::types::CommandId;

/// Transition used when the invocation does not set one.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(400);

/// One request to recall a scene.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hue_trigger::dispatch::{DEFAULT_TRANSITION, TriggerInvocation};
///
/// let invocation = TriggerInvocation::new("Relax").with_delay(Duration::from_millis(250));
/// assert_eq!(invocation.transition, DEFAULT_TRANSITION);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerInvocation {
    /// Correlates log lines and events for this invocation.
    pub id: CommandId,
    /// Scene name as shown in the Hue app.
    pub scene: String,
    /// Wait before pushing.
    pub delay: Duration,
    /// Bridge transition time.
    pub transition: Duration,
}

impl TriggerInvocation {
    /// Creates an immediate invocation with the default transition.
    #[must_use]
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            id: CommandId::new(),
            scene: scene.into(),
            delay: Duration::ZERO,
            transition: DEFAULT_TRANSITION,
        }
    }

    /// Sets the delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the transition.
    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }
}

/// Handle to a scheduled push.
pub type DispatchHandle = JoinHandle<Result<(), DispatchError>>;

/// Schedules scene pushes on a tokio runtime.
#[derive(Debug)]
pub struct CommandDispatcher<C: BridgeClient> {
    client: Arc<C>,
    runtime: Handle,
    events: EventBus,
}

impl<C: BridgeClient> CommandDispatcher<C> {
    /// Creates a dispatcher that spawns onto `runtime`.
    #[must_use]
    pub fn new(client: Arc<C>, runtime: Handle, events: EventBus) -> Self {
        Self {
            client,
            runtime,
            events,
        }
    }

    /// Validates `invocation` and schedules its push.
    ///
    /// The returned handle resolves once the push was attempted. Dropping it
    /// does not cancel the push.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotReady`] without a session,
    /// [`DispatchError::NoGroupConfigured`] without a group and
    /// [`DispatchError::UnknownScene`] if the name is not in `catalog`. No
    /// push is issued in any of these cases.
    pub fn dispatch(
        &self,
        session: Option<&Session<C::Session>>,
        catalog: &SceneCatalog,
        invocation: TriggerInvocation,
    ) -> Result<DispatchHandle, DispatchError> {
        let Some(session) = session else {
            tracing::warn!(scene = %invocation.scene, "Hue session not ready, dropping scene");
            return Err(DispatchError::NotReady);
        };

        let Some(group) = catalog.group() else {
            tracing::error!("No Hue group configured");
            return Err(DispatchError::NoGroupConfigured);
        };

        let Some(entry) = catalog.get(&invocation.scene) else {
            tracing::warn!(
                command_id = %invocation.id,
                scene = %invocation.scene,
                "Unknown Hue scene"
            );
            return Err(DispatchError::UnknownScene {
                name: invocation.scene,
            });
        };

        tracing::info!(
            command_id = %invocation.id,
            scene = %invocation.scene,
            delay_ms = invocation.delay.as_millis(),
            transition_ms = invocation.transition.as_millis(),
            "HUE: SET SCENE"
        );

        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let handle = session.handle().clone();
        let group = group.clone();
        let scene_id = entry.id.clone();

        Ok(self.runtime.spawn(async move {
            if !invocation.delay.is_zero() {
                tokio::time::sleep(invocation.delay).await;
            }

            match client
                .push_group_state(&handle, &group, &scene_id, invocation.transition)
                .await
            {
                Ok(()) => {
                    tracing::debug!(command_id = %invocation.id, "Scene pushed");
                    Ok(())
                }
                Err(source) => {
                    tracing::warn!(
                        command_id = %invocation.id,
                        scene = %invocation.scene,
                        group = %group,
                        error = %source,
                        "Hue scene push failed"
                    );
                    events.publish(ControllerEvent::push_failed(
                        invocation.id,
                        invocation.scene.clone(),
                        source.to_string(),
                    ));
                    Err(DispatchError::PushFailed {
                        scene: invocation.scene,
                        group: group.to_string(),
                        source,
                    })
                }
            }
        }))
    }
}
