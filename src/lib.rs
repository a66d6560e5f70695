// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hue_trigger` - Recall Philips Hue scenes from a trigger framework.
//!
//! This library connects to a Hue bridge, pairs with it when no credential is
//! configured, and exposes the scenes of one group as a `hue_scene` trigger.
//!
//! # Supported Features
//!
//! - **Bridge resolution**: Static host or LAN discovery
//! - **Pairing**: Waits for the link button and emits the new credential
//! - **Scene catalog**: Name lookup plus a CSS color preview per scene
//! - **Dispatch**: Delayed scene recall with a configurable transition
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hue_trigger::bridge::HttpBridge;
//! use hue_trigger::dispatch::TriggerInvocation;
//! use hue_trigger::event::ControllerEvent;
//! use hue_trigger::{Controller, ControllerConfig};
//!
//! #[tokio::main]
//! async fn main() -> hue_trigger::Result<()> {
//!     let controller = Controller::new(Arc::new(HttpBridge::new()?))?;
//!
//!     // Persist the credential the first time pairing succeeds
//!     let mut events = controller.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let ControllerEvent::CredentialCreated { credential, .. } = event {
//!                 println!("save user {}", credential.expose());
//!             }
//!         }
//!     });
//!
//!     controller
//!         .update_config(ControllerConfig::discover().with_group("1"))
//!         .await?;
//!
//!     let push = controller.trigger(TriggerInvocation::new("Relax"))?;
//!     let _ = push.await;
//!     Ok(())
//! }
//! ```
//!
//! ## Registering with a Trigger Framework
//!
//! ```
//! use hue_trigger::trigger::{TriggerCallback, TriggerRegistry, TriggerSpec};
//!
//! #[derive(Default)]
//! struct Registry(Vec<(TriggerSpec, TriggerCallback)>);
//!
//! impl TriggerRegistry for Registry {
//!     fn register_trigger(&mut self, spec: TriggerSpec, callback: TriggerCallback) {
//!         self.0.push((spec, callback));
//!     }
//! }
//! ```
//!
//! Pass the registry to [`Controller::register_triggers`]; the framework then
//! calls the callback with `hue_scene[scene, delay, transition]` arguments.

pub mod bridge;
pub mod color;
mod config;
mod controller;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod scene;
pub mod session;
pub mod trigger;
pub mod types;

pub use config::{ControllerConfig, DEFAULT_DEVICE_TYPE};
pub use controller::{Controller, ControllerBuilder, ControllerSnapshot};
pub use dispatch::{DispatchHandle, TriggerInvocation};
pub use error::{
    ApiError, BridgeError, ConfigError, DispatchError, Error, FetchError, Result, TriggerError,
};
pub use scene::{SceneCatalog, SceneEntry};
pub use session::{PairingPolicy, SessionState};
pub use types::{CommandId, Credential, GroupId, LightSample, RgbColor, SceneId};
