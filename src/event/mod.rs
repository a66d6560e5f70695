// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for controller lifecycle notifications.
//!
//! The [`EventBus`] uses tokio's broadcast channel so the surrounding system
//! (configuration persistence, status displays) can observe the controller
//! without being part of its pipeline.

mod controller_event;
mod event_bus;

pub use controller_event::ControllerEvent;
pub use event_bus::EventBus;
