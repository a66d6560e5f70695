// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the controller.
//!
//! # Types
//!
//! - [`GroupId`], [`SceneId`] - Bridge resource identifiers
//! - [`Credential`] - Bridge username produced by pairing
//! - [`CommandId`] - Correlation id for a trigger invocation
//! - [`LightSample`] - A light's chromaticity and brightness within a scene
//! - [`RgbColor`] - Display color computed from a sample

mod ids;
mod light_sample;
mod rgb_color;

pub use ids::{CommandId, Credential, GroupId, SceneId};
pub use light_sample::{Chromaticity, LightSample, MAX_BRIDGE_BRIGHTNESS};
pub use rgb_color::RgbColor;
