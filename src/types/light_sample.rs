// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-light color samples stored in a scene.

use serde::{Deserialize, Serialize};

/// Maximum `bri` value reported by the bridge.
pub const MAX_BRIDGE_BRIGHTNESS: u8 = 254;

/// CIE 1931 chromaticity coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chromaticity {
    /// The `x` coordinate.
    pub x: f64,
    /// The `y` coordinate.
    pub y: f64,
}

impl Chromaticity {
    /// Creates a chromaticity pair.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One light's stored state within a scene.
///
/// `xy` is absent for lights that are off or in color-temperature mode.
/// `brightness` is normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSample {
    /// Chromaticity, if the light has a color.
    pub xy: Option<Chromaticity>,
    /// Brightness in `[0, 1]`.
    pub brightness: f64,
}

impl LightSample {
    /// Creates a sample with chromaticity.
    #[must_use]
    pub const fn new(x: f64, y: f64, brightness: f64) -> Self {
        Self {
            xy: Some(Chromaticity::new(x, y)),
            brightness,
        }
    }

    /// Creates a sample without chromaticity.
    #[must_use]
    pub const fn colorless(brightness: f64) -> Self {
        Self {
            xy: None,
            brightness,
        }
    }

    /// Builds a sample from raw bridge values (`bri` in 0-254).
    ///
    /// A missing `bri` is treated as full brightness.
    #[must_use]
    pub fn from_bridge(xy: Option<[f64; 2]>, bri: Option<u8>) -> Self {
        let brightness = bri.map_or(1.0, |bri| {
            f64::from(bri.min(MAX_BRIDGE_BRIGHTNESS)) / f64::from(MAX_BRIDGE_BRIGHTNESS)
        });
        Self {
            xy: xy.map(|[x, y]| Chromaticity::new(x, y)),
            brightness,
        }
    }
}
