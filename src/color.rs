// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of bridge color samples to display colors.
//!
//! The bridge stores scene colors as CIE xyY (chromaticity plus brightness).
//! For display, each sample is converted to sRGB and a scene is summarized as
//! a CSS `linear-gradient` with one stop per colored light.
//!
//! All functions here are pure and deterministic.
//!
//! # Examples
//!
//! ```
//! use hue_trigger::color::{gradient, sample_to_rgb};
//! use hue_trigger::types::{LightSample, RgbColor};
//!
//! assert_eq!(sample_to_rgb(0.5, 0.4, 0.8), Some(RgbColor::new(255, 180, 96)));
//!
//! let css = gradient(&[LightSample::new(0.5, 0.4, 0.8)]);
//! assert_eq!(css, "linear-gradient(90deg, rgba(255,180,96,1) 0%)");
//! ```

use crate::types::{LightSample, RgbColor};

/// Gradient descriptor used when a scene has no colored lights.
pub const EMPTY_GRADIENT: &str = "none";

/// Linear threshold below which sRGB companding is linear.
const GAMMA_THRESHOLD: f64 = 0.003_130_8;

/// Converts an xyY sample to an sRGB display color.
///
/// Returns `None` for an invalid sample (`y <= 0` or any non-finite input),
/// which would otherwise divide by zero.
///
/// Components are floored, and an out-of-gamut color is scaled down by its
/// largest channel rather than clipped per channel, preserving hue.
#[must_use]
#[allow(clippy::many_single_char_names, clippy::similar_names)]
pub fn sample_to_rgb(x: f64, y: f64, brightness: f64) -> Option<RgbColor> {
    if !(x.is_finite() && y.is_finite() && brightness.is_finite()) || y <= 0.0 {
        return None;
    }

    let big_y = brightness;
    let big_x = big_y / y * x;
    let big_z = big_y / y * (1.0 - x - y);

    let r = big_x * 1.612 - big_y * 0.203 - big_z * 0.302;
    let g = -big_x * 0.509 + big_y * 1.412 + big_z * 0.066;
    let b = big_x * 0.026 - big_y * 0.072 + big_z * 0.962;

    let mut channels = [r, g, b].map(|c| compand(c).max(0.0));

    let max = channels.iter().copied().fold(0.0_f64, f64::max);
    if max > 1.0 {
        for c in &mut channels {
            *c /= max;
        }
    }

    let [r, g, b] = channels.map(to_byte);
    Some(RgbColor::new(r, g, b))
}

/// Converts a sample, returning `None` when it has no usable chromaticity.
#[must_use]
pub fn light_sample_to_rgb(sample: &LightSample) -> Option<RgbColor> {
    let xy = sample.xy?;
    sample_to_rgb(xy.x, xy.y, sample.brightness)
}

/// Builds a left-to-right CSS gradient from an ordered list of samples.
///
/// The 0-100% range is split into `samples.len()` equal steps and sample `i`
/// is placed at `i * (100 / len)` percent. Samples without a valid color are
/// skipped, and the remaining stops keep their original positions.
///
/// Returns [`EMPTY_GRADIENT`] when no sample has a valid color.
#[must_use]
pub fn gradient(samples: &[LightSample]) -> String {
    let stops = gradient_stops(samples);
    if stops.is_empty() {
        return EMPTY_GRADIENT.to_string();
    }

    let stops: Vec<String> = stops
        .iter()
        .map(|(color, percent)| format!("{} {percent}%", color.to_css_rgba()))
        .collect();

    format!("linear-gradient(90deg, {})", stops.join(", "))
}

/// Returns the `(color, percent)` stops that [`gradient`] renders.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gradient_stops(samples: &[LightSample]) -> Vec<(RgbColor, f64)> {
    if samples.is_empty() {
        return Vec::new();
    }

    let step = 100.0 / samples.len() as f64;

    samples
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| {
            light_sample_to_rgb(sample).map(|color| (color, index as f64 * step))
        })
        .collect()
}

/// Applies the sRGB transfer function to a linear channel.
fn compand(c: f64) -> f64 {
    if c <= GAMMA_THRESHOLD {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(c: f64) -> u8 {
    // c is in [0, 1] here
    (c * 255.0).floor().clamp(0.0, 255.0) as u8
}
