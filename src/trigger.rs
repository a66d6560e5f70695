// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trigger framework interface.
//!
//! The controller exposes a single trigger, `hue_scene[scene, delay,
//! transition]`. The framework owns parsing of its own syntax and calls back
//! with positional argument values; [`TriggerInvocation::from_args`] turns
//! those into a typed invocation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{DEFAULT_TRANSITION, TriggerInvocation};
use crate::error::TriggerError;

/// Name under which the scene trigger is registered.
pub const HUE_SCENE_TRIGGER: &str = "hue_scene";

/// Declared kind of a trigger argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Free text.
    String,
    /// A number.
    Number,
}

impl ArgKind {
    /// Returns the kind's name as used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An argument value supplied by the framework.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// A text value.
    String(String),
    /// A numeric value.
    Number(f64),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Declaration of one trigger argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerArg {
    /// Argument name.
    pub name: &'static str,
    /// Expected kind.
    pub kind: ArgKind,
    /// Help text.
    pub description: &'static str,
    /// Whether the argument may be omitted.
    pub optional: bool,
}

/// Declaration of a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    /// Trigger name.
    pub name: &'static str,
    /// Help text.
    pub description: &'static str,
    /// Positional arguments.
    pub args: Vec<TriggerArg>,
}

/// Callback invoked by the framework with positional argument values.
pub type TriggerCallback = Arc<dyn Fn(&[Option<ArgValue>]) + Send + Sync>;

/// The framework side of trigger registration.
pub trait TriggerRegistry {
    /// Registers `spec`, to be invoked through `callback`.
    fn register_trigger(&mut self, spec: TriggerSpec, callback: TriggerCallback);
}

/// Declaration of the `hue_scene` trigger.
#[must_use]
pub fn hue_scene_trigger() -> TriggerSpec {
    TriggerSpec {
        name: HUE_SCENE_TRIGGER,
        description: "update hue group",
        args: vec![
            TriggerArg {
                name: "scene",
                kind: ArgKind::String,
                description: "name of a scene configured in the hue app",
                optional: false,
            },
            TriggerArg {
                name: "delay",
                kind: ArgKind::Number,
                description: "delay time in milliseconds.  default: 0ms",
                optional: true,
            },
            TriggerArg {
                name: "transition",
                kind: ArgKind::Number,
                description: "transition time in milliseconds.  default: 400ms",
                optional: true,
            },
        ],
    }
}

impl TriggerInvocation {
    /// Builds an invocation from `hue_scene` arguments.
    ///
    /// Numbers may arrive as numeric strings. Negative or non-finite
    /// millisecond values become zero. A transition that is omitted or
    /// resolves to zero uses [`DEFAULT_TRANSITION`]; use
    /// [`TriggerInvocation::with_transition`] for an instant push.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::MissingArgument`] without a scene and
    /// [`TriggerError::InvalidArgument`] for a value of the wrong kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use hue_trigger::dispatch::TriggerInvocation;
    /// use hue_trigger::trigger::ArgValue;
    ///
    /// let args = [Some(ArgValue::from("Relax")), Some(ArgValue::from("250")), None];
    /// let invocation = TriggerInvocation::from_args(&args).unwrap();
    /// assert_eq!(invocation.delay, Duration::from_millis(250));
    /// ```
    pub fn from_args(args: &[Option<ArgValue>]) -> Result<Self, TriggerError> {
        let scene = match args.first() {
            Some(Some(ArgValue::String(scene))) => scene.clone(),
            Some(Some(ArgValue::Number(_))) => {
                return Err(TriggerError::InvalidArgument {
                    name: "scene",
                    expected: ArgKind::String.as_str(),
                });
            }
            Some(None) | None => return Err(TriggerError::MissingArgument("scene")),
        };

        let delay = millis_arg(args, 1, "delay")?.unwrap_or(Duration::ZERO);
        let transition = millis_arg(args, 2, "transition")?
            .filter(|transition| !transition.is_zero())
            .unwrap_or(DEFAULT_TRANSITION);

        Ok(Self::new(scene)
            .with_delay(delay)
            .with_transition(transition))
    }
}

fn millis_arg(
    args: &[Option<ArgValue>],
    index: usize,
    name: &'static str,
) -> Result<Option<Duration>, TriggerError> {
    let invalid = || TriggerError::InvalidArgument {
        name,
        expected: ArgKind::Number.as_str(),
    };

    let millis = match args.get(index) {
        Some(Some(ArgValue::Number(value))) => *value,
        Some(Some(ArgValue::String(text))) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        Some(None) | None => return Ok(None),
    };

    Ok(Some(millis_to_duration(millis)))
}

fn millis_to_duration(millis: f64) -> Duration {
    if !millis.is_finite() || millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::MAX)
}
