// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hue_trigger` library.
//!
//! Errors are grouped by the pipeline stage that produced them: bridge
//! transport, session configuration, scene fetching, command dispatch and
//! trigger argument resolution. Every variant carries enough context (stage,
//! bridge error code, message) to be diagnosed from the log line alone.

use thiserror::Error;

/// Bridge error code returned by `createUser` while the link button has not
/// been pressed.
pub const LINK_BUTTON_NOT_PRESSED: u32 = 101;

/// Bridge error code returned for an unknown or revoked username.
pub const UNAUTHORIZED_USER: u32 = 1;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The session could not be configured.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene or group data could not be fetched.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A scene command could not be dispatched.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Trigger arguments supplied by the framework were invalid.
    #[error("trigger error: {0}")]
    Trigger(#[from] TriggerError),

    /// A raw bridge call failed outside of a pipeline stage.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The controller was created outside of a tokio runtime.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// The configuration pipeline was replaced by a newer configuration.
    #[error("configuration superseded by a newer update")]
    Superseded,
}

/// A structured error reported by the bridge itself.
///
/// The Hue API reports errors as `{"type": <code>, "address": ..., "description": ...}`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("bridge error {code} at {address}: {description}")]
pub struct ApiError {
    /// Numeric error code (the `type` field).
    pub code: u32,
    /// Resource address the error applies to.
    pub address: String,
    /// Human readable description.
    pub description: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: u32, address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            address: address.into(),
            description: description.into(),
        }
    }

    /// The error the bridge returns while waiting for the link button.
    #[must_use]
    pub fn link_button_not_pressed() -> Self {
        Self::new(LINK_BUTTON_NOT_PRESSED, "", "link button not pressed")
    }

    /// The error for a username the bridge does not know.
    #[must_use]
    pub fn unauthorized_user(address: impl Into<String>) -> Self {
        Self::new(UNAUTHORIZED_USER, address, "unauthorized user")
    }
}

/// Errors produced by a [`BridgeClient`](crate::bridge::BridgeClient).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge answered with an error payload.
    #[error("{0}")]
    Api(ApiError),

    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the bridge failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response decoded but did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl BridgeError {
    /// Returns the bridge error code, if the bridge reported one.
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Api(api) => Some(api.code),
            _ => None,
        }
    }

    /// Returns `true` for the "link button not pressed" error.
    #[must_use]
    pub fn is_link_button_not_pressed(&self) -> bool {
        self.code() == Some(LINK_BUTTON_NOT_PRESSED)
    }
}

impl From<ApiError> for BridgeError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

/// Terminal failures of the session configuration pipeline.
///
/// None of these are retried automatically; the controller stays inert until
/// it is reconfigured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Bridge discovery returned no bridge or failed outright.
    #[error("resolving: no Hue bridge discovered")]
    DiscoveryFailed {
        /// The discovery transport error, if discovery did not complete.
        #[source]
        source: Option<BridgeError>,
    },

    /// Discovery is disabled and no host is configured.
    #[error("resolving: no bridge host configured and discovery disabled")]
    MissingAddress,

    /// Creating a user on the bridge failed with a non-retryable error.
    #[error("pairing with {host} failed after {attempts} attempt(s): {source}")]
    PairingFailed {
        /// Bridge host being paired with.
        host: String,
        /// Number of `createUser` attempts made.
        attempts: u32,
        /// The error that ended pairing.
        #[source]
        source: BridgeError,
    },

    /// A bounded pairing policy ran out of attempts.
    #[error("pairing with {host} gave up after {attempts} attempt(s): link button not pressed")]
    PairingExhausted {
        /// Bridge host being paired with.
        host: String,
        /// Number of `createUser` attempts made.
        attempts: u32,
    },

    /// The authenticated connectivity check failed.
    #[error("authenticating with {host} failed: {source}")]
    AuthenticationFailed {
        /// Bridge host.
        host: String,
        /// The underlying bridge error.
        #[source]
        source: BridgeError,
    },
}

impl ConfigError {
    /// Returns the lifecycle stage this error halted.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::DiscoveryFailed { .. } | Self::MissingAddress => "resolving",
            Self::PairingFailed { .. } | Self::PairingExhausted { .. } => "pairing",
            Self::AuthenticationFailed { .. } => "authenticating",
        }
    }
}

/// Errors while building the scene catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Listing scenes failed.
    #[error("listing scenes failed: {0}")]
    Scenes(#[source] BridgeError),

    /// Fetching a single scene's light states failed.
    #[error("fetching scene {id} failed: {source}")]
    SceneDetail {
        /// The scene being fetched.
        id: String,
        /// The underlying bridge error.
        #[source]
        source: BridgeError,
    },

    /// Listing groups failed.
    #[error("listing groups failed: {0}")]
    Groups(#[source] BridgeError),
}

/// Errors while dispatching a scene command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No ready session exists yet, or the last configuration failed.
    #[error("bridge session is not ready")]
    NotReady,

    /// No group is configured, so no scenes are known.
    #[error("no Hue group configured")]
    NoGroupConfigured,

    /// The requested scene is not in the configured group.
    #[error("unknown scene: {name}")]
    UnknownScene {
        /// The requested scene name.
        name: String,
    },

    /// The group-state push failed.
    #[error("pushing scene {scene} to group {group} failed: {source}")]
    PushFailed {
        /// Scene name.
        scene: String,
        /// Target group.
        group: String,
        /// The underlying bridge error.
        #[source]
        source: BridgeError,
    },
}

/// Errors resolving trigger arguments supplied by the framework.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// A required argument was not supplied.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// An argument had the wrong type.
    #[error("argument {name} must be a {expected}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Expected kind.
        expected: &'static str,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
