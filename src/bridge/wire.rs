// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hue v1 JSON payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, BridgeError};

#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    #[serde(rename = "type")]
    pub typ: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

impl From<WireError> for ApiError {
    fn from(err: WireError) -> Self {
        Self::new(err.typ, err.address, err.description)
    }
}

/// One element of a v1 result array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ApiResult<T> {
    Success(T),
    Error(WireError),
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscoveryEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub internalipaddress: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewUser<'a> {
    pub devicetype: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewUserReply {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigReply {
    pub name: String,
    /// Only present in the full config, which requires a known username.
    #[serde(default)]
    pub ipaddress: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SceneEntry {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub lights: Vec<String>,
    #[serde(default)]
    pub lightstates: HashMap<String, LightStateEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LightStateEntry {
    #[serde(default)]
    pub on: Option<bool>,
    #[serde(default)]
    pub bri: Option<u8>,
    #[serde(default)]
    pub xy: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub group_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupAction<'a> {
    pub scene: &'a str,
    pub transitiontime: u16,
}

/// Decodes a response body that is either an object of type `T` or a v1
/// error array.
pub(crate) fn decode_object<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BridgeError> {
    let value: Value = serde_json::from_str(body)?;
    if let Some(err) = first_error(&value)? {
        return Err(BridgeError::Api(err));
    }
    Ok(serde_json::from_value(value)?)
}

/// Decodes a v1 result array, returning the first success payload or the
/// first error.
pub(crate) fn decode_first_success<T: serde::de::DeserializeOwned>(
    body: &str,
) -> Result<T, BridgeError> {
    let results: Vec<ApiResult<T>> = serde_json::from_str(body)?;
    let mut success = None;
    for result in results {
        match result {
            ApiResult::Error(err) => return Err(BridgeError::Api(err.into())),
            ApiResult::Success(value) if success.is_none() => success = Some(value),
            ApiResult::Success(_) => {}
        }
    }
    success.ok_or_else(|| BridgeError::UnexpectedResponse("empty result array".to_string()))
}

/// Extracts the first error from a v1 error array, if `value` is one.
fn first_error(value: &Value) -> Result<Option<ApiError>, BridgeError> {
    let Some(items) = value.as_array() else {
        return Ok(None);
    };
    for item in items {
        if let Some(err) = item.get("error") {
            let err: WireError = serde_json::from_value(err.clone())?;
            return Ok(Some(err.into()));
        }
    }
    Ok(None)
}
