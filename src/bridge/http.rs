// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of [`BridgeClient`] for the Hue v1 REST API.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, BridgeError};
use crate::types::{Credential, GroupId, LightSample, SceneId};

use super::wire::{
    self, ConfigReply, DiscoveryEntry, GroupAction, GroupEntry, NewUser, NewUserReply, SceneEntry,
};
use super::{
    BridgeClient, BridgeInfo, DiscoveredBridge, GroupKind, GroupSummary, SceneDetail, SceneSummary,
};

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for [`HttpBridge`].
///
/// # Examples
///
/// ```
/// use hue_trigger::bridge::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new()
///     .with_timeout(Duration::from_secs(5))
///     .with_discovery_url("http://127.0.0.1:8080/");
/// assert_eq!(config.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    discovery_url: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Hue cloud discovery endpoint (N-UPnP).
    pub const DEFAULT_DISCOVERY_URL: &'static str = "https://discovery.meethue.com/";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            discovery_url: Self::DEFAULT_DISCOVERY_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the discovery endpoint.
    #[must_use]
    pub fn with_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the discovery endpoint.
    #[must_use]
    pub fn discovery_url(&self) -> &str {
        &self.discovery_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpBridge` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_bridge(self) -> Result<HttpBridge, BridgeError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(BridgeError::Http)?;

        Ok(HttpBridge {
            client,
            discovery_url: self.discovery_url,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HueSession
// ============================================================================

/// Connection handle for [`HttpBridge`].
#[derive(Clone)]
pub struct HueSession {
    base_url: String,
    username: Option<String>,
}

impl HueSession {
    /// Returns the bridge base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if this session carries a username.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    fn user_url(&self, path: &str) -> Result<String, BridgeError> {
        let username = self.username.as_deref().ok_or_else(|| {
            BridgeError::Connection("session is not authenticated".to_string())
        })?;
        Ok(format!(
            "{}/api/{}/{path}",
            self.base_url,
            urlencoding::encode(username)
        ))
    }
}

impl fmt::Debug for HueSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HueSession")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

// ============================================================================
// HttpBridge
// ============================================================================

/// Hue bridge client over HTTP.
///
/// # Examples
///
/// ```no_run
/// use hue_trigger::bridge::{BridgeClient, HttpBridge};
///
/// # async fn example() -> Result<(), hue_trigger::error::BridgeError> {
/// let bridge = HttpBridge::new()?;
/// let found = bridge.discover().await?;
/// println!("found {} bridge(s)", found.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBridge {
    client: Client,
    discovery_url: String,
}

impl HttpBridge {
    /// Creates a bridge client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, BridgeError> {
        HttpConfig::new().into_bridge()
    }

    fn session(host: &str, username: Option<String>) -> HueSession {
        let host = host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        HueSession { base_url, username }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<String, BridgeError> {
        tracing::debug!(method = %method, url = %redact(url), "Sending bridge request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(BridgeError::Http)?;

        if !response.status().is_success() {
            return Err(BridgeError::Connection(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(BridgeError::Http)?;

        tracing::trace!(body = %body, "Received bridge response");

        Ok(body)
    }

    async fn get(&self, url: &str) -> Result<String, BridgeError> {
        self.send::<Value>(Method::GET, url, None).await
    }
}

impl BridgeClient for HttpBridge {
    type Session = HueSession;

    async fn discover(&self) -> Result<Vec<DiscoveredBridge>, BridgeError> {
        let body = self.get(&self.discovery_url).await?;
        let entries: Vec<DiscoveryEntry> = serde_json::from_str(&body)?;

        Ok(entries
            .into_iter()
            .map(|entry| DiscoveredBridge {
                id: entry.id,
                host: entry.internalipaddress,
            })
            .collect())
    }

    async fn open_unauthenticated(&self, host: &str) -> Result<HueSession, BridgeError> {
        Ok(Self::session(host, None))
    }

    async fn open_authenticated(
        &self,
        host: &str,
        credential: &Credential,
    ) -> Result<HueSession, BridgeError> {
        Ok(Self::session(host, Some(credential.expose().to_string())))
    }

    async fn create_user(
        &self,
        session: &HueSession,
        device_type: &str,
    ) -> Result<Credential, BridgeError> {
        let url = format!("{}/api", session.base_url);
        let body = NewUser {
            devicetype: device_type,
        };
        let text = self.send(Method::POST, &url, Some(&body)).await?;
        let reply: NewUserReply = wire::decode_first_success(&text)?;
        Ok(Credential::new(reply.username))
    }

    async fn get_configuration(&self, session: &HueSession) -> Result<BridgeInfo, BridgeError> {
        let text = self.get(&session.user_url("config")?).await?;
        let reply: ConfigReply = wire::decode_object(&text)?;

        // Unknown usernames get the public subset with HTTP 200.
        let Some(ip_address) = reply.ipaddress else {
            return Err(BridgeError::Api(ApiError::unauthorized_user("/config")));
        };
        Ok(BridgeInfo {
            name: reply.name,
            ip_address,
        })
    }

    async fn list_scenes(&self, session: &HueSession) -> Result<Vec<SceneSummary>, BridgeError> {
        let text = self.get(&session.user_url("scenes")?).await?;
        let scenes: HashMap<String, SceneEntry> = wire::decode_object(&text)?;

        let mut summaries: Vec<SceneSummary> = scenes
            .into_iter()
            .map(|(id, scene)| SceneSummary {
                id: SceneId::new(id),
                name: scene.name,
                group: scene.group.map(GroupId::new),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    async fn get_scene_detail(
        &self,
        session: &HueSession,
        id: &SceneId,
    ) -> Result<SceneDetail, BridgeError> {
        let path = format!("scenes/{}", urlencoding::encode(id.as_str()));
        let text = self.get(&session.user_url(&path)?).await?;
        let scene: SceneEntry = wire::decode_object(&text)?;

        let light_states = scene
            .lights
            .iter()
            .map(|light| match scene.lightstates.get(light) {
                Some(state) => {
                    let xy = if state.on == Some(false) { None } else { state.xy };
                    LightSample::from_bridge(xy, state.bri)
                }
                None => LightSample::colorless(1.0),
            })
            .collect();

        Ok(SceneDetail {
            id: id.clone(),
            name: scene.name,
            light_states,
        })
    }

    async fn list_groups(&self, session: &HueSession) -> Result<Vec<GroupSummary>, BridgeError> {
        let text = self.get(&session.user_url("groups")?).await?;
        let groups: HashMap<String, GroupEntry> = wire::decode_object(&text)?;

        let mut summaries: Vec<GroupSummary> = groups
            .into_iter()
            .map(|(id, group)| GroupSummary {
                id: GroupId::new(id),
                name: group.name,
                kind: GroupKind::from_api(&group.group_type),
            })
            .collect();
        // Numeric ids sort by length first so "10" follows "9".
        summaries.sort_by(|a, b| {
            (a.id.as_str().len(), a.id.as_str()).cmp(&(b.id.as_str().len(), b.id.as_str()))
        });
        Ok(summaries)
    }

    async fn push_group_state(
        &self,
        session: &HueSession,
        group: &GroupId,
        scene: &SceneId,
        transition: Duration,
    ) -> Result<(), BridgeError> {
        let path = format!("groups/{}/action", urlencoding::encode(group.as_str()));
        let url = session.user_url(&path)?;
        let body = GroupAction {
            scene: scene.as_str(),
            transitiontime: transition_time(transition),
        };
        let text = self.send(Method::PUT, &url, Some(&body)).await?;
        wire::decode_first_success::<Value>(&text)?;
        Ok(())
    }
}

/// Converts a transition to the bridge's 100 ms units, rounding to nearest.
fn transition_time(transition: Duration) -> u16 {
    let tenths = (transition.as_millis() + 50) / 100;
    u16::try_from(tenths).unwrap_or(u16::MAX)
}

/// Hides the username segment of `/api/<username>/...` URLs in logs.
fn redact(url: &str) -> String {
    let Some(start) = url.find("/api/") else {
        return url.to_string();
    };
    let user_start = start + "/api/".len();
    let rest = &url[user_start..];
    match rest.find('/') {
        Some(end) => format!("{}***{}", &url[..user_start], &rest[end..]),
        None => format!("{}***", &url[..user_start]),
    }
}
