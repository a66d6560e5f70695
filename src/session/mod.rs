// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge session lifecycle.
//!
//! [`SessionManager::configure`] drives one pass of the lifecycle:
//!
//! ```text
//! Unconfigured -> Resolving -> (Pairing <-> PairingRetry) -> Authenticating -> Ready
//!                     |                  |                        |
//!                     +------------------+------------------------+--> Failed
//! ```
//!
//! Pairing is skipped when the configuration already carries a credential.
//! Every call restarts at `Resolving`; failures are terminal for that call and
//! leave the manager in `Failed` until the next one.

mod pairing;

pub use pairing::PairingPolicy;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::bridge::{BridgeClient, BridgeInfo};
use crate::config::ControllerConfig;
use crate::error::ConfigError;
use crate::event::{ControllerEvent, EventBus};
use crate::types::Credential;

use pairing::{PairingFailure, retry_with_policy};

/// Where the bridge address came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeAddress {
    /// Host taken from configuration.
    Static(String),
    /// Host found by LAN discovery.
    Discovered {
        /// Reachable host.
        host: String,
        /// Bridge identifier, if reported.
        bridge_id: Option<String>,
    },
}

impl BridgeAddress {
    /// Returns the host to connect to.
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Static(host) | Self::Discovered { host, .. } => host,
        }
    }

    /// Returns `true` if the address came from discovery.
    #[must_use]
    pub fn is_discovered(&self) -> bool {
        matches!(self, Self::Discovered { .. })
    }
}

impl fmt::Display for BridgeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host())
    }
}

/// Lifecycle state of the bridge session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No configuration has been applied.
    Unconfigured,
    /// Resolving the bridge address.
    Resolving,
    /// Waiting on a `createUser` attempt.
    Pairing {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Sleeping before the next `createUser` attempt.
    PairingRetry {
        /// The attempt that just failed.
        attempt: u32,
        /// Delay before the next attempt.
        delay: Duration,
    },
    /// Checking the credential against the bridge.
    Authenticating,
    /// Authenticated and ready.
    Ready {
        /// Bridge configuration fetched during the check.
        bridge: BridgeInfo,
    },
    /// The last configuration attempt failed.
    Failed {
        /// The stage that failed.
        stage: &'static str,
        /// Rendered error.
        reason: String,
    },
}

impl SessionState {
    /// Returns true if the session is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Returns true if the last configuration failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true while pairing is in progress.
    #[must_use]
    pub fn is_pairing(&self) -> bool {
        matches!(self, Self::Pairing { .. } | Self::PairingRetry { .. })
    }
}

/// An authenticated bridge session.
#[derive(Debug, Clone)]
pub struct Session<S> {
    address: BridgeAddress,
    credential: Credential,
    bridge: BridgeInfo,
    handle: S,
}

impl<S> Session<S> {
    /// Creates a session from its parts.
    #[must_use]
    pub fn new(
        address: BridgeAddress,
        credential: Credential,
        bridge: BridgeInfo,
        handle: S,
    ) -> Self {
        Self {
            address,
            credential,
            bridge,
            handle,
        }
    }

    /// Returns the bridge address.
    #[must_use]
    pub fn address(&self) -> &BridgeAddress {
        &self.address
    }

    /// Returns the credential in use.
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Returns the bridge configuration fetched at connect time.
    #[must_use]
    pub fn bridge(&self) -> &BridgeInfo {
        &self.bridge
    }

    /// Returns the client's connection handle.
    #[must_use]
    pub fn handle(&self) -> &S {
        &self.handle
    }
}

/// Owns the bridge session lifecycle.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hue_trigger::bridge::HttpBridge;
/// use hue_trigger::event::EventBus;
/// use hue_trigger::session::{PairingPolicy, SessionManager};
/// use hue_trigger::ControllerConfig;
///
/// # async fn example() -> hue_trigger::Result<()> {
/// let manager = SessionManager::new(
///     Arc::new(HttpBridge::new()?),
///     PairingPolicy::default(),
///     EventBus::new(),
/// );
///
/// let session = manager.configure(&ControllerConfig::discover()).await?;
/// println!("connected to {}", session.bridge().name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionManager<C: BridgeClient> {
    client: Arc<C>,
    policy: PairingPolicy,
    state: watch::Sender<SessionState>,
    events: EventBus,
}

impl<C: BridgeClient> SessionManager<C> {
    /// Creates a manager in the `Unconfigured` state.
    #[must_use]
    pub fn new(client: Arc<C>, policy: PairingPolicy, events: EventBus) -> Self {
        let (state, _) = watch::channel(SessionState::Unconfigured);
        Self {
            client,
            policy,
            state,
            events,
        }
    }

    /// Returns the bridge client.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Returns the pairing policy.
    #[must_use]
    pub fn policy(&self) -> &PairingPolicy {
        &self.policy
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that observes state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Runs the lifecycle for `config` and returns the ready session.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the stage that failed. None of them are
    /// retried here.
    pub async fn configure(
        &self,
        config: &ControllerConfig,
    ) -> Result<Session<C::Session>, ConfigError> {
        let result = self.run(config).await;

        if let Err(err) = &result {
            tracing::error!(stage = err.stage(), error = %err, "Hue bridge configuration failed");
            self.set_state(SessionState::Failed {
                stage: err.stage(),
                reason: err.to_string(),
            });
        }

        result
    }

    async fn run(&self, config: &ControllerConfig) -> Result<Session<C::Session>, ConfigError> {
        self.set_state(SessionState::Resolving);
        let address = self.resolve(config).await?;

        let credential = match &config.user {
            Some(credential) => credential.clone(),
            None => self.pair(&address, config.device_type()).await?,
        };

        self.set_state(SessionState::Authenticating);
        let (handle, bridge) = self.authenticate(&address, &credential).await?;

        tracing::info!(
            "Connected to Hue Bridge: {} :: {}",
            bridge.name,
            bridge.ip_address
        );

        self.set_state(SessionState::Ready {
            bridge: bridge.clone(),
        });

        Ok(Session::new(address, credential, bridge, handle))
    }

    async fn resolve(&self, config: &ControllerConfig) -> Result<BridgeAddress, ConfigError> {
        if !config.discover_bridge {
            return config
                .host
                .clone()
                .map(BridgeAddress::Static)
                .ok_or(ConfigError::MissingAddress);
        }

        tracing::debug!("Starting Hue bridge discovery");

        let found = self
            .client
            .discover()
            .await
            .map_err(|source| ConfigError::DiscoveryFailed {
                source: Some(source),
            })?;

        let count = found.len();
        let Some(first) = found.into_iter().next() else {
            return Err(ConfigError::DiscoveryFailed { source: None });
        };

        if count > 1 {
            tracing::warn!(
                count,
                host = %first.host,
                "Multiple Hue bridges discovered, using the first"
            );
        } else {
            tracing::info!(host = %first.host, "Discovered Hue bridge");
        }

        Ok(BridgeAddress::Discovered {
            host: first.host,
            bridge_id: first.id,
        })
    }

    async fn pair(
        &self,
        address: &BridgeAddress,
        device_type: &str,
    ) -> Result<Credential, ConfigError> {
        let host = address.host();

        let session = self
            .client
            .open_unauthenticated(host)
            .await
            .map_err(|source| ConfigError::PairingFailed {
                host: host.to_string(),
                attempts: 0,
                source,
            })?;

        tracing::warn!(
            host = %host,
            "Please press the link button on the Hue bridge to complete setup"
        );

        let client = self.client.as_ref();
        let session = &session;
        let outcome = retry_with_policy(
            &self.policy,
            move |attempt| {
                tracing::info!(attempt, "Hue auth attempt");
                self.set_state(SessionState::Pairing { attempt });
                client.create_user(session, device_type)
            },
            |attempt, delay| {
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    "Link button not pressed yet"
                );
                self.set_state(SessionState::PairingRetry { attempt, delay });
            },
        )
        .await;

        let (credential, attempts) = outcome.map_err(|failure| match failure {
            PairingFailure::Rejected { attempts, source } => ConfigError::PairingFailed {
                host: host.to_string(),
                attempts,
                source,
            },
            PairingFailure::Exhausted { attempts } => ConfigError::PairingExhausted {
                host: host.to_string(),
                attempts,
            },
        })?;

        tracing::info!(
            attempts,
            username = credential.expose(),
            "User has been created on the Hue bridge. This username grants full local \
             access to the bridge; treat it like a password"
        );

        self.events
            .publish(ControllerEvent::credential_created(credential.clone(), host));

        Ok(credential)
    }

    async fn authenticate(
        &self,
        address: &BridgeAddress,
        credential: &Credential,
    ) -> Result<(C::Session, BridgeInfo), ConfigError> {
        let host = address.host();
        let auth_failed = |source| ConfigError::AuthenticationFailed {
            host: host.to_string(),
            source,
        };

        let handle = self
            .client
            .open_authenticated(host, credential)
            .await
            .map_err(auth_failed)?;

        let bridge = self
            .client
            .get_configuration(&handle)
            .await
            .map_err(auth_failed)?;

        Ok((handle, bridge))
    }

    fn set_state(&self, state: SessionState) {
        tracing::debug!(state = ?state, "Session state changed");
        self.state.send_replace(state.clone());
        self.events.publish(ControllerEvent::state_changed(state));
    }
}
