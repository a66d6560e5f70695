// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The controller: session, scene catalog and dispatcher behind one handle.
//!
//! Readers always see a complete [`ControllerSnapshot`]. A configuration
//! pipeline builds the next snapshot off to the side and swaps it in whole;
//! a newer [`Controller::update_config`] or [`Controller::refresh_scenes`]
//! call aborts the pipeline in flight, which then never publishes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;

use crate::bridge::BridgeClient;
use crate::config::ControllerConfig;
use crate::dispatch::{CommandDispatcher, DispatchHandle, TriggerInvocation};
use crate::error::{DispatchError, Error, Result};
use crate::event::{ControllerEvent, EventBus};
use crate::scene::{self, SceneCatalog};
use crate::session::{PairingPolicy, Session, SessionManager, SessionState};
use crate::trigger::{self, ArgValue, TriggerRegistry};
use crate::types::GroupId;

/// An immutable view of the controller's working state.
#[derive(Debug)]
pub struct ControllerSnapshot<S> {
    generation: u64,
    session: Option<Session<S>>,
    catalog: SceneCatalog,
}

impl<S> ControllerSnapshot<S> {
    fn inert(generation: u64) -> Self {
        Self {
            generation,
            session: None,
            catalog: SceneCatalog::empty(),
        }
    }

    /// Returns the configuration generation that produced this snapshot.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the ready session, if configuration succeeded.
    #[must_use]
    pub fn session(&self) -> Option<&Session<S>> {
        self.session.as_ref()
    }

    /// Returns the scene catalog.
    #[must_use]
    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    /// Returns true if scenes can be dispatched against this snapshot.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.session.is_some() && self.catalog.group().is_some()
    }
}

/// Builder for [`Controller`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hue_trigger::bridge::HttpBridge;
/// use hue_trigger::session::PairingPolicy;
/// use hue_trigger::Controller;
///
/// # async fn example() -> hue_trigger::Result<()> {
/// let controller = Controller::builder(Arc::new(HttpBridge::new()?))
///     .with_pairing_policy(PairingPolicy::new().with_max_attempts(60))
///     .with_event_capacity(128)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ControllerBuilder<C: BridgeClient> {
    client: Arc<C>,
    pairing_policy: PairingPolicy,
    event_capacity: Option<usize>,
}

impl<C: BridgeClient> ControllerBuilder<C> {
    /// Sets the pairing retry policy.
    #[must_use]
    pub fn with_pairing_policy(mut self, policy: PairingPolicy) -> Self {
        self.pairing_policy = policy;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the controller on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn build(self) -> Result<Controller<C>> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let events = self
            .event_capacity
            .map_or_else(EventBus::new, EventBus::with_capacity);

        let inner = Inner {
            sessions: SessionManager::new(
                Arc::clone(&self.client),
                self.pairing_policy,
                events.clone(),
            ),
            dispatcher: CommandDispatcher::new(
                Arc::clone(&self.client),
                runtime.clone(),
                events.clone(),
            ),
            client: self.client,
            events,
            runtime,
            snapshot: RwLock::new(Arc::new(ControllerSnapshot::inert(0))),
            generation: AtomicU64::new(0),
            pipeline: Mutex::new(None),
        };

        Ok(Controller {
            inner: Arc::new(inner),
        })
    }
}

/// Bridges Hue scenes to the trigger framework.
///
/// Cloning is cheap; clones share the same state.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hue_trigger::bridge::HttpBridge;
/// use hue_trigger::dispatch::TriggerInvocation;
/// use hue_trigger::{Controller, ControllerConfig};
///
/// # async fn example() -> hue_trigger::Result<()> {
/// let controller = Controller::new(Arc::new(HttpBridge::new()?))?;
///
/// let config = ControllerConfig::with_host("192.168.1.2")
///     .with_user("existing-username")
///     .with_group("1");
/// controller.update_config(config).await?;
///
/// controller.trigger(TriggerInvocation::new("Relax"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Controller<C: BridgeClient> {
    inner: Arc<Inner<C>>,
}

impl<C: BridgeClient> Clone for Controller<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Work run by one pipeline task.
#[derive(Debug)]
enum Pipeline<S> {
    Configure(ControllerConfig),
    Refresh {
        session: Session<S>,
        group: Option<GroupId>,
    },
}

#[derive(Debug)]
struct Inner<C: BridgeClient> {
    client: Arc<C>,
    sessions: SessionManager<C>,
    dispatcher: CommandDispatcher<C>,
    events: EventBus,
    runtime: Handle,
    snapshot: RwLock<Arc<ControllerSnapshot<C::Session>>>,
    generation: AtomicU64,
    pipeline: Mutex<Option<AbortHandle>>,
}

impl<C: BridgeClient> Controller<C> {
    /// Creates a controller with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn new(client: Arc<C>) -> Result<Self> {
        Self::builder(client).build()
    }

    /// Starts building a controller.
    #[must_use]
    pub fn builder(client: Arc<C>) -> ControllerBuilder<C> {
        ControllerBuilder {
            client,
            pairing_policy: PairingPolicy::default(),
            event_capacity: None,
        }
    }

    /// Applies a configuration and returns the snapshot it produced.
    ///
    /// Aborts any pipeline still running for an earlier configuration. On a
    /// terminal failure an inert snapshot is published and the stage error
    /// returned; the controller stays inert until the next call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::Fetch`] for the failed stage, and
    /// [`Error::Superseded`] if a newer call replaced this one.
    pub async fn update_config(
        &self,
        config: ControllerConfig,
    ) -> Result<Arc<ControllerSnapshot<C::Session>>> {
        tracing::info!(config = ?config, "Applying Hue configuration");
        self.run(Pipeline::Configure(config)).await
    }

    /// Rebuilds the scene catalog on the current session.
    ///
    /// Shares the pipeline with [`update_config`](Self::update_config): it
    /// aborts, and is aborted by, any other pipeline in flight.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotReady`] without a ready session,
    /// [`Error::Fetch`] if fetching failed and [`Error::Superseded`] if a
    /// newer call replaced this one.
    pub async fn refresh_scenes(&self) -> Result<Arc<ControllerSnapshot<C::Session>>> {
        let current = self.snapshot();
        let Some(session) = current.session().cloned() else {
            return Err(DispatchError::NotReady.into());
        };
        let group = current.catalog().group().cloned();
        drop(current);

        tracing::info!("Refreshing Hue scenes");
        self.run(Pipeline::Refresh { session, group }).await
    }

    async fn run(
        &self,
        pipeline: Pipeline<C::Session>,
    ) -> Result<Arc<ControllerSnapshot<C::Session>>> {
        let task = {
            let mut in_flight = self.inner.pipeline.lock();
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

            let inner = Arc::clone(&self.inner);
            let task = self
                .inner
                .runtime
                .spawn(async move { inner.run_pipeline(generation, pipeline).await });

            if let Some(previous) = in_flight.replace(task.abort_handle()) {
                tracing::debug!(generation, "Aborting superseded pipeline");
                previous.abort();
            }
            task
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => Err(Error::Superseded),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    /// Schedules a scene push against the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dispatch`] if the invocation was rejected; nothing is
    /// pushed in that case.
    pub fn trigger(&self, invocation: TriggerInvocation) -> Result<DispatchHandle> {
        let snapshot = self.snapshot();
        let handle =
            self.inner
                .dispatcher
                .dispatch(snapshot.session(), snapshot.catalog(), invocation)?;
        Ok(handle)
    }

    /// Registers the `hue_scene` trigger with the framework.
    pub fn register_triggers<R: TriggerRegistry + ?Sized>(&self, registry: &mut R) {
        let controller = self.clone();
        registry.register_trigger(
            trigger::hue_scene_trigger(),
            Arc::new(move |args: &[Option<ArgValue>]| match TriggerInvocation::from_args(args) {
                Ok(invocation) => {
                    if let Err(err) = controller.trigger(invocation) {
                        tracing::debug!(error = %err, "hue_scene trigger rejected");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "Invalid hue_scene arguments"),
            }),
        );
    }

    /// Subscribes to controller events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.inner.events.subscribe()
    }

    /// Returns a receiver that observes session state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.sessions.watch_state()
    }

    /// Returns the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.sessions.state()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ControllerSnapshot<C::Session>> {
        Arc::clone(&self.inner.snapshot.read())
    }

    /// Returns the bridge client.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.inner.client
    }
}

impl<C: BridgeClient> Inner<C> {
    async fn run_pipeline(
        &self,
        generation: u64,
        pipeline: Pipeline<C::Session>,
    ) -> Result<Arc<ControllerSnapshot<C::Session>>> {
        let (session, group) = match pipeline {
            Pipeline::Configure(config) => {
                let configured = self.sessions.configure(&config).await;
                match configured {
                    Ok(session) => (session, config.group),
                    Err(err) => {
                        self.publish(ControllerSnapshot::inert(generation))?;
                        return Err(err.into());
                    }
                }
            }
            Pipeline::Refresh { session, group } => (session, group),
        };

        let catalog = match scene::rebuild(self.client.as_ref(), &session, group.as_ref()).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "Hue scene fetch failed");
                self.publish(ControllerSnapshot::inert(generation))?;
                return Err(err.into());
            }
        };

        let group = catalog.group().cloned();
        let scene_count = catalog.len();

        let snapshot = self.publish(ControllerSnapshot {
            generation,
            session: Some(session),
            catalog,
        })?;

        self.events
            .publish(ControllerEvent::catalog_rebuilt(group, scene_count));

        Ok(snapshot)
    }

    fn publish(
        &self,
        snapshot: ControllerSnapshot<C::Session>,
    ) -> Result<Arc<ControllerSnapshot<C::Session>>> {
        let mut current = self.snapshot.write();

        if self.generation.load(Ordering::SeqCst) != snapshot.generation {
            tracing::debug!(
                generation = snapshot.generation,
                "Discarding superseded configuration"
            );
            return Err(Error::Superseded);
        }

        let snapshot = Arc::new(snapshot);
        *current = Arc::clone(&snapshot);
        drop(current);

        tracing::debug!(
            generation = snapshot.generation,
            ready = snapshot.is_ready(),
            "Published controller snapshot"
        );

        Ok(snapshot)
    }
}
