// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scriptable in-memory bridge shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use hue_trigger::bridge::{
    BridgeClient, BridgeInfo, DiscoveredBridge, GroupKind, GroupSummary, SceneDetail, SceneSummary,
};
use hue_trigger::{ApiError, BridgeError, Credential, GroupId, LightSample, SceneId};

/// Username returned once the pairing script runs out.
pub const PAIRED_USER: &str = "paired-user";

/// Connection handle of the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubSession {
    pub host: String,
    pub user: Option<String>,
}

/// One recorded group-state push.
#[derive(Debug, Clone)]
pub struct Push {
    pub host: String,
    pub group: GroupId,
    pub scene: SceneId,
    pub transition: Duration,
    pub at: Instant,
}

#[derive(Debug, Default)]
pub struct StubBridge {
    discovered: Vec<DiscoveredBridge>,
    pairing: Mutex<VecDeque<Result<String, u32>>>,
    rejected_users: Vec<String>,
    hang_host: Option<String>,
    scenes: Vec<(SceneSummary, Vec<LightSample>)>,
    groups: Vec<GroupSummary>,
    fail_pushes: AtomicBool,
    create_user_calls: AtomicU32,
    pushes: Mutex<Vec<Push>>,
}

impl StubBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discovered(mut self, hosts: &[&str]) -> Self {
        self.discovered = hosts
            .iter()
            .enumerate()
            .map(|(i, host)| DiscoveredBridge::new(*host).with_id(format!("bridge-{i}")))
            .collect();
        self
    }

    /// Scripts `createUser`: `Err(code)` answers with that bridge error code.
    pub fn with_pairing_script(self, script: Vec<Result<&str, u32>>) -> Self {
        *self.pairing.lock() = script
            .into_iter()
            .map(|step| step.map(str::to_string))
            .collect();
        self
    }

    /// Answers `createUser` with code 101 `count` times before succeeding.
    pub fn with_link_button_after(self, count: usize) -> Self {
        let mut script = vec![Err(101); count];
        script.push(Ok(PAIRED_USER));
        self.with_pairing_script(script)
    }

    /// Rejects the connectivity check for `user` with code 1.
    pub fn with_rejected_user(mut self, user: &str) -> Self {
        self.rejected_users.push(user.to_string());
        self
    }

    /// Never completes the connectivity check for `host`.
    pub fn hanging_on(mut self, host: &str) -> Self {
        self.hang_host = Some(host.to_string());
        self
    }

    pub fn with_scene(mut self, id: &str, name: &str, group: &str, lights: Vec<LightSample>) -> Self {
        self.scenes.push((
            SceneSummary {
                id: SceneId::new(id),
                name: name.to_string(),
                group: Some(GroupId::new(group)),
            },
            lights,
        ));
        self
    }

    pub fn with_group(mut self, id: &str, name: &str, kind: GroupKind) -> Self {
        self.groups.push(GroupSummary {
            id: GroupId::new(id),
            name: name.to_string(),
            kind,
        });
        self
    }

    pub fn fail_pushes(&self) {
        self.fail_pushes.store(true, Ordering::SeqCst);
    }

    pub fn create_user_calls(&self) -> u32 {
        self.create_user_calls.load(Ordering::SeqCst)
    }

    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.lock().clone()
    }
}

impl BridgeClient for StubBridge {
    type Session = StubSession;

    async fn discover(&self) -> Result<Vec<DiscoveredBridge>, BridgeError> {
        Ok(self.discovered.clone())
    }

    async fn open_unauthenticated(&self, host: &str) -> Result<StubSession, BridgeError> {
        Ok(StubSession {
            host: host.to_string(),
            user: None,
        })
    }

    async fn open_authenticated(
        &self,
        host: &str,
        credential: &Credential,
    ) -> Result<StubSession, BridgeError> {
        Ok(StubSession {
            host: host.to_string(),
            user: Some(credential.expose().to_string()),
        })
    }

    async fn create_user(
        &self,
        _session: &StubSession,
        _device_type: &str,
    ) -> Result<Credential, BridgeError> {
        self.create_user_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.pairing.lock().pop_front();
        match step {
            Some(Ok(user)) => Ok(Credential::new(user)),
            Some(Err(code)) => Err(ApiError::new(code, "", "scripted error").into()),
            None => Ok(Credential::new(PAIRED_USER)),
        }
    }

    async fn get_configuration(&self, session: &StubSession) -> Result<BridgeInfo, BridgeError> {
        if self.hang_host.as_deref() == Some(session.host.as_str()) {
            std::future::pending::<()>().await;
        }

        let user = session.user.as_deref().unwrap_or_default();
        if self.rejected_users.iter().any(|rejected| rejected == user) {
            return Err(ApiError::new(1, "/config", "unauthorized user").into());
        }

        Ok(BridgeInfo {
            name: "Test Bridge".to_string(),
            ip_address: session.host.clone(),
        })
    }

    async fn list_scenes(&self, _session: &StubSession) -> Result<Vec<SceneSummary>, BridgeError> {
        Ok(self.scenes.iter().map(|(summary, _)| summary.clone()).collect())
    }

    async fn get_scene_detail(
        &self,
        _session: &StubSession,
        id: &SceneId,
    ) -> Result<SceneDetail, BridgeError> {
        self.scenes
            .iter()
            .find(|(summary, _)| &summary.id == id)
            .map(|(summary, lights)| SceneDetail {
                id: summary.id.clone(),
                name: summary.name.clone(),
                light_states: lights.clone(),
            })
            .ok_or_else(|| ApiError::new(3, format!("/scenes/{id}"), "resource not available").into())
    }

    async fn list_groups(&self, _session: &StubSession) -> Result<Vec<GroupSummary>, BridgeError> {
        Ok(self.groups.clone())
    }

    async fn push_group_state(
        &self,
        session: &StubSession,
        group: &GroupId,
        scene: &SceneId,
        transition: Duration,
    ) -> Result<(), BridgeError> {
        if self.fail_pushes.load(Ordering::SeqCst) {
            return Err(BridgeError::Connection("bridge unreachable".to_string()));
        }

        self.pushes.lock().push(Push {
            host: session.host.clone(),
            group: group.clone(),
            scene: scene.clone(),
            transition,
            at: Instant::now(),
        });
        Ok(())
    }
}
