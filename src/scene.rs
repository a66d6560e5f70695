// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene catalog for the configured group.
//!
//! A [`SceneCatalog`] is built once per configuration and never mutated.
//! Refreshing scenes means building a new catalog and swapping it in.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::bridge::{BridgeClient, GroupKind, GroupSummary};
use crate::color;
use crate::error::FetchError;
use crate::session::Session;
use crate::types::{GroupId, SceneId};

/// A scene exposed to the trigger framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEntry {
    /// Bridge scene identifier.
    pub id: SceneId,
    /// CSS preview gradient, or `"none"` if no light had a usable color.
    pub gradient: String,
}

/// Name-indexed scenes of one group.
#[derive(Debug, Clone)]
pub struct SceneCatalog {
    group: Option<GroupId>,
    entries: HashMap<String, SceneEntry>,
    available_groups: Vec<GroupSummary>,
    built_at: DateTime<Utc>,
}

impl SceneCatalog {
    /// Creates an empty catalog with no group.
    #[must_use]
    pub fn empty() -> Self {
        Self::unconfigured(Vec::new())
    }

    /// Creates a catalog for a session without a configured group.
    #[must_use]
    pub fn unconfigured(available_groups: Vec<GroupSummary>) -> Self {
        Self {
            group: None,
            entries: HashMap::new(),
            available_groups,
            built_at: Utc::now(),
        }
    }

    /// Creates a catalog from prepared entries.
    #[must_use]
    pub fn from_entries(group: GroupId, entries: HashMap<String, SceneEntry>) -> Self {
        Self {
            group: Some(group),
            entries,
            available_groups: Vec::new(),
            built_at: Utc::now(),
        }
    }

    /// Looks up a scene by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SceneEntry> {
        self.entries.get(name)
    }

    /// Returns the number of scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no scenes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the scene names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterates over `(name, entry)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SceneEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Returns the configured group.
    #[must_use]
    pub fn group(&self) -> Option<&GroupId> {
        self.group.as_ref()
    }

    /// Returns the groups listed when no group was configured.
    #[must_use]
    pub fn available_groups(&self) -> &[GroupSummary] {
        &self.available_groups
    }

    /// Returns when the catalog was built.
    #[must_use]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builds the catalog for `group` from the bridge.
///
/// Without a group, lists the bridge's groups instead and logs the rooms so
/// the operator can pick one.
///
/// # Errors
///
/// Returns the [`FetchError`] of the first failed bridge call.
pub async fn rebuild<C: BridgeClient>(
    client: &C,
    session: &Session<C::Session>,
    group: Option<&GroupId>,
) -> Result<SceneCatalog, FetchError> {
    let handle = session.handle();

    let Some(group) = group else {
        let groups = client.list_groups(handle).await.map_err(FetchError::Groups)?;
        tracing::error!(
            "No Hue group configured. Choose a group, add it to the configuration and restart.\n{}",
            format_group_table(&groups)
        );
        return Ok(SceneCatalog::unconfigured(groups));
    };

    tracing::debug!(group = %group, "Fetching Hue scenes");

    let mut scenes = client.list_scenes(handle).await.map_err(FetchError::Scenes)?;
    scenes.retain(|scene| scene.group.as_ref() == Some(group));

    let mut entries = HashMap::with_capacity(scenes.len());
    for scene in scenes {
        let detail = client
            .get_scene_detail(handle, &scene.id)
            .await
            .map_err(|source| FetchError::SceneDetail {
                id: scene.id.to_string(),
                source,
            })?;

        let entry = SceneEntry {
            id: scene.id,
            gradient: color::gradient(&detail.light_states),
        };

        if let Some(previous) = entries.insert(scene.name.clone(), entry) {
            tracing::warn!(
                name = %scene.name,
                replaced = %previous.id,
                "Duplicate Hue scene name, keeping the later scene"
            );
        }
    }

    let catalog = SceneCatalog::from_entries(group.clone(), entries);
    tracing::info!(
        group = %group,
        count = catalog.len(),
        "HUE CONFIGURED SCENES:\n{}",
        format_scene_table(&catalog)
    );

    Ok(catalog)
}

/// Renders the room-type groups as an ` ID  | Name` table.
#[must_use]
pub fn format_group_table(groups: &[GroupSummary]) -> String {
    let mut table = String::from(" ID  | Name\n-------------------\n");
    for group in groups.iter().filter(|group| group.kind == GroupKind::Room) {
        let id = format!("'{}'", group.id);
        let _ = writeln!(table, "{id:>4} | {}", group.name);
    }
    table
}

fn format_scene_table(catalog: &SceneCatalog) -> String {
    let mut table = String::new();
    for name in catalog.names() {
        if let Some(entry) = catalog.get(name) {
            let _ = writeln!(table, "  {name}: {}", entry.id);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str, kind: GroupKind) -> GroupSummary {
        GroupSummary {
            id: GroupId::new(id),
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn group_table_lists_rooms_only() {
        let table = format_group_table(&[
            group("1", "Living Room", GroupKind::Room),
            group("2", "Upstairs", GroupKind::Zone),
            group("12", "Kitchen", GroupKind::Room),
        ]);

        assert_eq!(
            table,
            " ID  | Name\n-------------------\n '1' | Living Room\n'12' | Kitchen\n"
        );
    }

    #[test]
    fn unconfigured_catalog_has_no_group() {
        let catalog = SceneCatalog::unconfigured(vec![group("1", "Office", GroupKind::Room)]);
        assert!(catalog.group().is_none());
        assert!(catalog.is_empty());
        assert_eq!(catalog.available_groups().len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let mut entries = HashMap::new();
        for (name, id) in [("Relax", "b"), ("Bright", "a"), ("Nightlight", "c")] {
            entries.insert(
                name.to_string(),
                SceneEntry {
                    id: SceneId::new(id),
                    gradient: color::EMPTY_GRADIENT.to_string(),
                },
            );
        }

        let catalog = SceneCatalog::from_entries(GroupId::new("1"), entries);
        assert_eq!(catalog.names(), vec!["Bright", "Nightlight", "Relax"]);
        assert_eq!(catalog.get("Relax").map(|e| e.id.as_str()), Some("b"));
        assert!(catalog.get("relax").is_none());
        assert!(format_scene_table(&catalog).starts_with("  Bright: a\n"));
    }
}
