// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! The typed boundary to the remote backend.
//!
//! Every operation that reads or writes real load order state goes through
//! [`Backend`]. Implementations wrap whatever transport the host provides;
//! failures cross the boundary as `anyhow` errors carrying a readable
//! message, never as [`crate::CoreError`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::filters::FilterStates;
use crate::metadata::{
    DerivedPluginMetadata, GameData, MainContent, Masterlist, PluginLoadOrderIndex,
    PluginMetadata, RawGroup, SimpleMessage,
};

/// One plugin's payload in a conflicts response, flagged with whether it
/// actually conflicts with the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConflictData {
    pub metadata: DerivedPluginMetadata,
    #[serde(default)]
    pub conflicts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConflictsResponse {
    pub general_messages: Vec<SimpleMessage>,
    pub plugins: Vec<PluginConflictData>,
}

/// The load order to restore when a sort is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelSortResponse {
    pub plugins: Vec<PluginLoadOrderIndex>,
    pub general_messages: Vec<SimpleMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterlistUpdateResponse {
    pub masterlist: Masterlist,
    pub general_messages: Vec<SimpleMessage>,
    pub plugins: Vec<DerivedPluginMetadata>,
}

/// The user-editable application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub game: String,
    pub language: String,
    pub theme: String,
    pub update_masterlist: bool,
    pub filters: FilterStates,
}

/// Operations the remote backend must provide.
pub trait Backend {
    /// Switches to the named game and returns its data.
    fn change_game(&self, folder: &str) -> Result<GameData>;

    /// Reloads the current game's data.
    fn get_game_data(&self) -> Result<GameData>;

    /// Updates the masterlist from its remote source. Returns `None` when
    /// it was already up to date.
    fn update_masterlist(&self) -> Result<Option<MasterlistUpdateResponse>>;

    /// Computes a sorted load order without applying it.
    fn sort_plugins(&self) -> Result<MainContent>;

    /// Commits the given plugin order to disk.
    fn apply_sort(&self, plugin_names: &[String]) -> Result<()>;

    /// Abandons the computed order and returns the one to restore.
    fn cancel_sort(&self) -> Result<CancelSortResponse>;

    /// Discards changes the sort made that were never applied.
    fn discard_unapplied_changes(&self) -> Result<()>;

    /// Removes the named plugin's user metadata and returns its fresh
    /// derived payload.
    fn clear_plugin_metadata(&self, plugin_name: &str) -> Result<DerivedPluginMetadata>;

    /// Removes all user metadata and returns fresh payloads for every
    /// affected plugin.
    fn clear_all_metadata(&self) -> Result<Vec<DerivedPluginMetadata>>;

    /// Reports an editor closing. When `apply_edits` is set the record is
    /// saved first; either way the plugin's fresh derived payload comes
    /// back.
    fn editor_closed(
        &self,
        apply_edits: bool,
        metadata: &PluginMetadata,
    ) -> Result<DerivedPluginMetadata>;

    /// Evaluates which plugins conflict with the named one.
    fn get_conflicting_plugins(&self, plugin_name: &str) -> Result<ConflictsResponse>;

    /// Persists the user's group edits.
    fn save_user_groups(&self, groups: &[RawGroup]) -> Result<()>;

    /// Persists the settings dialog's state.
    fn close_settings(&self, settings: &Settings) -> Result<()>;
}
