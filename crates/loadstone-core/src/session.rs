// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! Workflow orchestration across the game model, filters, interaction
//! state and backend.

use std::rc::Rc;

use anyhow::{bail, Context, Result};

use crate::filters::{FilteredContent, Filters};
use crate::game::Game;
use crate::metadata::{MainContent, PluginMetadata, RawGroup};
use crate::notify::Notifier;
use crate::query::{Backend, Settings};
use crate::state::State;
use crate::CoreError;

/// How a sort request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStatus {
    /// A new order was computed and is awaiting approval or cancellation.
    AwaitingApproval,
    /// Sorting did not change the order; nothing is pending.
    NoChanges,
}

/// One user's session: the loaded game, the filter state, the interaction
/// state machine and the backend boundary.
pub struct Session<B: Backend> {
    notifier: Rc<Notifier>,
    game: Option<Game>,
    filters: Filters,
    state: State,
    backend: B,
    update_masterlist_before_sort: bool,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B) -> Self {
        let notifier = Rc::new(Notifier::new());
        Session {
            filters: Filters::new(Rc::clone(&notifier)),
            state: State::new(Rc::clone(&notifier)),
            game: None,
            backend,
            update_masterlist_before_sort: false,
            notifier,
        }
    }

    pub fn notifier(&self) -> &Rc<Notifier> {
        &self.notifier
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    fn loaded_game(&mut self) -> Result<&mut Game, CoreError> {
        self.game.as_mut().ok_or(CoreError::NoGameLoaded)
    }

    /// Loads the current game's data from the backend.
    pub fn load_game(&mut self) -> Result<()> {
        let data = self
            .backend
            .get_game_data()
            .context("failed to get game data")?;
        self.game = Some(Game::new(data, Rc::clone(&self.notifier)));
        Ok(())
    }

    /// Switches to another game. Only legal outside sorting and editing.
    pub fn change_game(&mut self, folder: &str) -> Result<()> {
        if self.state.is_sorting() || self.state.is_editing() {
            return Err(CoreError::InvalidTransition {
                attempted: "change the game",
                current: self.state.current(),
            }
            .into());
        }
        let data = self
            .backend
            .change_game(folder)
            .with_context(|| format!("failed to change game to {folder}"))?;
        self.game = Some(Game::new(data, Rc::clone(&self.notifier)));
        Ok(())
    }

    /// Updates the masterlist. Returns whether anything changed.
    pub fn update_masterlist(&mut self) -> Result<bool> {
        let response = self
            .backend
            .update_masterlist()
            .context("failed to update the masterlist")?;
        let Some(response) = response else {
            return Ok(false);
        };

        let game = self.loaded_game()?;
        game.set_masterlist(Some(response.masterlist));
        game.set_general_messages(response.general_messages);
        for payload in response.plugins {
            if let Some(plugin) = game.find_plugin(&payload.name) {
                Rc::clone(plugin).borrow_mut().update(payload)?;
            }
        }
        Ok(true)
    }

    /// Runs the full sort workflow: deactivate the conflicts filter,
    /// optionally update the masterlist first, compute a sorted order and
    /// either stage it for approval or, when nothing moved, discard the
    /// attempt immediately.
    pub fn sort_plugins(&mut self) -> Result<SortStatus> {
        if self.state.is_editing() {
            return Err(CoreError::InvalidTransition {
                attempted: "sort plugins",
                current: self.state.current(),
            }
            .into());
        }

        self.filters.deactivate_conflicts_filter();
        if self.update_masterlist_before_sort {
            self.update_masterlist()?;
        }

        let content = self
            .backend
            .sort_plugins()
            .context("failed to sort plugins")?;

        let game = self.game.as_mut().ok_or(CoreError::NoGameLoaded)?;
        game.set_general_messages(content.general_messages);

        if content.plugins.is_empty() {
            bail!("sorting returned an empty plugin list");
        }

        if !game.has_load_order_changed(&content.plugins) {
            for payload in content.plugins {
                if let Some(plugin) = game.find_plugin(&payload.name) {
                    Rc::clone(plugin).borrow_mut().update(payload)?;
                }
            }
            self.backend
                .discard_unapplied_changes()
                .context("failed to discard unapplied changes")?;
            return Ok(SortStatus::NoChanges);
        }

        game.set_sorted_plugins(content.plugins)?;
        self.state.enter_sorting_state()?;
        Ok(SortStatus::AwaitingApproval)
    }

    /// Approves the pending sorted order and writes it to disk.
    pub fn apply_sort(&mut self) -> Result<()> {
        let names = self.loaded_game()?.plugin_names();
        self.backend
            .apply_sort(&names)
            .context("failed to apply the sorted load order")?;
        if let Some(game) = self.game.as_mut() {
            game.apply_sort();
        }
        self.state.exit_sorting_state()?;
        Ok(())
    }

    /// Abandons the pending sorted order and restores the previous one.
    pub fn cancel_sort(&mut self) -> Result<()> {
        let response = self
            .backend
            .cancel_sort()
            .context("failed to cancel sorting")?;
        let game = self.loaded_game()?;
        game.cancel_sort(&response.plugins, response.general_messages)?;
        self.state.exit_sorting_state()?;
        Ok(())
    }

    /// Removes all user metadata and refreshes the affected records.
    pub fn clear_all_metadata(&mut self) -> Result<()> {
        let payloads = self
            .backend
            .clear_all_metadata()
            .context("failed to clear all user metadata")?;
        self.loaded_game()?.clear_metadata(payloads)?;
        Ok(())
    }

    /// Removes one plugin's user metadata and refreshes its record.
    pub fn clear_plugin_metadata(&mut self, plugin_name: &str) -> Result<()> {
        let payload = self
            .backend
            .clear_plugin_metadata(plugin_name)
            .with_context(|| format!("failed to clear user metadata for {plugin_name}"))?;
        self.loaded_game()?.clear_metadata(vec![payload])?;
        Ok(())
    }

    /// Opens the metadata editor for the named plugin.
    pub fn open_editor(&mut self, plugin_name: &str) -> Result<()> {
        self.state.enter_editing_state()?;
        let game = self.loaded_game()?;
        let plugin = game
            .find_plugin(plugin_name)
            .ok_or_else(|| CoreError::UnknownPlugin(plugin_name.to_string()))?;
        plugin.borrow_mut().set_editor_open(true);
        Ok(())
    }

    /// Closes the metadata editor, applying the given edits if any, and
    /// refreshes the plugin from the backend's response.
    pub fn close_editor(
        &mut self,
        plugin_name: &str,
        edits: Option<PluginMetadata>,
    ) -> Result<()> {
        let apply_edits = edits.is_some();
        let metadata = edits.unwrap_or_else(|| PluginMetadata::new(plugin_name));
        let payload = self
            .backend
            .editor_closed(apply_edits, &metadata)
            .with_context(|| format!("failed to close the editor for {plugin_name}"))?;

        let game = self.loaded_game()?;
        let plugin = game
            .find_plugin(plugin_name)
            .ok_or_else(|| CoreError::UnknownPlugin(plugin_name.to_string()))?;
        {
            let mut plugin = plugin.borrow_mut();
            plugin.update(payload)?;
            plugin.set_editor_open(false);
        }
        self.state.exit_editing_state()?;
        Ok(())
    }

    /// Activates the conflicts filter for the named plugin and folds the
    /// response's refreshed payloads into the game model.
    pub fn activate_conflicts_filter(&mut self, plugin_name: &str) -> Result<MainContent> {
        let content = self
            .filters
            .activate_conflicts_filter(&self.backend, plugin_name);

        let game = self.loaded_game()?;
        if !content.general_messages.is_empty() {
            game.set_general_messages(content.general_messages.clone());
        }
        for payload in &content.plugins {
            if let Some(plugin) = game.find_plugin(&payload.name) {
                Rc::clone(plugin).borrow_mut().update(payload.clone())?;
            }
        }
        Ok(content)
    }

    pub fn deactivate_conflicts_filter(&mut self) -> bool {
        self.filters.deactivate_conflicts_filter()
    }

    /// Runs the current filters over the loaded game's plugins.
    pub fn apply_filters(&self) -> Result<FilteredContent> {
        let game = self.game.as_ref().ok_or(CoreError::NoGameLoaded)?;
        Ok(self.filters.apply(game.plugins()))
    }

    /// Persists the user's group edits and refreshes the merged view.
    pub fn save_user_groups(&mut self, groups: Vec<RawGroup>) -> Result<()> {
        self.backend
            .save_user_groups(&groups)
            .context("failed to save user groups")?;
        self.loaded_game()?.apply_user_groups(groups);
        Ok(())
    }

    /// Persists the settings dialog's state and applies it to the session.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        self.backend
            .close_settings(&settings)
            .context("failed to save settings")?;
        self.update_masterlist_before_sort = settings.update_masterlist;
        self.filters.load(&settings.filters);
        Ok(())
    }
}
