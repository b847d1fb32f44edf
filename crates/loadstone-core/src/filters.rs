// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! The filter engine deciding which plugins and messages are visible.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::metadata::{MainContent, SimpleMessage};
use crate::notify::{Event, Notifier};
use crate::plugin::SharedPlugin;
use crate::query::Backend;

const DO_NOT_CLEAN_PHRASE: &str = "do not clean";

/// The persistable on/off filter toggles, as stored in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterStates {
    pub hide_version_numbers: bool,
    #[serde(rename = "hideCRCs")]
    pub hide_crcs: bool,
    pub hide_bash_tags: bool,
    pub hide_notes: bool,
    pub hide_do_not_clean_messages: bool,
    pub hide_all_plugin_messages: bool,
    pub hide_inactive_plugins: bool,
    pub hide_messageless_plugins: bool,
}

/// The plugins surviving the current filters, plus how much was hidden.
#[derive(Debug, Clone, Default)]
pub struct FilteredContent {
    pub plugins: Vec<SharedPlugin>,
    pub hidden_plugin_count: usize,
    pub hidden_message_count: usize,
}

/// The full filter state: persistable toggles plus the transient conflicts
/// and content-search filters.
#[derive(Debug)]
pub struct Filters {
    pub hide_version_numbers: bool,
    pub hide_crcs: bool,
    pub hide_bash_tags: bool,
    pub hide_notes: bool,
    pub hide_do_not_clean_messages: bool,
    pub hide_all_plugin_messages: bool,
    pub hide_inactive_plugins: bool,
    pub hide_messageless_plugins: bool,

    /// Names of the plugins the conflicts filter shows; the first entry is
    /// the filter's target. Empty when the filter is inactive.
    pub conflicting_plugin_names: Vec<String>,
    pub content_search_string: String,

    notifier: Rc<Notifier>,
}

impl Filters {
    pub fn new(notifier: Rc<Notifier>) -> Self {
        Filters {
            hide_version_numbers: false,
            hide_crcs: false,
            hide_bash_tags: false,
            hide_notes: false,
            hide_do_not_clean_messages: false,
            hide_all_plugin_messages: false,
            hide_inactive_plugins: false,
            hide_messageless_plugins: false,
            conflicting_plugin_names: Vec::new(),
            content_search_string: String::new(),
            notifier,
        }
    }

    /// Overwrites the persistable toggles, leaving the transient filters
    /// untouched.
    pub fn load(&mut self, states: &FilterStates) {
        self.hide_version_numbers = states.hide_version_numbers;
        self.hide_crcs = states.hide_crcs;
        self.hide_bash_tags = states.hide_bash_tags;
        self.hide_notes = states.hide_notes;
        self.hide_do_not_clean_messages = states.hide_do_not_clean_messages;
        self.hide_all_plugin_messages = states.hide_all_plugin_messages;
        self.hide_inactive_plugins = states.hide_inactive_plugins;
        self.hide_messageless_plugins = states.hide_messageless_plugins;
    }

    pub fn states(&self) -> FilterStates {
        FilterStates {
            hide_version_numbers: self.hide_version_numbers,
            hide_crcs: self.hide_crcs,
            hide_bash_tags: self.hide_bash_tags,
            hide_notes: self.hide_notes,
            hide_do_not_clean_messages: self.hide_do_not_clean_messages,
            hide_all_plugin_messages: self.hide_all_plugin_messages,
            hide_inactive_plugins: self.hide_inactive_plugins,
            hide_messageless_plugins: self.hide_messageless_plugins,
        }
    }

    /// Whether a message passes the message-level filters.
    pub fn message_filter(&self, message: &SimpleMessage) -> bool {
        if self.hide_all_plugin_messages {
            return false;
        }
        if self.hide_notes && message.kind.is_note() {
            return false;
        }
        if self.hide_do_not_clean_messages
            && message.text.to_lowercase().contains(DO_NOT_CLEAN_PHRASE)
        {
            return false;
        }
        true
    }

    /// Whether a plugin passes the plugin-level filters. Message visibility
    /// feeds in: a plugin whose messages are all hidden counts as
    /// messageless.
    pub fn plugin_filter(&self, plugin: &SharedPlugin) -> bool {
        let plugin = plugin.borrow();

        if self.hide_inactive_plugins && !plugin.is_active {
            return false;
        }
        if !self.conflicting_plugin_names.is_empty()
            && !self
                .conflicting_plugin_names
                .iter()
                .any(|name| name == plugin.name())
        {
            return false;
        }

        let content = plugin.card_content(self);
        if self.hide_messageless_plugins && content.messages().is_empty() {
            return false;
        }
        content.contains_text(&self.content_search_string)
    }

    /// Clears the conflicts filter. Always announces the deactivation, even
    /// when the filter was not active; returns whether it was.
    pub fn deactivate_conflicts_filter(&mut self) -> bool {
        let was_active = !self.conflicting_plugin_names.is_empty();
        self.conflicting_plugin_names.clear();
        self.notifier.emit(Event::ConflictsFilterDeactivated);
        was_active
    }

    /// Activates the conflicts filter for the named plugin, querying the
    /// backend for its conflicts. The target name is set before the query,
    /// so a backend error fails open: the filter stays active with just the
    /// target visible, and an empty response is returned.
    pub fn activate_conflicts_filter(
        &mut self,
        backend: &dyn Backend,
        target_plugin_name: &str,
    ) -> MainContent {
        if target_plugin_name.is_empty() {
            return MainContent::default();
        }
        self.conflicting_plugin_names = vec![target_plugin_name.to_string()];

        match backend.get_conflicting_plugins(target_plugin_name) {
            Ok(response) => {
                let mut content = MainContent {
                    general_messages: response.general_messages,
                    plugins: Vec::new(),
                };
                for plugin in response.plugins {
                    if plugin.conflicts {
                        self.conflicting_plugin_names.push(plugin.metadata.name.clone());
                    }
                    content.plugins.push(plugin.metadata);
                }
                content
            }
            Err(error) => {
                log::error!(
                    "failed to activate conflicts filter for {target_plugin_name}: {error:#}"
                );
                MainContent::default()
            }
        }
    }

    pub fn are_any_filters_active(&self) -> bool {
        self.hide_version_numbers
            || self.hide_crcs
            || self.hide_bash_tags
            || self.hide_notes
            || self.hide_do_not_clean_messages
            || self.hide_all_plugin_messages
            || self.hide_inactive_plugins
            || self.hide_messageless_plugins
            || !self.conflicting_plugin_names.is_empty()
            || !self.content_search_string.is_empty()
    }

    /// Runs the plugin and message filters over the full sequence. Hidden
    /// message counts cover every plugin, including hidden ones.
    pub fn apply(&self, plugins: &[SharedPlugin]) -> FilteredContent {
        let mut content = FilteredContent::default();

        for plugin in plugins {
            let total = plugin.borrow().messages().len();
            let visible = plugin
                .borrow()
                .messages()
                .iter()
                .filter(|message| self.message_filter(message))
                .count();
            content.hidden_message_count += total - visible;

            if self.plugin_filter(plugin) {
                content.plugins.push(Rc::clone(plugin));
            } else {
                content.hidden_plugin_count += 1;
            }
        }

        content
    }
}
