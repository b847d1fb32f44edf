// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! The per-game aggregate: folder, general messages, masterlist info,
//! groups and the plugin sequence.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::group::merge_groups;
use crate::metadata::{
    count_messages, DerivedPluginMetadata, GameContent, GameGroups, Masterlist,
    PluginLoadOrderIndex, RawGroup, SimpleMessage, SourcedGroup,
};
use crate::notify::{Event, Notifier, PluginCounts};
use crate::plugin::{Plugin, SharedPlugin, DEFAULT_GROUP};
use crate::CoreError;

/// The loaded game's reactive state.
///
/// Like [`Plugin`], construction routes through the `set_*` mutators so the
/// same change notifications fire whether data arrives at load time or
/// later. The plugin sequence order is the load order.
#[derive(Debug)]
pub struct Game {
    folder: String,
    general_messages: Vec<SimpleMessage>,
    masterlist: Option<Masterlist>,
    plugins: Vec<SharedPlugin>,
    groups: Vec<SourcedGroup>,
    bash_tags: Vec<String>,
    /// The pre-sort sequence, retained while a computed order awaits
    /// approval. Empty otherwise.
    old_load_order: Vec<SharedPlugin>,
    notifier: Rc<Notifier>,
}

impl Game {
    pub fn new(data: crate::metadata::GameData, notifier: Rc<Notifier>) -> Self {
        let crate::metadata::GameData {
            folder,
            general_messages,
            masterlist,
            groups,
            plugins,
            bash_tags,
        } = data;

        let mut game = Game {
            folder: String::new(),
            general_messages: Vec::new(),
            masterlist: None,
            plugins: Vec::new(),
            groups: Vec::new(),
            bash_tags,
            old_load_order: Vec::new(),
            notifier: Rc::clone(&notifier),
        };

        game.set_folder(folder);
        game.set_masterlist(masterlist);
        game.set_groups(groups.as_ref());
        game.set_general_messages(general_messages);
        game.set_plugins(
            plugins
                .into_iter()
                .map(|metadata| Rc::new(RefCell::new(Plugin::new(metadata, Rc::clone(&notifier)))))
                .collect(),
        );
        game
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn general_messages(&self) -> &[SimpleMessage] {
        &self.general_messages
    }

    pub fn masterlist(&self) -> Option<&Masterlist> {
        self.masterlist.as_ref()
    }

    pub fn plugins(&self) -> &[SharedPlugin] {
        &self.plugins
    }

    pub fn groups(&self) -> &[SourcedGroup] {
        &self.groups
    }

    pub fn bash_tags(&self) -> &[String] {
        &self.bash_tags
    }

    pub fn has_unapplied_sort(&self) -> bool {
        !self.old_load_order.is_empty()
    }

    pub fn set_folder(&mut self, folder: String) {
        if self.folder != folder {
            self.notifier.emit(Event::GameFolderChanged {
                folder: folder.clone(),
            });
        }
        self.folder = folder;
    }

    pub fn set_general_messages(&mut self, messages: Vec<SimpleMessage>) {
        if self.general_messages == messages {
            return;
        }
        let old = count_messages(&self.general_messages);
        let new = count_messages(&messages);
        self.general_messages = messages.clone();
        self.notifier.emit(Event::GeneralMessagesChanged {
            total_diff: new.total as i64 - old.total as i64,
            warning_diff: new.warnings as i64 - old.warnings as i64,
            error_diff: new.errors as i64 - old.errors as i64,
            messages,
        });
    }

    pub fn set_masterlist(&mut self, masterlist: Option<Masterlist>) {
        if self.masterlist == masterlist {
            return;
        }
        match &masterlist {
            Some(masterlist) => self.notifier.emit(Event::MasterlistChanged {
                revision: masterlist.revision.clone(),
                date: masterlist.date.clone(),
            }),
            None => self.notifier.emit(Event::MasterlistChanged {
                revision: "N/A".into(),
                date: "N/A".into(),
            }),
        }
        self.masterlist = masterlist;
    }

    /// Replaces the merged group view. The `default` group always exists,
    /// even when neither list defines it.
    pub fn set_groups(&mut self, groups: Option<&GameGroups>) {
        let mut merged = match groups {
            Some(groups) => merge_groups(&groups.masterlist, &groups.userlist),
            None => Vec::new(),
        };
        if !merged.iter().any(|group| group.name == DEFAULT_GROUP) {
            merged.push(SourcedGroup {
                name: DEFAULT_GROUP.into(),
                is_user_added: false,
                after: Vec::new(),
            });
            merged.sort_by(|a, b| a.name.cmp(&b.name));
        }
        if self.groups == merged {
            return;
        }
        self.groups = merged.clone();
        self.notifier.emit(Event::GroupsChanged { groups: merged });
    }

    pub fn user_groups(&self) -> Vec<RawGroup> {
        self.groups
            .iter()
            .filter(|group| {
                group.is_user_added || group.after.iter().any(|edge| edge.is_user_added)
            })
            .map(|group| RawGroup {
                name: group.name.clone(),
                after: group
                    .after
                    .iter()
                    .filter(|edge| edge.is_user_added)
                    .map(|edge| edge.name.clone())
                    .collect(),
            })
            .collect()
    }

    pub fn masterlist_groups(&self) -> Vec<RawGroup> {
        self.groups
            .iter()
            .filter(|group| !group.is_user_added)
            .map(|group| RawGroup {
                name: group.name.clone(),
                after: group
                    .after
                    .iter()
                    .filter(|edge| !edge.is_user_added)
                    .map(|edge| edge.name.clone())
                    .collect(),
            })
            .collect()
    }

    /// Re-merges the given userlist groups over the current masterlist
    /// half.
    pub fn apply_user_groups(&mut self, userlist: Vec<RawGroup>) {
        let masterlist = self.masterlist_groups();
        self.set_groups(Some(&GameGroups {
            masterlist,
            userlist,
        }));
    }

    /// Replaces the plugin sequence, restacks the cards and recounts the
    /// totals. General messages count towards the message totals.
    pub fn set_plugins(&mut self, plugins: Vec<SharedPlugin>) {
        let mut counts = count_totals(&self.general_messages, &plugins);
        counts.total_plugins = plugins.len();

        let mut seen = HashSet::new();
        let total = plugins.len();
        for (index, plugin) in plugins.iter().enumerate() {
            let mut plugin = plugin.borrow_mut();
            // Later cards stack under earlier ones.
            plugin.card_z_index = total - index;
            if !seen.insert(plugin.id().to_string()) {
                log::warn!("duplicate plugin id {}", plugin.id());
            }
        }

        self.plugins = plugins;
        self.notifier.emit(Event::GamePluginsChanged(counts));
    }

    pub fn find_plugin(&self, name: &str) -> Option<&SharedPlugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.borrow().name() == name)
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|plugin| plugin.borrow().name().to_string())
            .collect()
    }

    pub fn group_plugin_names(&self, group: &str) -> Vec<String> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.borrow().group() == group)
            .map(|plugin| plugin.borrow().name().to_string())
            .collect()
    }

    /// Whether the given payload order differs from the current sequence.
    pub fn has_load_order_changed(&self, payloads: &[DerivedPluginMetadata]) -> bool {
        !(payloads.len() == self.plugins.len()
            && payloads
                .iter()
                .zip(&self.plugins)
                .all(|(payload, plugin)| payload.name == plugin.borrow().name()))
    }

    /// Installs a computed load order, retaining the current one for
    /// cancellation. Records survive the reorder: a payload naming an
    /// existing plugin updates it in place, so transient state such as an
    /// open editor is kept.
    pub fn set_sorted_plugins(
        &mut self,
        payloads: Vec<DerivedPluginMetadata>,
    ) -> Result<(), CoreError> {
        self.old_load_order = self.plugins.clone();

        let mut sorted = Vec::with_capacity(payloads.len());
        for payload in payloads {
            match self.find_plugin(&payload.name) {
                Some(plugin) => {
                    let plugin = Rc::clone(plugin);
                    plugin.borrow_mut().update(payload)?;
                    sorted.push(plugin);
                }
                None => sorted.push(Rc::new(RefCell::new(Plugin::new(
                    payload,
                    Rc::clone(&self.notifier),
                )))),
            }
        }

        self.set_plugins(sorted);
        Ok(())
    }

    /// Approves the pending sorted order.
    pub fn apply_sort(&mut self) {
        self.old_load_order.clear();
    }

    /// Restores the pre-sort order described by the backend. Retained
    /// records not named in the restored order are dropped.
    pub fn cancel_sort(
        &mut self,
        restored: &[PluginLoadOrderIndex],
        general_messages: Vec<SimpleMessage>,
    ) -> Result<(), CoreError> {
        if self.old_load_order.is_empty() {
            return Err(CoreError::NoSortInProgress);
        }

        let mut plugins = Vec::with_capacity(restored.len());
        for entry in restored {
            let found = self
                .old_load_order
                .iter()
                .find(|plugin| plugin.borrow().name() == entry.name);
            if let Some(plugin) = found {
                plugin.borrow_mut().set_load_order_index(entry.load_order_index);
                plugins.push(Rc::clone(plugin));
            } else {
                log::warn!("restored load order names unknown plugin {}", entry.name);
            }
        }

        self.old_load_order.clear();
        self.set_plugins(plugins);
        self.set_general_messages(general_messages);
        Ok(())
    }

    /// Applies fresh payloads after user metadata was cleared.
    pub fn clear_metadata(
        &mut self,
        payloads: Vec<DerivedPluginMetadata>,
    ) -> Result<(), CoreError> {
        for payload in payloads {
            match self.find_plugin(&payload.name) {
                Some(plugin) => Rc::clone(plugin).borrow_mut().update(payload)?,
                None => return Err(CoreError::UnknownPlugin(payload.name)),
            }
        }
        Ok(())
    }

    /// Plain-data snapshot of the whole game, for export.
    pub fn content(&self) -> GameContent {
        GameContent {
            messages: self.general_messages.clone(),
            plugins: self
                .plugins
                .iter()
                .map(|plugin| {
                    let plugin = plugin.borrow();
                    crate::metadata::PluginContent {
                        name: plugin.name().to_string(),
                        crc: plugin.crc(),
                        version: plugin.version.clone(),
                        is_active: plugin.is_active,
                        is_empty: plugin.is_empty,
                        loads_archive: plugin.loads_archive,
                        is_dirty: plugin.is_dirty(),
                        group: plugin.group().to_string(),
                        messages: plugin.messages().to_vec(),
                        current_tags: plugin.current_tags().to_vec(),
                        suggested_tags: plugin.suggested_tags().to_vec(),
                    }
                })
                .collect(),
        }
    }
}

fn count_totals(general_messages: &[SimpleMessage], plugins: &[SharedPlugin]) -> PluginCounts {
    let mut counts = PluginCounts::default();

    let general = count_messages(general_messages);
    counts.total_messages = general.total;
    counts.warnings = general.warnings;
    counts.errors = general.errors;

    for plugin in plugins {
        let plugin = plugin.borrow();
        let messages = count_messages(plugin.messages());
        counts.total_messages += messages.total;
        counts.warnings += messages.warnings;
        counts.errors += messages.errors;
        if plugin.is_active {
            counts.active_plugins += 1;
        }
        if plugin.is_dirty() {
            counts.dirty_plugins += 1;
        }
    }

    counts
}
