// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! The reactive per-plugin record and its filter-aware card snapshot.

use std::cell::RefCell;
use std::rc::Rc;

use crate::filters::Filters;
use crate::metadata::{
    count_messages, DerivedPluginMetadata, PluginMetadata, SimpleMessage, Tag, TagRowData,
};
use crate::notify::{Event, ItemContentPayload, Notifier};
use crate::CoreError;

/// Plugins are shared between the live sequence and a saved pre-sort order,
/// and must keep their identity (including transient editor state) across
/// reordering.
pub type SharedPlugin = Rc<RefCell<Plugin>>;

pub(crate) const DEFAULT_GROUP: &str = "default";

/// Formats a CRC-32 checksum as eight uppercase hex digits.
pub fn crc_to_string(crc: u32) -> String {
    format!("{crc:08X}")
}

/// A plugin's element identifier: its name with all whitespace stripped.
fn derive_id(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The three comma-joined tag strings shown on a plugin card.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginTags {
    pub current: String,
    pub add: String,
    pub remove: String,
}

/// Splits suggested tags into addition and removal strings, dropping
/// suggestions that would not change the current tag set.
///
/// A removal is kept only when its tag is currently present. An addition is
/// dropped when its tag is already present, or when the same tag is also
/// suggested for removal (an ambiguous suggestion, shown as if not
/// suggested). Comparisons are case-insensitive.
fn deduplicate_tags(current_tags: &[Tag], suggested_tags: &[Tag]) -> PluginTags {
    let current_lower: Vec<String> = current_tags
        .iter()
        .map(|tag| tag.name.to_lowercase())
        .collect();
    let removal_lower: Vec<String> = suggested_tags
        .iter()
        .filter(|tag| !tag.is_addition)
        .map(|tag| tag.name.to_lowercase())
        .collect();

    let removals: Vec<&Tag> = suggested_tags
        .iter()
        .filter(|tag| !tag.is_addition && current_lower.contains(&tag.name.to_lowercase()))
        .collect();

    let additions: Vec<&Tag> = suggested_tags
        .iter()
        .filter(|tag| {
            let lower = tag.name.to_lowercase();
            tag.is_addition && !current_lower.contains(&lower) && !removal_lower.contains(&lower)
        })
        .collect();

    let join = |tags: &[&Tag]| {
        tags.iter()
            .map(|tag| tag.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    PluginTags {
        current: current_tags
            .iter()
            .map(|tag| tag.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        add: join(&additions),
        remove: join(&removals),
    }
}

/// A single plugin's reactive state.
///
/// Construction is silent; every subsequent mutation goes through a
/// `set_*` method that compares against the stored value and publishes the
/// matching [`Event`] only when something observable changed.
#[derive(Debug)]
pub struct Plugin {
    name: String,
    id: String,
    crc: u32,
    group: String,
    cleaned_with: String,
    load_order_index: Option<usize>,
    is_dirty: bool,
    messages: Vec<SimpleMessage>,
    current_tags: Vec<Tag>,
    suggested_tags: Vec<Tag>,
    userlist: Option<PluginMetadata>,
    is_editor_open: bool,
    is_search_result: bool,

    pub is_active: bool,
    pub is_empty: bool,
    pub is_master: bool,
    pub is_light_master: bool,
    pub loads_archive: bool,
    pub version: String,
    pub masterlist: Option<PluginMetadata>,
    /// Stacking position of this plugin's card; assigned by the game model
    /// whenever the sequence is replaced.
    pub card_z_index: usize,

    notifier: Rc<Notifier>,
}

impl Plugin {
    pub fn new(metadata: DerivedPluginMetadata, notifier: Rc<Notifier>) -> Self {
        Plugin {
            id: derive_id(&metadata.name),
            name: metadata.name,
            crc: metadata.crc.unwrap_or(0),
            group: metadata.group.unwrap_or_else(|| DEFAULT_GROUP.into()),
            cleaned_with: metadata.cleaned_with.unwrap_or_default(),
            load_order_index: metadata.load_order_index,
            is_dirty: metadata.is_dirty,
            messages: metadata.messages,
            current_tags: metadata.current_tags,
            suggested_tags: metadata.suggested_tags,
            userlist: metadata.userlist,
            is_editor_open: false,
            is_search_result: false,
            is_active: metadata.is_active,
            is_empty: metadata.is_empty,
            is_master: metadata.is_master,
            is_light_master: metadata.is_light_master,
            loads_archive: metadata.loads_archive,
            version: metadata.version.unwrap_or_default(),
            masterlist: metadata.masterlist,
            card_z_index: 0,
            notifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn cleaned_with(&self) -> &str {
        &self.cleaned_with
    }

    pub fn load_order_index(&self) -> Option<usize> {
        self.load_order_index
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn messages(&self) -> &[SimpleMessage] {
        &self.messages
    }

    pub fn current_tags(&self) -> &[Tag] {
        &self.current_tags
    }

    pub fn suggested_tags(&self) -> &[Tag] {
        &self.suggested_tags
    }

    pub fn userlist(&self) -> Option<&PluginMetadata> {
        self.userlist.as_ref()
    }

    pub fn is_editor_open(&self) -> bool {
        self.is_editor_open
    }

    pub fn is_search_result(&self) -> bool {
        self.is_search_result
    }

    /// True when a userlist record exists and carries actual edits.
    pub fn has_user_edits(&self) -> bool {
        self.userlist
            .as_ref()
            .is_some_and(|metadata| !metadata.is_identity_only())
    }

    pub fn set_messages(&mut self, messages: Vec<SimpleMessage>) {
        let old = count_messages(&self.messages);
        let new = count_messages(&messages);

        if old == new && self.messages == messages {
            return;
        }
        self.messages = messages;
        self.notifier.emit(Event::PluginMessagesChanged {
            plugin_id: self.id.clone(),
            may_change_card_height: true,
            total_diff: new.total as i64 - old.total as i64,
            warning_diff: new.warnings as i64 - old.warnings as i64,
            error_diff: new.errors as i64 - old.errors as i64,
        });
    }

    pub fn set_is_dirty(&mut self, is_dirty: bool) {
        if self.is_dirty == is_dirty {
            return;
        }
        self.is_dirty = is_dirty;
        self.notifier.emit(Event::PluginCleaningDataChanged {
            plugin_id: self.id.clone(),
            is_dirty: Some(is_dirty),
            cleaned_with: None,
        });
    }

    pub fn set_cleaned_with(&mut self, cleaned_with: String) {
        if self.cleaned_with == cleaned_with {
            return;
        }
        self.cleaned_with = cleaned_with.clone();
        self.notifier.emit(Event::PluginCleaningDataChanged {
            plugin_id: self.id.clone(),
            is_dirty: None,
            cleaned_with: Some(cleaned_with),
        });
    }

    pub fn set_crc(&mut self, crc: u32) {
        if self.crc == crc {
            return;
        }
        self.crc = crc;
        self.notifier.emit(Event::PluginCardContentChanged {
            plugin_id: self.id.clone(),
            may_change_card_height: false,
        });
    }

    pub fn set_current_tags(&mut self, tags: Vec<Tag>) {
        if self.current_tags == tags {
            return;
        }
        self.current_tags = tags;
        self.notifier.emit(Event::PluginCardContentChanged {
            plugin_id: self.id.clone(),
            may_change_card_height: true,
        });
    }

    pub fn set_suggested_tags(&mut self, tags: Vec<Tag>) {
        if self.suggested_tags == tags {
            return;
        }
        self.suggested_tags = tags;
        self.notifier.emit(Event::PluginCardContentChanged {
            plugin_id: self.id.clone(),
            may_change_card_height: true,
        });
    }

    /// Replaces the userlist record. User edits affect both the compact
    /// item (edit marker) and the card styling, so both notifications go
    /// out, item content first.
    pub fn set_userlist(&mut self, userlist: Option<PluginMetadata>) {
        if self.userlist == userlist {
            return;
        }
        self.userlist = userlist;
        self.emit_item_content_changed();
        self.notifier.emit(Event::PluginCardStylingChanged {
            plugin_id: self.id.clone(),
        });
    }

    pub fn set_group(&mut self, group: String) {
        if self.group == group {
            return;
        }
        self.group = group;
        self.emit_item_content_changed();
    }

    pub fn set_editor_open(&mut self, is_open: bool) {
        if self.is_editor_open == is_open {
            return;
        }
        self.is_editor_open = is_open;
        self.emit_item_content_changed();
    }

    pub fn set_load_order_index(&mut self, index: Option<usize>) {
        if self.load_order_index == index {
            return;
        }
        self.load_order_index = index;
        self.emit_item_content_changed();
    }

    pub fn set_search_result(&mut self, is_search_result: bool) {
        if self.is_search_result == is_search_result {
            return;
        }
        self.is_search_result = is_search_result;
        self.notifier.emit(Event::PluginCardStylingChanged {
            plugin_id: self.id.clone(),
        });
    }

    fn emit_item_content_changed(&self) {
        self.notifier
            .emit(Event::PluginItemContentChanged(ItemContentPayload {
                plugin_id: self.id.clone(),
                group: self.group.clone(),
                is_editor_open: self.is_editor_open,
                has_user_edits: self.has_user_edits(),
                load_order_index: self.load_order_index,
                is_light_master: self.is_light_master,
            }));
    }

    /// Overwrites this record with a fresh backend payload. Fields the
    /// payload omits revert to their defaults. The payload must describe
    /// the same plugin.
    pub fn update(&mut self, metadata: DerivedPluginMetadata) -> Result<(), CoreError> {
        if metadata.name != self.name {
            return Err(CoreError::MismatchedPluginName {
                expected: self.name.clone(),
                actual: metadata.name,
            });
        }

        self.is_active = metadata.is_active;
        self.is_empty = metadata.is_empty;
        self.is_master = metadata.is_master;
        self.is_light_master = metadata.is_light_master;
        self.loads_archive = metadata.loads_archive;
        self.version = metadata.version.unwrap_or_default();
        self.masterlist = metadata.masterlist;

        self.set_messages(metadata.messages);
        self.set_is_dirty(metadata.is_dirty);
        self.set_cleaned_with(metadata.cleaned_with.unwrap_or_default());
        self.set_crc(metadata.crc.unwrap_or(0));
        self.set_current_tags(metadata.current_tags);
        self.set_suggested_tags(metadata.suggested_tags);
        self.set_userlist(metadata.userlist);
        self.set_group(metadata.group.unwrap_or_else(|| DEFAULT_GROUP.into()));
        self.set_load_order_index(metadata.load_order_index);

        Ok(())
    }

    /// Captures what the plugin's card should show under the given filters.
    pub fn card_content(&self, filters: &Filters) -> PluginCardContent {
        let tags = if filters.hide_bash_tags {
            PluginTags::default()
        } else {
            deduplicate_tags(&self.current_tags, &self.suggested_tags)
        };

        PluginCardContent {
            name: self.name.clone(),
            is_active: self.is_active,
            is_empty: self.is_empty,
            is_master: self.is_master,
            is_light_master: self.is_light_master,
            loads_archive: self.loads_archive,
            version: if filters.hide_version_numbers {
                String::new()
            } else {
                self.version.clone()
            },
            crc: if filters.hide_crcs { 0 } else { self.crc },
            tags,
            messages: self
                .messages
                .iter()
                .filter(|message| filters.message_filter(message))
                .cloned()
                .collect(),
        }
    }

    /// Converts an editor tag table row into a metadata tag.
    pub fn tag_from_row_data(row: &TagRowData) -> Result<Tag, CoreError> {
        let is_addition = match row.kind.as_str() {
            "add" => true,
            "remove" => false,
            other => return Err(CoreError::UnknownTagRowType(other.into())),
        };
        Ok(Tag {
            name: row.name.clone(),
            is_addition,
            condition: row.condition.clone(),
        })
    }

    /// Converts a metadata tag into an editor tag table row.
    pub fn tag_to_row_data(tag: &Tag) -> TagRowData {
        TagRowData {
            name: tag.name.clone(),
            kind: if tag.is_addition { "add" } else { "remove" }.into(),
            condition: tag.condition.clone(),
        }
    }
}

/// A read-only, filter-aware snapshot of a plugin card's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCardContent {
    name: String,
    is_active: bool,
    is_empty: bool,
    is_master: bool,
    is_light_master: bool,
    loads_archive: bool,
    version: String,
    crc: u32,
    tags: PluginTags,
    messages: Vec<SimpleMessage>,
}

impl PluginCardContent {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    pub fn is_light_master(&self) -> bool {
        self.is_light_master
    }

    pub fn loads_archive(&self) -> bool {
        self.loads_archive
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The formatted CRC, or an empty string when the CRC is unknown or
    /// hidden.
    pub fn crc(&self) -> String {
        if self.crc == 0 {
            String::new()
        } else {
            crc_to_string(self.crc)
        }
    }

    pub fn tags(&self) -> &PluginTags {
        &self.tags
    }

    pub fn messages(&self) -> &[SimpleMessage] {
        &self.messages
    }

    /// Case-insensitive search across everything the card shows. The empty
    /// needle matches.
    pub fn contains_text(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();

        self.name.to_lowercase().contains(&needle)
            || self.crc().to_lowercase().contains(&needle)
            || self.version.to_lowercase().contains(&needle)
            || self.tags.current.to_lowercase().contains(&needle)
            || self.tags.add.to_lowercase().contains(&needle)
            || self.tags.remove.to_lowercase().contains(&needle)
            || self
                .messages
                .iter()
                .any(|message| message.text.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MessageType;
    use crate::notify::record_events;

    fn tag(name: &str, is_addition: bool) -> Tag {
        Tag {
            name: name.into(),
            is_addition,
            condition: String::new(),
        }
    }

    fn new_plugin(metadata: DerivedPluginMetadata) -> (Plugin, Rc<Notifier>) {
        let notifier = Rc::new(Notifier::new());
        (Plugin::new(metadata, Rc::clone(&notifier)), notifier)
    }

    #[test]
    fn test_crc_to_string_pads_to_eight_uppercase_digits() {
        assert_eq!(crc_to_string(0xDEADBEEF), "DEADBEEF");
        assert_eq!(crc_to_string(0xBEEF), "0000BEEF");
    }

    #[test]
    fn test_id_strips_whitespace_from_name() {
        let (plugin, _notifier) = new_plugin(DerivedPluginMetadata::new("Blank - Different.esp"));
        assert_eq!(plugin.name(), "Blank - Different.esp");
        assert_eq!(plugin.id(), "Blank-Different.esp");
    }

    #[test]
    fn test_construction_emits_nothing() {
        let notifier = Rc::new(Notifier::new());
        let events = record_events(&notifier);

        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.messages = vec![SimpleMessage::new(MessageType::Warn, "a warning")];
        let _plugin = Plugin::new(metadata, Rc::clone(&notifier));

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_set_messages_emits_count_deltas() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.messages = vec![
            SimpleMessage::new(MessageType::Say, "a note"),
            SimpleMessage::new(MessageType::Warn, "a warning"),
        ];
        let (mut plugin, notifier) = new_plugin(metadata);
        let events = record_events(&notifier);

        plugin.set_messages(vec![SimpleMessage::new(MessageType::Error, "an error")]);

        assert_eq!(
            *events.borrow(),
            vec![Event::PluginMessagesChanged {
                plugin_id: "Blank.esp".into(),
                may_change_card_height: true,
                total_diff: -1,
                warning_diff: -1,
                error_diff: 1,
            }]
        );
    }

    #[test]
    fn test_set_messages_suppresses_no_op() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.messages = vec![SimpleMessage::new(MessageType::Say, "a note")];
        let (mut plugin, notifier) = new_plugin(metadata);
        let events = record_events(&notifier);

        plugin.set_messages(vec![SimpleMessage::new(MessageType::Say, "a note")]);

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_set_messages_emits_when_text_changes_but_counts_match() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.messages = vec![SimpleMessage::new(MessageType::Say, "a note")];
        let (mut plugin, notifier) = new_plugin(metadata);
        let events = record_events(&notifier);

        plugin.set_messages(vec![SimpleMessage::new(MessageType::Say, "another note")]);

        assert_eq!(events.borrow().len(), 1);
        assert!(matches!(
            events.borrow()[0],
            Event::PluginMessagesChanged {
                total_diff: 0,
                warning_diff: 0,
                error_diff: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_set_userlist_emits_item_content_then_styling() {
        let (mut plugin, notifier) = new_plugin(DerivedPluginMetadata::new("Blank.esp"));
        let events = record_events(&notifier);

        let mut userlist = PluginMetadata::new("Blank.esp");
        userlist.group = Some("late".into());
        plugin.set_userlist(Some(userlist));

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::PluginItemContentChanged(payload) => {
                assert!(payload.has_user_edits);
                assert_eq!(payload.plugin_id, "Blank.esp");
            }
            other => panic!("expected item content event, got {other:?}"),
        }
        assert_eq!(
            events[1],
            Event::PluginCardStylingChanged {
                plugin_id: "Blank.esp".into()
            }
        );
    }

    #[test]
    fn test_identity_only_userlist_is_not_a_user_edit() {
        let (mut plugin, _notifier) = new_plugin(DerivedPluginMetadata::new("Blank.esp"));

        plugin.set_userlist(Some(PluginMetadata::new("Blank.esp")));

        assert!(!plugin.has_user_edits());
    }

    #[test]
    fn test_update_rejects_mismatched_name() {
        let (mut plugin, _notifier) = new_plugin(DerivedPluginMetadata::new("Blank.esp"));

        let err = plugin
            .update(DerivedPluginMetadata::new("Other.esp"))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "cannot update data for Blank.esp using data for Other.esp"
        );
    }

    #[test]
    fn test_update_with_identical_payload_is_silent() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.crc = Some(0xDEADBEEF);
        metadata.messages = vec![SimpleMessage::new(MessageType::Warn, "a warning")];
        let (mut plugin, notifier) = new_plugin(metadata.clone());
        let events = record_events(&notifier);

        plugin.update(metadata).unwrap();

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_update_reverts_omitted_fields_to_defaults() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.crc = Some(0xDEADBEEF);
        metadata.group = Some("late".into());
        metadata.version = Some("1.0".into());
        let (mut plugin, _notifier) = new_plugin(metadata);

        plugin.update(DerivedPluginMetadata::new("Blank.esp")).unwrap();

        assert_eq!(plugin.crc(), 0);
        assert_eq!(plugin.group(), DEFAULT_GROUP);
        assert_eq!(plugin.version, "");
    }

    #[test]
    fn test_deduplicate_tags() {
        let current = vec![tag("Relev", true), tag("Delev", true)];
        let suggested = vec![
            // Already present: dropped from additions.
            tag("Relev", true),
            tag("NoMerge", true),
            // Not currently present: removal dropped.
            tag("C.Water", false),
            tag("Delev", false),
        ];

        let tags = deduplicate_tags(&current, &suggested);

        assert_eq!(tags.current, "Relev, Delev");
        assert_eq!(tags.add, "NoMerge");
        assert_eq!(tags.remove, "Delev");
    }

    #[test]
    fn test_deduplicate_tags_addition_cancelled_by_removal() {
        let current = vec![tag("Delev", true)];
        let suggested = vec![tag("delev", true), tag("Delev", false)];

        let tags = deduplicate_tags(&current, &suggested);

        assert_eq!(tags.add, "");
        assert_eq!(tags.remove, "Delev");
    }

    #[test]
    fn test_deduplicate_tags_drops_ambiguous_suggestions() {
        // Suggested both ways while not currently present: neither column
        // shows it.
        let suggested = vec![tag("C.Water", true), tag("c.water", false)];

        let tags = deduplicate_tags(&[], &suggested);

        assert_eq!(tags.add, "");
        assert_eq!(tags.remove, "");
    }

    #[test]
    fn test_card_content_respects_filters() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.crc = Some(0xDEADBEEF);
        metadata.version = Some("1.0".into());
        metadata.suggested_tags = vec![tag("Delev", true)];
        metadata.messages = vec![
            SimpleMessage::new(MessageType::Say, "a note"),
            SimpleMessage::new(MessageType::Warn, "a warning"),
        ];
        let (plugin, notifier) = new_plugin(metadata);

        let mut filters = Filters::new(notifier);
        let content = plugin.card_content(&filters);
        assert_eq!(content.crc(), "DEADBEEF");
        assert_eq!(content.version(), "1.0");
        assert_eq!(content.tags().add, "Delev");
        assert_eq!(content.messages().len(), 2);

        filters.hide_crcs = true;
        filters.hide_version_numbers = true;
        filters.hide_bash_tags = true;
        filters.hide_notes = true;
        let content = plugin.card_content(&filters);
        assert_eq!(content.crc(), "");
        assert_eq!(content.version(), "");
        assert_eq!(content.tags(), &PluginTags::default());
        assert_eq!(content.messages().len(), 1);
        assert_eq!(content.messages()[0].kind, MessageType::Warn);
    }

    #[test]
    fn test_contains_text_searches_all_card_fields() {
        let mut metadata = DerivedPluginMetadata::new("Blank.esp");
        metadata.crc = Some(0xDEADBEEF);
        metadata.version = Some("1.0-beta".into());
        metadata.current_tags = vec![tag("Relev", true)];
        metadata.messages = vec![SimpleMessage::new(MessageType::Say, "Install the patch")];
        let (plugin, notifier) = new_plugin(metadata);

        let filters = Filters::new(notifier);
        let content = plugin.card_content(&filters);

        assert!(content.contains_text(""));
        assert!(content.contains_text("blank"));
        assert!(content.contains_text("deadbeef"));
        assert!(content.contains_text("BETA"));
        assert!(content.contains_text("relev"));
        assert!(content.contains_text("the patch"));
        assert!(!content.contains_text("missing"));
    }

    #[test]
    fn test_tag_row_data_round_trip() {
        let row = TagRowData {
            name: "Delev".into(),
            kind: "remove".into(),
            condition: "file(\"Blank.esm\")".into(),
        };

        let tag = Plugin::tag_from_row_data(&row).unwrap();
        assert!(!tag.is_addition);
        assert_eq!(Plugin::tag_to_row_data(&tag), row);

        let err = Plugin::tag_from_row_data(&TagRowData {
            name: "Delev".into(),
            kind: "delete".into(),
            condition: String::new(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("delete"));
    }
}
