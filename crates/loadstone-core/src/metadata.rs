// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! Data-transfer types shared with the remote backend.
//!
//! Field names mirror the JSON payloads crossing the query boundary, so
//! every struct here renames to camelCase. Change suppression in the model
//! relies on the derived `PartialEq` of these types: each field is compared
//! structurally, not via a generic deep-equal utility.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// A note. The wire name is `say` for historical reasons.
    Say,
    Warn,
    Error,
}

impl MessageType {
    pub fn is_note(self) -> bool {
        matches!(self, MessageType::Say)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub text: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub condition: String,
}

impl SimpleMessage {
    pub fn new(kind: MessageType, text: impl Into<String>) -> Self {
        SimpleMessage {
            kind,
            text: text.into(),
            language: String::new(),
            condition: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    pub is_addition: bool,
    #[serde(default)]
    pub condition: String,
}

/// One row of the metadata editor's tag table. `kind` is `"add"` or
/// `"remove"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRowData {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    pub text: String,
    #[serde(default)]
    pub language: String,
}

/// A file reference in an after/requirements/incompatibilities list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub name: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginCleaningData {
    pub crc: u32,
    pub util: String,
    pub itm: u32,
    pub udr: u32,
    pub nav: u32,
    pub info: Vec<MessageContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModLocation {
    pub name: String,
    #[serde(default)]
    pub link: String,
}

/// A full metadata record from one provenance source (masterlist or
/// userlist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginMetadata {
    pub name: String,
    pub enabled: bool,
    pub after: Vec<File>,
    pub req: Vec<File>,
    pub inc: Vec<File>,
    pub msg: Vec<SimpleMessage>,
    pub tag: Vec<Tag>,
    pub dirty: Vec<PluginCleaningData>,
    pub clean: Vec<PluginCleaningData>,
    pub url: Vec<ModLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        PluginMetadata {
            name: name.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// True when the record carries nothing beyond its mandatory name.
    pub fn is_identity_only(&self) -> bool {
        self.after.is_empty()
            && self.req.is_empty()
            && self.inc.is_empty()
            && self.msg.is_empty()
            && self.tag.is_empty()
            && self.dirty.is_empty()
            && self.clean.is_empty()
            && self.url.is_empty()
            && self.group.is_none()
    }
}

/// The authoritative per-plugin payload derived by the backend. Every
/// update fully overwrites the record it targets; omitted fields revert to
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivedPluginMetadata {
    pub name: String,
    pub is_active: bool,
    pub is_dirty: bool,
    pub is_empty: bool,
    pub is_master: bool,
    pub is_light_master: bool,
    pub loads_archive: bool,
    pub messages: Vec<SimpleMessage>,
    pub suggested_tags: Vec<Tag>,
    pub current_tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_order_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masterlist: Option<PluginMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userlist: Option<PluginMetadata>,
}

impl DerivedPluginMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        DerivedPluginMetadata {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Masterlist {
    pub revision: String,
    pub date: String,
}

/// A group as stored in a metadata list: a name plus the names of the
/// groups it loads after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroup {
    pub name: String,
    #[serde(default)]
    pub after: Vec<String>,
}

/// A load-after edge in the merged group view, tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcedEdge {
    pub name: String,
    pub is_user_added: bool,
}

/// A group in the merged masterlist/userlist view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcedGroup {
    pub name: String,
    pub is_user_added: bool,
    #[serde(default)]
    pub after: Vec<SourcedEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GameGroups {
    pub masterlist: Vec<RawGroup>,
    pub userlist: Vec<RawGroup>,
}

/// Everything the backend returns when a game is loaded or switched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GameData {
    pub folder: String,
    pub general_messages: Vec<SimpleMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masterlist: Option<Masterlist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<GameGroups>,
    pub plugins: Vec<DerivedPluginMetadata>,
    pub bash_tags: Vec<String>,
}

/// General messages plus plugin payloads, the shape shared by the sort and
/// conflict responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MainContent {
    pub general_messages: Vec<SimpleMessage>,
    pub plugins: Vec<DerivedPluginMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginLoadOrderIndex {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_order_index: Option<usize>,
}

/// Plain-data snapshot of a plugin, for the copy-content collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginContent {
    pub name: String,
    pub crc: u32,
    pub version: String,
    pub is_active: bool,
    pub is_empty: bool,
    pub loads_archive: bool,
    pub is_dirty: bool,
    pub group: String,
    pub messages: Vec<SimpleMessage>,
    pub current_tags: Vec<Tag>,
    pub suggested_tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GameContent {
    pub messages: Vec<SimpleMessage>,
    pub plugins: Vec<PluginContent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageCounts {
    pub total: usize,
    pub warnings: usize,
    pub errors: usize,
}

pub fn count_messages(messages: &[SimpleMessage]) -> MessageCounts {
    let mut counts = MessageCounts {
        total: messages.len(),
        ..Default::default()
    };
    for message in messages {
        match message.kind {
            MessageType::Warn => counts.warnings += 1,
            MessageType::Error => counts.errors += 1,
            MessageType::Say => {}
        }
    }
    counts
}
