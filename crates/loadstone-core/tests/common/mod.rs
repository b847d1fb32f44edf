// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

use anyhow::{anyhow, Result};
use loadstone_core::metadata::{DerivedPluginMetadata, GameData, MainContent, PluginMetadata};
use loadstone_core::query::{
    CancelSortResponse, ConflictsResponse, MasterlistUpdateResponse, Settings,
};
use loadstone_core::{Backend, Event, Notifier};

static INIT_LOGGING: Once = Once::new();

/// Sends test log output to the terminal, once per process.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = simplelog::TermLogger::init(
            simplelog::LevelFilter::Debug,
            simplelog::Config::default(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        );
    });
}

/// Collects every event a notifier emits into a shared buffer.
pub fn record_events(notifier: &Notifier) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    notifier.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// A backend scripted with just the responses the workflow suites need.
/// Unscripted queries fail, which doubles as the error path in tests.
#[derive(Default)]
pub struct ScriptedBackend {
    pub game_data: RefCell<Option<GameData>>,
    pub sort_response: RefCell<Option<MainContent>>,
    pub cancel_sort_response: RefCell<Option<CancelSortResponse>>,
    pub cleared_metadata: RefCell<Option<Vec<DerivedPluginMetadata>>>,
    pub editor_closed_response: RefCell<Option<DerivedPluginMetadata>>,
    pub conflicts_response: RefCell<Option<ConflictsResponse>>,

    pub applied_sort: RefCell<Option<Vec<String>>>,
    pub editor_payloads: RefCell<Vec<(bool, PluginMetadata)>>,
    pub discard_calls: Cell<usize>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn scripted<T: Clone>(slot: &RefCell<Option<T>>, query: &str) -> Result<T> {
    slot.borrow()
        .clone()
        .ok_or_else(|| anyhow!("unscripted query: {query}"))
}

impl Backend for ScriptedBackend {
    fn change_game(&self, _folder: &str) -> Result<GameData> {
        Err(anyhow!("unscripted query: change_game"))
    }

    fn get_game_data(&self) -> Result<GameData> {
        scripted(&self.game_data, "get_game_data")
    }

    fn update_masterlist(&self) -> Result<Option<MasterlistUpdateResponse>> {
        Err(anyhow!("unscripted query: update_masterlist"))
    }

    fn sort_plugins(&self) -> Result<MainContent> {
        scripted(&self.sort_response, "sort_plugins")
    }

    fn apply_sort(&self, plugin_names: &[String]) -> Result<()> {
        self.applied_sort.replace(Some(plugin_names.to_vec()));
        Ok(())
    }

    fn cancel_sort(&self) -> Result<CancelSortResponse> {
        scripted(&self.cancel_sort_response, "cancel_sort")
    }

    fn discard_unapplied_changes(&self) -> Result<()> {
        self.discard_calls.set(self.discard_calls.get() + 1);
        Ok(())
    }

    fn clear_plugin_metadata(&self, plugin_name: &str) -> Result<DerivedPluginMetadata> {
        self.cleared_metadata
            .borrow()
            .as_ref()
            .and_then(|payloads| {
                payloads
                    .iter()
                    .find(|payload| payload.name == plugin_name)
                    .cloned()
            })
            .ok_or_else(|| anyhow!("unscripted query: clear_plugin_metadata"))
    }

    fn clear_all_metadata(&self) -> Result<Vec<DerivedPluginMetadata>> {
        scripted(&self.cleared_metadata, "clear_all_metadata")
    }

    fn editor_closed(
        &self,
        apply_edits: bool,
        metadata: &PluginMetadata,
    ) -> Result<DerivedPluginMetadata> {
        self.editor_payloads
            .borrow_mut()
            .push((apply_edits, metadata.clone()));
        scripted(&self.editor_closed_response, "editor_closed")
    }

    fn get_conflicting_plugins(&self, _plugin_name: &str) -> Result<ConflictsResponse> {
        scripted(&self.conflicts_response, "get_conflicting_plugins")
    }

    fn save_user_groups(&self, _groups: &[loadstone_core::metadata::RawGroup]) -> Result<()> {
        Ok(())
    }

    fn close_settings(&self, _settings: &Settings) -> Result<()> {
        Ok(())
    }
}

/// Builds a session with the named plugins already loaded.
pub fn loaded_session(plugin_names: &[&str]) -> loadstone_core::Session<ScriptedBackend> {
    init_logging();

    let backend = ScriptedBackend::new();
    backend.game_data.replace(Some(GameData {
        folder: "Skyrim".into(),
        plugins: plugin_names
            .iter()
            .map(|name| DerivedPluginMetadata::new(*name))
            .collect(),
        ..Default::default()
    }));
    let mut session = loadstone_core::Session::new(backend);
    session.load_game().expect("game data was scripted");
    session
}
