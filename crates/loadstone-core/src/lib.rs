// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! The UI-independent state layer of the Loadstone load order manager.
//!
//! This crate owns the reactive plugin/game data model, the filter engine
//! deciding which plugins and messages are visible, the interaction state
//! machine gating sorting and metadata-editing workflows, and the typed
//! boundary to the remote backend that actually reads and writes load
//! orders. Rendering, dialogs and transport are external collaborators:
//! they subscribe to [`notify::Event`]s and drive [`session::Session`]
//! operations.

pub mod filters;
pub mod game;
pub mod group;
pub mod metadata;
pub mod notify;
pub mod plugin;
pub mod query;
pub mod session;
pub mod state;

use thiserror::Error;

/// Contract errors: programmer mistakes and illegal operations.
///
/// Remote-call failures never take this form; they cross the
/// [`query::Backend`] boundary as `anyhow` errors carrying only a
/// human-readable message.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cannot update data for {expected} using data for {actual}")]
    MismatchedPluginName { expected: String, actual: String },
    #[error("cannot {attempted} from the {current} state")]
    InvalidTransition {
        attempted: &'static str,
        current: state::ApplicationState,
    },
    #[error("no sort is in progress")]
    NoSortInProgress,
    #[error("no game is loaded")]
    NoGameLoaded,
    #[error("unknown plugin {0}")]
    UnknownPlugin(String),
    #[error("unknown tag row type {0:?}, expected \"add\" or \"remove\"")]
    UnknownTagRowType(String),
}

pub use filters::{FilterStates, FilteredContent, Filters};
pub use game::Game;
pub use group::merge_groups;
pub use notify::{Event, EventKind, Notifier, SubscriptionId};
pub use plugin::{crc_to_string, Plugin, PluginCardContent, SharedPlugin};
pub use query::Backend;
pub use session::{Session, SortStatus};
pub use state::{ApplicationState, State};
