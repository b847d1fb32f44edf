// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! The three-state interaction machine gating sorting and editing.

use std::fmt;
use std::rc::Rc;

use crate::notify::{Event, Notifier};
use crate::CoreError;

/// The mutually exclusive interaction modes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationState {
    #[default]
    Default,
    /// A computed load order is awaiting approval or cancellation.
    Sorting,
    /// A metadata editor is open.
    Editing,
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplicationState::Default => "default",
            ApplicationState::Sorting => "sorting",
            ApplicationState::Editing => "editing",
        };
        f.write_str(name)
    }
}

/// Tracks the current interaction mode and announces transitions.
///
/// Every transition method is idempotent: requesting a state the machine is
/// already in succeeds without re-announcing. Illegal transitions return
/// [`CoreError::InvalidTransition`] and leave the state untouched.
#[derive(Debug)]
pub struct State {
    current: ApplicationState,
    notifier: Rc<Notifier>,
}

impl State {
    pub fn new(notifier: Rc<Notifier>) -> Self {
        State {
            current: ApplicationState::Default,
            notifier,
        }
    }

    pub fn current(&self) -> ApplicationState {
        self.current
    }

    pub fn is_sorting(&self) -> bool {
        self.current == ApplicationState::Sorting
    }

    pub fn is_editing(&self) -> bool {
        self.current == ApplicationState::Editing
    }

    pub fn enter_sorting_state(&mut self) -> Result<(), CoreError> {
        match self.current {
            ApplicationState::Sorting => Ok(()),
            ApplicationState::Editing => Err(CoreError::InvalidTransition {
                attempted: "enter the sorting state",
                current: self.current,
            }),
            ApplicationState::Default => {
                self.transition(ApplicationState::Sorting);
                Ok(())
            }
        }
    }

    pub fn exit_sorting_state(&mut self) -> Result<(), CoreError> {
        match self.current {
            ApplicationState::Default => Ok(()),
            ApplicationState::Editing => Err(CoreError::InvalidTransition {
                attempted: "exit the sorting state",
                current: self.current,
            }),
            ApplicationState::Sorting => {
                self.transition(ApplicationState::Default);
                Ok(())
            }
        }
    }

    pub fn enter_editing_state(&mut self) -> Result<(), CoreError> {
        match self.current {
            ApplicationState::Editing => Ok(()),
            ApplicationState::Sorting => Err(CoreError::InvalidTransition {
                attempted: "enter the editing state",
                current: self.current,
            }),
            ApplicationState::Default => {
                self.transition(ApplicationState::Editing);
                Ok(())
            }
        }
    }

    pub fn exit_editing_state(&mut self) -> Result<(), CoreError> {
        match self.current {
            ApplicationState::Default => Ok(()),
            ApplicationState::Sorting => Err(CoreError::InvalidTransition {
                attempted: "exit the editing state",
                current: self.current,
            }),
            ApplicationState::Editing => {
                self.transition(ApplicationState::Default);
                Ok(())
            }
        }
    }

    fn transition(&mut self, next: ApplicationState) {
        self.current = next;
        self.notifier
            .emit(Event::InteractionModeChanged { mode: next });
    }
}
