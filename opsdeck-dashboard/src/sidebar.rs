//! Sidebar collapse state, persisted across sessions.
//!
//! A two-state toggle outside the query engine's responsibility; the engine
//! never manages UI-local state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::persistence::{self, PersistedUiState, PersistenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

/// The sidebar toggle. Every change is written through to the UI state file
/// so the choice survives restarts.
#[derive(Debug)]
pub struct Sidebar {
    state: SidebarState,
    path: PathBuf,
}

impl Sidebar {
    /// Load sidebar state from the UI state file, defaulting to expanded
    /// when no state has been persisted yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let state = persistence::load(&path)?
            .map(|persisted| persisted.sidebar)
            .unwrap_or(SidebarState::Expanded);
        Ok(Self { state, path })
    }

    pub fn state(&self) -> SidebarState {
        self.state
    }

    pub fn is_collapsed(&self) -> bool {
        self.state == SidebarState::Collapsed
    }

    /// Flip between expanded and collapsed, persisting the new state.
    pub fn toggle(&mut self) -> Result<SidebarState, PersistenceError> {
        let next = match self.state {
            SidebarState::Expanded => SidebarState::Collapsed,
            SidebarState::Collapsed => SidebarState::Expanded,
        };
        self.set(next)?;
        Ok(self.state)
    }

    pub fn set(&mut self, state: SidebarState) -> Result<(), PersistenceError> {
        self.state = state;
        persistence::save(&self.path, &PersistedUiState { sidebar: self.state })
    }
}
