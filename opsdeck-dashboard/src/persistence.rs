//! Persistence for lightweight UI state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::sidebar::SidebarState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedUiState {
    pub sidebar: SidebarState,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub fn load(path: &Path) -> Result<Option<PersistedUiState>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let state = serde_json::from_str::<PersistedUiState>(&contents)?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &PersistedUiState) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(state)?;
    std::fs::write(path, contents)?;
    Ok(())
}
