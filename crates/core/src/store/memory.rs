use std::sync::Mutex;

use super::traits::PositionStore;
use crate::errors::CoreError;
use crate::models::position::Position;

/// In-memory position store for tests and embedded use.
/// Same whole-table semantics as the file-backed store.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<Position>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(positions: Vec<Position>) -> Self {
        Self {
            rows: Mutex::new(positions),
        }
    }
}

impl PositionStore for InMemoryStore {
    fn read(&self) -> Result<Vec<Position>, CoreError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| CoreError::Store("store lock poisoned".into()))?;
        Ok(rows.clone())
    }

    fn update(&self, positions: &[Position]) -> Result<(), CoreError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| CoreError::Store("store lock poisoned".into()))?;
        *rows = positions.to_vec();
        Ok(())
    }
}
