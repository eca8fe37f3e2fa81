//! High-score persistence: one integer in one named slot.

use std::cell::Cell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub trait HighScoreStore {
    fn load(&self) -> Result<u32, GameError>;
    fn save(&mut self, score: u32) -> Result<(), GameError>;
}

/// In-memory slot. Clones share the same value, so a caller can keep a
/// handle after giving one to the engine.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    value: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        MemoryStore {
            value: Rc::new(Cell::new(score)),
        }
    }

    pub fn value(&self) -> u32 {
        self.value.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, GameError> {
        Ok(self.value.get())
    }

    fn save(&mut self, score: u32) -> Result<(), GameError> {
        self.value.set(score);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SaveSlot {
    #[serde(rename = "raidenHighScore")]
    high_score: u32,
}

/// JSON file holding `{"raidenHighScore": n}`. A missing file reads as 0.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u32, GameError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let slot: SaveSlot = serde_json::from_str(&text)?;
        Ok(slot.high_score)
    }

    fn save(&mut self, score: u32) -> Result<(), GameError> {
        let text = serde_json::to_string(&SaveSlot { high_score: score })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
