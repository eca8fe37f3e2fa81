//! Game configuration.
//!
//! Defaults are safe to run with; an optional INI file overrides any of them.
//!
//! ```ini
//! [field]
//! width = 480
//! height = 640
//!
//! [loop]
//! target_fps = 60
//!
//! [game]
//! seed = 42
//! save_file = ./raiden_high_score.json
//! ```

use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use log::info;

use crate::error::GameError;

const DEFAULT_FIELD_WIDTH: u32 = 480;
const DEFAULT_FIELD_HEIGHT: u32 = 640;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_SAVE_FILE: &str = "./raiden_high_score.json";
/// Smallest field that still fits the boss and the spawn margins.
const MIN_FIELD_SIZE: u32 = 160;
/// Above this a frame would round to less than a millisecond of simulated time.
const MAX_TARGET_FPS: u32 = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub field_width: u32,
    pub field_height: u32,
    /// Simulation frames per second; fixes the timestep.
    pub target_fps: u32,
    /// Seed for the simulation RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub save_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            field_width: DEFAULT_FIELD_WIDTH,
            field_height: DEFAULT_FIELD_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            seed: None,
            save_file: PathBuf::from(DEFAULT_SAVE_FILE),
        }
    }

    /// Length of one simulation frame in microseconds.
    pub fn frame_micros(&self) -> u64 {
        1_000_000 / self.target_fps.max(1) as u64
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<(), GameError> {
        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|e| GameError::Config(format!("{}: {}", path.display(), e)))?;
        self.apply(&ini)?;
        info!(
            "Loaded config from {}: field {}x{}, fps={}, seed={:?}",
            path.display(),
            self.field_width,
            self.field_height,
            self.target_fps,
            self.seed
        );
        Ok(())
    }

    pub fn load_from_str(&mut self, text: &str) -> Result<(), GameError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(GameError::Config)?;
        self.apply(&ini)
    }

    fn apply(&mut self, ini: &Ini) -> Result<(), GameError> {
        if let Some(width) = ini.getuint("field", "width").map_err(GameError::Config)? {
            self.field_width = to_u32("field.width", width)?;
        }
        if let Some(height) = ini.getuint("field", "height").map_err(GameError::Config)? {
            self.field_height = to_u32("field.height", height)?;
        }
        if let Some(fps) = ini.getuint("loop", "target_fps").map_err(GameError::Config)? {
            self.target_fps = to_u32("loop.target_fps", fps)?;
        }
        if let Some(seed) = ini.getuint("game", "seed").map_err(GameError::Config)? {
            self.seed = Some(seed);
        }
        if let Some(save_file) = ini.get("game", "save_file") {
            self.save_file = PathBuf::from(save_file);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.field_width < MIN_FIELD_SIZE || self.field_height < MIN_FIELD_SIZE {
            return Err(GameError::Config(format!(
                "field {}x{} is smaller than {}x{}",
                self.field_width, self.field_height, MIN_FIELD_SIZE, MIN_FIELD_SIZE
            )));
        }
        if self.target_fps == 0 || self.target_fps > MAX_TARGET_FPS {
            return Err(GameError::Config(format!(
                "target_fps must be between 1 and {MAX_TARGET_FPS}, got {}",
                self.target_fps
            )));
        }
        Ok(())
    }
}

fn to_u32(key: &str, value: u64) -> Result<u32, GameError> {
    u32::try_from(value).map_err(|_| GameError::Config(format!("{key} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_micros(), 16_666);
    }

    #[test]
    fn ini_overrides_defaults() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[field]\nwidth = 320\n\n[loop]\ntarget_fps = 30\n\n[game]\nseed = 9\nsave_file = /tmp/hs.json\n")
            .unwrap();
        assert_eq!(config.field_width, 320);
        assert_eq!(config.field_height, DEFAULT_FIELD_HEIGHT);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.save_file, PathBuf::from("/tmp/hs.json"));
    }

    #[test]
    fn rejects_tiny_field() {
        let mut config = GameConfig::new();
        let err = config.load_from_str("[field]\nwidth = 10\n").unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let mut config = GameConfig::new();
        assert!(config.load_from_str("[loop]\ntarget_fps = fast\n").is_err());
    }

    #[test]
    fn rejects_zero_fps() {
        let mut config = GameConfig::new();
        assert!(config.load_from_str("[loop]\ntarget_fps = 0\n").is_err());
    }

    #[test]
    fn rejects_fps_that_would_stall_the_clock() {
        let mut config = GameConfig::new();
        assert!(config.load_from_str("[loop]\ntarget_fps = 2000000\n").is_err());

        config.target_fps = MAX_TARGET_FPS;
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_micros(), 1_000);
    }
}
