use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Calibration offsets beyond this are clamped, in ms.
pub const MAX_MUSIC_OFFSET_MS: i64 = 500;

/// Which keys map onto the 3×3 gamepad.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum KeyLayout {
    /// 7 8 9 / 4 5 6 / 1 2 3
    #[default]
    Numpad,
    /// q w e / a s d / z x c
    Qwerty,
}

impl KeyLayout {
    fn rows(self) -> [&'static str; 3] {
        match self {
            KeyLayout::Numpad => ["789", "456", "123"],
            KeyLayout::Qwerty => ["qwe", "asd", "zxc"],
        }
    }

    /// Grid cell for a typed character, row-major from the top-left.
    pub fn position_for(self, c: char) -> Option<usize> {
        let c = c.to_ascii_lowercase();
        self.rows()
            .iter()
            .enumerate()
            .find_map(|(row, keys)| keys.find(c).map(|col| row * 3 + col))
    }

    pub fn key_for(self, position: usize) -> Option<char> {
        self.rows().get(position / 3)?.chars().nth(position % 3)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Added to the track position to compensate for output latency.
    pub music_offset_ms: i64,
    /// Keep playing when health runs out.
    pub no_fail: bool,
    pub tick_rate_ms: u64,
    pub log_level: String,
    pub key_layout: KeyLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_offset_ms: -75,
            no_fail: false,
            tick_rate_ms: 16,
            log_level: "warn".to_string(),
            key_layout: KeyLayout::Numpad,
        }
    }
}

impl Config {
    pub fn clamped(mut self) -> Self {
        self.music_offset_ms = self
            .music_offset_ms
            .clamp(-MAX_MUSIC_OFFSET_MS, MAX_MUSIC_OFFSET_MS);
        self.tick_rate_ms = self.tick_rate_ms.max(1);
        self
    }

    /// Parsed log level; unknown names fall back to `warn`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> crate::error::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("windsong_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.clamped(),
            Err(e) => {
                log::warn!(
                    "ignoring malformed config {}: {e}",
                    self.path.display()
                );
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults_and_clamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "music_offset_ms": 9000, "key_layout": "qwerty" }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.music_offset_ms, 500);
        assert_eq!(cfg.key_layout, KeyLayout::Qwerty);
        assert!(!cfg.no_fail);
        assert_eq!(cfg.tick_rate_ms, 16);
    }

    #[test]
    fn level_filter_falls_back() {
        let mut cfg = Config::default();
        assert_eq!(cfg.level_filter(), log::LevelFilter::Warn);
        cfg.log_level = "debug".into();
        assert_eq!(cfg.level_filter(), log::LevelFilter::Debug);
        cfg.log_level = "chatty".into();
        assert_eq!(cfg.level_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn key_layouts_cover_grid() {
        assert_eq!(KeyLayout::Numpad.position_for('7'), Some(0));
        assert_eq!(KeyLayout::Numpad.position_for('5'), Some(4));
        assert_eq!(KeyLayout::Numpad.position_for('3'), Some(8));
        assert_eq!(KeyLayout::Qwerty.position_for('Q'), Some(0));
        assert_eq!(KeyLayout::Qwerty.position_for('d'), Some(5));
        assert_eq!(KeyLayout::Qwerty.position_for('x'), Some(7));
        assert_eq!(KeyLayout::Qwerty.position_for('p'), None);
        assert_eq!(KeyLayout::Numpad.position_for('0'), None);
    }

    #[test]
    fn key_for_inverts_position_for() {
        for layout in [KeyLayout::Numpad, KeyLayout::Qwerty] {
            for pos in 0..9 {
                let key = layout.key_for(pos).unwrap();
                assert_eq!(layout.position_for(key), Some(pos));
            }
            assert_eq!(layout.key_for(9), None);
        }
    }
}
