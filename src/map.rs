use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::hit_object::{HitObject, SoundKind, GRID_CELLS};

/// A parsed map: metadata plus its time-ordered hit objects.
///
/// Files are line based with `[Metadata]` (`Key: Value`) and `[HitObjects]`
/// (`time,position,sound`) sections. Lines shorter than two characters or starting
/// with `//` are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Beatmap {
    pub path: Option<PathBuf>,
    pub audio_filename: Option<String>,
    pub title: String,
    pub artist: String,
    pub creator: String,
    pub difficulty: u32,
    pub objects: Arc<[HitObject]>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Metadata,
    HitObjects,
}

fn is_valid_line(line: &str) -> bool {
    line.len() > 1 && !line.starts_with("//")
}

fn tokenize(line: &str) -> Option<(&str, &str)> {
    line.split_once(':').map(|(k, v)| (k.trim(), v.trim()))
}

fn parse_hit_object(line: &str) -> std::result::Result<HitObject, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [time, position, sound] = fields.as_slice() else {
        return Err(format!("expected 3 fields, found {}", fields.len()));
    };
    let time_ms: i64 = time.parse().map_err(|e| format!("bad time '{time}': {e}"))?;
    let position: usize = position
        .parse()
        .map_err(|e| format!("bad position '{position}': {e}"))?;
    if position >= GRID_CELLS {
        return Err(format!("position {position} outside 0..{GRID_CELLS}"));
    }
    let code: i64 = sound.parse().map_err(|e| format!("bad sound '{sound}': {e}"))?;
    let sound = SoundKind::from_code(code).ok_or_else(|| format!("unknown sound {code}"))?;
    Ok(HitObject::new(time_ms, position, sound))
}

impl Beatmap {
    /// Parses map text. Malformed entries are logged and skipped; a map with no
    /// usable hit objects is an error.
    pub fn parse(text: &str, path: Option<&Path>) -> Result<Self> {
        let source = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        let mut map = Beatmap {
            path: path.map(Path::to_path_buf),
            audio_filename: None,
            title: String::new(),
            artist: String::new(),
            creator: String::new(),
            difficulty: 1,
            objects: Arc::from(Vec::new()),
        };
        let mut objects = Vec::new();
        let mut section = Section::None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if !is_valid_line(line) {
                continue;
            }
            if line.starts_with('[') {
                section = match line {
                    "[Metadata]" => Section::Metadata,
                    "[HitObjects]" => Section::HitObjects,
                    other => {
                        log::debug!("skipping section {other} in {source}");
                        Section::None
                    }
                };
                continue;
            }

            match section {
                Section::None => {}
                Section::Metadata => {
                    let Some((key, value)) = tokenize(line) else {
                        log::debug!("failed to tokenize line {}: '{line}'", idx + 1);
                        continue;
                    };
                    match key {
                        "AudioFilename" => map.audio_filename = Some(value.to_string()),
                        "Title" => map.title = value.to_string(),
                        "Artist" => map.artist = value.to_string(),
                        "Creator" => map.creator = value.to_string(),
                        "Difficulty" => match value.parse() {
                            Ok(d) => map.difficulty = d,
                            Err(e) => log::warn!(
                                "failed to read metadata '{line}' in {source}: {e}"
                            ),
                        },
                        _ => {}
                    }
                }
                Section::HitObjects => match parse_hit_object(line) {
                    Ok(object) => objects.push(object),
                    Err(reason) => {
                        let err = Error::Map {
                            line: idx + 1,
                            reason,
                        };
                        log::warn!("{source}: {err}, skipped");
                    }
                },
            }
        }

        if objects.is_empty() {
            return Err(Error::EmptyMap {
                path: map.path.clone(),
            });
        }
        if map.audio_filename.is_none() {
            log::warn!("{source}: no AudioFilename in [Metadata]");
        }
        if let Some((a, b)) = objects
            .iter()
            .tuple_windows()
            .find(|(a, b)| b.time_ms < a.time_ms)
        {
            log::warn!(
                "{source}: hit objects out of order ({}ms after {}ms)",
                b.time_ms,
                a.time_ms
            );
        }

        map.objects = objects.into();
        Ok(map)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let map = Self::parse(&text, Some(path))?;
        log::info!("loaded {map} ({} objects)", map.objects.len());
        Ok(map)
    }

    /// Time of the last hit object, in ms.
    pub fn end_time(&self) -> i64 {
        self.objects.last().map_or(0, |h| h.time_ms)
    }

    pub fn difficulty_label(&self) -> &'static str {
        match self.difficulty {
            0..=3 => "Easy",
            4..=5 => "Standard",
            6..=7 => "Hard",
            _ => "Insane",
        }
    }
}

/// Resolves a map argument: an existing path is used as given, otherwise it is
/// looked up in `search_dir`, with a `.wsm` extension added if missing.
pub fn resolve_path(name: &Path, search_dir: Option<&Path>) -> PathBuf {
    if name.exists() {
        return name.to_path_buf();
    }
    let Some(dir) = search_dir else {
        return name.to_path_buf();
    };
    let candidate = dir.join(name);
    if candidate.extension().is_none() {
        let with_ext = candidate.with_extension("wsm");
        if with_ext.exists() {
            return with_ext;
        }
    }
    if candidate.exists() {
        candidate
    } else {
        name.to_path_buf()
    }
}

impl fmt::Display for Beatmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.artist, self.title, self.creator)
    }
}
