use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CACHE_DIR: &str = "footy_hub";
const RECENTS_FILE: &str = "recent_players.json";
const RECENTS_VERSION: u32 = 1;
pub const MAX_RECENT_PLAYERS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct RecentsFile {
    version: u32,
    players: Vec<String>,
    #[serde(default)]
    saved_at: Option<u64>,
}

/// Moves `name` to the front, dropping any older copy and anything past the cap.
pub fn push_recent(list: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    list.retain(|existing| !existing.eq_ignore_ascii_case(name));
    list.insert(0, name.to_string());
    list.truncate(MAX_RECENT_PLAYERS);
}

pub fn load_recent_players() -> Vec<String> {
    match recents_path() {
        Some(path) => load_recent_from(&path),
        None => Vec::new(),
    }
}

pub fn save_recent_players(players: &[String]) {
    let Some(path) = recents_path() else {
        return;
    };
    if let Err(err) = save_recent_to(&path, players) {
        warn!(path = %path.display(), error = %err, "failed to save recent players");
    }
}

/// Missing, unreadable or outdated files all load as an empty list.
pub fn load_recent_from(path: &Path) -> Vec<String> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    let Ok(file) = serde_json::from_str::<RecentsFile>(&raw) else {
        return Vec::new();
    };
    if file.version != RECENTS_VERSION {
        debug!(found = file.version, "ignoring recent players from another version");
        return Vec::new();
    }
    let mut players = Vec::new();
    for name in file.players.iter().rev() {
        push_recent(&mut players, name);
    }
    players
}

pub fn save_recent_to(path: &Path, players: &[String]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = RecentsFile {
        version: RECENTS_VERSION,
        players: players.iter().take(MAX_RECENT_PLAYERS).cloned().collect(),
        saved_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs()),
    };
    let json = serde_json::to_string_pretty(&file).context("encode recent players")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename into {}", path.display()))?;
    Ok(())
}

fn recents_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(RECENTS_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(RECENTS_FILE),
    )
}
