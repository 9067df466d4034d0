//! Saving and loading the world, and exporting its turn log.

mod jsonl;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::SimResult;
use crate::migrate::migrate;
use crate::model::WorldState;

pub use jsonl::{TURN_LOG_FILE, flush_turn_log, read_turn_log};

/// Serialize the whole world to pretty JSON at `path`.
pub fn save_world(world: &WorldState, path: &Path) -> SimResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(world)?;
    fs::write(path, text)?;
    debug!(path = %path.display(), turn = world.turn, "world saved");
    Ok(())
}

/// Load a world saved by this or an older build. Legacy layouts are
/// migrated on the way in.
pub fn load_world(path: &Path) -> SimResult<WorldState> {
    let text = fs::read_to_string(path)?;
    let payload: serde_json::Value = serde_json::from_str(&text)?;
    let world = migrate(payload)?;
    debug!(path = %path.display(), turn = world.turn, "world loaded");
    Ok(world)
}
