use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::{TurnLogEntry, WorldState};

pub const TURN_LOG_FILE: &str = "turn_log.jsonl";

/// Marker on every line, so a log mixed into other JSONL streams can be
/// filtered by `kind`.
const LINE_KIND: &str = "turn";

/// One line of the exported log: the turn index up front for grepping, then
/// the full entry.
#[derive(Serialize)]
struct LogLine<'a> {
    kind: &'a str,
    turn: u32,
    entry: &'a TurnLogEntry,
}

#[derive(Deserialize)]
struct OwnedLogLine {
    turn: u32,
    entry: TurnLogEntry,
}

fn write_turn_lines(path: &Path, entries: &[TurnLogEntry]) -> SimResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for entry in entries {
        let line = LogLine {
            kind: LINE_KIND,
            turn: entry.turn,
            entry,
        };
        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the world's turn log to `turn_log.jsonl` under `output_dir`, one
/// entry per line, creating the directory if needed. Returns the file path.
pub fn flush_turn_log(world: &WorldState, output_dir: &Path) -> SimResult<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(TURN_LOG_FILE);
    write_turn_lines(&path, &world.log)?;
    Ok(path)
}

/// Read back a turn log written by [`flush_turn_log`]. Lines of another
/// kind are skipped; a line whose turn disagrees with its entry is an error.
pub fn read_turn_log(path: &Path) -> SimResult<Vec<TurnLogEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)?;
        if value.get("kind").and_then(serde_json::Value::as_str) != Some(LINE_KIND) {
            continue;
        }
        let parsed: OwnedLogLine = serde_json::from_value(value)?;
        if parsed.turn != parsed.entry.turn {
            return Err(SimError::invariant(
                "turn_log_line",
                format!(
                    "line {} claims turn {} but holds turn {}",
                    number + 1,
                    parsed.turn,
                    parsed.entry.turn
                ),
            ));
        }
        entries.push(parsed.entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn lines_carry_kind_and_turn() {
        let engine = testutil::engine();
        let mut world = testutil::small_world(2);
        for _ in 0..2 {
            engine
                .commit(&mut world, &crate::model::Decisions::default())
                .unwrap();
        }
        let dir = tempfile::tempdir().unwrap();
        let path = flush_turn_log(&world, dir.path()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        for (i, line) in text.lines().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["kind"], LINE_KIND);
            assert_eq!(value["turn"], i as u64);
        }
        assert_eq!(read_turn_log(&path).unwrap(), world.log);
    }

    #[test]
    fn foreign_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TURN_LOG_FILE);
        fs::write(&path, "{\"kind\":\"note\",\"turn\":0,\"entry\":null}\n\n").unwrap();
        assert!(read_turn_log(&path).unwrap().is_empty());

        fs::write(&path, "{\"kind\":\"turn\",\"turn\":0,\"entry\":null}\n").unwrap();
        assert!(read_turn_log(&path).is_err());
    }
}
