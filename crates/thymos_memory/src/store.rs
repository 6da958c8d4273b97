//! On-disk snapshot of the feedback model.
//!
//! One JSON file per model. Saves are atomic (temp file + rename) so a
//! concurrent reader never observes a half-written table; an unparseable
//! file is reported as `CorruptModel` and the caller falls back to an empty
//! model rather than crashing the session.

use crate::qlearn::{FeedbackModel, StateKey};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thymos_core::ThymosError;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    state: StateKey,
    action: String,
    value: f64,
}

/// Serialized table. Entries are sorted on save so snapshots diff cleanly.
#[derive(Debug, Serialize, Deserialize)]
struct ModelSnapshot {
    version: u32,
    saved_at: i64,
    entries: Vec<SnapshotEntry>,
}

/// Persist the full table, overwriting `path` atomically.
pub fn save<P: AsRef<Path>>(model: &FeedbackModel, path: P) -> Result<()> {
    let path = path.as_ref();

    let mut entries: Vec<SnapshotEntry> = model
        .table()
        .iter()
        .flat_map(|(state, actions)| {
            actions.iter().map(move |(action, value)| SnapshotEntry {
                state: state.clone(),
                action: action.clone(),
                value: *value,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        (&a.state.location, a.state.emotion.as_str(), &a.action)
            .cmp(&(&b.state.location, b.state.emotion.as_str(), &b.action))
    });

    let snapshot = ModelSnapshot {
        version: SNAPSHOT_VERSION,
        saved_at: chrono::Utc::now().timestamp(),
        entries,
    };
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Failed to write snapshot temp file: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move snapshot into place: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "model snapshot saved");
    Ok(())
}

/// Restore a model from `path`.
///
/// Unparseable or wrong-shape content yields `ThymosError::CorruptModel`
/// (downcastable through the `anyhow` chain); a missing file is an ordinary
/// IO error. Use [`load_or_default`] for the non-fatal variant.
pub fn load<P: AsRef<Path>>(path: P) -> Result<FeedbackModel> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let snapshot: ModelSnapshot =
        serde_json::from_str(&content).map_err(|e| ThymosError::CorruptModel {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(ThymosError::CorruptModel {
            path: path.display().to_string(),
            reason: format!("unsupported snapshot version {}", snapshot.version),
        }
        .into());
    }

    let mut model = FeedbackModel::new();
    for entry in snapshot.entries {
        model.insert_value(entry.state, entry.action, entry.value);
    }
    Ok(model)
}

/// Load if present and parseable; otherwise log and start empty.
///
/// A corrupt snapshot must never take the host session down.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> FeedbackModel {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "no model snapshot yet, starting empty");
        return FeedbackModel::new();
    }
    match load(path) {
        Ok(model) => {
            tracing::info!(
                path = %path.display(),
                states = model.state_count(),
                "model snapshot loaded"
            );
            model
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding unreadable model snapshot");
            FeedbackModel::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thymos_core::Emotion;

    fn populated_model() -> FeedbackModel {
        let mut model = FeedbackModel::new();
        for (loc, emotion) in [
            ("New York", Emotion::Happy),
            ("Tokyo", Emotion::Tired),
            ("Berlin", Emotion::Bored),
        ] {
            let s = StateKey::new(loc, emotion);
            model.update(&s, "cafe", 1.0);
            model.update(&s, "bar", -1.0);
            model.update(&s, "cafe", 1.0);
        }
        model
    }

    #[test]
    fn test_roundtrip_preserves_every_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = populated_model();
        save(&model, &path).unwrap();
        let restored = load(&path).unwrap();

        assert_eq!(restored.state_count(), 3);
        for (state, actions) in model.table() {
            for (action, value) in actions {
                assert_eq!(
                    restored.value(state, action),
                    *value,
                    "value drifted for {}/{}",
                    state,
                    action
                );
            }
        }
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut model = FeedbackModel::new();
        let s = StateKey::new("New York", Emotion::Happy);
        model.update(&s, "karaoke", 1.0);
        save(&model, &path).unwrap();

        model.update(&s, "karaoke", 1.0);
        save(&model, &path).unwrap();

        let restored = load(&path).unwrap();
        assert_eq!(restored.value(&s, "karaoke"), model.value(&s, "karaoke"));
    }

    #[test]
    fn test_corrupt_snapshot_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json at all").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThymosError>(),
            Some(ThymosError::CorruptModel { .. })
        ));
    }

    #[test]
    fn test_wrong_version_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"version": 99, "saved_at": 0, "entries": []}"#,
        )
        .unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThymosError>(),
            Some(ThymosError::CorruptModel { .. })
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_or_default(dir.path().join("absent.json"));
        assert!(model.is_empty());
    }

    #[test]
    fn test_load_or_default_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "garbage").unwrap();
        let model = load_or_default(&path);
        assert!(model.is_empty());
    }
}
