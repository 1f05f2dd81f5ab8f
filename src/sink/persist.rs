//! Snapshot persistence - render log, last curve, palette and mode flags as JSON
//!
//! Loading parses the whole file before anything is handed to a session,
//! so a bad file never leaves a half-restored canvas.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::SinkError;
use crate::curve::{CurvePoint, Palette};
use crate::playback::PointBatch;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 timestamp
    pub saved_at: String,
    pub render_log: Vec<PointBatch>,
    pub last_curve: Vec<CurvePoint>,
    pub palette: Option<Palette>,
    /// Flags the drawings were made with
    #[serde(default)]
    pub state: SessionState,
}

impl Snapshot {
    pub fn new(
        render_log: Vec<PointBatch>,
        last_curve: Vec<CurvePoint>,
        palette: Option<Palette>,
        state: SessionState,
    ) -> Self {
        Self {
            saved_at: chrono::Local::now().to_rfc3339(),
            render_log,
            last_curve,
            palette,
            state,
        }
    }
}

pub fn save_snapshot<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<(), SinkError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string(snapshot)?)?;
    info!(
        "Saved snapshot to {:?} ({} batches, {} curve points)",
        path,
        snapshot.render_log.len(),
        snapshot.last_curve.len()
    );
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot, SinkError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    info!("Loaded snapshot from {:?} ({} batches)", path, snapshot.render_log.len());
    Ok(snapshot)
}
