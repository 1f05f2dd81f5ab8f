//! Sinks - where emitted batches and snapshots go
//!
//! - RenderSink: receives batches as they are emitted (viewer, logger)
//! - persist: JSON snapshots of render log, last curve, palette and flags
//! - export: PNG rendering of the current canvas

pub mod export;
pub mod persist;

use thiserror::Error;
use tracing::debug;

use crate::playback::PointBatch;
use crate::session::SessionState;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Nothing to export: render log is empty")]
    EmptyLog,
}

/// Flags a sink needs to draw a batch
pub struct RenderView<'a> {
    pub state: &'a SessionState,
}

/// Receives batches from a session
pub trait RenderSink {
    fn draw_batch(&mut self, batch: &PointBatch, view: &RenderView<'_>);

    fn erase_batch(&mut self, _batch: &PointBatch) {}

    fn clear(&mut self) {}

    /// Polled after every drawn batch
    fn pause_requested(&mut self) -> bool {
        false
    }
}

/// Logs batches and optionally pauses after a fixed number of them
#[derive(Debug, Default)]
pub struct TracingSink {
    pub drawn: usize,
    pub points: usize,
    pub pause_after: Option<usize>,
}

impl RenderSink for TracingSink {
    fn draw_batch(&mut self, batch: &PointBatch, view: &RenderView<'_>) {
        self.drawn += 1;
        self.points += batch.points.len();
        let color = batch.color.to_u8();
        debug!(
            "batch {} @{}: {} points, theta {:.3}..{:.3}, color #{:02x}{:02x}{:02x}, {}",
            batch.id.0,
            batch.start_index,
            batch.points.len(),
            batch.theta_range.0,
            batch.theta_range.1,
            color[0],
            color[1],
            color[2],
            if view.state.data_points { "dots" } else { "line" }
        );
    }

    fn erase_batch(&mut self, batch: &PointBatch) {
        self.drawn = self.drawn.saturating_sub(1);
        self.points = self.points.saturating_sub(batch.points.len());
        debug!("erased batch {}", batch.id.0);
    }

    fn clear(&mut self) {
        self.drawn = 0;
        self.points = 0;
    }

    fn pause_requested(&mut self) -> bool {
        self.pause_after.map_or(false, |n| self.drawn >= n)
    }
}

/// Records everything it is asked to do
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectSink {
    pub drawn: Vec<PointBatch>,
    pub erased: Vec<crate::playback::BatchId>,
    pub cleared: bool,
    pub pause_after: Option<usize>,
}

#[cfg(test)]
impl RenderSink for CollectSink {
    fn draw_batch(&mut self, batch: &PointBatch, _view: &RenderView<'_>) {
        self.drawn.push(batch.clone());
    }

    fn erase_batch(&mut self, batch: &PointBatch) {
        self.erased.push(batch.id);
    }

    fn clear(&mut self) {
        self.cleared = true;
        self.drawn.clear();
    }

    fn pause_requested(&mut self) -> bool {
        self.pause_after.map_or(false, |n| self.drawn.len() >= n)
    }
}
