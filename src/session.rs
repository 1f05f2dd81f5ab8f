//! Curve Session - single owner of mode flags, palette and playback
//!
//! All mutation goes through explicit methods (or `commands::Action`
//! dispatch); there is no process-wide state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::curve::{AxisInfluence, Dimension, Palette, ParameterGenerator, ShapeInfluence};
use crate::playback::{BatchId, PlaybackController, PlaybackState, PointBatch};
use crate::sink::persist::{load_snapshot, Snapshot};
use crate::sink::{RenderSink, RenderView, SinkError};

/// Mode flags that influence generation and rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// User intent: false while the user has paused playback
    pub playing: bool,
    pub dimension: Dimension,
    /// Dots instead of lines
    pub data_points: bool,
    pub trace: bool,
    pub lock_pattern: bool,
    pub dark_mode: bool,
    /// Angle where playback stopped; set once a curve was paused mid-way
    pub last_emitted_angle: Option<f64>,
    pub shape: ShapeInfluence,
    pub axis: AxisInfluence,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            playing: true,
            dimension: Dimension::Two,
            data_points: false,
            trace: false,
            lock_pattern: false,
            dark_mode: false,
            last_emitted_angle: None,
            shape: ShapeInfluence::None,
            axis: AxisInfluence::Spiral,
        }
    }
}

pub struct Session {
    generator: ParameterGenerator,
    initial: SessionState,
    state: SessionState,
    palette: Option<Palette>,
    playback: PlaybackController,
    rng: StdRng,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible session
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        let initial = SessionState {
            dimension: config.dimension,
            ..SessionState::default()
        };
        Self {
            generator: ParameterGenerator::from(config),
            state: initial.clone(),
            initial,
            palette: None,
            playback: PlaybackController::new(config),
            rng,
        }
    }

    /// Regenerate parameters (keeping the palette under lock) and start playing
    pub fn next_pattern(&mut self) {
        self.playback.next_pattern();
        let params = self.generator.generate(
            &mut self.rng,
            self.state.lock_pattern,
            self.palette.as_ref(),
            self.state.shape,
            self.state.axis,
        );
        self.palette = Some(params.palette);
        self.state.playing = true;
        self.state.last_emitted_angle = None;
        self.playback
            .start(params, self.state.dimension, self.state.lock_pattern);
    }

    /// Emit at most one batch into `sink`. This is the host's yield point.
    pub fn step(&mut self, sink: &mut dyn RenderSink) -> Option<BatchId> {
        let view = RenderView { state: &self.state };
        let id = match self.playback.step() {
            Some(batch) => {
                sink.draw_batch(batch, &view);
                Some(batch.id)
            }
            None => None,
        };

        // A pause after the final batch finds the curve already complete
        if id.is_some()
            && sink.pause_requested()
            && self.playback.request_pause()
            && self.playback.observe_pause()
        {
            self.state.playing = false;
        }
        self.sync_pause_position();
        id
    }

    /// Step until the curve completes or pauses. Returns the batch count.
    pub fn run(&mut self, sink: &mut dyn RenderSink) -> usize {
        let mut emitted = 0;
        while self.step(sink).is_some() {
            emitted += 1;
        }
        emitted
    }

    /// Request a pause at the next batch boundary
    pub fn pause(&mut self) -> bool {
        if self.playback.state() != PlaybackState::Playing {
            return false;
        }
        self.state.playing = false;
        self.playback.request_pause()
    }

    /// Continue from the last emitted angle. No-op unless paused.
    pub fn resume(&mut self) -> bool {
        if self.playback.pause_pending() {
            self.playback.cancel_pause();
            self.state.playing = true;
            return true;
        }
        if self.playback.resume() {
            self.state.playing = true;
            true
        } else {
            false
        }
    }

    pub fn toggle_playing(&mut self) -> bool {
        if self.state.playing {
            self.pause()
        } else {
            self.resume()
        }
    }

    pub fn undo(&mut self) -> Option<PointBatch> {
        self.playback.undo()
    }

    /// Undo and tell the sink which batch to erase
    pub fn undo_into(&mut self, sink: &mut dyn RenderSink) -> Option<BatchId> {
        let batch = self.playback.undo()?;
        sink.erase_batch(&batch);
        Some(batch.id)
    }

    pub fn toggle_trace(&mut self) {
        self.state.trace = !self.state.trace;
    }

    pub fn toggle_data_points(&mut self) {
        self.state.data_points = !self.state.data_points;
    }

    pub fn toggle_lock(&mut self) {
        self.state.lock_pattern = !self.state.lock_pattern;
        self.next_pattern();
    }

    pub fn toggle_dimension(&mut self) {
        self.state.dimension = self.state.dimension.toggled();
        self.next_pattern();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.state.dark_mode = !self.state.dark_mode;
        self.next_pattern();
    }

    /// Radio semantics: picking the active shape clears it
    pub fn select_shape(&mut self, shape: ShapeInfluence) {
        self.state.shape = if self.state.shape == shape {
            ShapeInfluence::None
        } else {
            shape
        };
        self.next_pattern();
    }

    /// Radio semantics: picking the active axis mode falls back to spiral
    pub fn select_axis(&mut self, axis: AxisInfluence) {
        self.state.axis = if self.state.axis == axis {
            AxisInfluence::Spiral
        } else {
            axis
        };
        self.next_pattern();
    }

    /// Fresh palette for subsequent drawing; playback is untouched
    pub fn shuffle_palette(&mut self) -> Palette {
        let palette = self.generator.palette(&mut self.rng);
        self.palette = Some(palette);
        self.playback.set_palette(palette);
        palette
    }

    /// Back to the initial flags with an empty canvas
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.palette = None;
        self.playback.reset();
        info!("Session reset");
    }

    pub fn reset_into(&mut self, sink: &mut dyn RenderSink) {
        self.reset();
        sink.clear();
    }

    /// Capture render log, last curve, palette and mode flags
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.playback.render_log().to_vec(),
            self.playback.curve().to_vec(),
            self.palette,
            self.state.clone(),
        )
    }

    /// Replace canvas, palette and mode flags with a loaded snapshot.
    /// Playback goes idle.
    pub fn restore(&mut self, snapshot: Snapshot) {
        debug!(
            "Restoring snapshot from {}: {} batches",
            snapshot.saved_at,
            snapshot.render_log.len()
        );
        self.palette = snapshot.palette;
        self.state = SessionState {
            playing: true,
            last_emitted_angle: None,
            ..snapshot.state
        };
        self.playback.restore(snapshot.render_log, snapshot.last_curve);
    }

    /// Read a snapshot file and restore it. On error the session is untouched.
    pub fn load_from<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SinkError> {
        let snapshot = load_snapshot(path)?;
        self.restore(snapshot);
        Ok(())
    }

    fn sync_pause_position(&mut self) {
        if self.playback.state() == PlaybackState::Paused {
            self.state.last_emitted_angle = self.playback.last_emitted_angle();
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn view(&self) -> RenderView<'_> {
        RenderView { state: &self.state }
    }
}
