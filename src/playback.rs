//! Playback Controller - progressive emission of a curve in fixed-size batches
//!
//! States: Idle -> Playing -> (Paused <-> Playing) -> Complete.
//! Every `step` emits at most one batch, so the host gets a yield point
//! between batches. Pause requests are only honored at batch boundaries.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::curve::{rebase_depth, CurveParameters, CurvePoint, Dimension, Evaluator, Palette, Rgb};

/// Batches emitted without a palette
const UNCOLORED: Rgb = Rgb(0.5, 0.5, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub u64);

/// Contiguous slice of curve samples emitted as one rendering update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointBatch {
    pub id: BatchId,
    /// Index of the first point within the full curve
    pub start_index: usize,
    pub points: Vec<CurvePoint>,
    pub theta_range: (f64, f64),
    /// Palette slot: the curve walks through the palette in thirds
    pub color_index: usize,
    /// Resolved at emission; later palette changes leave it alone
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Complete,
}

pub struct PlaybackController {
    state: PlaybackState,
    evaluator: Evaluator,
    domain_end: f64,
    sample_count: usize,
    batch_size: usize,
    params: Option<CurveParameters>,
    /// Colors for batches emitted from now on
    palette: Option<Palette>,
    dimension: Dimension,
    /// Full curve; the not-yet-emitted tail is re-evaluated on resume
    curve: Vec<CurvePoint>,
    /// Index of the next sample to emit
    cursor: usize,
    render_log: Vec<PointBatch>,
    undo_stack: Vec<BatchId>,
    next_id: u64,
    pause_requested: bool,
    last_emitted_angle: Option<f64>,
}

impl PlaybackController {
    pub fn new(config: &Config) -> Self {
        Self {
            state: PlaybackState::Idle,
            evaluator: Evaluator::from(config),
            domain_end: config.domain_end(),
            sample_count: config.sample_count,
            batch_size: config.batch_size(),
            params: None,
            palette: None,
            dimension: config.dimension,
            curve: Vec::new(),
            cursor: 0,
            render_log: Vec::new(),
            undo_stack: Vec::new(),
            next_id: 0,
            pause_requested: false,
            last_emitted_angle: None,
        }
    }

    /// Evaluate a new curve and start playing it from the beginning.
    ///
    /// `keep_log` leaves earlier drawings in the render log (lock pattern).
    pub fn start(&mut self, params: CurveParameters, dimension: Dimension, keep_log: bool) {
        if !keep_log {
            self.render_log.clear();
        }
        self.undo_stack.clear();
        self.pause_requested = false;
        self.last_emitted_angle = None;

        self.curve = self
            .evaluator
            .evaluate(0.0, self.domain_end, self.sample_count, &params, dimension);
        self.params = Some(params);
        self.palette = Some(params.palette);
        self.dimension = dimension;
        self.cursor = 0;
        self.state = PlaybackState::Playing;

        info!(
            "Playing curve k={} shape={} axis={} ({} samples, batch {})",
            params.frequency_multiplier,
            params.shape.name(),
            params.axis.name(),
            self.curve.len(),
            self.batch_size
        );
    }

    /// Emit the next batch, or observe a pending pause.
    ///
    /// Returns `None` when nothing was emitted.
    pub fn step(&mut self) -> Option<&PointBatch> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        if self.pause_requested {
            self.pause_now();
            return None;
        }
        if self.cursor >= self.curve.len() {
            self.complete();
            return None;
        }

        let start = self.cursor;
        let end = (start + self.batch_size).min(self.curve.len());
        let points = self.curve[start..end].to_vec();
        let theta_range = (points[0].theta, points[points.len() - 1].theta);
        let color_index = (3 * start / self.sample_count.max(1)).min(2);
        let color = self.palette.map_or(UNCOLORED, |p| p.color(color_index));

        let batch = PointBatch {
            id: BatchId(self.next_id),
            start_index: start,
            points,
            theta_range,
            color_index,
            color,
        };
        self.next_id += 1;
        self.cursor = end;

        self.undo_stack.push(batch.id);
        self.render_log.push(batch);

        if self.cursor >= self.curve.len() {
            self.complete();
        }
        self.render_log.last()
    }

    /// Ask for a pause at the next batch boundary. Only meaningful while playing.
    pub fn request_pause(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.pause_requested = true;
        }
        self.pause_requested
    }

    /// Withdraw a pause request that hasn't been observed yet
    pub fn cancel_pause(&mut self) {
        self.pause_requested = false;
    }

    pub fn pause_pending(&self) -> bool {
        self.pause_requested
    }

    /// Transition to Paused if a request is pending. Used right after a
    /// batch was handed to the host.
    pub fn observe_pause(&mut self) -> bool {
        if self.state == PlaybackState::Playing && self.pause_requested {
            self.pause_now();
            true
        } else {
            false
        }
    }

    fn pause_now(&mut self) {
        self.pause_requested = false;
        if self.cursor >= self.curve.len() {
            self.complete();
            return;
        }
        let angle = self.curve[self.cursor].theta;
        self.last_emitted_angle = Some(angle);
        self.state = PlaybackState::Paused;
        debug!("Paused at sample {} (theta={:.4})", self.cursor, angle);
    }

    /// Continue a paused curve from the angle where it stopped.
    ///
    /// The remaining samples are re-evaluated over `[last_emitted_angle, end]`
    /// with the same parameters. No-op unless paused.
    pub fn resume(&mut self) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }
        let (Some(angle), Some(params)) = (self.last_emitted_angle, self.params) else {
            return false;
        };

        let remaining = self.curve.len() - self.cursor;
        let mut tail = self
            .evaluator
            .evaluate(angle, self.domain_end, remaining, &params, self.dimension);
        if let Some(from) = self.curve[self.cursor].z {
            rebase_depth(&mut tail, from, self.evaluator.depth);
        }

        self.curve.truncate(self.cursor);
        self.curve.extend(tail);
        self.state = PlaybackState::Playing;
        debug!("Resumed at sample {} (theta={:.4}), {} remaining", self.cursor, angle, remaining);
        true
    }

    /// Switch colors for the batches still to come
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = Some(palette);
    }

    /// Abandon the current curve. The caller starts the next one.
    pub fn next_pattern(&mut self) {
        self.state = PlaybackState::Idle;
        self.undo_stack.clear();
        self.pause_requested = false;
        self.last_emitted_angle = None;
    }

    /// Remove the most recently emitted batch from the render log
    pub fn undo(&mut self) -> Option<PointBatch> {
        let id = self.undo_stack.pop()?;
        let pos = self.render_log.iter().rposition(|b| b.id == id)?;
        let batch = self.render_log.remove(pos);
        debug!("Undid batch {} ({} points)", id.0, batch.points.len());
        Some(batch)
    }

    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.params = None;
        self.palette = None;
        self.curve.clear();
        self.cursor = 0;
        self.render_log.clear();
        self.undo_stack.clear();
        self.pause_requested = false;
        self.last_emitted_angle = None;
    }

    /// Replace log and curve with previously saved data. Playback goes idle.
    pub fn restore(&mut self, render_log: Vec<PointBatch>, curve: Vec<CurvePoint>) {
        self.next_id = render_log
            .iter()
            .map(|b| b.id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_id);
        self.cursor = curve.len();
        self.render_log = render_log;
        self.curve = curve;
        self.state = PlaybackState::Idle;
        self.params = None;
        self.palette = None;
        self.undo_stack.clear();
        self.pause_requested = false;
        self.last_emitted_angle = None;
    }

    fn complete(&mut self) {
        self.state = PlaybackState::Complete;
        self.pause_requested = false;
        debug!("Curve complete after {} batches", self.undo_stack.len());
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn params(&self) -> Option<&CurveParameters> {
        self.params.as_ref()
    }

    pub fn curve(&self) -> &[CurvePoint] {
        &self.curve
    }

    pub fn render_log(&self) -> &[PointBatch] {
        &self.render_log
    }

    pub fn last_emitted_angle(&self) -> Option<f64> {
        self.last_emitted_angle
    }

    /// Emitted samples / total samples of the current curve
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor.min(self.curve.len()), self.curve.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{AxisInfluence, ParameterGenerator, ShapeInfluence};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> Config {
        Config {
            sample_count: 1000,
            ..Config::default()
        }
    }

    fn params(seed: u64) -> CurveParameters {
        let mut rng = StdRng::seed_from_u64(seed);
        ParameterGenerator::default().generate(&mut rng, false, None, ShapeInfluence::None, AxisInfluence::Spiral)
    }

    fn drain(controller: &mut PlaybackController) -> usize {
        let mut emitted = 0;
        while let Some(batch) = controller.step() {
            emitted += batch.points.len();
        }
        emitted
    }

    #[test]
    fn test_idle_until_started() {
        let mut controller = PlaybackController::new(&small_config());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.step().is_none());
        assert!(!controller.resume());
    }

    #[test]
    fn test_plays_to_completion_in_hundred_batches() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(1), Dimension::Two, false);

        let emitted = drain(&mut controller);
        assert_eq!(emitted, 1000);
        assert_eq!(controller.render_log().len(), 100);
        assert!(controller.render_log().iter().all(|b| b.points.len() == 10));
        assert_eq!(controller.state(), PlaybackState::Complete);
        assert_eq!(controller.progress(), (1000, 1000));
    }

    #[test]
    fn test_color_index_walks_thirds() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(2), Dimension::Two, false);
        drain(&mut controller);

        let log = controller.render_log();
        assert_eq!(log[0].color_index, 0);
        assert_eq!(log[34].color_index, 1);
        assert_eq!(log[99].color_index, 2);
        assert!(log.windows(2).all(|w| w[0].color_index <= w[1].color_index));
        let palette = params(2).palette;
        assert_eq!(log[0].color, palette.colors[0]);
        assert_eq!(log[99].color, palette.colors[2]);
    }

    #[test]
    fn test_new_palette_only_colors_later_batches() {
        let mut controller = PlaybackController::new(&small_config());
        let first = params(4);
        controller.start(first, Dimension::Two, false);
        controller.step();

        let other = params(5).palette;
        controller.set_palette(other);
        controller.step();

        let log = controller.render_log();
        assert_eq!(log[0].color, first.palette.colors[0]);
        assert_eq!(log[1].color, other.colors[0]);
    }

    #[test]
    fn test_pause_observed_at_batch_boundary() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(3), Dimension::Two, false);

        for _ in 0..5 {
            controller.step();
        }
        assert!(controller.request_pause());
        assert!(controller.step().is_none());
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert_eq!(controller.progress().0, 50);

        let expected = controller.curve()[50].theta;
        assert_eq!(controller.last_emitted_angle(), Some(expected));
        // Paused emits nothing
        assert!(controller.step().is_none());
    }

    #[test]
    fn test_resume_continues_from_last_angle() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(4), Dimension::Three, false);
        for _ in 0..30 {
            controller.step();
        }
        controller.request_pause();
        controller.observe_pause();
        let angle = controller.last_emitted_angle().unwrap();
        let depth_at_pause = controller.curve()[300].z.unwrap();

        assert!(controller.resume());
        assert_eq!(controller.state(), PlaybackState::Playing);
        let batch = controller.step().unwrap().clone();
        assert_eq!(batch.start_index, 300);
        assert_eq!(batch.points[0].theta, angle);
        assert!((batch.points[0].z.unwrap() - depth_at_pause).abs() < 1e-9);

        let rest = drain(&mut controller);
        assert_eq!(300 + batch.points.len() + rest, 1000);
        assert_eq!(controller.state(), PlaybackState::Complete);
        let last = controller.curve().last().unwrap();
        assert!((last.z.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_resume_while_playing_is_noop() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(5), Dimension::Two, false);
        controller.step();
        assert!(!controller.resume());
        assert_eq!(controller.progress().0, 10);
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(6), Dimension::Two, false);
        for _ in 0..4 {
            controller.step();
        }
        let newest = controller.render_log().last().unwrap().id;
        let undone = controller.undo().unwrap();
        assert_eq!(undone.id, newest);
        assert_eq!(controller.render_log().len(), 3);
        assert_eq!(controller.render_log().last().unwrap().start_index, 20);
    }

    #[test]
    fn test_n_undos_empty_log() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(7), Dimension::Two, false);
        for _ in 0..12 {
            controller.step();
        }
        for _ in 0..12 {
            assert!(controller.undo().is_some());
        }
        assert!(controller.render_log().is_empty());
        assert!(controller.undo().is_none());
    }

    #[test]
    fn test_next_pattern_clears_undo_but_lock_keeps_log() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(8), Dimension::Two, false);
        for _ in 0..3 {
            controller.step();
        }
        controller.next_pattern();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.undo().is_none());

        controller.start(params(9), Dimension::Two, true);
        controller.step();
        assert_eq!(controller.render_log().len(), 4);

        controller.next_pattern();
        controller.start(params(10), Dimension::Two, false);
        assert!(controller.render_log().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(11), Dimension::Two, false);
        controller.step();
        controller.request_pause();
        controller.step();
        controller.reset();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.render_log().is_empty());
        assert!(controller.curve().is_empty());
        assert_eq!(controller.last_emitted_angle(), None);
        assert!(controller.params().is_none());
    }

    #[test]
    fn test_restore_continues_ids() {
        let mut controller = PlaybackController::new(&small_config());
        controller.start(params(12), Dimension::Two, false);
        controller.step();
        controller.step();
        let log = controller.render_log().to_vec();
        let curve = controller.curve().to_vec();

        let mut other = PlaybackController::new(&small_config());
        other.restore(log, curve);
        assert_eq!(other.state(), PlaybackState::Idle);
        assert_eq!(other.render_log().len(), 2);
        other.start(params(13), Dimension::Two, true);
        let id = other.step().unwrap().id;
        assert_eq!(id, BatchId(2));
    }

    #[test]
    fn test_empty_curve_completes() {
        let config = Config {
            sample_count: 0,
            ..Config::default()
        };
        let mut controller = PlaybackController::new(&config);
        controller.start(params(14), Dimension::Two, false);
        assert!(controller.step().is_none());
        assert_eq!(controller.state(), PlaybackState::Complete);
    }
}
