//! Command dispatch - host actions keyed by name
//!
//! Hosts (viewer buttons, CLI flags) translate their input into an
//! `Action` and hand it to `Session::dispatch`.

use tracing::debug;

use crate::curve::{AxisInfluence, Palette, ShapeInfluence};
use crate::playback::PointBatch;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NextPattern,
    ToggleLock,
    ToggleTrace,
    ToggleDataPoints,
    TogglePlaying,
    Undo,
    ShufflePalette,
    Reset,
    ToggleDimension,
    ToggleDarkMode,
    Shape(ShapeInfluence),
    Axis(AxisInfluence),
}

/// Name -> action table
pub const ACTIONS: &[(&str, Action)] = &[
    ("next_pattern", Action::NextPattern),
    ("toggle_lock", Action::ToggleLock),
    ("toggle_trace", Action::ToggleTrace),
    ("toggle_data_points", Action::ToggleDataPoints),
    ("toggle_playing", Action::TogglePlaying),
    ("undo", Action::Undo),
    ("shuffle_palette", Action::ShufflePalette),
    ("reset", Action::Reset),
    ("toggle_dimension", Action::ToggleDimension),
    ("toggle_dark_mode", Action::ToggleDarkMode),
    ("shape:circle", Action::Shape(ShapeInfluence::Circle)),
    ("shape:square", Action::Shape(ShapeInfluence::Square)),
    ("shape:triangle", Action::Shape(ShapeInfluence::Triangle)),
    ("axis:spiral", Action::Axis(AxisInfluence::Spiral)),
    ("axis:random", Action::Axis(AxisInfluence::Random)),
];

impl Action {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        ACTIONS
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, action)| *action)
    }

    pub fn name(&self) -> &'static str {
        ACTIONS
            .iter()
            .find(|(_, action)| action == self)
            .map(|(key, _)| *key)
            .unwrap_or("unknown")
    }
}

/// What a dispatched action did, for the host to reflect
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new playback cycle started
    Restarted,
    /// A flag flipped without touching playback
    Toggled,
    PauseRequested,
    Resumed,
    Undone(PointBatch),
    PaletteChanged(Palette),
    Reset,
    /// Precondition not met (nothing to undo, nothing to pause)
    Ignored,
}

impl Session {
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        debug!("dispatch {}", action.name());
        match action {
            Action::NextPattern => {
                self.next_pattern();
                Outcome::Restarted
            }
            Action::ToggleLock => {
                self.toggle_lock();
                Outcome::Restarted
            }
            Action::ToggleTrace => {
                self.toggle_trace();
                Outcome::Toggled
            }
            Action::ToggleDataPoints => {
                self.toggle_data_points();
                Outcome::Toggled
            }
            Action::TogglePlaying => {
                let was_playing = self.state().playing;
                match (self.toggle_playing(), was_playing) {
                    (true, true) => Outcome::PauseRequested,
                    (true, false) => Outcome::Resumed,
                    (false, _) => Outcome::Ignored,
                }
            }
            Action::Undo => match self.undo() {
                Some(batch) => Outcome::Undone(batch),
                None => Outcome::Ignored,
            },
            Action::ShufflePalette => Outcome::PaletteChanged(self.shuffle_palette()),
            Action::Reset => {
                self.reset();
                Outcome::Reset
            }
            Action::ToggleDimension => {
                self.toggle_dimension();
                Outcome::Restarted
            }
            Action::ToggleDarkMode => {
                self.toggle_dark_mode();
                Outcome::Restarted
            }
            Action::Shape(shape) => {
                self.select_shape(shape);
                Outcome::Restarted
            }
            Action::Axis(axis) => {
                self.select_axis(axis);
                Outcome::Restarted
            }
        }
    }

    /// Dispatch by table name; `None` for an unknown name
    pub fn dispatch_named(&mut self, name: &str) -> Option<Outcome> {
        Action::from_name(name).map(|action| self.dispatch(action))
    }
}
