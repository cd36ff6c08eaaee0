use glam::DVec2;
use serde::Deserialize;

use crate::animation::{Ease, Tween};
use crate::map::MarkerId;

/// What happens when a different pin is clicked while a label is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReopenPolicy {
    /// Replace the label content in place.
    #[default]
    Swap,
    /// Animate the current label out, then the new one in.
    CloseThenOpen,
}

/// The pin a label belongs to and where it was clicked (viewport pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelTarget {
    pub marker: MarkerId,
    pub anchor: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    IdleRotating,
    PausedHover {
        marker: MarkerId,
    },
    LabelOpening {
        target: LabelTarget,
        tween: Tween,
    },
    LabelOpen {
        target: LabelTarget,
    },
    LabelClosing {
        target: LabelTarget,
        tween: Tween,
        /// Label to open once this one is gone.
        then: Option<LabelTarget>,
    },
}

impl SelectionState {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionState::IdleRotating => "idle",
            SelectionState::PausedHover { .. } => "hover",
            SelectionState::LabelOpening { .. } => "opening",
            SelectionState::LabelOpen { .. } => "open",
            SelectionState::LabelClosing { .. } => "closing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    /// Result of a hover hit test.
    Hover(Option<MarkerId>),
    /// Result of a click hit test at `pos`.
    Click { hit: Option<MarkerId>, pos: DVec2 },
    /// The open label itself was clicked.
    LabelClicked,
    /// Frame time in seconds.
    Tick(f64),
}

/// Instructions for whoever draws the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelEffect {
    Show(LabelTarget),
    Swap(LabelTarget),
    Hide,
}

/// Label lifecycle plus the idle-rotation gate.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    state: SelectionState,
    policy: ReopenPolicy,
    open_secs: f64,
    close_secs: f64,
    pause_on_hover: bool,
}

impl SelectionMachine {
    pub fn new(policy: ReopenPolicy, open_secs: f64, close_secs: f64, pause_on_hover: bool) -> Self {
        Self {
            state: SelectionState::IdleRotating,
            policy,
            open_secs,
            close_secs,
            pause_on_hover,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Idle rotation runs only while nothing is hovered or shown.
    pub fn idle_rotation_active(&self) -> bool {
        matches!(self.state, SelectionState::IdleRotating)
    }

    /// Current label scale; 0 when no label is visible.
    pub fn label_scale(&self) -> f64 {
        match &self.state {
            SelectionState::LabelOpening { tween, .. } | SelectionState::LabelClosing { tween, .. } => {
                tween.value()
            }
            SelectionState::LabelOpen { .. } => 1.0,
            _ => 0.0,
        }
    }

    pub fn label_target(&self) -> Option<LabelTarget> {
        match &self.state {
            SelectionState::LabelOpening { target, .. }
            | SelectionState::LabelOpen { target }
            | SelectionState::LabelClosing { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: SelectionEvent) -> Option<LabelEffect> {
        let before = self.state.name();
        let effect = match event {
            SelectionEvent::Hover(hit) => {
                self.hover(hit);
                None
            }
            SelectionEvent::Click { hit, pos } => self.click(hit, pos),
            SelectionEvent::LabelClicked => match self.state {
                SelectionState::LabelOpening { target, .. } | SelectionState::LabelOpen { target } => {
                    self.close(target, None);
                    None
                }
                _ => None,
            },
            SelectionEvent::Tick(dt) => self.tick(dt),
        };

        let after = self.state.name();
        if before != after {
            log::debug!("selection {before} -> {after}");
        }
        effect
    }

    fn hover(&mut self, hit: Option<MarkerId>) {
        self.state = match (self.state, hit) {
            (SelectionState::IdleRotating, Some(marker)) if self.pause_on_hover => {
                SelectionState::PausedHover { marker }
            }
            (SelectionState::PausedHover { .. }, Some(marker)) => SelectionState::PausedHover { marker },
            (SelectionState::PausedHover { .. }, None) => SelectionState::IdleRotating,
            (state, _) => state,
        };
    }

    fn click(&mut self, hit: Option<MarkerId>, pos: DVec2) -> Option<LabelEffect> {
        let new_target = hit.map(|marker| LabelTarget { marker, anchor: pos });

        match (self.state, new_target) {
            (SelectionState::IdleRotating | SelectionState::PausedHover { .. }, Some(target)) => {
                Some(self.open(target, 0.0))
            }
            (SelectionState::LabelOpening { target: current, tween }, Some(target))
                if current.marker != target.marker =>
            {
                Some(self.open(target, tween.value()))
            }
            (SelectionState::LabelOpen { target: current }, Some(target)) if current.marker != target.marker => {
                match self.policy {
                    ReopenPolicy::Swap => {
                        self.state = SelectionState::LabelOpen { target };
                        Some(LabelEffect::Swap(target))
                    }
                    ReopenPolicy::CloseThenOpen => {
                        self.close(current, Some(target));
                        None
                    }
                }
            }
            // a miss or the same pin again
            (SelectionState::LabelOpen { target: current }, _) => {
                self.close(current, None);
                None
            }
            (SelectionState::LabelClosing { tween, .. }, Some(target)) => {
                Some(self.open(target, tween.value()))
            }
            (SelectionState::LabelClosing { target, tween, .. }, None) => {
                // A miss cancels any queued reopen.
                self.state = SelectionState::LabelClosing { target, tween, then: None };
                None
            }
            _ => None,
        }
    }

    fn tick(&mut self, dt: f64) -> Option<LabelEffect> {
        match self.state {
            SelectionState::LabelOpening { target, mut tween } => {
                self.state = if tween.advance(dt) {
                    SelectionState::LabelOpen { target }
                } else {
                    SelectionState::LabelOpening { target, tween }
                };
                None
            }
            SelectionState::LabelClosing { target, mut tween, then } => {
                if !tween.advance(dt) {
                    self.state = SelectionState::LabelClosing { target, tween, then };
                    return None;
                }
                match then {
                    Some(next) => Some(self.open(next, 0.0)),
                    None => {
                        self.state = SelectionState::IdleRotating;
                        Some(LabelEffect::Hide)
                    }
                }
            }
            _ => None,
        }
    }

    fn open(&mut self, target: LabelTarget, from_scale: f64) -> LabelEffect {
        let from_scale = from_scale.clamp(0.0, 1.0);
        // Resuming part way only spends the remaining share of the duration.
        let duration = self.open_secs * (1.0 - from_scale);
        self.state = SelectionState::LabelOpening {
            target,
            tween: Tween::new(from_scale, 1.0, duration, Ease::BackOut),
        };
        LabelEffect::Show(target)
    }

    /// The one way a label leaves the screen.
    fn close(&mut self, target: LabelTarget, then: Option<LabelTarget>) {
        let from_scale = self.label_scale().clamp(0.0, 1.0);
        self.state = SelectionState::LabelClosing {
            target,
            tween: Tween::new(from_scale, 0.0, self.close_secs * from_scale, Ease::BackIn),
            then,
        };
    }
}
