// Time-based scalar interpolation for the label pop-in/pop-out.

/// Overshoot amount of the back curves (the common 1.70158 constant).
const BACK_OVERSHOOT: f64 = 1.70158;

/// Easing curve applied to normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Runs past the target and settles back ("pop" in).
    BackOut,
    /// Pulls back before heading to the target ("pop" out).
    BackIn,
}

impl Ease {
    /// Map `t` in [0, 1] onto the curve. Endpoints are exact.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let c1 = BACK_OVERSHOOT;
        let c3 = c1 + 1.0;
        match self {
            Ease::Linear => t,
            Ease::BackOut => {
                let u = t - 1.0;
                1.0 + c3 * u * u * u + c1 * u * u
            }
            Ease::BackIn => c3 * t * t * t - c1 * t * t,
        }
    }
}

/// Interpolates a value from `from` to `to` over `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: f64,
    elapsed: f64,
    ease: Ease,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        }
    }

    /// Advance by `dt` seconds. Returns true once the tween has finished.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Normalized time in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn value(&self) -> f64 {
        if self.is_finished() {
            return self.to;
        }
        self.from + (self.to - self.from) * self.ease.apply(self.progress())
    }

    pub fn target(&self) -> f64 {
        self.to
    }
}
