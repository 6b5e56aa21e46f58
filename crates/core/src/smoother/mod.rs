use crate::viseme::BAR_COUNT;

/// Base fraction of the remaining distance covered per step.
const STEP_BASE: f32 = 0.18;
const STEP_GAIN: f32 = 3.5;
const STEP_MAX: f32 = 0.98;
/// Neutral small-open shape used at rest.
const NEUTRAL_HEIGHT: f32 = 3.0;
/// Fully closed shape used by [`Smoother::snap_closed`].
const CLOSED_HEIGHT: f32 = 2.0;

/// First-order exponential interpolator between the displayed shape and
/// the per-frame target. A single-pole filter is cheap, stable and
/// never overshoots; the speed multiplier lets sleepy emotions smear
/// transitions and hyped ones snap quickly.
#[derive(Debug)]
pub struct Smoother {
    current: [f32; BAR_COUNT],
    target: [f32; BAR_COUNT],
}

impl Smoother {
    pub fn new() -> Self {
        Self {
            current: [NEUTRAL_HEIGHT; BAR_COUNT],
            target: [NEUTRAL_HEIGHT; BAR_COUNT],
        }
    }

    pub fn set_target(&mut self, target: [f32; BAR_COUNT]) {
        self.target = target;
    }

    /// Neutral shape used while idle or silent.
    pub fn neutral_target() -> [f32; BAR_COUNT] {
        [NEUTRAL_HEIGHT; BAR_COUNT]
    }

    /// Forces the displayed shape fully closed, used to punch a hard
    /// onset transition before the next interpolation step.
    pub fn snap_closed(&mut self) {
        self.current = [CLOSED_HEIGHT; BAR_COUNT];
    }

    /// Moves the displayed shape toward the target and returns a copy.
    /// Callers may retain the result across frames without observing
    /// later mutation.
    pub fn step(&mut self, speed_multiplier: f32) -> [f32; BAR_COUNT] {
        let fraction = (STEP_BASE * speed_multiplier * STEP_GAIN).min(STEP_MAX);
        for (current, target) in self.current.iter_mut().zip(self.target.iter()) {
            *current += (target - *current) * fraction;
        }
        self.current
    }

    pub fn current(&self) -> [f32; BAR_COUNT] {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = [NEUTRAL_HEIGHT; BAR_COUNT];
        self.target = [NEUTRAL_HEIGHT; BAR_COUNT];
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new()
    }
}
