/// Frame-stepped animation time
///
/// Time is kept in `f64` so a 1.0 increment stays exact for far longer than
/// any session; animated angles are reduced modulo 360 before they drop to
/// `f32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    value: f64,
    increment: f64,
}

impl AnimationClock {
    /// A negative increment would run time backwards, so it is clamped to zero
    pub fn new(start: f64, increment: f64) -> Self {
        Self {
            value: start,
            increment: increment.max(0.0),
        }
    }

    /// Advance by one frame and return the new time
    pub fn advance(&mut self) -> f64 {
        self.value += self.increment;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}
