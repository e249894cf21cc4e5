/// delay and sound countdowns; only ever decremented by the host's clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerPair {
    pub delay: u8,
    pub sound: u8,
}

impl TimerPair {
    pub fn new() -> Self {
        TimerPair::default()
    }

    pub fn reset(&mut self) {
        *self = TimerPair::default();
    }

    /// one tick of the 60Hz clock
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn tone_active(&self) -> bool {
        self.sound > 0
    }
}
