/// # environment
///
/// Sets everything up and runs the main loop. Two clocks are kept apart:
/// the instruction clock decides how many `cycle()`s are owed, the timer
/// clock how many `tick_timers()`. Each clock carries its own remainder
/// from one frame to the next, so neither drifts and a slow frame just
/// means more work owed on the next one.
use crate::display::Display;
use crate::errors::EnvError;
use crate::framebuffer::SCREEN_BUFFER_SIZE;
use crate::input::{Input, KeyEvent};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use std::time::{Duration, Instant};

/// fixed-rate clock that turns elapsed time into a whole number of beats
struct Clock {
    period: Duration,
    owed: Duration,
}

impl Clock {
    fn new(hz: u32) -> Self {
        Clock {
            period: Duration::from_secs(1) / hz.max(1),
            owed: Duration::ZERO,
        }
    }

    /// how many beats fit in the time owed so far
    fn due(&mut self, elapsed: Duration) -> u32 {
        self.owed += elapsed;
        let beats = (self.owed.as_nanos() / self.period.as_nanos()) as u32;
        self.owed -= self.period * beats;
        beats
    }
}

/// why a run stopped, or that it hasn't
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Quit,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub cycles: u64,
    pub timer_ticks: u64,
    pub unknown_opcodes: u64,
}

pub struct Environment<D: Display, I: Input, S: Sound> {
    machine: Chip8Interpreter,
    display: D,
    input: I,
    sound: S,
    instruction_clock: Clock,
    timer_clock: Clock,
    frame: Duration,
    timer_ticks: u64,
}

impl<D: Display, I: Input, S: Sound> Environment<D, I, S> {
    /// fails if the display can't take the framebuffer as it comes
    pub fn new(
        machine: Chip8Interpreter,
        display: D,
        input: I,
        sound: S,
    ) -> Result<Self, EnvError> {
        let wants = display.get_display_size_bytes();
        if wants != SCREEN_BUFFER_SIZE {
            return Err(EnvError::DisplaySize {
                wants,
                has: SCREEN_BUFFER_SIZE,
            });
        }
        let config = machine.config();
        let instruction_clock = Clock::new(config.instructions_per_second);
        let timer_clock = Clock::new(config.timer_hz);
        // redraw and poll input once per timer beat
        let frame = timer_clock.period;
        Ok(Environment {
            machine,
            display,
            input,
            sound,
            instruction_clock,
            timer_clock,
            frame,
            timer_ticks: 0,
        })
    }

    /// catch up on `elapsed` wall-clock time: input, owed cycles, owed
    /// timer ticks, then redraw and sound if anything changed
    pub fn advance(&mut self, elapsed: Duration) -> Result<RunStatus, EnvError> {
        for event in self.input.poll()? {
            match event {
                KeyEvent::Key { index, pressed } => self.machine.set_key(index, pressed)?,
                KeyEvent::Quit => return Ok(RunStatus::Quit),
            }
        }

        let mut status = RunStatus::Running;
        for _ in 0..self.instruction_clock.due(elapsed) {
            if self.finished() {
                status = RunStatus::Finished;
                break;
            }
            self.machine.cycle()?;
        }
        if self.finished() {
            status = RunStatus::Finished;
        }

        for _ in 0..self.timer_clock.due(elapsed) {
            self.machine.tick_timers();
            self.timer_ticks += 1;
        }

        if self.machine.framebuffer_mut().take_dirty() {
            self.display.draw(&self.machine.framebuffer().to_bytes())?;
        }

        let tone = self.machine.tone_active();
        if tone != self.sound.is_beeping() {
            let result = if tone {
                self.sound.beep()
            } else {
                self.sound.stop()
            };
            result.map_err(|e| EnvError::Sound(e.to_string()))?;
        }

        Ok(status)
    }

    /// run in real time until the user quits, `max_cycles` runs out, or
    /// the machine faults
    pub fn run(&mut self) -> Result<RunSummary, EnvError> {
        let mut last = Instant::now();
        loop {
            let now = Instant::now();
            let status = self.advance(now - last)?;
            last = now;
            if status != RunStatus::Running {
                let _ = self.sound.stop();
                return Ok(self.summary(status));
            }
            spin_sleep::sleep(self.frame.saturating_sub(now.elapsed()));
        }
    }

    pub fn summary(&self, status: RunStatus) -> RunSummary {
        RunSummary {
            status,
            cycles: self.machine.cycles(),
            timer_ticks: self.timer_ticks,
            unknown_opcodes: self.machine.unknown_opcodes(),
        }
    }

    fn finished(&self) -> bool {
        match self.machine.config().max_cycles {
            Some(max) => self.machine.cycles() >= max,
            None => false,
        }
    }

    pub fn machine(&self) -> &Chip8Interpreter {
        &self.machine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::display::DummyDisplay;
    use crate::errors::VmError;
    use crate::input::DummyInput;
    use crate::sound::Mute;

    fn env(
        config: Config,
        words: &[u16],
        input: Vec<Vec<KeyEvent>>,
    ) -> Environment<DummyDisplay, DummyInput, Mute> {
        let mut m = Chip8Interpreter::new(config);
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        m.load_program(&bytes).unwrap();
        Environment::new(m, DummyDisplay::new(), DummyInput::new(input), Mute::new()).unwrap()
    }

    #[test]
    fn test_display_size_must_match() {
        let m = Chip8Interpreter::new(Config::headless(1));
        let display = DummyDisplay::with_size(128);
        match Environment::new(m, display, DummyInput::new(vec![]), Mute::new()) {
            Err(EnvError::DisplaySize { wants, has }) => {
                assert_eq!(wants, 128);
                assert_eq!(has, 256);
            }
            Err(e) => panic!("wrong error {}", e),
            Ok(_) => panic!("a 128 byte display was accepted"),
        }
    }

    #[test]
    fn test_clock_keeps_remainder() {
        let mut c = Clock::new(60);
        assert_eq!(c.due(Duration::from_millis(10)), 0);
        assert_eq!(c.due(Duration::from_millis(10)), 1);
        assert_eq!(c.due(Duration::from_secs(1)), 60);
    }

    #[test]
    fn test_one_second() -> Result<(), EnvError> {
        // delay = sound = 0x50, then spin
        let mut e = env(Config::headless(1), &[0x6050, 0xf015, 0xf018, 0x1206], vec![]);
        assert_eq!(e.advance(Duration::from_secs(1))?, RunStatus::Running);
        assert_eq!(e.machine().cycles(), 700);
        assert_eq!(e.summary(RunStatus::Running).timer_ticks, 60);
        assert_eq!(e.machine().timers().delay, 0x50 - 60);
        assert_eq!(e.sound().beeps, 1);
        assert!(e.sound().is_beeping());
        Ok(())
    }

    #[test]
    fn test_timers_ignore_instruction_rate() -> Result<(), EnvError> {
        let mut fast = Config::headless(1);
        fast.instructions_per_second = 5000;
        let mut e = env(fast, &[0x6050, 0xf015, 0x1204], vec![]);
        e.advance(Duration::from_millis(500))?;
        assert_eq!(e.machine().cycles(), 2500);
        assert_eq!(e.machine().timers().delay, 0x50 - 30);
        Ok(())
    }

    #[test]
    fn test_sound_stops_when_timer_runs_out() -> Result<(), EnvError> {
        let mut e = env(Config::headless(1), &[0x6002, 0xf018, 0x1204], vec![]);
        e.advance(Duration::from_millis(10))?;
        assert!(e.sound().is_beeping());
        e.advance(Duration::from_millis(50))?;
        assert!(!e.sound().is_beeping());
        Ok(())
    }

    #[test]
    fn test_redraws_only_when_dirty() -> Result<(), EnvError> {
        // draw the "0" glyph once, then spin
        let mut e = env(Config::headless(1), &[0xd005, 0x1202], vec![]);
        e.advance(Duration::from_millis(20))?;
        e.advance(Duration::from_millis(20))?;
        assert_eq!(e.display().frames, 1);
        assert_eq!(e.display().last[0], 0xf0);
        assert!(!e.machine().framebuffer().is_dirty());
        Ok(())
    }

    #[test]
    fn test_input_reaches_keypad() -> Result<(), EnvError> {
        let press = KeyEvent::Key {
            index: 0xc,
            pressed: true,
        };
        let mut e = env(Config::headless(1), &[0xf50a, 0x1202], vec![vec![], vec![press]]);
        e.advance(Duration::from_millis(20))?;
        assert!(e.machine().is_waiting_for_key());
        e.advance(Duration::from_millis(20))?;
        assert_eq!(e.machine().registers().v[5], 0xc);
        Ok(())
    }

    #[test]
    fn test_quit() -> Result<(), EnvError> {
        let mut e = env(Config::headless(1), &[0x1200], vec![vec![KeyEvent::Quit]]);
        assert_eq!(e.run()?.status, RunStatus::Quit);
        Ok(())
    }

    #[test]
    fn test_max_cycles() -> Result<(), EnvError> {
        let mut c = Config::headless(1);
        c.max_cycles = Some(10);
        let mut e = env(c, &[0x1200], vec![]);
        assert_eq!(e.advance(Duration::from_secs(1))?, RunStatus::Finished);
        assert_eq!(e.machine().cycles(), 10);
        Ok(())
    }

    #[test]
    fn test_fault_stops_run() {
        let mut e = env(Config::headless(1), &[0x00ee], vec![]);
        match e.run() {
            Err(EnvError::Fault(f)) => assert_eq!(f.error, VmError::StackUnderflow),
            other => panic!("expected a fault, got {:?}", other),
        }
    }
}
