use std::time::Duration;

/// what to do when the interpreter meets an instruction word it can't decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// log it, count it, and carry on as if it were a no-op
    Lenient,
    /// halt the machine with a fault
    Strict,
}

/// machine and host settings; the host loop owns the clocks and the key
/// hold, the machine only ever looks at `unknown_opcode`, `seed` and
/// `log_warnings`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub unknown_opcode: UnknownOpcodePolicy,
    pub instructions_per_second: u32,
    pub timer_hz: u32,
    pub seed: Option<u64>,
    pub log_warnings: bool,
    pub max_cycles: Option<u64>,
    pub key_hold: Duration,
}

/// conventional CHIP-8 speed; the COSMAC VIP managed roughly this
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

/// delay and sound timers count down at 60Hz
pub const DEFAULT_TIMER_HZ: u32 = 60;

/// terminals start auto-repeating a held key after 250-600ms, so a key
/// has to stay down at least that long after its last press event
pub const DEFAULT_KEY_HOLD: Duration = Duration::from_millis(650);

impl Default for Config {
    fn default() -> Self {
        Config {
            unknown_opcode: UnknownOpcodePolicy::Lenient,
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            timer_hz: DEFAULT_TIMER_HZ,
            seed: None,
            log_warnings: true,
            max_cycles: None,
            key_hold: DEFAULT_KEY_HOLD,
        }
    }
}

impl Config {
    /// quiet, deterministic settings for tests and headless runs
    pub fn headless(seed: u64) -> Self {
        Config {
            seed: Some(seed),
            log_warnings: false,
            ..Config::default()
        }
    }

    pub fn strict(mut self) -> Self {
        self.unknown_opcode = UnknownOpcodePolicy::Strict;
        self
    }
}
