use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// left-hand side of a qwerty keyboard laid over the COSMAC hex keypad
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <-  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// something the host should tell the machine about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Key { index: u8, pressed: bool },
    Quit,
}

/// reads keypresses
pub trait Input {
    /// everything that happened since the last poll, without blocking
    fn poll(&mut self) -> Result<Vec<KeyEvent>, io::Error>;
}

/// terminals only tell us about presses (and auto-repeats), so a key counts
/// as held until `hold` after the last press we saw for it
struct HeldKeys {
    hold: Duration,
    since: [Option<Instant>; 16],
}

impl HeldKeys {
    fn new(hold: Duration) -> Self {
        HeldKeys {
            hold,
            since: [None; 16],
        }
    }

    /// a press or auto-repeat; only the first one is news
    fn press(&mut self, index: u8, now: Instant) -> Option<KeyEvent> {
        let since = self.since[index as usize].replace(now);
        match since {
            Some(_) => None,
            None => Some(KeyEvent::Key {
                index,
                pressed: true,
            }),
        }
    }

    /// release anything we haven't heard about for a while
    fn expire(&mut self, now: Instant, events: &mut Vec<KeyEvent>) {
        for (index, held) in self.since.iter_mut().enumerate() {
            if let Some(since) = *held {
                if now.duration_since(since) >= self.hold {
                    *held = None;
                    events.push(KeyEvent::Key {
                        index: index as u8,
                        pressed: false,
                    });
                }
            }
        }
    }
}

/// Input from the terminal, using crossterm in raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: HeldKeys,
    log_warnings: bool,
}

impl TermInput {
    pub fn new(log_warnings: bool, key_hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: HeldKeys::new(key_hold),
            log_warnings,
        })
    }

    fn read_terminal(&mut self, now: Instant, events: &mut Vec<KeyEvent>) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => events.push(KeyEvent::Quit),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(KeyEvent::Quit)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&index) => events.extend(self.held.press(index, now)),
                        None => {
                            if self.log_warnings {
                                eprintln!("Warning: can't map {:?} to a COSMAC key", key);
                            }
                        }
                    },
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<Vec<KeyEvent>, io::Error> {
        let now = Instant::now();
        let mut events = Vec::new();
        self.read_terminal(now, &mut events)?;
        self.held.expire(now, &mut events);
        Ok(events)
    }
}

/// dummy Input implementation for testing: hands out one batch of events
/// per poll, then nothing
pub struct DummyInput {
    batches: VecDeque<Vec<KeyEvent>>,
}

impl DummyInput {
    pub fn new(batches: Vec<Vec<KeyEvent>>) -> Self {
        DummyInput {
            batches: VecDeque::from(batches),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Vec<KeyEvent>, io::Error> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
