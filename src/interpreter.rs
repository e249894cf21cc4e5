/// # interpreter
///
/// The whole machine lives in one `Chip8Interpreter`: memory, registers,
/// call stack, timers, framebuffer and keypad. The host drives it with
///  - `cycle()`       -- fetch/decode/execute one instruction
///  - `tick_timers()` -- one beat of the 60Hz timer clock
///  - `set_key()`     -- keypad events, whenever they happen
/// and reads the framebuffer (and its dirty flag) and `tone_active()`
/// back out. Nothing in here knows about wall-clock time; timers only ever
/// move when the host ticks them.
///
/// Fx0A doesn't block. It parks the machine in a waiting state and every
/// following `cycle()` looks for a freshly pressed key instead of
/// executing anything.
use crate::config::{Config, UnknownOpcodePolicy};
use crate::errors::{EnvError, Fault, VmError};
use crate::framebuffer::Framebuffer;
use crate::instruction::{AluOp, Instruction};
use crate::keypad::KeyMatrix;
use crate::memory::{Chip8Memory, MemoryMap, PROGRAM_ADDR};
use crate::registers::RegisterFile;
use crate::stack::CallStack;
use crate::timers::TimerPair;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// what the machine is doing between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    /// parked on Fx0A, result goes in Vx
    WaitingForKey { x: u8 },
    Halted(Fault),
}

/// how the program counter moves once an instruction has executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Wait,
}

/// what a single call to `cycle()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Executed(Instruction),
    /// unknown opcode passed over under the lenient policy
    Skipped(u16),
    /// still parked on Fx0A
    Waiting,
    /// Fx0A saw a key and the machine is running again
    Resumed { key: u8 },
}

pub struct Chip8Interpreter {
    memory: Chip8Memory,
    registers: RegisterFile,
    stack: CallStack,
    timers: TimerPair,
    framebuffer: Framebuffer,
    keys: KeyMatrix,
    state: State,
    rng: StdRng,
    config: Config,
    cycles: u64,
    unknown_opcodes: u64,
}

impl Chip8Interpreter {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Chip8Interpreter {
            memory: Chip8Memory::new(),
            registers: RegisterFile::new(),
            stack: CallStack::new(),
            timers: TimerPair::new(),
            framebuffer: Framebuffer::new(),
            keys: KeyMatrix::new(),
            state: State::Running,
            rng,
            config,
            cycles: 0,
            unknown_opcodes: 0,
        }
    }

    /// back to power-on: memory zeroed with the font reinstalled, PC at
    /// 0x200, empty stack, timers stopped, blank screen. The keypad is
    /// left alone; it belongs to the host
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers.reset();
        self.stack.reset();
        self.timers.reset();
        self.framebuffer = Framebuffer::new();
        self.state = State::Running;
        self.cycles = 0;
        self.unknown_opcodes = 0;
    }

    /// reset, then copy a program in at 0x200. If it doesn't fit, the
    /// machine stays halted and no cycle will run
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), VmError> {
        self.reset();
        if let Err(error) = self.memory.load_program(program) {
            self.halt(Fault {
                pc: PROGRAM_ADDR,
                opcode: None,
                error,
            });
            return Err(error);
        }
        Ok(())
    }

    /// load a chip8 program from anything readable; returns its length
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<usize, EnvError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)?;
        Ok(buf.len())
    }

    /// run one fetch/decode/execute step
    pub fn cycle(&mut self) -> Result<Cycle, Fault> {
        match self.state {
            State::Halted(fault) => {
                return Err(Fault {
                    error: VmError::Halted,
                    ..fault
                })
            }
            State::WaitingForKey { x } => return Ok(self.poll_wait(x)),
            State::Running => {}
        }

        let pc = self.registers.pc;
        let word = match self.memory.read16(pc) {
            Ok(word) => word,
            Err(error) => {
                return Err(self.halt(Fault {
                    pc,
                    opcode: None,
                    error,
                }))
            }
        };
        let instruction = Instruction::decode(word);

        match self.execute(instruction) {
            Ok(flow) => {
                self.advance(flow);
                self.cycles += 1;
                Ok(Cycle::Executed(instruction))
            }
            Err(error)
                if error.is_recoverable()
                    && self.config.unknown_opcode == UnknownOpcodePolicy::Lenient =>
            {
                if self.config.log_warnings {
                    eprintln!(
                        "Warning: unknown opcode 0x{:04x} at 0x{:03x}; skipping",
                        word, pc
                    );
                }
                self.unknown_opcodes += 1;
                self.cycles += 1;
                self.advance(Flow::Next);
                Ok(Cycle::Skipped(word))
            }
            Err(error) => Err(self.halt(Fault {
                pc,
                opcode: Some(word),
                error,
            })),
        }
    }

    /// one tick of the host's fixed-rate timer clock
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn set_key(&mut self, index: u8, pressed: bool) -> Result<(), VmError> {
        self.keys.set_key(index, pressed)
    }

    pub fn tone_active(&self) -> bool {
        self.timers.tone_active()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.state, State::WaitingForKey { .. })
    }

    /// the fault that stopped the machine, if any
    pub fn halted(&self) -> Option<Fault> {
        match self.state {
            State::Halted(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// so the host can consume the dirty flag
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn timers(&self) -> &TimerPair {
        &self.timers
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// instructions executed (or skipped) since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn unknown_opcodes(&self) -> u64 {
        self.unknown_opcodes
    }

    fn halt(&mut self, fault: Fault) -> Fault {
        self.state = State::Halted(fault);
        fault
    }

    fn advance(&mut self, flow: Flow) {
        let pc = &mut self.registers.pc;
        match flow {
            Flow::Next => *pc = pc.wrapping_add(2),
            Flow::Skip => *pc = pc.wrapping_add(4),
            Flow::Jump(addr) => *pc = addr,
            Flow::Wait => {}
        }
    }

    fn poll_wait(&mut self, x: u8) -> Cycle {
        match self.keys.take_fresh() {
            Some(key) => {
                self.registers.set(x, key);
                self.state = State::Running;
                self.advance(Flow::Next);
                self.cycles += 1;
                Cycle::Resumed { key }
            }
            None => Cycle::Waiting,
        }
    }

    fn skip_if(condition: bool) -> Flow {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }

    /// carry out one instruction. On error nothing has been changed
    fn execute(&mut self, instruction: Instruction) -> Result<Flow, VmError> {
        let r = &mut self.registers;
        let flow = match instruction {
            Instruction::ClearScreen => {
                self.framebuffer.clear();
                Flow::Next
            }
            Instruction::Return => Flow::Jump(self.stack.pop()?),
            Instruction::Jump { nnn } => Flow::Jump(nnn),
            Instruction::Call { nnn } => {
                self.stack.push(r.pc.wrapping_add(2))?;
                Flow::Jump(nnn)
            }
            Instruction::SkipEqImm { x, kk } => Self::skip_if(r.get(x) == kk),
            Instruction::SkipNeImm { x, kk } => Self::skip_if(r.get(x) != kk),
            Instruction::SkipEqReg { x, y } => Self::skip_if(r.get(x) == r.get(y)),
            Instruction::SkipNeReg { x, y } => Self::skip_if(r.get(x) != r.get(y)),
            Instruction::LoadImm { x, kk } => {
                r.set(x, kk);
                Flow::Next
            }
            Instruction::AddImm { x, kk } => {
                r.set(x, r.get(x).wrapping_add(kk));
                Flow::Next
            }
            Instruction::Alu { op, x, y } => {
                alu(r, op, x, y);
                Flow::Next
            }
            Instruction::LoadI { nnn } => {
                r.i = nnn;
                Flow::Next
            }
            Instruction::JumpOffset { nnn } => Flow::Jump(r.get(0) as u16 + nnn),
            Instruction::Random { x, kk } => {
                let byte: u8 = self.rng.random();
                r.set(x, byte & kk);
                Flow::Next
            }
            Instruction::Draw { x, y, n } => {
                let sprite = self.memory.get_ro_slice(r.i, n as usize)?;
                let collision = self.framebuffer.draw_sprite(r.get(x), r.get(y), sprite);
                r.set_flag(collision);
                Flow::Next
            }
            Instruction::SkipKeyPressed { x } => Self::skip_if(self.keys.is_pressed(r.get(x))),
            Instruction::SkipKeyNotPressed { x } => {
                Self::skip_if(!self.keys.is_pressed(r.get(x)))
            }
            Instruction::GetDelay { x } => {
                r.set(x, self.timers.delay);
                Flow::Next
            }
            Instruction::WaitKey { x } => {
                // only presses from here on count
                self.keys.clear_fresh();
                self.state = State::WaitingForKey { x };
                Flow::Wait
            }
            Instruction::SetDelay { x } => {
                self.timers.delay = r.get(x);
                Flow::Next
            }
            Instruction::SetSound { x } => {
                self.timers.sound = r.get(x);
                Flow::Next
            }
            Instruction::AddI { x } => {
                r.i = r.i.wrapping_add(r.get(x) as u16);
                Flow::Next
            }
            Instruction::LoadGlyph { x } => {
                r.i = Chip8Memory::glyph_addr(r.get(x));
                Flow::Next
            }
            Instruction::StoreBcd { x } => {
                let v = r.get(x);
                self.memory.write(&[v / 100, (v / 10) % 10, v % 10], r.i)?;
                Flow::Next
            }
            Instruction::StoreRegs { x } => {
                // NB. inclusive of Vx
                self.memory.write(&r.v[..=x as usize], r.i)?;
                Flow::Next
            }
            Instruction::LoadRegs { x } => {
                let count = x as usize + 1;
                let bytes = self.memory.get_ro_slice(r.i, count)?;
                r.v[..count].copy_from_slice(bytes);
                Flow::Next
            }
            Instruction::Unknown(word) => return Err(VmError::UnknownOpcode(word)),
        };
        Ok(flow)
    }
}

/// 8xyN. Flags are worked out from the operands as they were before the
/// operation, and VF is written last so it holds the flag even when x is F
fn alu(r: &mut RegisterFile, op: AluOp, x: u8, y: u8) {
    let vx = r.get(x);
    let vy = r.get(y);
    let (result, flag) = match op {
        AluOp::Assign => (vy, None),
        AluOp::Or => (vx | vy, None),
        AluOp::And => (vx & vy, None),
        AluOp::Xor => (vx ^ vy, None),
        AluOp::Add => {
            let (sum, carry) = vx.overflowing_add(vy);
            (sum, Some(carry))
        }
        AluOp::Sub => (vx.wrapping_sub(vy), Some(vx >= vy)),
        AluOp::SubReversed => (vy.wrapping_sub(vx), Some(vy >= vx)),
        AluOp::ShiftRight => (vx >> 1, Some(vx & 0x01 != 0)),
        AluOp::ShiftLeft => (vx << 1, Some(vx & 0x80 != 0)),
    };
    r.set(x, result);
    if let Some(flag) = flag {
        r.set_flag(flag);
    }
}
