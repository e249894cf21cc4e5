use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::Environment;
use chip8vm::input::TermInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::{Chip8Interpreter, Config, UnknownOpcodePolicy};

#[derive(Parser, Debug)]
#[command(name = "chip8vm")]
#[command(about = "CHIP-8 virtual machine in the terminal", long_about = None)]
struct Args {
    /// Path to the game
    #[arg(long)]
    path: PathBuf,

    /// Halt on unknown opcodes instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Instructions per second
    #[arg(long, default_value_t = chip8vm::config::DEFAULT_INSTRUCTIONS_PER_SECOND)]
    speed: u32,

    /// Seed for the random number opcode
    #[arg(long)]
    seed: Option<u64>,

    /// No beeping
    #[arg(long)]
    mute: bool,

    /// Stop after this many instructions
    #[arg(long)]
    max_cycles: Option<u64>,

    /// How long a key stays down after the terminal last reported it
    #[arg(long, default_value_t = chip8vm::config::DEFAULT_KEY_HOLD.as_millis() as u64)]
    key_hold_ms: u64,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            unknown_opcode: if self.strict {
                UnknownOpcodePolicy::Strict
            } else {
                UnknownOpcodePolicy::Lenient
            },
            instructions_per_second: self.speed,
            seed: self.seed,
            // the terminal belongs to the display while we run
            log_warnings: false,
            max_cycles: self.max_cycles,
            key_hold: Duration::from_millis(self.key_hold_ms),
            ..Config::default()
        }
    }
}

fn run(args: &Args, machine: Chip8Interpreter, sound: impl Sound) -> Result<()> {
    let display = MonoTermDisplay::new().context("can't set up the terminal display")?;
    let input = TermInput::new(false, machine.config().key_hold)
        .context("can't put the terminal in raw mode")?;
    let mut env = Environment::new(machine, display, input, sound)?;
    let result = env.run();
    drop(env);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..4 {
        println!();
    }
    let summary = result.with_context(|| format!("{} stopped", args.path.display()))?;
    eprintln!(
        "{:?} after {} cycles, {} timer ticks, {} unknown opcodes skipped",
        summary.status, summary.cycles, summary.timer_ticks, summary.unknown_opcodes
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut f = File::open(&args.path)
        .with_context(|| format!("can't open game {}", args.path.display()))?;
    let mut machine = Chip8Interpreter::new(args.config());
    machine
        .load_program_from(&mut f)
        .with_context(|| format!("can't load game {}", args.path.display()))?;

    if args.mute {
        run(&args, machine, Mute::new())
    } else {
        run(&args, machine, SimpleBeep::new())
    }
}
