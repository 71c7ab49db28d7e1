use anyhow::Context;
use chip8::display::MonoTermDisplay;
use chip8::{Chip8Interpreter, DispatchMode, InterpreterConfig, MemoryPolicy, Rom, RomFormat};
use clap::Parser;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use spin_sleep::LoopHelper;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 virtual machine in the terminal", long_about = None)]
struct Args {
    #[arg(help = "Path to the ROM file to run")]
    rom_path: PathBuf,

    #[arg(long, help = "ROM is text of hex instruction words, e.g. \"00E0 1200\"")]
    hex: bool,

    #[arg(short, long, default_value_t = 60.0, help = "Frames per second")]
    fps: f64,

    #[arg(short, long, default_value_t = 10, help = "Instructions per frame")]
    ipf: u32,

    #[arg(long, help = "Only dispatch the reference instruction table")]
    reference: bool,

    #[arg(long, help = "Refuse writes below 0x200 instead of logging them")]
    strict_memory: bool,

    #[arg(long, help = "Stop after this many frames")]
    max_frames: Option<u64>,
}

impl Args {
    fn config(&self) -> InterpreterConfig {
        InterpreterConfig {
            dispatch: if self.reference {
                DispatchMode::Reference
            } else {
                DispatchMode::Extended
            },
            memory_policy: if self.strict_memory {
                MemoryPolicy::Strict
            } else {
                MemoryPolicy::Permissive
            },
        }
    }

    fn rom_format(&self) -> RomFormat {
        if self.hex {
            RomFormat::HexWords
        } else {
            RomFormat::Binary
        }
    }
}

fn main() -> anyhow::Result<()> {
    // NB. anything logged lands on top of the display; redirect stderr if you
    //     turn RUST_LOG up
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();
    let args = Args::parse();

    let rom = Rom::open(&args.rom_path, args.rom_format())
        .with_context(|| format!("couldn't load {}", args.rom_path.display()))?;

    // initialise
    let mut display = MonoTermDisplay::new()?;
    let mut interpreter = Chip8Interpreter::with_config(&mut display, args.config());
    interpreter.load_rom(&rom)?;

    let outcome = main_loop(&mut interpreter, &args);

    // give the terminal back before saying anything
    drop(interpreter);
    drop(display);
    println!();
    outcome
}

/// step, show, sleep; until the user quits or `max_frames` is reached. Once
/// the program runs out the last frame stays up.
fn main_loop(interpreter: &mut Chip8Interpreter, args: &Args) -> anyhow::Result<()> {
    let mut loop_helper = LoopHelper::builder().build_with_target_rate(args.fps);
    let mut frames: u64 = 0;
    let mut halted = false;

    loop {
        loop_helper.loop_start();
        if quit_requested()? {
            break;
        }

        if !halted {
            for _ in 0..args.ipf {
                match interpreter.step() {
                    Ok(_) => {}
                    Err(e) if e.is_exhausted() => {
                        log::info!("{}", e);
                        halted = true;
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        interpreter.refresh()?;

        frames += 1;
        if matches!(args.max_frames, Some(max) if frames >= max) {
            break;
        }
        loop_helper.loop_sleep();
    }
    Ok(())
}

/// drain pending terminal events, looking for Esc, q or ctrl-c
fn quit_requested() -> anyhow::Result<bool> {
    while poll(Duration::from_millis(0))? {
        if let Event::Key(key) = read()? {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(true),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(true)
                }
                _ => {}
            }
        }
    }
    Ok(false)
}
