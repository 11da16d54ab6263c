use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use chip8_vm::sdl::{SdlInput, SdlRenderer};
use chip8_vm::{Config, Cpu};

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter")]
struct Args {
    /// program to run, loaded at 0x200
    program: PathBuf,

    /// window pixels per CHIP-8 pixel
    #[arg(short, long, default_value_t = 10)]
    scale: u32,

    /// pause after each instruction, in microseconds
    #[arg(short, long, default_value_t = 2000)]
    cycle_delay_us: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("chip8_vm=info"))
        .init();

    let args = Args::parse();
    let config = Config {
        cycle_delay: Duration::from_micros(args.cycle_delay_us),
        scale: args.scale,
        ..Config::default()
    };

    let sdl_ctx = sdl2::init().map_err(anyhow::Error::msg)?;
    let video = sdl_ctx.video().map_err(anyhow::Error::msg)?;
    let event_pump = sdl_ctx.event_pump().map_err(anyhow::Error::msg)?;

    let mut renderer = SdlRenderer::new(&video, config.scale).context("could not open window")?;
    let mut emu = Cpu::new(Box::new(SdlInput::new(event_pump)), config);
    emu.load_program_file(&args.program)
        .with_context(|| format!("could not load {}", args.program.display()))?;

    emu.run(&mut renderer).context("interpreter stopped")?;
    Ok(())
}
