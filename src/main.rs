//! Runs a chip8 program inside of the terminal.
//!
//! The keypad is mapped onto the left hand side of the keyboard:
//!
//! ```text
//! Keypad        Keyboard
//! 1 2 3 C       1 2 3 4
//! 4 5 6 D       Q W E R
//! 7 8 9 E       A S D F
//! A 0 B F       Z X C V
//! ```
//!
//! Press `Esc` to quit.
mod terminal;

use {
    anyhow::{anyhow, bail, Context},
    chip::{
        chip8::ChipSet,
        definitions::cpu,
        resources::{Rom, RomArchives},
        Config, Runner,
    },
    clap::Parser,
    std::{fs::File, path::PathBuf, process},
    terminal::{TerminalDisplay, TerminalKeyboard},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a raw program image or to a zip archive of programs
    path: PathBuf,

    /// The program to run out of the archive
    #[arg(short, long)]
    rom: Option<String>,

    /// Lists all the programs inside of the archive and exits
    #[arg(short, long)]
    list: bool,

    /// Instructions executed per second
    #[arg(long, default_value_t = cpu::HERTZ)]
    hertz: u64,

    /// Writes the log into the given file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn setup_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("unable to create the log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

fn is_archive(path: &std::path::Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("zip"))
}

/// Will load the program, `None` means there is nothing to run.
fn load_rom(args: &Args) -> anyhow::Result<Option<Rom>> {
    if !is_archive(&args.path) {
        if args.list || args.rom.is_some() {
            bail!("{} is not a zip archive", args.path.display());
        }
        let rom = Rom::from_file(&args.path)
            .with_context(|| format!("unable to read {}", args.path.display()))?;
        return Ok(Some(rom));
    }

    let mut archive = RomArchives::open(&args.path)
        .with_context(|| format!("unable to open the archive {}", args.path.display()))?;

    if args.list {
        for name in archive.file_names() {
            println!("{}", name);
        }
        return Ok(None);
    }

    let name = args
        .rom
        .as_deref()
        .ok_or_else(|| anyhow!("pick a program out of the archive with --rom, see --list"))?;
    let rom = archive
        .get_file_data(name)
        .with_context(|| format!("unable to extract {}", name))?;
    Ok(Some(rom))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.log_file.as_ref())?;

    let config = Config::new(args.hertz)?;
    let rom = match load_rom(&args)? {
        Some(rom) => rom,
        None => return Ok(()),
    };
    let chip = ChipSet::new(rom).context("the program does not fit into memory")?;

    let mut runner: Runner<_, _> = Runner::new(
        chip,
        TerminalDisplay::new(),
        TerminalKeyboard::new(),
        config,
    )?;

    match runner.run() {
        Ok(()) => {
            runner.shutdown(false)?;
            Ok(())
        }
        Err(err) => {
            let state = runner.chip().to_string();
            // keep the last frame until a key is hit
            runner.shutdown(true)?;
            eprintln!("The program halted: {}", err);
            eprintln!("{}", state);
            process::exit(1);
        }
    }
}
