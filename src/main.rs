use anyhow::Context;
use clap::Parser;
use kmon::monitor::{Monitor, MonitorExit};
use kmon::snapshot::MachineImage;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Machine snapshot (TOML) to inspect.
    snapshot: PathBuf,

    /// Silence crate logging; the monitor owns the terminal.
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.quiet {
        kmon::log::disable();
    }

    let image = MachineImage::load(&args.snapshot)?;
    kmon::km_info!(target: "kmon", "snapshot {} loaded", args.snapshot.display());

    let mut monitor = Monitor::new(image.session())?;

    match monitor.run().context("monitor session")? {
        MonitorExit::Quit => {}
        MonitorExit::ResumeProgram => {
            println!("resume requested, but a snapshot has no live program to continue");
        }
    }
    Ok(())
}
