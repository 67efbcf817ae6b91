//! air_sketch — interactive entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use air_sketch::app::run;
use air_sketch::config::{AppConfig, Mode};

#[derive(Parser, Debug)]
#[command(name = "air_sketch", about = "Draw in the air, let a model read it")]
struct Args {
    /// TOML config file (default: ./air_sketch.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ignore any config file and start from built-in defaults
    #[arg(long)]
    quick: bool,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    /// rgb24 frame stream: a file path, or `-` for stdin
    #[arg(long)]
    raw_video: Option<String>,
    /// Hand detector command line
    #[arg(long)]
    detector: Option<String>,
    /// Don't flip frames horizontally
    #[arg(long)]
    no_mirror: bool,
    #[arg(long)]
    model: Option<String>,
    /// Instruction sent with the canvas
    #[arg(long)]
    prompt: Option<String>,
}

impl Args {
    fn apply(self, cfg: &mut AppConfig) {
        if let Some(v) = self.width     { cfg.width = v; }
        if let Some(v) = self.height    { cfg.height = v; }
        if let Some(v) = self.model     { cfg.model = v; }
        if let Some(v) = self.prompt    { cfg.prompt = v; }
        if self.raw_video.is_some()     { cfg.raw_video = self.raw_video; }
        if self.detector.is_some()      { cfg.detector = self.detector; }
        if self.no_mirror               { cfg.mirror = false; }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut cfg = if args.quick {
        AppConfig::default()
    } else {
        AppConfig::discover(args.config.as_deref())?
    };
    cfg.apply_env(|k| std::env::var(k).ok());
    args.apply(&mut cfg);
    cfg.validate()?;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Air Sketch — draw in the air, let a model read it   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match cfg.mode() {
        Mode::Simulation => {
            println!("  Mode: Keyboard/mouse simulation  (use --raw-video/--detector for a camera)");
        }
        Mode::Hardware { raw_video, detector } => {
            println!("  Mode: Camera");
            println!("    frames   : {}", raw_video.as_deref().unwrap_or("synthetic"));
            println!("    detector : {}", detector.as_deref().unwrap_or("simulated hand"));
        }
    }
    println!("  Frame {}x{}, model {}", cfg.width, cfg.height, cfg.model);
    println!();

    run(cfg)
}
