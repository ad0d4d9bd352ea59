use std::path::PathBuf;

use clap::Parser;
use log::info;
use simulation::{App, Stepper};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scene json file path
    #[arg(value_name = "FILE")]
    scene: PathBuf,

    /// Number of frames to simulate
    #[arg(long, short, default_value = "600")]
    frames: usize,

    /// Frame duration in seconds
    #[arg(long, default_value = "0.016666666666666666")]
    dt: f64,

    /// Collisions resolved per frame before the rest is committed unchecked
    #[arg(long, default_value = "64")]
    max_substeps: usize,

    /// Debris seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Print collisions as json lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), String> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    let mut app = App::try_from_file(&cli.scene, cli.seed)?
        .with_stepper(Stepper::default().with_max_substeps(cli.max_substeps));
    info!(
        "Loaded {} entities from {}",
        app.get_scene().len(),
        cli.scene.display()
    );

    let now = std::time::Instant::now();
    for _ in 0..cli.frames {
        let frame = app.get_frame_id() + 1;
        let report = app.run_frame(cli.dt).map_err(|e| e.to_string())?;
        if cli.json {
            for collision in &report.collisions {
                let line = serde_json::json!({ "frame": frame, "collision": collision });
                println!("{line}");
            }
        }
    }
    let elapsed = now.elapsed();

    if !cli.json {
        println!("{}", app.get_history().pretty_to_string());
    }
    for touchdown in app.get_touchdowns() {
        info!(
            "Craft {} touched down at {:.3}: {}",
            touchdown.craft.0, touchdown.at, touchdown.landing
        );
    }
    info!(
        "Ran {} frames to t={:.3} in {elapsed:?}, {} entities left",
        app.get_frame_id(),
        app.get_clock(),
        app.get_scene().len()
    );
    Ok(())
}
