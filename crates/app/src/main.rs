use std::{f32::consts::TAU, io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use lipsync_core::{EngineConfig, FftAnalysisSource, LipSyncEngine, Viseme};
use tracing_subscriber::EnvFilter;

fn main() -> lipsync_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            frequency,
            amplitude,
            seconds,
            emotion,
            output,
        } => run_simulate(frequency, amplitude, seconds, emotion.as_deref(), output),
        Commands::Shapes => run_shapes(),
    }
}

/// Synthesizes a sine tone, drives the engine at 16 ms ticks and emits
/// one JSON frame per line.
fn run_simulate(
    frequency: f32,
    amplitude: f32,
    seconds: f32,
    emotion: Option<&str>,
    output: Option<PathBuf>,
) -> lipsync_core::Result<()> {
    tracing::info!(frequency, amplitude, seconds, "starting simulation");

    let config = EngineConfig::default();
    let sample_rate = config.sample_rate;
    let source = FftAnalysisSource::new(config.window_size)?;

    let mut engine = LipSyncEngine::new(config);
    engine.init(Box::new(source.clone()), sample_rate)?;
    if let Some(name) = emotion {
        engine.set_emotion(name);
    }

    let tick_ms = 16.0f64;
    let samples_per_tick = (sample_rate as f64 * tick_ms / 1_000.0) as usize;
    let ticks = (seconds as f64 * 1_000.0 / tick_ms) as usize;

    let mut lines = Vec::with_capacity(ticks);
    let mut sample_index = 0usize;
    for tick in 0..ticks {
        let chunk: Vec<f32> = (0..samples_per_tick)
            .map(|offset| {
                let t = (sample_index + offset) as f32 / sample_rate as f32;
                amplitude * (TAU * frequency * t).sin()
            })
            .collect();
        sample_index += samples_per_tick;
        source.push_samples(&chunk);

        let frame = engine.tick(true, (tick + 1) as f64 * tick_ms);
        lines.push(serde_json::to_string(&frame).map_err(|err| err.to_string())?);
    }

    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            for line in &lines {
                writeln!(file, "{line}")?;
            }
        }
        None => {
            for line in &lines {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Dumps the viseme reference shape library with phoneme labels.
fn run_shapes() -> lipsync_core::Result<()> {
    let table: Vec<serde_json::Value> = Viseme::ALL
        .iter()
        .map(|viseme| {
            serde_json::json!({
                "viseme": viseme,
                "phoneme": viseme.phoneme_label(),
                "shape": viseme.reference_shape(),
                "vowel": viseme.is_vowel(),
            })
        })
        .collect();

    let rendered = serde_json::to_string_pretty(&table).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-time lip sync engine demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the engine with a synthetic tone and print frame results.
    Simulate {
        /// Tone frequency in Hz.
        #[arg(short, long, default_value_t = 220.0)]
        frequency: f32,
        /// Tone amplitude in [0, 1].
        #[arg(short, long, default_value_t = 0.4)]
        amplitude: f32,
        /// Simulated playback duration.
        #[arg(short, long, default_value_t = 2.0)]
        seconds: f32,
        /// Emotion preset applied before the first tick.
        #[arg(short, long)]
        emotion: Option<String>,
        /// Optional path for the JSON frame log.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the viseme shape library as JSON.
    Shapes,
}
