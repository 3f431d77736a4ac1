use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fun_meter::config::AppConfig;
use fun_meter::engine::{Collaborators, EngineHandle, RoundEvent, RoundSummary, StatusLevel};
use fun_meter::platform::PlatformInfo;
use fun_meter::storage::{FileStore, GameMode, ScoreStore};
use fun_meter::testing::{
    EnergyClassifier, ScriptedLoader, ShakePattern, SyntheticMicrophone, SyntheticMotion,
};
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(
    name = "fun_meter_cli",
    about = "Play laugh and shake rounds against synthetic sensors"
)]
struct Cli {
    /// JSON config file (defaults to assets/fun_meter.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding leaderboard files (overrides the config)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Laugh,
    Shake,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Laugh => GameMode::Laugh,
            ModeArg::Shake => GameMode::Shake,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one round and record the result
    Play {
        #[arg(value_enum)]
        mode: ModeArg,
        #[arg(long)]
        name: String,
        /// WAV file used as microphone input (laugh)
        #[arg(long)]
        wav: Option<PathBuf>,
        /// Tone amplitude when no WAV is given (laugh)
        #[arg(long, default_value_t = 0.15)]
        amplitude: f32,
        /// Peak shake acceleration in m/s², 0 keeps the device still (shake)
        #[arg(long, default_value_t = 15.0)]
        intensity: f64,
        /// Stop the round early after this many milliseconds
        #[arg(long)]
        stop_after_ms: Option<u64>,
    },
    /// Print the stored top scores for a mode
    Leaderboard {
        #[arg(long, value_enum)]
        mode: ModeArg,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };
    if let Some(dir) = cli.store_dir {
        config.storage.directory = dir;
    }

    match cli.command {
        Commands::Play {
            mode,
            name,
            wav,
            amplitude,
            intensity,
            stop_after_ms,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to build tokio runtime")?;
            let collaborators = build_collaborators(&config, wav.as_deref(), amplitude, intensity)?;
            let summary = runtime.block_on(play(
                config,
                collaborators,
                mode.into(),
                &name,
                stop_after_ms,
            ))?;
            print_summary(&summary);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Leaderboard { mode, json } => print_leaderboard(&config, mode.into(), json),
    }
}

fn build_collaborators(
    config: &AppConfig,
    wav: Option<&Path>,
    amplitude: f32,
    intensity: f64,
) -> Result<Collaborators> {
    let microphone = match wav {
        Some(path) => SyntheticMicrophone::from_wav(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SyntheticMicrophone::tone(220.0, amplitude),
    };
    let motion = if intensity > 0.0 {
        SyntheticMotion::shaking(ShakePattern {
            acceleration: intensity,
            ..ShakePattern::vigorous()
        })
    } else {
        SyntheticMotion::new()
    };

    Ok(Collaborators {
        microphone: Arc::new(microphone),
        motion: Arc::new(motion),
        classifier_loader: Arc::new(ScriptedLoader::new(Arc::new(EnergyClassifier::default()))),
        storage: Arc::new(FileStore::new(&config.storage.directory)),
        platform: PlatformInfo::default(),
    })
}

async fn play(
    config: AppConfig,
    collaborators: Collaborators,
    mode: GameMode,
    name: &str,
    stop_after_ms: Option<u64>,
) -> Result<RoundSummary> {
    let engine = EngineHandle::new(config, collaborators);
    let mut events = engine.subscribe();
    engine.start(mode, name).await?;

    let deadline = tokio::time::sleep(Duration::from_millis(stop_after_ms.unwrap_or_default()));
    tokio::pin!(deadline);
    let mut last_second = None;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(RoundEvent::Finished(summary)) => return Ok(summary),
                Ok(event) => print_event(&event, &mut last_second),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("[CLI] Skipped {} round events", skipped);
                }
                Err(RecvError::Closed) => anyhow::bail!("round event channel closed"),
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping round...");
                return stop(&engine, mode);
            }
            _ = &mut deadline, if stop_after_ms.is_some() => {
                return stop(&engine, mode);
            }
        }
    }
}

fn stop(engine: &EngineHandle, mode: GameMode) -> Result<RoundSummary> {
    engine
        .stop(mode)?
        .context("round had already finished")
}

fn print_event(event: &RoundEvent, last_second: &mut Option<u64>) {
    match event {
        RoundEvent::Phase { phase, .. } => println!("phase: {:?}", phase),
        RoundEvent::Status { level, message, .. } => {
            let tag = match level {
                StatusLevel::Info => "info",
                StatusLevel::Warning => "warn",
                StatusLevel::Error => "error",
            };
            println!("[{tag}] {message}");
        }
        RoundEvent::Score {
            score, elapsed_ms, ..
        } => {
            let second = elapsed_ms / 1000;
            if *last_second != Some(second) {
                *last_second = Some(second);
                println!("{:>5} ms  score {}", elapsed_ms, score);
            }
        }
        RoundEvent::Meter { .. } | RoundEvent::Controls { .. } | RoundEvent::Finished(_) => {}
    }
}

fn print_summary(summary: &RoundSummary) {
    println!(
        "{} scored {} in {} ({:?})",
        summary.player, summary.score, summary.mode, summary.cause
    );
    if summary.personal_best {
        println!("New personal best!");
    }
    match (summary.persisted, summary.rank) {
        (true, Some(rank)) => println!("Leaderboard rank: #{}", rank),
        (true, None) => println!("Did not make the leaderboard"),
        (false, _) => println!("Score could not be saved"),
    }
}

fn print_leaderboard(config: &AppConfig, mode: GameMode, json: bool) -> Result<ExitCode> {
    let scores = ScoreStore::new(
        Arc::new(FileStore::new(&config.storage.directory)),
        &config.storage,
    );
    let board = scores.load(mode);

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} leaderboard", mode);
    if board.is_empty() {
        println!("  (no scores yet)");
    }
    for (index, entry) in board.entries().iter().enumerate() {
        println!("{:>3}. {:<16} {:>5}", index + 1, entry.name, entry.score);
    }
    Ok(ExitCode::SUCCESS)
}
