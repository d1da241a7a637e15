use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lensfit_core::{
    Catalog, FaceAnalysis, FaceRecommendation, LandmarkCapture, ScoringStrategy, TryOnSession,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;
mod replay;

use config::Config;
use replay::{Replay, ReplayRecord, Step};

#[derive(Parser)]
#[command(name = "lensfit", about = "Face-shape analysis and eyewear recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a recorded landmark capture and rank the catalog
    Analyze {
        /// JSON file with `width`, `height` and 468 `landmarks`
        file: PathBuf,
        /// Photo the landmarks were taken from; its size overrides the JSON dimensions
        #[arg(long)]
        image: Option<PathBuf>,
        /// Scoring strategy (membership or geometry)
        #[arg(short, long)]
        strategy: Option<ScoringStrategy>,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog frames
    Catalog {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a recorded detector stream through the auto-capture gate
    Watch {
        /// JSON Lines file, one detector callback per line
        file: PathBuf,
        /// Scoring strategy (membership or geometry)
        #[arg(short, long)]
        strategy: Option<ScoringStrategy>,
        /// Reopen the gate after each capture instead of stopping
        #[arg(long)]
        repeat: bool,
    },
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    analysis: &'a FaceAnalysis,
    recommendations: &'a [FaceRecommendation<'a>],
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let custom_catalog;
    let catalog = match &config.catalog_path {
        Some(path) => {
            custom_catalog = Catalog::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            &custom_catalog
        }
        None => Catalog::builtin(),
    };

    match cli.command {
        Commands::Analyze {
            file,
            image,
            strategy,
            json,
        } => {
            let strategy = strategy.unwrap_or(config.strategy);
            analyze(catalog, strategy, &file, image.as_deref(), json).await?;
        }
        Commands::Catalog { json } => print_catalog(catalog, json)?,
        Commands::Watch {
            file,
            strategy,
            repeat,
        } => {
            let strategy = strategy.unwrap_or(config.strategy);
            watch(catalog, strategy, &config, &file, repeat).await?;
        }
    }

    Ok(())
}

async fn analyze(
    catalog: &Catalog,
    strategy: ScoringStrategy,
    file: &Path,
    image: Option<&Path>,
    json: bool,
) -> Result<()> {
    let src = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let mut capture = LandmarkCapture::from_json(&src)
        .with_context(|| format!("parsing {}", file.display()))?;

    if let Some(image) = image {
        let (width, height) = image::image_dimensions(image)
            .with_context(|| format!("reading image header {}", image.display()))?;
        tracing::debug!(width, height, "using photo dimensions");
        capture.width = width;
        capture.height = height;
    }

    let mut session = TryOnSession::new(catalog, strategy);
    session.analyze_capture(capture)?;
    report(&session, json)
}

async fn watch(
    catalog: &Catalog,
    strategy: ScoringStrategy,
    config: &Config,
    file: &Path,
    repeat: bool,
) -> Result<()> {
    let handle = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("opening {}", file.display()))?;
    let mut lines = BufReader::new(handle).lines();

    let session = TryOnSession::new(catalog, strategy);
    let mut replay = Replay::new(session, config.gate_config(), Instant::now());
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReplayRecord = serde_json::from_str(&line)
            .with_context(|| format!("line {line_no}: bad replay record"))?;
        let t_ms = record.t_ms;

        match replay.feed(line_no, record)? {
            Step::CountdownStarted { remaining } => {
                println!(
                    "[{t_ms:>6} ms] face positioned, capturing in {}s",
                    remaining.as_secs()
                );
            }
            Step::Analyzed => {
                println!("[{t_ms:>6} ms] captured");
                report(replay.session(), false)?;
                if !repeat {
                    break;
                }
                replay.reopen();
            }
            // Withhold the result and wait for the next capture.
            Step::Failed(e) => println!("[{t_ms:>6} ms] captured, analysis failed: {e}"),
            Step::Idle => {}
        }
    }

    if replay.analyses() == 0 {
        println!(
            "No capture: face never held position for {}s",
            config.countdown_secs
        );
    }
    Ok(())
}

fn report(session: &TryOnSession<'_>, json: bool) -> Result<()> {
    let Some(analysis) = session.current() else {
        return Ok(());
    };
    let recommendations = session.recommendations();

    if json {
        let out = AnalysisReport {
            analysis,
            recommendations: &recommendations,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let g = &analysis.geometry;
    println!(
        "Face shape: {} ({:.0}% confidence)",
        analysis.shape,
        analysis.confidence * 100.0
    );
    println!(
        "  width {:.0}px  height {:.0}px  jaw {:.0}px  forehead {:.0}px  \
         cheeks {:.0}px  eyes {:.0}px",
        g.face_width,
        g.face_height,
        g.jaw_width,
        g.forehead_width,
        g.cheek_width,
        g.eye_distance
    );
    for line in analysis.characteristics.iter().chain(&analysis.recommendations) {
        println!("  - {line}");
    }

    println!("\nRecommendations ({} scoring):", session.scorer_name());
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{:>2}. {:<24} {:<10} {:>3.0}%  [{:?}]",
            i + 1,
            rec.frame.name,
            rec.frame.brand,
            rec.match_score * 100.0,
            rec.priority
        );
        for reason in &rec.reasons {
            println!("      {reason}");
        }
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.frames())?);
        return Ok(());
    }

    for frame in catalog.frames() {
        let suits: Vec<&str> = frame.suitable_for.iter().map(|s| s.as_str()).collect();
        let mut tags = Vec::new();
        if frame.bestseller {
            tags.push("bestseller");
        }
        if frame.new {
            tags.push("new");
        }
        println!(
            "{:>3}  {:<24} {:<10} {:?}/{:?}  {:.0}mm  ${:.2}  suits {}  {}",
            frame.id,
            frame.name,
            frame.brand,
            frame.category,
            frame.shape,
            frame.width,
            frame.price,
            suits.join(", "),
            tags.join(" ")
        );
    }
    Ok(())
}
