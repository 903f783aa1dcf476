use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use analysis::{
    analyze_catalog,
    dem::ArcAsciiDem,
    elevation::ElevationLookup,
    gpx_import::{collect_gpx_files, read_points_from_path},
    models::{Anchor, PointOfInterest},
    AnalysisContext, EngineConfig, Method, RouteInput,
};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Summarize GPX routes: distance, elevation gain, difficulty, start and nearby POIs"
)]
struct Args {
    /// GPX files, or directories whose .gpx files should all be analyzed
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON engine configuration; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Elevation method overriding the configured one
    /// (raw_positive_delta, distance_smooth_threshold, moving_average_threshold, adaptive_blend)
    #[arg(long)]
    method: Option<Method>,

    /// JSON array of `{name, lat, lon}` start anchors
    #[arg(long)]
    anchors: Option<PathBuf>,

    /// JSON array of points of interest
    #[arg(long)]
    pois: Option<PathBuf>,

    /// ESRI ASCII grid used instead of the elevations recorded in the GPX files
    #[arg(long)]
    dem: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

fn default_anchors() -> Vec<Anchor> {
    vec![
        Anchor::new("Campus", 52.3813, -1.5616),
        Anchor::new("Leamington", 52.2922, -1.5354),
    ]
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|err| format!("failed to open {}: {err}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
    Ok(value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analysis=info,route_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config: EngineConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };
    if let Some(method) = args.method {
        config.method = method;
    }
    config.validate()?;

    let anchors = match &args.anchors {
        Some(path) => read_json(path)?,
        None => default_anchors(),
    };
    let pois: Vec<PointOfInterest> = match &args.pois {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let dem = args.dem.as_deref().map(ArcAsciiDem::from_path).transpose()?;

    let mut routes = Vec::new();
    for path in collect_gpx_files(&args.inputs)? {
        match read_points_from_path(&path) {
            Ok(points) => routes.push(RouteInput {
                id: route_id(&path),
                name: None,
                points,
            }),
            Err(err) => tracing::warn!("skipping {}: {err}", path.display()),
        }
    }
    tracing::info!(
        "analyzing {} routes with {} (anchors={}, pois={})",
        routes.len(),
        config.method,
        anchors.len(),
        pois.len()
    );

    let ctx = AnalysisContext {
        config: &config,
        anchors: &anchors,
        pois: &pois,
        lookup: dem.as_ref().map(|dem| dem as &dyn ElevationLookup),
    };
    let summaries: Vec<_> = analyze_catalog(&routes, &ctx)
        .into_iter()
        .filter_map(|outcome| outcome.result.ok())
        .collect();

    let output = if args.pretty {
        serde_json::to_string_pretty(&summaries)?
    } else {
        serde_json::to_string(&summaries)?
    };
    println!("{output}");

    Ok(())
}

fn route_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
