use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use analysis::{
    dem::ArcAsciiDem,
    elevation::{gain_by_method, resolve_elevations},
    gpx_import::{collect_gpx_files, read_points_from_path},
    EngineConfig, Method,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Print the elevation gain of every method for each GPX route"
)]
struct Args {
    /// GPX files, or directories whose .gpx files should all be compared
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON engine configuration; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON object mapping GPX file names (or stems) to a reference gain in meters
    #[arg(long)]
    reference: Option<PathBuf>,

    /// ESRI ASCII grid used instead of the elevations recorded in the GPX files
    #[arg(long)]
    dem: Option<PathBuf>,
}

#[derive(Default)]
struct Totals {
    routes: usize,
    reference_m: f64,
    gain_m: HashMap<Method, f64>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|err| format!("failed to open {}: {err}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
    Ok(value)
}

fn reference_for(references: &HashMap<String, f64>, path: &Path) -> Option<f64> {
    let by_name = path
        .file_name()
        .and_then(|name| references.get(name.to_string_lossy().as_ref()));
    let by_stem = || {
        path.file_stem()
            .and_then(|stem| references.get(stem.to_string_lossy().as_ref()))
    };
    by_name.or_else(by_stem).copied()
}

fn with_deviation(gain: f64, reference: Option<f64>) -> String {
    match reference {
        Some(reference) if reference != 0.0 => {
            format!("{gain:.0} ({:+.1}%)", (gain - reference) / reference * 100.0)
        }
        _ => format!("{gain:.0}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config: EngineConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    let references: HashMap<String, f64> = match &args.reference {
        Some(path) => read_json(path)?,
        None => HashMap::new(),
    };
    let dem = args.dem.as_deref().map(ArcAsciiDem::from_path).transpose()?;

    let files = collect_gpx_files(&args.inputs)?;
    tracing::info!("comparing {} methods on {} files", Method::ALL.len(), files.len());

    let mut totals = Totals::default();
    for path in &files {
        let route = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let points = match read_points_from_path(path) {
            Ok(points) => points,
            Err(err) => {
                println!("{route:<30} ERROR: {err}");
                continue;
            }
        };
        let points = match &dem {
            Some(dem) => resolve_elevations(&points, dem),
            None => points,
        };

        let gains = gain_by_method(&points, &config)?;
        let reference = reference_for(&references, path);

        let columns: Vec<String> = gains
            .iter()
            .map(|(method, gain)| format!("{method}: {}", with_deviation(*gain, reference)))
            .collect();
        let reference_display = reference.map_or_else(|| "N/A".to_string(), |r| format!("{r:.0}"));
        println!("{route:<30} {reference_display:<10} {}", columns.join("  "));

        if let Some(reference) = reference {
            totals.routes += 1;
            totals.reference_m += reference;
            for (method, gain) in gains {
                *totals.gain_m.entry(method).or_default() += gain;
            }
        }
    }

    if totals.routes == 0 {
        if !references.is_empty() {
            println!("\nNo routes matched a reference gain.");
        }
        return Ok(());
    }

    let count = totals.routes as f64;
    let average_reference = totals.reference_m / count;
    println!("{}", "-".repeat(80));
    println!("{:<30} {average_reference:<10.0}", "AVERAGES:");
    for method in Method::ALL {
        let average = totals.gain_m.get(&method).copied().unwrap_or_default() / count;
        println!(
            "  {method:<28} {}",
            with_deviation(average, Some(average_reference))
        );
    }

    Ok(())
}
