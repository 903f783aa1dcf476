//! Distance, elevation gain, difficulty, start location and nearby points of
//! interest for recorded outdoor routes.
//!
//! The engine modules (`geo`, `smoothing`, `threshold`, `elevation`,
//! `proximity`, `location`, `difficulty`) are pure functions over in-memory
//! points. `gpx_import`, `dem` and `catalog` sit around them for the
//! command-line tools.

pub mod catalog;
pub mod config;
pub mod dem;
pub mod difficulty;
pub mod elevation;
pub mod error;
pub mod geo;
pub mod gpx_import;
pub mod location;
pub mod models;
pub mod proximity;
pub mod smoothing;
pub mod threshold;

pub use catalog::{analyze_catalog, analyze_route, AnalysisContext, RouteInput, RouteOutcome};
pub use config::EngineConfig;
pub use elevation::{ElevationLookup, Method, RouteMetrics};
pub use error::EngineError;
