use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use gpx::{Gpx, Waypoint};

use crate::models::GeoPoint;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open GPX file {path:?}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}

/// Every track point of every track segment, in document order. Documents
/// without tracks fall back to their route points.
pub fn read_points(reader: impl Read) -> Result<Vec<GeoPoint>, ImportError> {
    let gpx = gpx::read(BufReader::new(reader))?;
    Ok(points_from_gpx(&gpx))
}

pub fn read_points_from_path(path: impl AsRef<Path>) -> Result<Vec<GeoPoint>, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Io {
        source,
        path: path.into(),
    })?;
    read_points(file)
}

pub fn points_from_gpx(gpx: &Gpx) -> Vec<GeoPoint> {
    let track_points: Vec<GeoPoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .map(to_geo_point)
        .collect();

    if !track_points.is_empty() {
        return track_points;
    }

    gpx.routes
        .iter()
        .flat_map(|route| &route.points)
        .map(to_geo_point)
        .collect()
}

/// Expands directories into the `.gpx` files they directly contain (sorted by
/// name); plain file paths are kept as given.
pub fn collect_gpx_files(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_gpx(path))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn is_gpx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"))
}

fn to_geo_point(waypoint: &Waypoint) -> GeoPoint {
    let point: geo_types::Point<f64> = waypoint.point();
    GeoPoint::new(point.y(), point.x(), waypoint.elevation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Loop</name>
    <trkseg>
      <trkpt lat="52.3813" lon="-1.5616"><ele>80.0</ele></trkpt>
      <trkpt lat="52.3820" lon="-1.5600"><ele>82.5</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="52.3830" lon="-1.5590"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    const ROUTE_ONLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <rte>
    <rtept lat="52.2922" lon="-1.5354"><ele>60</ele></rtept>
    <rtept lat="52.3000" lon="-1.5400"><ele>65</ele></rtept>
  </rte>
</gpx>"#;

    #[test]
    fn flattens_segments_in_order() {
        let points = read_points(TRACK.as_bytes()).expect("valid gpx");
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], GeoPoint::new(52.3813, -1.5616, Some(80.0)));
        assert_eq!(points[1].elevation, Some(82.5));
        assert_eq!(points[2].elevation, None);
    }

    #[test]
    fn falls_back_to_route_points() {
        let points = read_points(ROUTE_ONLY.as_bytes()).expect("valid gpx");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].lat, 52.2922);
        assert_eq!(points[1].elevation, Some(65.0));
    }

    #[test]
    fn collects_gpx_files_from_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.gpx", "a.GPX", "notes.txt"] {
            std::fs::write(dir.path().join(name), TRACK).expect("write");
        }
        let extra = PathBuf::from("explicit.gpx");
        let files = collect_gpx_files(&[dir.path().to_path_buf(), extra.clone()]).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.GPX"), dir.path().join("b.gpx"), extra]
        );
    }

    #[test]
    fn reads_points_from_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("loop.gpx");
        std::fs::write(&path, TRACK).expect("write");
        assert_eq!(read_points_from_path(&path).unwrap().len(), 3);
        assert!(matches!(
            read_points_from_path(dir.path().join("missing.gpx")),
            Err(ImportError::Io { .. })
        ));
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = read_points("<gpx><trk>".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Gpx(_)));
    }
}
