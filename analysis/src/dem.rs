use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::elevation::ElevationLookup;

#[derive(Debug, Error)]
pub enum DemLoadError {
    #[error("failed to open DEM file {path:?}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to read DEM data: {0}")]
    Read(#[from] std::io::Error),
    #[error("DEM file missing header field `{0}`")]
    MissingHeader(&'static str),
    #[error("DEM file has invalid numeric header for `{field}`: {source}")]
    InvalidHeader {
        field: &'static str,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("DEM file has invalid integer header for `{field}`: {source}")]
    InvalidHeaderInt {
        field: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("DEM file has an invalid cell value: {0}")]
    InvalidCell(#[source] std::num::ParseFloatError),
    #[error("DEM grid must be at least 1x1 with a positive cell size")]
    EmptyGrid,
    #[error("DEM grid has {expected} cells but file provided {actual}")]
    UnexpectedCellCount { expected: usize, actual: usize },
}

/// ESRI ASCII elevation grid in geographic coordinates: `xllcorner` is a
/// longitude, `yllcorner` a latitude and `cellsize` is in degrees (SRTM
/// style). Row 0 is the northernmost row.
#[derive(Debug, Clone)]
pub struct ArcAsciiDem {
    ncols: usize,
    nrows: usize,
    xllcorner: f64,
    yllcorner: f64,
    cellsize: f64,
    nodata: f64,
    lat_max: f64,
    lon_max: f64,
    values: Vec<f64>,
}

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xllcorner: Option<f64>,
    yllcorner: Option<f64>,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

impl ArcAsciiDem {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DemLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DemLoadError::Io {
            source,
            path: path.into(),
        })?;
        let dem = Self::from_reader(file)?;
        tracing::info!(
            "loaded DEM grid {}x{} from {}",
            dem.ncols,
            dem.nrows,
            path.display()
        );
        Ok(dem)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, DemLoadError> {
        let mut reader = BufReader::new(reader);
        let mut header = Header::default();
        let mut line = String::new();

        for _ in 0..6 {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };

            match key.to_lowercase().as_str() {
                "ncols" => header.ncols = Some(parse_int("ncols", value)?),
                "nrows" => header.nrows = Some(parse_int("nrows", value)?),
                "xllcorner" | "xllcenter" => {
                    header.xllcorner = Some(parse_float("xllcorner", value)?);
                }
                "yllcorner" | "yllcenter" => {
                    header.yllcorner = Some(parse_float("yllcorner", value)?);
                }
                "cellsize" => header.cellsize = Some(parse_float("cellsize", value)?),
                "nodata_value" => header.nodata = Some(parse_float("nodata_value", value)?),
                _ => {}
            }
        }

        let ncols = header.ncols.ok_or(DemLoadError::MissingHeader("ncols"))?;
        let nrows = header.nrows.ok_or(DemLoadError::MissingHeader("nrows"))?;
        let xllcorner = header.xllcorner.ok_or(DemLoadError::MissingHeader("xllcorner"))?;
        let yllcorner = header.yllcorner.ok_or(DemLoadError::MissingHeader("yllcorner"))?;
        let cellsize = header.cellsize.ok_or(DemLoadError::MissingHeader("cellsize"))?;
        let nodata = header.nodata.unwrap_or(-9999.0);

        if ncols == 0 || nrows == 0 || !(cellsize > 0.0) {
            return Err(DemLoadError::EmptyGrid);
        }

        let lat_max = yllcorner + cellsize * ((nrows - 1) as f64);
        let lon_max = xllcorner + cellsize * ((ncols - 1) as f64);

        let mut values = Vec::with_capacity(ncols * nrows);
        for line in reader.lines() {
            let line = line?;
            for token in line.split_whitespace() {
                values.push(token.parse::<f64>().map_err(DemLoadError::InvalidCell)?);
            }
        }

        let expected = ncols * nrows;
        if values.len() != expected {
            return Err(DemLoadError::UnexpectedCellCount {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            ncols,
            nrows,
            xllcorner,
            yllcorner,
            cellsize,
            nodata,
            lat_max,
            lon_max,
            values,
        })
    }

    /// Bilinear interpolation between the four cells around `(lat, lon)`.
    ///
    /// Nodata corners drop out and the remaining corner weights are
    /// renormalized, so a point next to a hole still gets a value. `None`
    /// outside the grid or when every weighted corner is nodata.
    pub fn sample(&self, lat: f64, lon: f64) -> Option<f64> {
        let (row, col) = self.grid_position(lat, lon)?;

        let (top, left) = (row.floor() as usize, col.floor() as usize);
        let bottom = (top + 1).min(self.nrows - 1);
        let right = (left + 1).min(self.ncols - 1);
        let (fy, fx) = (row.fract(), col.fract());

        let corners = [
            (top, left, (1.0 - fy) * (1.0 - fx)),
            (top, right, (1.0 - fy) * fx),
            (bottom, left, fy * (1.0 - fx)),
            (bottom, right, fy * fx),
        ];

        let (weighted, weight) = corners
            .iter()
            .filter(|(_, _, w)| *w > 0.0)
            .filter_map(|&(r, c, w)| self.value(r, c).map(|v| (v * w, w)))
            .fold((0.0, 0.0), |(sum, total), (v, w)| (sum + v, total + w));

        (weight > 0.0).then(|| weighted / weight)
    }

    /// Fractional `(row, col)` of a coordinate, row 0 being the northern edge.
    fn grid_position(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let inside = (self.yllcorner..=self.lat_max).contains(&lat)
            && (self.xllcorner..=self.lon_max).contains(&lon);
        if !inside {
            return None;
        }
        let row = ((self.lat_max - lat) / self.cellsize).clamp(0.0, (self.nrows - 1) as f64);
        let col = ((lon - self.xllcorner) / self.cellsize).clamp(0.0, (self.ncols - 1) as f64);
        Some((row, col))
    }

    fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        let value = self.values.get(row * self.ncols + col).copied()?;
        if (value - self.nodata).abs() < f64::EPSILON {
            None
        } else {
            Some(value)
        }
    }
}

impl ElevationLookup for ArcAsciiDem {
    fn elevation(&self, lat: f64, lon: f64) -> Option<f64> {
        self.sample(lat, lon)
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<usize, DemLoadError> {
    value
        .parse()
        .map_err(|source| DemLoadError::InvalidHeaderInt { field, source })
}

fn parse_float(field: &'static str, value: &str) -> Result<f64, DemLoadError> {
    value
        .parse()
        .map_err(|source| DemLoadError::InvalidHeader { field, source })
}
