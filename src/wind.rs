//! Wind direction from velocity components and wind-rose binning

use crate::constants::{WIND_U_ALIASES, WIND_V_ALIASES};
use crate::dataset::with_dataset;
use crate::errors::Result;
use crate::series::{read_spatial_series, TimeSeries};
use netcdf::File;
use std::path::Path;
use tracing::debug;

pub const DIRECTION_UNITS: &str = "degrees_from_north";

/// Meteorological direction (where the wind blows from), degrees clockwise from north
pub fn direction_from_components(u: f64, v: f64) -> f64 {
    ((-u).atan2(-v).to_degrees() + 360.0) % 360.0
}

fn first_present<'a>(file: &File, aliases: &[&'a str]) -> Option<&'a str> {
    aliases
        .iter()
        .copied()
        .find(|name| file.variable(name).is_some())
}

/// Direction series from the eastward/northward components of an open file,
/// `None` when either component is missing.
pub fn wind_direction_from(file: &File) -> Result<Option<TimeSeries>> {
    let (Some(u_name), Some(v_name)) = (
        first_present(file, WIND_U_ALIASES),
        first_present(file, WIND_V_ALIASES),
    ) else {
        return Ok(None);
    };
    debug!(u = u_name, v = v_name, "Found wind components");

    let u = read_spatial_series(file, u_name)?;
    let v = read_spatial_series(file, v_name)?;
    let values = u
        .values
        .iter()
        .zip(&v.values)
        .map(|(&u, &v)| direction_from_components(u, v))
        .collect();

    Ok(Some(TimeSeries::new(
        "wind_direction",
        Some(DIRECTION_UNITS.to_string()),
        u.times,
        values,
    )))
}

/// Opens `path` and derives its wind direction series.
pub fn load_wind_direction(path: &Path) -> Result<Option<TimeSeries>> {
    with_dataset(path, |dataset| wind_direction_from(dataset.file()))
}

/// Percentage of finite directions falling in each of `sectors` equal
/// sectors, the first starting at north. Empty when there are no finite values.
pub fn rose_histogram(directions: &[f64], sectors: usize) -> Vec<f64> {
    if sectors == 0 {
        return Vec::new();
    }
    let width = 360.0 / sectors as f64;
    let mut counts = vec![0usize; sectors];
    let mut total = 0usize;

    for d in directions.iter().filter(|d| d.is_finite()) {
        let sector = ((d.rem_euclid(360.0) / width) as usize).min(sectors - 1);
        counts[sector] += 1;
        total += 1;
    }

    if total == 0 {
        return Vec::new();
    }
    counts
        .into_iter()
        .map(|c| c as f64 / total as f64 * 100.0)
        .collect()
}
