//! Synthetic NetCDF inputs shared by the integration tests

#![allow(dead_code)]

use cmip_vis::errors::Result;
use ndarray::{Array1, Array3};
use netcdf::create;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const NOLEAP_MONTH_DAYS: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Spatial offsets of the 2x2 grid; they average to zero
const CELL_OFFSETS: [[f32; 2]; 2] = [[1.0, -1.0], [0.5, -0.5]];

/// Calendar month (1..=12) of a day index in a `noleap` calendar starting on 1 January
pub fn noleap_month(day: usize) -> u32 {
    let mut remaining = day % 365;
    for (i, len) in NOLEAP_MONTH_DAYS.iter().enumerate() {
        if remaining < *len {
            return i as u32 + 1;
        }
        remaining -= len;
    }
    12
}

/// Kelvin temperature that only depends on the calendar month
pub fn monthly_kelvin(day: usize) -> f32 {
    280.0 + noleap_month(day) as f32
}

pub struct GridVariable<'a> {
    pub name: &'a str,
    pub units: &'a str,
    pub value: &'a dyn Fn(usize) -> f32,
}

/// Writes a `time x lat x lon` file with daily steps. Each cell holds the
/// daily value plus a fixed offset, so the spatial mean is the daily value.
pub fn write_daily_grid(
    path: &Path,
    days: usize,
    time_units: &str,
    calendar: &str,
    variables: &[GridVariable],
) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("time", days)?;
    file.add_dimension("lat", 2)?;
    file.add_dimension("lon", 2)?;

    {
        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", time_units)?;
        time.put_attribute("calendar", calendar)?;
        let steps = Array1::from_vec((0..days).map(|d| d as f64).collect());
        time.put(steps.view(), ..)?;
    }
    for (name, units, values) in [
        ("lat", "degrees_north", vec![-10.0, -5.0]),
        ("lon", "degrees_east", vec![-60.0, -55.0]),
    ] {
        let mut coord = file.add_variable::<f64>(name, &[name])?;
        coord.put_attribute("units", units)?;
        coord.put(Array1::from_vec(values).view(), ..)?;
    }

    for variable in variables {
        let data = Array3::from_shape_fn((days, 2, 2), |(d, y, x)| {
            (variable.value)(d) + CELL_OFFSETS[y][x]
        });
        let mut var = file.add_variable::<f32>(variable.name, &["time", "lat", "lon"])?;
        var.put_attribute("units", variable.units)?;
        var.put(data.view(), ..)?;
    }
    Ok(())
}

/// `years` of daily Kelvin `tas` on a noleap calendar, every year identical
pub fn write_tas_file(path: &Path, years: usize, reference_year: i32, shift: f32) -> Result<()> {
    let value = move |d: usize| monthly_kelvin(d) + shift;
    write_daily_grid(
        path,
        years * 365,
        &format!("days since {reference_year}-01-01 00:00:00"),
        "noleap",
        &[GridVariable {
            name: "tas",
            units: "K",
            value: &value,
        }],
    )
}

/// Stores `source` as the single member `member` of a new zip archive
pub fn zip_single(source: &Path, archive: &Path, member: &str) -> Result<()> {
    let bytes = std::fs::read(source)?;
    let mut writer = ZipWriter::new(File::create(archive)?);
    writer.start_file(member, FileOptions::default())?;
    writer.write_all(&bytes)?;
    writer.finish()?;
    Ok(())
}
