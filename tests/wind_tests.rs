mod common;

use cmip_vis::{
    errors::Result,
    wind::{direction_from_components, load_wind_direction, rose_histogram, DIRECTION_UNITS},
};
use common::{write_daily_grid, write_tas_file, GridVariable};
use tempfile::tempdir;

#[test]
fn test_direction_formula() {
    // Meteorological convention: the direction the wind comes from
    assert!((direction_from_components(0.0, -1.0) - 0.0).abs() < 1e-9);
    assert!((direction_from_components(-1.0, 0.0) - 90.0).abs() < 1e-9);
    assert!((direction_from_components(0.0, 1.0) - 180.0).abs() < 1e-9);
    assert!((direction_from_components(1.0, 0.0) - 270.0).abs() < 1e-9);
    assert!((direction_from_components(-1.0, -1.0) - 45.0).abs() < 1e-9);
}

#[test]
fn test_rose_histogram() {
    let directions = [0.0, 10.0, 359.0, 90.0, f64::NAN, 180.0];
    let freq = rose_histogram(&directions, 16);

    assert_eq!(freq.len(), 16);
    assert!((freq.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    // 0 and 10 in the first sector, 359 in the last
    assert!((freq[0] - 40.0).abs() < 1e-9);
    assert!((freq[15] - 20.0).abs() < 1e-9);
    assert!((freq[4] - 20.0).abs() < 1e-9);
    assert!((freq[8] - 20.0).abs() < 1e-9);

    assert!(rose_histogram(&[f64::NAN], 16).is_empty());
    assert!(rose_histogram(&[], 16).is_empty());
}

#[test]
fn test_load_wind_direction_from_components() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("historical_wind.nc");
    let speed = |d: usize| 3.0 + (d % 7) as f32;
    let u = |_d: usize| -2.0_f32;
    let v = |_d: usize| 0.0_f32;
    write_daily_grid(
        &path,
        20,
        "days since 2000-01-01",
        "noleap",
        &[
            GridVariable {
                name: "sfcWind",
                units: "m s-1",
                value: &speed,
            },
            GridVariable {
                name: "uas",
                units: "m s-1",
                value: &u,
            },
            GridVariable {
                name: "vas",
                units: "m s-1",
                value: &v,
            },
        ],
    )?;

    let direction = load_wind_direction(&path)?.expect("both components present");
    assert_eq!(direction.len(), 20);
    assert_eq!(direction.units.as_deref(), Some(DIRECTION_UNITS));
    assert!(direction.values.iter().all(|d| (d - 90.0).abs() < 1e-6));
    Ok(())
}

#[test]
fn test_missing_components_yield_none() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("historical_tas.nc");
    write_tas_file(&path, 1, 2000, 0.0)?;

    assert!(load_wind_direction(&path)?.is_none());
    Ok(())
}
