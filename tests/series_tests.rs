//! Variable resolution, CF decoding and temperature conversion

mod common;

use cmip_vis::{
    constants::CELSIUS_UNITS,
    errors::{CmipVisError, Result},
    series::{load_series, read_spatial_series, resolve_variable, TimeSeries},
    time::CalendarDate,
};
use common::{write_daily_grid, write_tas_file, GridVariable};
use ndarray::Array3;
use netcdf::{create, open};
use tempfile::tempdir;

#[test]
fn test_alias_resolution_matches_direct_lookup() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("historical_tas.nc");
    write_tas_file(&path, 1, 2000, 0.0)?;

    let direct = load_series(&path, "tas")?;
    let aliased = load_series(&path, "near_surface_air_temperature")?;

    assert_eq!(direct.values, aliased.values);
    assert_eq!(direct.times, aliased.times);
    assert_eq!(direct.units, aliased.units);
    Ok(())
}

#[test]
fn test_kelvin_converted_once() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("historical_tas.nc");
    write_tas_file(&path, 1, 2000, 0.0)?;

    let mut series = load_series(&path, "near_surface_air_temperature")?;
    assert_eq!(series.units.as_deref(), Some(CELSIUS_UNITS));
    // January: 281 K on every cell once the offsets cancel
    assert!((series.values[0] - (281.0 - 273.15)).abs() < 1e-9);

    let before = series.values.clone();
    assert!(!series.convert_kelvin_to_celsius());
    assert_eq!(series.values, before);
    assert_eq!(series.units.as_deref(), Some(CELSIUS_UNITS));
    Ok(())
}

#[test]
fn test_convert_kelvin_to_celsius_in_memory() {
    let mut series = TimeSeries::new(
        "tas",
        Some("K".to_string()),
        vec![CalendarDate::new(2000, 1, 1), CalendarDate::new(2000, 1, 2)],
        vec![273.15, 283.15],
    );

    assert!(series.convert_kelvin_to_celsius());
    assert!(series.values[0].abs() < 1e-12);
    assert!((series.values[1] - 10.0).abs() < 1e-12);
    assert!(!series.convert_kelvin_to_celsius());

    let mut celsius = TimeSeries::new("tas", Some("degC".to_string()), vec![], vec![]);
    assert!(!celsius.convert_kelvin_to_celsius());
}

#[test]
fn test_non_temperature_keeps_units() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("historical_pr.nc");
    let value = |_d: usize| 2.0_f32;
    write_daily_grid(
        &path,
        30,
        "days since 2000-01-01",
        "noleap",
        &[GridVariable {
            name: "pr",
            units: "kg m-2 s-1",
            value: &value,
        }],
    )?;

    let series = load_series(&path, "total_precipitation")?;
    assert_eq!(series.name, "pr");
    assert_eq!(series.units.as_deref(), Some("kg m-2 s-1"));
    assert!(series.values.iter().all(|v| (v - 2.0).abs() < 1e-9));
    Ok(())
}

#[test]
fn test_single_data_variable_fallback() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("historical_other.nc");
    let value = |_d: usize| 5.0_f32;
    write_daily_grid(
        &path,
        10,
        "days since 2000-01-01",
        "standard",
        &[GridVariable {
            name: "sfcWindmax",
            units: "m s-1",
            value: &value,
        }],
    )?;

    let file = open(&path)?;
    assert_eq!(resolve_variable(&file, "near_surface_wind_speed", "x.nc")?, "sfcWindmax");
    Ok(())
}

#[test]
fn test_variable_not_found_lists_alternatives() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("two_vars.nc");
    let a = |_d: usize| 1.0_f32;
    let b = |_d: usize| 2.0_f32;
    write_daily_grid(
        &path,
        5,
        "days since 2000-01-01",
        "noleap",
        &[
            GridVariable {
                name: "huss",
                units: "1",
                value: &a,
            },
            GridVariable {
                name: "psl",
                units: "Pa",
                value: &b,
            },
        ],
    )?;

    match load_series(&path, "tas") {
        Err(CmipVisError::VariableNotFound {
            var,
            file,
            available,
        }) => {
            assert_eq!(var, "tas");
            assert_eq!(file, "two_vars.nc");
            assert!(available.contains(&"huss".to_string()));
            assert!(available.contains(&"psl".to_string()));
            assert!(!available.contains(&"time".to_string()));
        }
        other => panic!("Expected VariableNotFound error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_fill_values_scale_and_unsorted_time() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("packed.nc");

    {
        let mut file = create(&path)?;
        file.add_dimension("time", 3)?;
        file.add_dimension("lat", 1)?;
        file.add_dimension("lon", 2)?;
        {
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_attribute("units", "hours since 2001-03-01 00:00:00")?;
            time.put_attribute("calendar", "proleptic_gregorian")?;
            // Stored out of order
            time.put(ndarray::Array1::from_vec(vec![48.0, 0.0, 24.0]).view(), ..)?;
        }
        let mut var = file.add_variable::<f32>("sfcWind", &["time", "lat", "lon"])?;
        var.put_attribute("_FillValue", -999.0f32)?;
        var.put_attribute("scale_factor", 0.5f32)?;
        var.put_attribute("add_offset", 1.0f32)?;
        var.put_attribute("units", "m s-1")?;
        let data = Array3::from_shape_vec((3, 1, 2), vec![10.0, -999.0, 2.0, 4.0, -999.0, -999.0])?;
        var.put(data.view(), ..)?;
    }

    let file = open(&path)?;
    let series = read_spatial_series(&file, "sfcWind")?;
    assert_eq!(
        series.times,
        vec![
            CalendarDate::new(2001, 3, 1),
            CalendarDate::new(2001, 3, 2),
            CalendarDate::new(2001, 3, 3),
        ]
    );
    // t=0h: mean(2, 3) decoded; t=24h: all missing; t=48h: 10 decoded alone
    assert!((series.values[0] - 2.5).abs() < 1e-9);
    assert!(series.values[1].is_nan());
    assert!((series.values[2] - 6.0).abs() < 1e-9);
    Ok(())
}
