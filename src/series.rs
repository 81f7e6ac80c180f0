//! Variable resolution, CF decoding and spatial reduction to time series

use crate::constants::{
    aliases_for, is_temperature, CELSIUS_UNITS, KELVIN_OFFSET, LATITUDE_DIMS, LONGITUDE_DIMS,
    TIME_DIMS,
};
use crate::dataset::{with_dataset, OpenedDataset};
use crate::errors::{CmipVisError, Result};
use crate::metadata::{data_variable_names, dimension_names, numeric_attribute, string_attribute};
use crate::time::{CalendarDate, TimeAxis};
use ndarray::{ArrayD, Axis};
use netcdf::{File, Variable};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// A spatially averaged series for one (experiment, variable)
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    pub units: Option<String>,
    pub times: Vec<CalendarDate>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// `times` and `values` must have the same length.
    pub fn new(
        name: impl Into<String>,
        units: Option<String>,
        times: Vec<CalendarDate>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self {
            name: name.into(),
            units,
            times,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (CalendarDate, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Convert Kelvin-like values to Celsius and rewrite the units.
    ///
    /// Returns whether a conversion happened; a converted series reports
    /// `degC` and is left alone on the next call.
    pub fn convert_kelvin_to_celsius(&mut self) -> bool {
        let kelvin = self.units.as_deref().map(is_kelvin_like).unwrap_or(false);
        if !kelvin {
            return false;
        }
        for v in &mut self.values {
            *v -= KELVIN_OFFSET;
        }
        self.units = Some(CELSIUS_UNITS.to_string());
        true
    }
}

/// Unit strings that denote an absolute temperature scale
pub fn is_kelvin_like(units: &str) -> bool {
    let units = units.trim().to_lowercase();
    units.contains('k') || units == "kelvin"
}

/// Picks the variable to read for `requested`: the literal name, then its
/// aliases, then the only data variable of the file.
pub fn resolve_variable(file: &File, requested: &str, file_label: &str) -> Result<String> {
    if file.variable(requested).is_some() {
        return Ok(requested.to_string());
    }

    if let Some(alias) = aliases_for(requested)
        .iter()
        .find(|alias| file.variable(alias).is_some())
    {
        debug!(requested, alias, "Resolved variable through alias");
        return Ok((*alias).to_string());
    }

    let data_vars = data_variable_names(file);
    if let [only] = data_vars.as_slice() {
        debug!(requested, fallback = %only, "Using the only data variable in file");
        return Ok(only.clone());
    }

    Err(CmipVisError::VariableNotFound {
        var: requested.to_string(),
        file: file_label.to_string(),
        available: data_vars,
    })
}

/// Reads a variable as f64 with `_FillValue`/`missing_value` masked to NaN
/// and `scale_factor`/`add_offset` applied.
pub fn read_decoded(var: &Variable) -> Result<ArrayD<f64>> {
    let shape: Vec<usize> = var
        .dimensions()
        .iter()
        .map(netcdf::Dimension::len)
        .collect();
    let raw = var.get_values::<f64, _>(..)?;

    let fill = numeric_attribute(var, "_FillValue");
    let missing = numeric_attribute(var, "missing_value");
    let scale = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    let decoded: Vec<f64> = raw
        .into_iter()
        .map(|v| {
            if !v.is_finite() || Some(v) == fill || Some(v) == missing {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    Ok(ArrayD::from_shape_vec(shape, decoded)?)
}

/// Mean of the finite values, NaN when there are none
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Averages `data` over its latitude/longitude axes, one value per step of
/// the time axis. Returns the reduced values and the time dimension name.
pub fn spatial_mean(data: &ArrayD<f64>, dims: &[String], var_name: &str) -> Result<(Vec<f64>, String)> {
    let find = |candidates: &[&str]| {
        candidates
            .iter()
            .find_map(|c| dims.iter().position(|d| d == c))
    };
    let lat_axis = find(LATITUDE_DIMS);
    let lon_axis = find(LONGITUDE_DIMS);
    let time_axis = find(TIME_DIMS).ok_or_else(|| CmipVisError::DimensionNotFound {
        var: var_name.to_string(),
        dim: "time".to_string(),
    })?;

    let leftover = dims.iter().enumerate().any(|(axis, _)| {
        axis != time_axis
            && Some(axis) != lat_axis
            && Some(axis) != lon_axis
            && data.shape()[axis] > 1
    });
    if leftover {
        return Err(CmipVisError::UnsupportedShape {
            var: var_name.to_string(),
            dims: dims.to_vec(),
        });
    }

    let steps = data.shape()[time_axis];
    let values: Vec<f64> = (0..steps)
        .into_par_iter()
        .map(|t| nan_mean(data.index_axis(Axis(time_axis), t).iter().copied()))
        .collect();

    Ok((values, dims[time_axis].clone()))
}

/// Reads `var_name`, averages it spatially and decodes its time axis.
/// The result is sorted by time.
pub fn read_spatial_series(file: &File, var_name: &str) -> Result<TimeSeries> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| CmipVisError::VariableNotFound {
            var: var_name.to_string(),
            file: String::new(),
            available: data_variable_names(file),
        })?;

    let dims = dimension_names(&var);
    let data = read_decoded(&var)?;
    let (values, time_dim) = spatial_mean(&data, &dims, var_name)?;

    let time_var = file
        .variable(&time_dim)
        .ok_or_else(|| CmipVisError::VariableNotFound {
            var: time_dim.clone(),
            file: String::new(),
            available: Vec::new(),
        })?;
    let raw_times = time_var.get_values::<f64, _>(..)?;
    let axis = TimeAxis::from_variable(&time_var)?;

    let mut order: Vec<usize> = (0..raw_times.len()).collect();
    order.sort_by(|&a, &b| raw_times[a].total_cmp(&raw_times[b]));

    let mut times = Vec::with_capacity(order.len());
    let mut sorted_values = Vec::with_capacity(order.len());
    for i in order {
        times.push(axis.decode(raw_times[i])?);
        sorted_values.push(values[i]);
    }

    Ok(TimeSeries::new(
        var_name,
        string_attribute(&var, "units"),
        times,
        sorted_values,
    ))
}

/// Resolves `requested` in an open dataset and returns its spatial mean
/// series, in Celsius for temperature variables stored in Kelvin.
pub fn load_series_from(dataset: &OpenedDataset, requested: &str) -> Result<TimeSeries> {
    let file = dataset.file();
    let resolved = resolve_variable(file, requested, &dataset.display_name())?;
    let mut series = read_spatial_series(file, &resolved)?;

    if (is_temperature(requested) || is_temperature(&resolved)) && series.convert_kelvin_to_celsius()
    {
        debug!(variable = %resolved, "Converted Kelvin to Celsius");
    }

    info!(
        file = %dataset.display_name(),
        variable = %resolved,
        steps = series.len(),
        "Loaded series"
    );
    Ok(series)
}

/// Opens `path` (zipped or not) and loads the series for `variable`.
pub fn load_series(path: &Path, variable: &str) -> Result<TimeSeries> {
    with_dataset(path, |dataset| load_series_from(dataset, variable))
}
