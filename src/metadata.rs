//! NetCDF metadata inspection
//!
//! Attribute helpers used by the loaders, the data-variable listing used for
//! variable resolution, and the `--list-vars` report.

use crate::errors::Result;
use netcdf::{AttributeValue, File, Variable};
use std::collections::HashSet;

/// Reads a string attribute, `None` if absent or not textual.
pub fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(ss) => ss.into_iter().next(),
        _ => None,
    }
}

/// Reads a numeric attribute as f64. Array attributes yield their first element.
pub fn numeric_attribute(var: &Variable, name: &str) -> Option<f64> {
    let value = match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => v,
        AttributeValue::Float(v) => f64::from(v),
        AttributeValue::Int(v) => f64::from(v),
        AttributeValue::Short(v) => f64::from(v),
        AttributeValue::Schar(v) => f64::from(v),
        AttributeValue::Uchar(v) => f64::from(v),
        AttributeValue::Ushort(v) => f64::from(v),
        AttributeValue::Uint(v) => f64::from(v),
        AttributeValue::Longlong(v) => v as f64,
        AttributeValue::Ulonglong(v) => v as f64,
        AttributeValue::Doubles(vs) => *vs.first()?,
        AttributeValue::Floats(vs) => f64::from(*vs.first()?),
        AttributeValue::Ints(vs) => f64::from(*vs.first()?),
        AttributeValue::Shorts(vs) => f64::from(*vs.first()?),
        _ => return None,
    };
    Some(value)
}

/// Dimension names of a variable, in storage order
pub fn dimension_names(var: &Variable) -> Vec<String> {
    var.dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect()
}

/// Names of the data variables: everything that is neither a coordinate
/// variable (named after a dimension) nor listed in a `coordinates` attribute.
pub fn data_variable_names(file: &File) -> Vec<String> {
    let dimension_names: HashSet<String> =
        file.dimensions().map(|d| d.name().to_string()).collect();

    let auxiliary: HashSet<String> = file
        .variables()
        .filter_map(|v| string_attribute(&v, "coordinates"))
        .flat_map(|coords| {
            coords
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    file.variables()
        .map(|v| v.name().to_string())
        .filter(|name| !dimension_names.contains(name) && !auxiliary.contains(name))
        .collect()
}

/// Lists all variables and dimensions in a clean, organized format.
pub fn list_variables_and_dimensions(file: &File) -> Result<()> {
    println!("\n Dimensions");
    println!("==============");

    let mut dimensions: Vec<_> = file.dimensions().collect();
    dimensions.sort_by_key(|d| d.name().to_string());

    if dimensions.is_empty() {
        println!("   (No dimensions found)");
    } else {
        for dim in dimensions {
            let length_info = if dim.is_unlimited() {
                format!("{} (unlimited)", dim.len())
            } else {
                dim.len().to_string()
            };
            println!("    {} = {}", dim.name(), length_info);
        }
    }

    let data_vars: HashSet<String> = data_variable_names(file).into_iter().collect();

    println!("\n Variables");
    println!("=============");

    let mut variables: Vec<_> = file.variables().collect();
    variables.sort_by_key(|v| v.name().to_string());

    if variables.is_empty() {
        println!("   (No variables found)");
    }
    for var in variables {
        let name = var.name().to_string();
        let dims = dimension_names(&var);
        let shape: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.len().to_string())
            .collect();
        let role = if data_vars.contains(&name) { "data" } else { "coord" };

        if dims.is_empty() {
            println!("    {name} [{role}]: scalar");
        } else {
            println!(
                "    {name} [{role}]: [{}] = ({})",
                dims.join(", "),
                shape.join(" x ")
            );
        }

        let key_attrs: Vec<String> = ["units", "long_name", "calendar"]
            .iter()
            .filter_map(|attr| string_attribute(&var, attr).map(|v| format!("{attr}: {v}")))
            .collect();
        if !key_attrs.is_empty() {
            println!("      - {}", key_attrs.join(", "));
        }
    }

    Ok(())
}
