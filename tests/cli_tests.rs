use clap::Parser;
use cmip_vis::cli::{parse_return_period, parse_scenario_mapping, AnalyzeArgs, FetchArgs};
use cmip_vis::constants::{
    DEFAULT_AREA, DEFAULT_FETCH_EXPERIMENTS, DEFAULT_FETCH_VARIABLES, DEFAULT_RETURN_PERIODS,
    DEFAULT_SCENARIOS,
};
use std::path::PathBuf;

#[test]
fn test_scenario_mapping_parser() {
    assert_eq!(
        parse_scenario_mapping("ssp1_2_6=data/ssp126.nc"),
        Ok(("ssp1_2_6".to_string(), PathBuf::from("data/ssp126.nc")))
    );
    // Only the first '=' separates
    assert_eq!(
        parse_scenario_mapping("ssp5_8_5=odd=name.nc"),
        Ok(("ssp5_8_5".to_string(), PathBuf::from("odd=name.nc")))
    );

    for bad in ["ssp1_2_6", "=file.nc", "ssp1_2_6=", ""] {
        let err = parse_scenario_mapping(bad).expect_err("malformed mapping");
        assert!(err.contains("experiment=file.nc"), "{err}");
    }
}

#[test]
fn test_return_period_parser() {
    assert_eq!(parse_return_period("25"), Ok(25));
    assert!(parse_return_period("1").is_err());
    assert!(parse_return_period("0").is_err());
    assert!(parse_return_period("ten").is_err());
}

#[test]
fn test_fetch_defaults() {
    let args = FetchArgs::try_parse_from(["cmip-fetch"]).expect("defaults parse");
    let plan = args.into_plan().expect("valid plan");

    assert_eq!(
        plan.variables,
        vec!["near_surface_air_temperature", "near_surface_wind_speed"]
    );
    assert_eq!(plan.experiments, vec!["historical", "ssp1_2_6", "ssp5_8_5"]);
    assert_eq!(plan.area, [0.25, -94.68, -23.09, -71.04]);
    assert_eq!(plan.area, DEFAULT_AREA);
    assert_eq!(plan.variables, DEFAULT_FETCH_VARIABLES);
    assert_eq!(plan.experiments, DEFAULT_FETCH_EXPERIMENTS);
    assert_eq!(plan.model, "ipsl_cm6a_lr");
    assert_eq!(plan.historical_years, (1980, 2014));
    assert_eq!(plan.scenario_years, (2015, 2049));
    assert_eq!(plan.output_base, PathBuf::from("date"));
    assert_eq!(plan.years_for("historical").len(), 35);
    assert_eq!(plan.years_for("ssp5_8_5")[0], "2015");
}

#[test]
fn test_fetch_overrides() {
    let args = FetchArgs::try_parse_from([
        "cmip-fetch",
        "-v",
        "near_surface_wind_speed",
        "-e",
        "ssp2_4_5",
        "--area",
        "5",
        "-80",
        "-10",
        "-60",
        "--scenario-start",
        "2030",
        "--scenario-end",
        "2031",
        "--output-base",
        "downloads",
    ])
    .expect("overrides parse");
    let plan = args.into_plan().expect("valid plan");

    assert_eq!(plan.variables, vec!["near_surface_wind_speed"]);
    assert_eq!(plan.experiments, vec!["ssp2_4_5"]);
    assert_eq!(plan.area, [5.0, -80.0, -10.0, -60.0]);
    assert_eq!(plan.years_for("ssp2_4_5"), vec!["2030", "2031"]);
    assert_eq!(plan.output_base, PathBuf::from("downloads"));
}

#[test]
fn test_fetch_rejects_reversed_range() {
    let args = FetchArgs::try_parse_from([
        "cmip-fetch",
        "--historical-start",
        "2000",
        "--historical-end",
        "1990",
    ])
    .expect("flags parse");
    assert!(args.into_plan().is_err());
}

#[test]
fn test_analyze_arguments() {
    let args = AnalyzeArgs::try_parse_from([
        "cmip-vis",
        "--variable",
        "near_surface_wind_speed",
        "--scenario-file",
        "ssp1_2_6=a.nc",
        "--scenario-file",
        "ssp5_8_5=b.zip",
        "--return-periods",
        "5",
        "100",
        "--threads",
        "2",
    ])
    .expect("arguments parse");

    assert_eq!(args.threads, Some(2));
    assert!(!args.list_vars);
    let config = args.analysis_config();
    assert_eq!(config.variable, "near_surface_wind_speed");
    assert_eq!(config.experiments, vec!["ssp1_2_6", "ssp5_8_5"]);
    assert_eq!(config.scenario_files.len(), 2);
    assert_eq!(config.scenario_files[1], ("ssp5_8_5".to_string(), PathBuf::from("b.zip")));
    assert_eq!(config.return_periods, vec![5, 100]);
    assert_eq!(config.data_dir, PathBuf::from("date"));
    assert_eq!(config.output_dir, PathBuf::from("img"));
}

#[test]
fn test_analyze_defaults() {
    let args = AnalyzeArgs::try_parse_from(["cmip-vis"]).expect("defaults parse");
    let config = args.analysis_config();

    assert_eq!(config.variable, "near_surface_air_temperature");
    assert_eq!(config.experiments, DEFAULT_SCENARIOS);
    assert_eq!(config.return_periods, DEFAULT_RETURN_PERIODS);
    assert!(config.historical_file.is_none());
    assert!(config.scenario_files.is_empty());
}

#[test]
fn test_analyze_rejects_bad_mapping() {
    let result = AnalyzeArgs::try_parse_from(["cmip-vis", "--scenario-file", "ssp1_2_6"]);
    assert!(result.is_err());

    let result = AnalyzeArgs::try_parse_from(["cmip-vis", "--return-periods", "1"]);
    assert!(result.is_err());
}
