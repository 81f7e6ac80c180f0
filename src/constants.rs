//! Static lookup tables and command-line defaults shared by both tools

/// CDS dataset that serves the CMIP6 projections
pub const DATASET: &str = "projections-cmip6";
pub const TEMPORAL_RESOLUTION: &str = "daily";

/// Retrieval defaults
pub const DEFAULT_MODEL: &str = "ipsl_cm6a_lr";
pub const DEFAULT_AREA: [f64; 4] = [0.25, -94.68, -23.09, -71.04];
pub const DEFAULT_FETCH_VARIABLES: [&str; 2] = ["near_surface_air_temperature", "near_surface_wind_speed"];
pub const DEFAULT_FETCH_EXPERIMENTS: [&str; 3] = ["historical", "ssp1_2_6", "ssp5_8_5"];
pub const HISTORICAL_RANGE: (i32, i32) = (1980, 2014);
pub const SCENARIO_RANGE: (i32, i32) = (2015, 2049);
pub const DEFAULT_BASE_DIR: &str = "date";

/// Analysis defaults
pub const DEFAULT_VARIABLE: &str = "near_surface_air_temperature";
pub const DEFAULT_SCENARIOS: [&str; 2] = ["ssp1_2_6", "ssp5_8_5"];
pub const DEFAULT_OUTPUT_DIR: &str = "img";
pub const DEFAULT_RETURN_PERIODS: &[u32] = &[10, 20, 50];

/// Experiment names and directory layout
pub const HISTORICAL: &str = "historical";
pub const HISTORICAL_DIR: &str = "historico";
pub const SCENARIO_DIR: &str = "projecao";

/// Kelvin to Celsius offset
pub const KELVIN_OFFSET: f64 = 273.15;
pub const CELSIUS_UNITS: &str = "degC";

/// Canonical variable name -> names used by different providers
pub const ALIASES: &[(&str, &[&str])] = &[
    ("near_surface_air_temperature", &["tas", "t2m"]),
    ("near_surface_wind_speed", &["sfcWind", "wind_speed", "wind"]),
    ("total_precipitation", &["tp", "pr", "precipitation"]),
];

pub const TEMP_NAMES: &[&str] = &["near_surface_air_temperature", "tas", "t2m"];
pub const WIND_SPEED_NAMES: &[&str] = &["near_surface_wind_speed", "sfcWind", "wind_speed", "wind"];
pub const WIND_U_ALIASES: &[&str] = &["uas", "u10", "eastward_wind", "eastward_near_surface_wind"];
pub const WIND_V_ALIASES: &[&str] = &["vas", "v10", "northward_wind", "northward_near_surface_wind"];

/// Accumulative quantities are summed; everything else is averaged
pub const SUM_VARIABLES: &[&str] = &["total_precipitation", "tp", "pr", "precipitation"];

pub const LATITUDE_DIMS: &[&str] = &["latitude", "lat"];
pub const LONGITUDE_DIMS: &[&str] = &["longitude", "lon"];
pub const TIME_DIMS: &[&str] = &["time", "t", "Time"];

/// Experiment -> chart color
pub const COLORS: &[(&str, &str)] = &[
    ("historical", "gray"),
    ("ssp1_2_6", "green"),
    ("ssp5_8_5", "orange"),
];

/// Colors for experiments missing from [`COLORS`]
pub const FALLBACK_PALETTE: &[&str] = &[
    "#1f77b4", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf", "#bcbd22",
];

/// Chart kinds, used as file name suffixes
pub const PLOT_MONTHLY_CLIMATOLOGY: &str = "climatologia_mensal";
pub const PLOT_ANNUAL_SERIES: &str = "serie_anual";
pub const PLOT_MONTHLY_ANOMALIES: &str = "anomalias_mensais";
pub const PLOT_ANNUAL_ANOMALIES: &str = "anomalias_anuais";
pub const PLOT_WIND_ROSE: &str = "rosa_dos_ventos";
pub const PLOT_RETURN_LEVELS: &str = "niveis_retorno";

/// Alternate names for a canonical variable, empty when unknown
pub fn aliases_for(variable: &str) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(name, _)| *name == variable)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

pub fn is_temperature(name: &str) -> bool {
    TEMP_NAMES.contains(&name)
}

pub fn is_wind_speed(name: &str) -> bool {
    WIND_SPEED_NAMES.contains(&name)
}

/// Subdirectory that holds files for an experiment
pub fn experiment_subdir(experiment: &str) -> &'static str {
    if experiment == HISTORICAL {
        HISTORICAL_DIR
    } else {
        SCENARIO_DIR
    }
}
