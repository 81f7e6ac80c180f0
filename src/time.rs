//! CF-convention time coordinate decoding
//!
//! CMIP6 files store time as `<unit> since <reference>` offsets in one of a
//! handful of model calendars. Aggregation only needs the calendar date of
//! each step, so decoding produces [`CalendarDate`] values rather than
//! `chrono` timestamps (a `360_day` calendar has dates chrono cannot represent).

use crate::errors::{CmipVisError, Result};
use crate::metadata::string_attribute;
use chrono::{Datelike, NaiveDate, TimeDelta};
use netcdf::Variable;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A date in the coordinate's own calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// Supported CF calendars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// `standard`, `gregorian` and `proleptic_gregorian`, all decoded proleptically
    ProlepticGregorian,
    /// `noleap` / `365_day`
    NoLeap,
    /// `all_leap` / `366_day`
    AllLeap,
    /// `360_day`
    Day360,
}

impl Calendar {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(CmipVisError::TimeDecode(format!(
                "unsupported calendar '{other}'"
            ))),
        }
    }

    /// Month lengths for fixed-length calendars
    const fn month_lengths(self) -> Option<[u32; 12]> {
        match self {
            Self::ProlepticGregorian => None,
            Self::NoLeap => Some([31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]),
            Self::AllLeap => Some([31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]),
            Self::Day360 => Some([30; 12]),
        }
    }
}

/// Parsed `<unit> since <reference>` string
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    pub seconds_per_unit: f64,
    pub reference: CalendarDate,
    /// Seconds past midnight of the reference date
    pub reference_seconds: f64,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self> {
        let bad = || CmipVisError::TimeDecode(format!("unrecognized time units '{units}'"));

        let lower = units.trim().to_lowercase();
        let (unit, reference) = lower.split_once(" since ").ok_or_else(bad)?;

        let seconds_per_unit = match unit.trim() {
            "days" | "day" | "d" => SECONDS_PER_DAY,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            _ => return Err(bad()),
        };

        let reference = reference
            .trim()
            .trim_end_matches("utc")
            .trim_end_matches('z')
            .trim()
            .replacen('t', " ", 1);
        let (date_part, time_part) = reference
            .split_once(' ')
            .map(|(d, t)| (d, t.trim()))
            .unwrap_or((reference.as_str(), ""));

        let mut date_fields = date_part.split('-').map(str::parse::<i64>);
        let mut next = || date_fields.next().and_then(|r| r.ok());
        let year = next().ok_or_else(bad)?;
        let month = next().unwrap_or(1);
        let day = next().unwrap_or(1);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(bad());
        }

        // Drop a trailing numeric zone offset such as "+00:00"
        let time_part = time_part.split('+').next().unwrap_or("");
        let mut reference_seconds = 0.0;
        for (field, scale) in time_part
            .split(':')
            .filter(|f| !f.is_empty())
            .zip([3_600.0, 60.0, 1.0])
        {
            let value: f64 = field.parse().map_err(|_| bad())?;
            reference_seconds += value * scale;
        }

        Ok(Self {
            seconds_per_unit,
            reference: CalendarDate::new(year as i32, month as u32, day as u32),
            reference_seconds,
        })
    }
}

/// Decoder for one time coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub units: TimeUnits,
    pub calendar: Calendar,
}

impl TimeAxis {
    pub fn new(units: &str, calendar: Option<&str>) -> Result<Self> {
        Ok(Self {
            units: TimeUnits::parse(units)?,
            calendar: Calendar::parse(calendar.unwrap_or("standard"))?,
        })
    }

    /// Build a decoder from a coordinate variable's `units` and `calendar` attributes
    pub fn from_variable(var: &Variable) -> Result<Self> {
        let units = string_attribute(var, "units").ok_or_else(|| {
            CmipVisError::TimeDecode(format!("time variable '{}' has no units", var.name()))
        })?;
        let calendar = string_attribute(var, "calendar");
        Self::new(&units, calendar.as_deref())
    }

    /// Calendar date of one offset
    pub fn decode(&self, value: f64) -> Result<CalendarDate> {
        if !value.is_finite() {
            return Err(CmipVisError::TimeDecode(format!(
                "non-finite time value {value}"
            )));
        }
        // Millisecond rounding keeps values like 30.999999999 days on the right day
        let offset_ms =
            ((self.units.reference_seconds + value * self.units.seconds_per_unit) * 1_000.0).round();

        match self.calendar.month_lengths() {
            None => self.decode_gregorian(offset_ms),
            Some(lengths) => self.decode_fixed(offset_ms, &lengths),
        }
    }

    pub fn decode_all(&self, values: &[f64]) -> Result<Vec<CalendarDate>> {
        values.iter().map(|&v| self.decode(v)).collect()
    }

    fn decode_gregorian(&self, offset_ms: f64) -> Result<CalendarDate> {
        let reference = self.units.reference;
        let out_of_range = || {
            CmipVisError::TimeDecode(format!(
                "offset {offset_ms} ms from {reference:?} is out of range"
            ))
        };

        let start = NaiveDate::from_ymd_opt(reference.year, reference.month, reference.day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(out_of_range)?;
        let delta = TimeDelta::try_milliseconds(offset_ms as i64).ok_or_else(out_of_range)?;
        let moment = start.checked_add_signed(delta).ok_or_else(out_of_range)?;

        Ok(CalendarDate::new(moment.year(), moment.month(), moment.day()))
    }

    fn decode_fixed(&self, offset_ms: f64, lengths: &[u32; 12]) -> Result<CalendarDate> {
        let reference = self.units.reference;
        let year_len: i64 = lengths.iter().map(|&l| i64::from(l)).sum();
        let month_start: i64 = lengths[..reference.month as usize - 1]
            .iter()
            .map(|&l| i64::from(l))
            .sum();
        if reference.day > lengths[reference.month as usize - 1] {
            return Err(CmipVisError::TimeDecode(format!(
                "reference date {reference:?} does not exist in calendar {:?}",
                self.calendar
            )));
        }

        let base_days =
            i64::from(reference.year) * year_len + month_start + i64::from(reference.day) - 1;
        let offset_days = (offset_ms / 1_000.0 / SECONDS_PER_DAY).floor() as i64;
        let total = base_days + offset_days;

        let year = total.div_euclid(year_len);
        let mut day_of_year = total.rem_euclid(year_len);
        let mut month = 1;
        for &len in lengths {
            let len = i64::from(len);
            if day_of_year < len {
                break;
            }
            day_of_year -= len;
            month += 1;
        }

        Ok(CalendarDate::new(year as i32, month, day_of_year as u32 + 1))
    }
}
