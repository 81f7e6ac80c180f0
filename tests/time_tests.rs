use cmip_vis::{
    errors::{CmipVisError, Result},
    time::{Calendar, CalendarDate, TimeAxis, TimeUnits},
};

#[test]
fn test_parse_units() -> Result<()> {
    let units = TimeUnits::parse("days since 1850-01-01 00:00:00")?;
    assert_eq!(units.seconds_per_unit, 86_400.0);
    assert_eq!(units.reference, CalendarDate::new(1850, 1, 1));
    assert_eq!(units.reference_seconds, 0.0);

    let units = TimeUnits::parse("hours since 2015-01-01T12:00:00Z")?;
    assert_eq!(units.seconds_per_unit, 3_600.0);
    assert_eq!(units.reference, CalendarDate::new(2015, 1, 1));
    assert_eq!(units.reference_seconds, 43_200.0);

    assert!(matches!(
        TimeUnits::parse("fortnights since 2000-01-01"),
        Err(CmipVisError::TimeDecode(_))
    ));
    assert!(TimeUnits::parse("days").is_err());
    Ok(())
}

#[test]
fn test_calendar_names() -> Result<()> {
    assert_eq!(Calendar::parse("standard")?, Calendar::ProlepticGregorian);
    assert_eq!(Calendar::parse("gregorian")?, Calendar::ProlepticGregorian);
    assert_eq!(Calendar::parse("365_day")?, Calendar::NoLeap);
    assert_eq!(Calendar::parse("366_day")?, Calendar::AllLeap);
    assert_eq!(Calendar::parse("360_day")?, Calendar::Day360);
    assert!(Calendar::parse("julian").is_err());
    Ok(())
}

#[test]
fn test_gregorian_decoding() -> Result<()> {
    let axis = TimeAxis::new("days since 2000-01-01", Some("standard"))?;
    assert_eq!(axis.decode(0.0)?, CalendarDate::new(2000, 1, 1));
    // 2000 is a leap year
    assert_eq!(axis.decode(59.0)?, CalendarDate::new(2000, 2, 29));
    assert_eq!(axis.decode(366.0)?, CalendarDate::new(2001, 1, 1));
    assert_eq!(axis.decode(-1.0)?, CalendarDate::new(1999, 12, 31));
    // Midday steps stay on their day
    assert_eq!(axis.decode(0.5)?, CalendarDate::new(2000, 1, 1));
    Ok(())
}

#[test]
fn test_noleap_decoding() -> Result<()> {
    let axis = TimeAxis::new("days since 2000-01-01", Some("noleap"))?;
    assert_eq!(axis.decode(58.0)?, CalendarDate::new(2000, 2, 28));
    assert_eq!(axis.decode(59.0)?, CalendarDate::new(2000, 3, 1));
    assert_eq!(axis.decode(365.0)?, CalendarDate::new(2001, 1, 1));
    assert_eq!(axis.decode(-1.0)?, CalendarDate::new(1999, 12, 31));
    Ok(())
}

#[test]
fn test_all_leap_and_360_day_decoding() -> Result<()> {
    let all_leap = TimeAxis::new("days since 2001-01-01", Some("all_leap"))?;
    assert_eq!(all_leap.decode(59.0)?, CalendarDate::new(2001, 2, 29));
    assert_eq!(all_leap.decode(366.0)?, CalendarDate::new(2002, 1, 1));

    let day360 = TimeAxis::new("days since 2000-01-01", Some("360_day"))?;
    assert_eq!(day360.decode(29.0)?, CalendarDate::new(2000, 1, 30));
    assert_eq!(day360.decode(59.0)?, CalendarDate::new(2000, 2, 30));
    assert_eq!(day360.decode(360.0)?, CalendarDate::new(2001, 1, 1));

    let hours = TimeAxis::new("hours since 2000-12-30 00:00:00", Some("360_day"))?;
    assert_eq!(hours.decode(24.0)?, CalendarDate::new(2001, 1, 1));
    Ok(())
}

#[test]
fn test_decode_rejects_non_finite() -> Result<()> {
    let axis = TimeAxis::new("days since 2000-01-01", None)?;
    assert!(axis.decode(f64::NAN).is_err());
    assert_eq!(
        axis.decode_all(&[0.0, 31.0])?,
        vec![CalendarDate::new(2000, 1, 1), CalendarDate::new(2000, 2, 1)]
    );
    Ok(())
}
