use cmip_vis::{
    errors::{CmipVisError, Result},
    extremes::{compute_return_levels, fit_gev, GevParams, MIN_SAMPLES},
};

/// Evenly spaced quantiles of a Gumbel distribution
fn gumbel_sample(loc: f64, scale: f64, n: usize) -> Vec<f64> {
    (1..=n)
        .map(|i| {
            let p = (i as f64 - 0.5) / n as f64;
            loc - scale * (-p.ln()).ln()
        })
        .collect()
}

#[test]
fn test_short_series_rejected() {
    let data = [1.0, 2.0, f64::NAN, 3.0, 4.0, f64::NAN];
    match compute_return_levels(&data, &[10, 20]) {
        Err(CmipVisError::SeriesTooShort { found, required }) => {
            assert_eq!(found, 4);
            assert_eq!(required, MIN_SAMPLES);
        }
        other => panic!("Expected SeriesTooShort error, got {other:?}"),
    }
}

#[test]
fn test_one_estimate_per_period() -> Result<()> {
    let data = gumbel_sample(20.0, 3.0, 40);
    let levels = compute_return_levels(&data, &[10, 20, 50])?;

    assert_eq!(levels.keys().copied().collect::<Vec<_>>(), vec![10, 20, 50]);
    assert!(levels.values().all(|v| v.is_finite()));
    assert!(levels[&10] < levels[&20]);
    assert!(levels[&20] < levels[&50]);
    Ok(())
}

#[test]
fn test_fit_recovers_gumbel_parameters() -> Result<()> {
    let data = gumbel_sample(10.0, 2.0, 200);
    let params = fit_gev(&data)?;

    assert!(params.shape.abs() < 0.1, "shape {}", params.shape);
    assert!((params.loc - 10.0).abs() < 0.3, "loc {}", params.loc);
    assert!((params.scale - 2.0).abs() < 0.3, "scale {}", params.scale);

    let truth = GevParams {
        shape: 0.0,
        loc: 10.0,
        scale: 2.0,
    };
    assert!((params.return_level(50) - truth.return_level(50)).abs() < 1.5);
    Ok(())
}

#[test]
fn test_invalid_periods_and_flat_samples() {
    let data = gumbel_sample(10.0, 2.0, 30);
    assert!(matches!(
        compute_return_levels(&data, &[1, 10]),
        Err(CmipVisError::InvalidReturnPeriod(1))
    ));

    let flat = [5.0; 10];
    assert!(matches!(fit_gev(&flat), Err(CmipVisError::FitFailed(_))));
}

#[test]
fn test_likelihood_outside_support_is_infinite() {
    let params = GevParams {
        shape: 0.5,
        loc: 0.0,
        scale: 1.0,
    };
    // Upper bound is loc + scale / shape = 2
    assert!(params.neg_log_likelihood(&[1.0, 3.0]).is_infinite());
    assert!(params.neg_log_likelihood(&[0.5, 1.0]).is_finite());
}
