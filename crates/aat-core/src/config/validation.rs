//! Cross-field configuration validation.
//!
//! Every violation names the offending key so the fix is obvious from the
//! error alone.

use super::AnalysisConfig;
use aat_common::{Error, Result};

/// Validate a parsed configuration.
pub fn validate(config: &AnalysisConfig) -> Result<()> {
    validate_frequencies(&config.sweep.frequencies)?;
    validate_severities(config)?;
    validate_groupings(config)?;
    validate_risk(config)?;
    validate_values(config)?;
    validate_dataset(config)?;
    Ok(())
}

fn validate_frequencies(frequencies: &[f64]) -> Result<()> {
    if frequencies.is_empty() {
        return Err(Error::Config("sweep.frequencies must not be empty".into()));
    }
    for &f in frequencies {
        if !(f > 0.0 && f <= 100.0) {
            return Err(Error::Config(format!(
                "sweep.frequencies entry {f} is outside (0, 100]"
            )));
        }
    }
    if frequencies.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::Config(
            "sweep.frequencies must be strictly ascending".into(),
        ));
    }
    Ok(())
}

fn validate_severities(config: &AnalysisConfig) -> Result<()> {
    let severities = &config.sweep.severities;
    if severities.is_empty() {
        return Err(Error::Config("sweep.severities must not be empty".into()));
    }
    let mut seen = std::collections::BTreeSet::new();
    for severity in severities {
        if !seen.insert(severity) {
            return Err(Error::Config(format!(
                "sweep.severities lists '{severity}' more than once"
            )));
        }
    }
    for (severity, years) in &config.bad_years {
        if years.is_empty() {
            return Err(Error::Config(format!(
                "bad_years.{severity} is present but empty; remove it to fall back to the predictand column"
            )));
        }
    }
    Ok(())
}

fn validate_groupings(config: &AnalysisConfig) -> Result<()> {
    let groupings = &config.sweep.groupings;
    if groupings.is_empty() {
        return Err(Error::Config("sweep.groupings must not be empty".into()));
    }
    let mut seen = std::collections::BTreeSet::new();
    for grouping in groupings {
        if !seen.insert(grouping) {
            return Err(Error::Config(format!(
                "sweep.groupings lists '{grouping}' more than once"
            )));
        }
    }
    Ok(())
}

fn validate_risk(config: &AnalysisConfig) -> Result<()> {
    let risk = &config.risk;
    if !risk.risk_tolerance.is_finite() || !(0.0..=1.0).contains(&risk.risk_tolerance) {
        return Err(Error::Config(format!(
            "risk.risk_tolerance {} is outside [0, 1]",
            risk.risk_tolerance
        )));
    }
    if !risk.zero_tolerance_penalty.is_finite() || risk.zero_tolerance_penalty < 0.0 {
        return Err(Error::Config(format!(
            "risk.zero_tolerance_penalty {} must be finite and non-negative",
            risk.zero_tolerance_penalty
        )));
    }
    Ok(())
}

fn validate_values(config: &AnalysisConfig) -> Result<()> {
    let v = &config.values;
    for (key, value) in [
        ("values.worthy_action", v.worthy_action),
        ("values.act_in_vain", v.act_in_vain),
        ("values.worthy_inaction", v.worthy_inaction),
        ("values.fail_to_act", v.fail_to_act),
    ] {
        if !value.is_finite() {
            return Err(Error::Config(format!("{key} must be finite, got {value}")));
        }
    }
    Ok(())
}

fn validate_dataset(config: &AnalysisConfig) -> Result<()> {
    if config.dataset.issue_month0 > 11 {
        return Err(Error::Config(format!(
            "dataset.issue_month0 {} is outside 0..=11",
            config.dataset.issue_month0
        )));
    }
    if let super::PredictandKind::Value {
        bad_year_threshold, ..
    } = config.dataset.predictand_kind
    {
        if !bad_year_threshold.is_finite() {
            return Err(Error::Config(
                "dataset.predictand_kind.bad_year_threshold must be finite".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::MINIMAL_YAML;
    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::from_yaml_str(MINIMAL_YAML).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_frequencies() {
        let mut cfg = config();
        cfg.sweep.frequencies.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sweep.frequencies"));
    }

    #[test]
    fn test_rejects_out_of_range_frequency() {
        let mut cfg = config();
        cfg.sweep.frequencies = vec![10.0, 120.0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_unsorted_frequencies() {
        let mut cfg = config();
        cfg.sweep.frequencies = vec![30.0, 10.0];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn test_rejects_duplicate_severity() {
        let mut cfg = config();
        cfg.sweep.severities = vec![crate::config::Severity::High, crate::config::Severity::High];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_risk_tolerance() {
        let mut cfg = config();
        cfg.risk.risk_tolerance = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("risk.risk_tolerance"));

        cfg.risk.risk_tolerance = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_risk_tolerance_is_allowed() {
        let mut cfg = config();
        cfg.risk.risk_tolerance = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_issue_month() {
        let mut cfg = config();
        cfg.dataset.issue_month0 = 12;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_outcome_value() {
        let mut cfg = config();
        cfg.values.act_in_vain = f64::NEG_INFINITY;
        assert!(cfg.validate().is_err());
    }
}
