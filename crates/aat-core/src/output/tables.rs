//! Table renderers for sweep and quantile reports.

use crate::analyze::{GroupDistribution, QuantileReport};
use crate::sweep::SweepReport;
use aat_common::{OutputFormat, Result};

fn fmt_num(value: f64) -> String {
    format!("{value:.4}")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(fmt_num).unwrap_or_else(|| "-".to_string())
}

fn fmt_flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Render a sweep report in the requested format.
pub fn render_sweep(report: &SweepReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Md => Ok(sweep_markdown(report)),
        OutputFormat::Summary => {
            let rows: usize = report.tables.iter().map(|t| t.table.rows.len()).sum();
            Ok(format!(
                "sweep: {} tables, {} rows, {} metrics rows, {} failed partitions (schema {})",
                report.tables.len(),
                rows,
                report.metrics.len(),
                report.failures.len(),
                report.schema_version
            ))
        }
    }
}

fn sweep_markdown(report: &SweepReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Trigger sweep (issue month {}, direction {})\n",
        report.issue_month, report.direction
    ));

    for entry in &report.tables {
        let table = &entry.table;
        out.push_str(&format!(
            "\n## {} / frequency {}% / {}\n\nthreshold {} (adjusted {})\n\n",
            entry.severity,
            table.frequency,
            table.scope,
            fmt_num(table.threshold),
            fmt_num(table.adjusted_threshold)
        ));
        out.push_str(
            "| Year | Unit | Forecast | Difference | Triggered | Triggered (adj) | Bad Year | Outcome |\n",
        );
        out.push_str("|---:|---|---:|---:|---|---|---|---|\n");
        for row in &table.rows {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                row.year,
                row.unit_name,
                fmt_num(row.predictor_value),
                fmt_num(row.trigger_difference),
                fmt_flag(row.triggered),
                fmt_flag(row.triggered_adjusted),
                fmt_flag(row.is_bad_year),
                row.outcome
            ));
        }
    }

    out.push_str("\n## Metrics\n\n");
    out.push_str(
        "| Severity | Freq (%) | Scope | WA | AV | FA | WI | Accuracy | Sensitivity | Specificity | EV | EV norm | Reward | Risk | RARoP |\n",
    );
    out.push_str("|---|---:|---|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|\n");
    for row in &report.metrics {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            row.severity,
            row.frequency,
            row.scope,
            row.counts.worthy_action,
            row.counts.act_in_vain,
            row.counts.fail_to_act,
            row.counts.worthy_inaction,
            fmt_opt(row.accuracy),
            fmt_opt(row.sensitivity),
            fmt_opt(row.specificity),
            fmt_opt(row.ev),
            fmt_opt(row.ev_norm),
            fmt_opt(row.reward),
            fmt_opt(row.risk),
            fmt_opt(row.rarop)
        ));
    }

    if !report.failures.is_empty() {
        out.push_str("\n## Failed partitions\n\n");
        out.push_str("| Severity | Freq (%) | Scope | Error |\n|---|---:|---|---|\n");
        for failure in &report.failures {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                failure.severity, failure.frequency, failure.scope, failure.error.message
            ));
        }
    }

    out
}

/// Render a quantile report in the requested format.
pub fn render_quantiles(report: &QuantileReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Md => Ok(quantiles_markdown(report)),
        OutputFormat::Summary => Ok(format!(
            "quantiles: {} partitions, source {:?}, frequency {}% (schema {})",
            report.partitions.len(),
            report.source,
            report.frequency,
            report.schema_version
        )),
    }
}

fn group_markdown(out: &mut String, group: &GroupDistribution) {
    out.push_str(&format!("\n### {} (n={})\n\n", group.group, group.count));
    if group.count == 0 {
        out.push_str("empty group\n");
        return;
    }
    out.push_str("| Prob | Value |\n|---:|---:|\n");
    for point in &group.quantiles {
        out.push_str(&format!("| {} | {} |\n", point.prob, fmt_num(point.value)));
    }
    if let Some(summary) = &group.summary {
        out.push_str(&format!(
            "\nmin {} / q1 {} / median {} / q3 {} / max {}\n",
            fmt_num(summary.min),
            fmt_num(summary.q1),
            fmt_num(summary.median),
            fmt_num(summary.q3),
            fmt_num(summary.max)
        ));
    }
}

fn quantiles_markdown(report: &QuantileReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Quantiles (frequency {}%, source {:?})\n",
        report.frequency, report.source
    ));
    for partition in &report.partitions {
        out.push_str(&format!("\n## {}\n", partition.scope));
        group_markdown(&mut out, &partition.analysis.triggered);
        group_markdown(&mut out, &partition.analysis.not_triggered);
    }
    out
}

/// Render a configuration check result.
pub fn render_check(config_path: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::json!({ "status": "ok", "config": config_path }).to_string()
        }
        OutputFormat::Md | OutputFormat::Summary => {
            format!("config ok: {config_path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapt::Observation;
    use crate::config::AnalysisConfig;
    use crate::sweep::sweep;

    fn report() -> SweepReport {
        let config = AnalysisConfig::from_yaml_str(
            r#"
dataset:
  predictor: pnep
  predictand: bad_year
  issue_month0: 2
sweep:
  frequencies: [50]
  groupings: [national]
bad_years:
  moderate: [2010, 2012]
  high: [2012]
risk:
  risk_tolerance: 0.5
"#,
        )
        .unwrap();
        let observations: Vec<Observation> = [
            (2010, 0.30, true),
            (2011, 0.80, false),
            (2012, 0.10, true),
            (2013, 0.95, false),
        ]
        .into_iter()
        .map(|(year, value, bad)| Observation {
            year,
            unit_id: "A".into(),
            unit_name: "Unit A".into(),
            predictor_value: value,
            is_bad_year: bad,
        })
        .collect();
        sweep(&observations, &config).unwrap()
    }

    #[test]
    fn test_render_sweep_json_has_stable_columns() {
        let text = render_sweep(&report(), aat_common::OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["schema_version"], "1.0.0");
        let first_metric = &value["metrics"][0];
        for key in [
            "severity",
            "frequency",
            "scope",
            "worthy_action",
            "act_in_vain",
            "fail_to_act",
            "worthy_inaction",
            "accuracy",
            "sensitivity",
            "specificity",
            "ev",
            "ev_norm",
            "reward",
            "risk",
            "rarop",
        ] {
            assert!(first_metric.get(key).is_some(), "missing column {key}");
        }
    }

    #[test]
    fn test_render_sweep_markdown() {
        let text = render_sweep(&report(), aat_common::OutputFormat::Md).unwrap();
        assert!(text.contains("# Trigger sweep (issue month Mar"));
        assert!(text.contains("Worthy Action"));
        assert!(text.contains("## Metrics"));
        assert!(!text.contains("## Failed partitions"));
    }

    #[test]
    fn test_render_sweep_summary() {
        let text = render_sweep(&report(), aat_common::OutputFormat::Summary).unwrap();
        assert!(text.starts_with("sweep: 2 tables, 8 rows"));
        assert!(text.contains("0 failed partitions"));
    }
}
