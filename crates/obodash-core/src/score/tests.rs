use std::collections::BTreeMap;

use super::*;
use crate::config::{ScoreFactor, WeightOverride};
use crate::models::{CheckResult, FailureKind, LevelCounts, RecordedResult, RecordedStatus};
use crate::summary::summarize_recorded;

fn record_with(results: &[(&str, CheckResult)], base_generated: bool) -> OntologyRecord {
    let mut record = OntologyRecord::new("foo");
    record.base_generated = base_generated;
    for (label, result) in results {
        record
            .results
            .insert((*label).to_string(), RecordedResult::from(result.clone()));
    }
    record.summary = Some(summarize_recorded(&record.results));
    record
}

fn equal_composite_weights() -> ScoreWeights {
    let mut overrides = BTreeMap::new();
    for factor in ["impact", "dashboard"] {
        overrides.insert(
            factor.to_string(),
            WeightOverride {
                impact_factor: Some(1.0),
                max_impact: None,
            },
        );
    }
    ScoreWeights::with_overrides(&overrides).expect("weights")
}

#[test]
fn deduction_is_monotone_in_every_count() {
    let weights = ScoreWeights::default();
    let base = DeductionCounts::default();
    let baseline = deduction_score(&base, &weights).value();
    assert_eq!(baseline, 100.0);

    for step in 0..50_u64 {
        let lower = DeductionCounts {
            no_base: step.min(1),
            overall: LevelCounts::new(step, step, step),
            report: LevelCounts::new(step * 10, step * 10, step * 10),
        };
        let higher = DeductionCounts {
            no_base: (step + 1).min(1),
            overall: LevelCounts::new(step + 1, step + 1, step + 1),
            report: LevelCounts::new(step * 10 + 10, step * 10 + 10, step * 10 + 10),
        };
        assert!(deduction_score(&higher, &weights) <= deduction_score(&lower, &weights));
    }
}

#[test]
fn deduction_caps_each_factor_at_max_impact() {
    let weights = ScoreWeights::default();
    let counts = DeductionCounts {
        no_base: 1,
        overall: LevelCounts::new(1000, 1000, 1000),
        report: LevelCounts::new(100_000, 100_000, 100_000),
    };
    let capped = ScoreFactor::ALL
        .into_iter()
        .take(7)
        .map(|factor| weights.max_impact(factor))
        .sum::<f64>();
    assert_eq!(deduction_score(&counts, &weights).value(), 100.0 - capped);
}

#[test]
fn deduction_reads_counts_from_record() {
    let record = record_with(
        &[
            ("FP01 Open", CheckResult::pass()),
            ("FP05 Scope", CheckResult::error("Missing domain")),
            (
                "ROBOT Report",
                CheckResult::warn("2 warnings.").with_counts(LevelCounts::new(0, 2, 0)),
            ),
        ],
        true,
    );
    let counts = DeductionCounts::from_record(&record);
    assert_eq!(counts.no_base, 1);
    assert_eq!(counts.overall, LevelCounts::new(1, 1, 0));
    assert_eq!(counts.report, LevelCounts::new(0, 2, 0));

    // 100 - 5 (no base) - 1 (error) - 0.5 (warning) - 0.02 (report warnings)
    let score = ScoringStrategy::Deduction.score(&record, &ScoreWeights::default());
    assert_eq!(score.value(), 93.48);
    assert_eq!(score.to_string(), "93.48");
}

#[test]
fn category_all_pass_with_base_is_full_marks() {
    let record = record_with(
        &[
            ("FP01 Open", CheckResult::pass()),
            ("FP02 Common Format", CheckResult::pass()),
        ],
        false,
    );
    assert_eq!(category_fraction_score(&record).to_string(), "100.00");
}

#[test]
fn category_one_error_without_base_loses_two_categories() {
    for k in 1..=12_usize {
        let mut results = vec![("FP05 Scope".to_string(), CheckResult::error("x"))];
        for index in 1..k {
            results.push((format!("check {index}"), CheckResult::pass()));
        }
        let borrowed = results
            .iter()
            .map(|(label, result)| (label.as_str(), result.clone()))
            .collect::<Vec<_>>();
        let record = record_with(&borrowed, true);
        let expected = (100.0 - 2.0 * 100.0 / (k as f64 + 1.0)).max(0.0);
        let score = category_fraction_score(&record).value();
        assert!((score - expected).abs() < 0.006, "k={k}: {score} vs {expected}");
    }
}

#[test]
fn category_scores_the_foo_scenario() {
    let record = record_with(
        &[
            ("FP01 Open", CheckResult::pass()),
            ("FP02 Common Format", CheckResult::pass()),
            ("FP03 URIs", CheckResult::error("Invalid namespace")),
        ],
        false,
    );
    assert_eq!(category_fraction_score(&record).to_string(), "75.00");
}

#[test]
fn category_returns_zero_for_unknown_status() {
    let mut record = record_with(&[("FP01 Open", CheckResult::pass())], false);
    record.results.insert(
        "FP02 Common Format".to_string(),
        RecordedResult {
            status: RecordedStatus::Unrecognized("MAYBE".to_string()),
            comment: None,
            file: None,
            results: None,
        },
    );
    assert_eq!(category_fraction_score(&record), DashboardScore::ZERO);
}

#[test]
fn category_without_results_hangs_on_the_base_category() {
    let published_base = OntologyRecord::new("empty");
    assert_eq!(category_fraction_score(&published_base).to_string(), "100.00");

    let generated_base = record_with(&[], true);
    assert_eq!(category_fraction_score(&generated_base), DashboardScore::ZERO);

    let mut failed = OntologyRecord::new("failed");
    failed.failure = Some(FailureKind::FailedDownload);
    assert_eq!(category_fraction_score(&failed), DashboardScore::ZERO);
}

#[test]
fn warn_and_info_deduct_fractions_of_a_category() {
    let record = record_with(
        &[
            ("FP01 Open", CheckResult::warn("license")),
            ("FP02 Common Format", CheckResult::info("syntax")),
            ("FP03 URIs", CheckResult::pass()),
        ],
        false,
    );
    // w = 25: 100 - 25/3 - 2.5
    assert_eq!(category_fraction_score(&record).value(), 89.17);
}

#[test]
fn failed_record_scores_zero_everywhere() {
    let mut record = record_with(&[("FP01 Open", CheckResult::pass())], false);
    record.failure = Some(FailureKind::FailedDownload);
    let weights = ScoreWeights::default();
    for strategy in [ScoringStrategy::Deduction, ScoringStrategy::Category] {
        let (dashboard, obo) = score_record(
            &record,
            strategy,
            &weights,
            CompositeMode::All,
            1.0,
            20,
        );
        assert_eq!(dashboard, DashboardScore::ZERO);
        assert_eq!(obo.score, 0.0);
    }
}

#[test]
fn composite_extremes() {
    let weights = equal_composite_weights();
    let zero = compute_obo_score(
        &CompositeInputs::default(),
        &weights,
        CompositeMode::ImpactDashboard,
    );
    assert_eq!(zero.score, 0.0);

    let full = compute_obo_score(
        &CompositeInputs {
            impact: 1.0,
            dashboard: 1.0,
            ..CompositeInputs::default()
        },
        &weights,
        CompositeMode::ImpactDashboard,
    );
    assert_eq!(full.score, 1.0);
    assert_eq!(full.formula, "(1*impact+1*dashboard)/2");
}

#[test]
fn composite_formula_names_default_weights() {
    let weights = ScoreWeights::default();
    let inputs = CompositeInputs {
        impact: 0.5,
        dashboard: 0.8,
        reuse: 0.1,
        impact_external: 0.25,
    };
    let two = compute_obo_score(&inputs, &weights, CompositeMode::ImpactDashboard);
    assert_eq!(two.formula, "(3*impact+2*dashboard)/5");
    assert_eq!(two.score, 0.62);

    let all = compute_obo_score(&inputs, &weights, CompositeMode::All);
    assert_eq!(
        all.formula,
        "(3*impact+2*dashboard+1*reuse+3*impact_external)/9"
    );
    let metric = all.to_metric();
    assert_eq!(metric.reuse, 0.1);
    assert_eq!(metric.formula, all.formula);
}

#[test]
fn external_impact_steps() {
    let steps = [
        (0, 0.0),
        (1, 0.25),
        (2, 0.25),
        (3, 0.5),
        (5, 0.5),
        (6, 0.75),
        (10, 0.75),
        (11, 1.0),
        (400, 1.0),
    ];
    for (usages, expected) in steps {
        assert_eq!(external_impact(usages), expected, "usages={usages}");
    }
}

#[test]
fn impact_fraction_ignores_self() {
    assert_eq!(impact_fraction(0, 1), 0.0);
    assert_eq!(impact_fraction(2, 5), 0.5);
    assert_eq!(impact_fraction(9, 5), 1.0);
}
