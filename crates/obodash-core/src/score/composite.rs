use serde::{Deserialize, Serialize};

use super::round_to;
use crate::config::{CompositeMode, ScoreFactor, ScoreWeights};
use crate::models::OboScoreMetric;

/// Normalized composite inputs, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompositeInputs {
    pub impact: f64,
    pub dashboard: f64,
    pub reuse: f64,
    pub impact_external: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OboScore {
    pub score: f64,
    pub formula: String,
    #[serde(skip)]
    pub inputs: CompositeInputs,
}

impl OboScore {
    #[must_use]
    pub fn failed(weights: &ScoreWeights, mode: CompositeMode) -> Self {
        Self {
            score: 0.0,
            formula: formula(weights, mode),
            inputs: CompositeInputs::default(),
        }
    }

    #[must_use]
    pub fn to_metric(&self) -> OboScoreMetric {
        OboScoreMetric {
            oboscore: self.score,
            impact: self.inputs.impact,
            dashboard: self.inputs.dashboard,
            reuse: self.inputs.reuse,
            impact_external: self.inputs.impact_external,
            formula: self.formula.clone(),
        }
    }
}

/// Weighted mean of the composite factors selected by `mode`.
#[must_use]
pub fn compute_obo_score(
    inputs: &CompositeInputs,
    weights: &ScoreWeights,
    mode: CompositeMode,
) -> OboScore {
    let terms = terms(inputs, mode);
    let sum_weights = terms
        .iter()
        .map(|(factor, _)| weights.weight(*factor))
        .sum::<f64>();
    let score = if sum_weights > 0.0 {
        terms
            .iter()
            .map(|(factor, value)| weights.weight(*factor) * value.clamp(0.0, 1.0))
            .sum::<f64>()
            / sum_weights
    } else {
        0.0
    };
    OboScore {
        score: round_to(score, 3),
        formula: formula(weights, mode),
        inputs: *inputs,
    }
}

fn terms(inputs: &CompositeInputs, mode: CompositeMode) -> Vec<(ScoreFactor, f64)> {
    let mut terms = vec![
        (ScoreFactor::Impact, inputs.impact),
        (ScoreFactor::Dashboard, inputs.dashboard),
    ];
    if mode == CompositeMode::All {
        terms.push((ScoreFactor::Reuse, inputs.reuse));
        terms.push((ScoreFactor::ImpactExternal, inputs.impact_external));
    }
    terms
}

/// e.g. `(3*impact+2*dashboard)/5`
fn formula(weights: &ScoreWeights, mode: CompositeMode) -> String {
    let terms = terms(&CompositeInputs::default(), mode);
    let sum = terms
        .iter()
        .map(|(factor, _)| weights.weight(*factor))
        .sum::<f64>();
    let numerator = terms
        .iter()
        .map(|(factor, _)| format!("{}*{}", weights.weight(*factor), factor.as_str()))
        .collect::<Vec<_>>()
        .join("+");
    format!("({numerator})/{sum}")
}

/// Fraction of the other tracked ontologies that use this one.
#[must_use]
pub fn impact_fraction(used_by: usize, tracked: usize) -> f64 {
    if tracked <= 1 {
        return 0.0;
    }
    (used_by as f64 / (tracked - 1) as f64).min(1.0)
}

/// Step function over the number of documented external usages.
#[must_use]
pub fn external_impact(usages: usize) -> f64 {
    match usages {
        0 => 0.0,
        1..=2 => 0.25,
        3..=5 => 0.5,
        6..=10 => 0.75,
        _ => 1.0,
    }
}
