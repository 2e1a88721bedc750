use shared::{EnumCount, IntoEnumIterator, Label};
use std::collections::BTreeMap;

use super::classifier::InferenceError;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Score of `label`, in percent, unrounded.
    pub confidence: f64,
    /// Every label's score in percent, rounded to two decimals.
    pub breakdown: BTreeMap<Label, f64>,
}

impl Prediction {
    /// Shapes a raw score vector. Scores are taken as-is unless `apply_softmax` is set.
    pub fn from_scores(scores: &[f32], apply_softmax: bool) -> Result<Self, InferenceError> {
        if scores.len() != Label::COUNT {
            return Err(InferenceError::UnexpectedOutput(format!(
                "expected {} scores, got {}",
                Label::COUNT,
                scores.len()
            )));
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::UnexpectedOutput(
                "scores contain non-finite values".into(),
            ));
        }

        let scores: Vec<f64> = if apply_softmax {
            softmax(scores)
        } else {
            scores.iter().map(|&s| f64::from(s)).collect()
        };

        let best = argmax(&scores);
        let label = Label::from_index(best)
            .ok_or_else(|| InferenceError::UnexpectedOutput(format!("no label at index {best}")))?;

        let breakdown = Label::iter()
            .zip(&scores)
            .map(|(label, score)| (label, round2(score * 100.0)))
            .collect();

        Ok(Self {
            label,
            confidence: scores[best] * 100.0,
            breakdown,
        })
    }

    pub fn formatted_confidence(&self) -> String {
        format!("{:.2}%", self.confidence)
    }
}

/// First index of the maximum, so ties go to the lower label.
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .map(|&l| f64::from(l))
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (f64::from(l) - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
