//! decision.rs: threshold rule that turns class probabilities into one label.
//!
//! Precedence, not arg-max: `factual` wins whenever it clears its own threshold,
//! even if `relevant` is numerically higher. Comparisons are strict (`>`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three output classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Factual,
    Relevant,
    Noise,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Factual, Label::Relevant, Label::Noise];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Factual => "factual",
            Label::Relevant => "relevant",
            Label::Noise => "noise",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class cutoffs loaded from the model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub factual: f64,
    pub relevant: f64,
}

impl Thresholds {
    /// Both values must be finite and inside <0.0, 1.0>.
    pub fn new(factual: f64, relevant: f64) -> anyhow::Result<Self> {
        for (name, v) in [("threshold_factual", factual), ("threshold_relevant", relevant)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                anyhow::bail!("{name} must be a finite value in [0, 1], got {v}");
            }
        }
        Ok(Self { factual, relevant })
    }
}

/// Probabilities for the three classes, resolved by class name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub factual: f64,
    pub relevant: f64,
    pub noise: f64,
}

impl ClassProbabilities {
    pub fn new(factual: f64, relevant: f64, noise: f64) -> Self {
        Self {
            factual,
            relevant,
            noise,
        }
    }

    /// Pick the three classes out of one probability row. A missing class is a
    /// configuration error of the artifact.
    pub fn from_row(row: &[f64], classes: &[String]) -> anyhow::Result<Self> {
        if row.len() != classes.len() {
            anyhow::bail!(
                "probability row has {} values for {} classes",
                row.len(),
                classes.len()
            );
        }
        let pick = |label: Label| {
            classes
                .iter()
                .position(|c| c == label.as_str())
                .map(|i| row[i])
                .ok_or_else(|| anyhow::anyhow!("class `{}` missing from model classes", label))
        };
        Ok(Self {
            factual: pick(Label::Factual)?,
            relevant: pick(Label::Relevant)?,
            noise: pick(Label::Noise)?,
        })
    }

    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::Factual => self.factual,
            Label::Relevant => self.relevant,
            Label::Noise => self.noise,
        }
    }
}

/// First match wins: factual, then relevant, else noise.
pub fn decide(p: &ClassProbabilities, t: &Thresholds) -> Label {
    if p.factual > t.factual {
        Label::Factual
    } else if p.relevant > t.relevant {
        Label::Relevant
    } else {
        Label::Noise
    }
}

/// Probability → percentage with one decimal, e.g. 0.873 → "87.3%".
pub fn format_percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Formatted confidences for all three classes (serialized in this order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confidence {
    pub factual: String,
    pub relevant: String,
    pub noise: String,
}

impl From<&ClassProbabilities> for Confidence {
    fn from(p: &ClassProbabilities) -> Self {
        Self {
            factual: format_percent(p.factual),
            relevant: format_percent(p.relevant),
            noise: format_percent(p.noise),
        }
    }
}

/// Per-request output; not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: Confidence,
}

impl ClassificationResult {
    pub fn from_probabilities(p: &ClassProbabilities, t: &Thresholds) -> Self {
        Self {
            label: decide(p, t),
            confidence: Confidence::from(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn t(f: f64, r: f64) -> Thresholds {
        Thresholds::new(f, r).unwrap()
    }

    #[test]
    fn factual_preempts_higher_relevant() {
        let p = ClassProbabilities::new(0.6, 0.9, 0.1);
        assert_eq!(decide(&p, &t(0.5, 0.3)), Label::Factual);
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let p = ClassProbabilities::new(0.5, 0.2, 0.3);
        assert_eq!(decide(&p, &t(0.5, 0.3)), Label::Noise);

        let p = ClassProbabilities::new(0.5, 0.3000001, 0.2);
        assert_eq!(decide(&p, &t(0.5, 0.3)), Label::Relevant);

        let p = ClassProbabilities::new(0.1, 0.3, 0.6);
        assert_eq!(decide(&p, &t(0.5, 0.3)), Label::Noise);
    }

    #[test]
    fn noise_even_when_noise_probability_is_low() {
        // noise has no threshold of its own
        let p = ClassProbabilities::new(0.45, 0.45, 0.10);
        assert_eq!(decide(&p, &t(0.5, 0.5)), Label::Noise);
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.1234), "12.3%");
        assert_eq!(format_percent(0.873), "87.3%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn thresholds_reject_out_of_range() {
        assert!(Thresholds::new(1.2, 0.3).is_err());
        assert!(Thresholds::new(0.5, f64::NAN).is_err());
        assert!(Thresholds::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn from_row_follows_class_order() {
        let classes = vec!["factual".to_string(), "noise".into(), "relevant".into()];
        let p = ClassProbabilities::from_row(&[0.2, 0.5, 0.3], &classes).unwrap();
        assert_eq!(p, ClassProbabilities::new(0.2, 0.3, 0.5));
    }

    #[test]
    fn from_row_missing_class_is_error() {
        let classes = vec!["factual".to_string(), "other".into(), "relevant".into()];
        let err = ClassProbabilities::from_row(&[0.2, 0.5, 0.3], &classes).unwrap_err();
        assert!(err.to_string().contains("noise"), "{err}");
    }

    #[test]
    fn serialize_result_shape() {
        let p = ClassProbabilities::new(0.873, 0.1, 0.027);
        let r = ClassificationResult::from_probabilities(&p, &t(0.5, 0.4));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            json!({
                "label": "factual",
                "confidence": { "factual": "87.3%", "relevant": "10.0%", "noise": "2.7%" }
            })
        );
        let s = serde_json::to_string(&r.confidence).unwrap();
        assert!(s.find("factual").unwrap() < s.find("relevant").unwrap());
        assert!(s.find("relevant").unwrap() < s.find("noise").unwrap());
    }
}
