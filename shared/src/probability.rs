use derive_more::Deref;
use strum::{EnumCount, IntoEnumIterator};

use crate::ClassLabel;

/// Allowed drift of a probability vector's total mass from 1.0.
pub const SUM_TOLERANCE: f32 = 1e-5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbabilityError {
    #[error("expected {expected} class scores, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("score at index {0} is not finite")]
    NonFinite(usize),
    #[error("score at index {0} is negative")]
    Negative(usize),
    #[error("scores have no probability mass")]
    ZeroMass,
    #[error("scores sum past the f32 range")]
    Overflow,
}

/// One confidence per [`ClassLabel`], in label order, summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deref)]
pub struct ProbabilityVector([f32; ClassLabel::COUNT]);

impl ProbabilityVector {
    /// Accepts scores that are already probabilities and renormalizes them so
    /// the total is exactly 1 up to float rounding.
    pub fn from_scores(scores: &[f32]) -> Result<Self, ProbabilityError> {
        let values = Self::check_shape(scores)?;
        if let Some(index) = values.iter().position(|v| *v < 0.0) {
            return Err(ProbabilityError::Negative(index));
        }
        let total: f32 = values.iter().sum();
        if !total.is_finite() {
            return Err(ProbabilityError::Overflow);
        }
        if total <= 0.0 {
            return Err(ProbabilityError::ZeroMass);
        }
        Ok(Self(values.map(|v| v / total)))
    }

    /// Numerically stable softmax over raw logits.
    pub fn from_logits(logits: &[f32]) -> Result<Self, ProbabilityError> {
        let values = Self::check_shape(logits)?;
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps = values.map(|v| (v - max).exp());
        let total: f32 = exps.iter().sum();
        Ok(Self(exps.map(|v| v / total)))
    }

    fn check_shape(scores: &[f32]) -> Result<[f32; ClassLabel::COUNT], ProbabilityError> {
        let values: [f32; ClassLabel::COUNT] =
            scores
                .try_into()
                .map_err(|_| ProbabilityError::WrongLength {
                    expected: ClassLabel::COUNT,
                    actual: scores.len(),
                })?;
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ProbabilityError::NonFinite(index));
        }
        Ok(values)
    }

    /// Label with the largest score; ties resolve to the lowest index.
    pub fn argmax(&self) -> ClassLabel {
        ClassLabel::iter().fold(ClassLabel::Glioma, |best, label| {
            if self.get(label) > self.get(best) { label } else { best }
        })
    }

    pub fn get(&self, label: ClassLabel) -> f32 {
        self.0[label.index()]
    }

    pub fn total(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Pairs every label with its probability, in label order.
    pub fn labeled(&self) -> impl Iterator<Item = (ClassLabel, f32)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, value)| ClassLabel::from_index(index).map(|label| (label, *value)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: ClassLabel,
    pub probabilities: ProbabilityVector,
}

impl Prediction {
    pub fn from_probabilities(probabilities: ProbabilityVector) -> Self {
        Self {
            label: probabilities.argmax(),
            probabilities,
        }
    }

    pub fn confidence(&self) -> f32 {
        self.probabilities.get(self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(p: &ProbabilityVector) {
        assert_eq!(p.len(), ClassLabel::COUNT);
        assert!((p.total() - 1.0).abs() <= SUM_TOLERANCE, "total was {}", p.total());
    }

    #[test]
    fn scores_are_renormalized() {
        let p = ProbabilityVector::from_scores(&[0.2, 0.2, 0.2, 0.4000001]).unwrap();
        assert_normalized(&p);
        assert_eq!(p.argmax(), ClassLabel::Pituitary);
    }

    #[test]
    fn logits_go_through_softmax() {
        let p = ProbabilityVector::from_logits(&[1.0, 3.0, -2.0, 0.5]).unwrap();
        assert_normalized(&p);
        assert_eq!(p.argmax(), ClassLabel::Meningioma);
        assert!(p.iter().all(|v| *v > 0.0 && *v < 1.0));
    }

    #[test]
    fn large_logits_do_not_overflow() {
        let p = ProbabilityVector::from_logits(&[1000.0, 999.0, 0.0, -1000.0]).unwrap();
        assert_normalized(&p);
        assert_eq!(p.argmax(), ClassLabel::Glioma);
    }

    #[test]
    fn malformed_scores_are_rejected() {
        assert_eq!(
            ProbabilityVector::from_scores(&[0.5, 0.5]),
            Err(ProbabilityError::WrongLength {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(
            ProbabilityVector::from_scores(&[0.5, f32::NAN, 0.0, 0.5]),
            Err(ProbabilityError::NonFinite(1))
        );
        assert_eq!(
            ProbabilityVector::from_scores(&[0.5, 0.0, -0.1, 0.6]),
            Err(ProbabilityError::Negative(2))
        );
        assert_eq!(
            ProbabilityVector::from_scores(&[0.0; 4]),
            Err(ProbabilityError::ZeroMass)
        );
    }

    #[test]
    fn scores_summing_past_f32_max_are_rejected() {
        assert_eq!(
            ProbabilityVector::from_scores(&[3.0e38, 3.0e38, 0.0, 0.0]),
            Err(ProbabilityError::Overflow)
        );
        let p = ProbabilityVector::from_scores(&[3.0e38, 0.0, 0.0, 0.0]).unwrap();
        assert_normalized(&p);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let p = ProbabilityVector::from_scores(&[0.1, 0.4, 0.4, 0.1]).unwrap();
        assert_eq!(p.argmax(), ClassLabel::Meningioma);
        let uniform = ProbabilityVector::from_scores(&[0.25; 4]).unwrap();
        assert_eq!(Prediction::from_probabilities(uniform).label, ClassLabel::Glioma);
    }

    #[test]
    fn selection_is_idempotent() {
        let p = ProbabilityVector::from_scores(&[0.05, 0.1, 0.15, 0.7]).unwrap();
        let first = Prediction::from_probabilities(p);
        let second = Prediction::from_probabilities(first.probabilities);
        assert_eq!(first, second);
        assert_eq!(first.label, ClassLabel::Pituitary);
        assert!((first.confidence() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn labeled_pairs_follow_label_order() {
        let p = ProbabilityVector::from_scores(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        let labels: Vec<_> = p.labeled().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            [
                ClassLabel::Glioma,
                ClassLabel::Meningioma,
                ClassLabel::NoTumor,
                ClassLabel::Pituitary
            ]
        );
    }
}
