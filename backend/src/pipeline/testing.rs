use shared::ProbabilityVector;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::model::{to_probabilities, Classifier, InferenceError};
use super::preprocess::PreprocessedTensor;
use crate::config::OutputActivation;

/// Deterministic stand-in for the Torch artifact: scores each class by how
/// close the mean intensity is to a per-class centre.
#[derive(Debug, Default)]
pub struct StubClassifier {
    calls: AtomicUsize,
}

const CENTRES: [f32; 4] = [0.35, 0.55, 0.0, 0.85];

impl StubClassifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for StubClassifier {
    fn predict(&self, input: &PreprocessedTensor) -> Result<ProbabilityVector, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mean = input.mean();
        let logits = CENTRES.map(|c| -20.0 * (mean - c).powi(2));
        to_probabilities(&logits, OutputActivation::Logits)
    }
}

/// Always fails, like a runtime that lost its device.
pub struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _: &PreprocessedTensor) -> Result<ProbabilityVector, InferenceError> {
        Err(InferenceError::Runtime("device lost".into()))
    }
}
