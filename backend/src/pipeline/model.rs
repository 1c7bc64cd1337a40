use shared::{ProbabilityError, ProbabilityVector};
use std::path::PathBuf;

use super::preprocess::PreprocessedTensor;
use crate::config::OutputActivation;

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to load model artifact {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("model artifact emits {actual} outputs, expected {expected}")]
    OutputWidth { expected: usize, actual: usize },
    #[error("warm-up inference failed: {0}")]
    WarmUp(#[from] InferenceError),
    #[error("this build has no model runtime; rebuild with the `torch` feature")]
    RuntimeUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model runtime error: {0}")]
    Runtime(String),
    #[error("model returned an unusable output: {0}")]
    InvalidOutput(#[from] ProbabilityError),
    #[error("model lock poisoned")]
    Poisoned,
}

/// One forward pass from a preprocessed image to class probabilities.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &PreprocessedTensor) -> Result<ProbabilityVector, InferenceError>;
}

/// Turns a raw output row into probabilities according to the artifact's last layer.
pub fn to_probabilities(
    raw: &[f32],
    activation: OutputActivation,
) -> Result<ProbabilityVector, InferenceError> {
    let probabilities = match activation {
        OutputActivation::Probabilities => ProbabilityVector::from_scores(raw)?,
        OutputActivation::Logits => ProbabilityVector::from_logits(raw)?,
    };
    Ok(probabilities)
}

/// Runs the pure-black warm-up input and checks the output width against the label table.
pub fn warm_up<C: Classifier + ?Sized>(classifier: &C) -> Result<ProbabilityVector, ModelLoadError> {
    match classifier.predict(&PreprocessedTensor::zeros()) {
        Ok(probabilities) => Ok(probabilities),
        Err(InferenceError::InvalidOutput(ProbabilityError::WrongLength { expected, actual })) => {
            Err(ModelLoadError::OutputWidth { expected, actual })
        }
        Err(e) => Err(ModelLoadError::WarmUp(e)),
    }
}

#[cfg(feature = "torch")]
pub use torch::TorchClassifier;

#[cfg(feature = "torch")]
mod torch {
    use std::sync::Mutex;
    use tch::{CModule, Device, Kind, Tensor};

    use super::*;
    use crate::config::{DevicePreference, InputLayout, ModelConfig};
    use crate::pipeline::preprocess::INPUT_SIZE;

    /// TorchScript artifact behind a mutex; forward passes are serialized.
    pub struct TorchClassifier {
        module: Mutex<CModule>,
        device: Device,
        layout: InputLayout,
        activation: OutputActivation,
    }

    impl TorchClassifier {
        pub fn load(config: &ModelConfig) -> Result<Self, ModelLoadError> {
            if !config.path.exists() {
                return Err(ModelLoadError::NotFound(config.path.clone()));
            }

            let device = match config.device {
                DevicePreference::Auto => Device::cuda_if_available(),
                DevicePreference::Cpu => Device::Cpu,
                DevicePreference::Cuda => Device::Cuda(0),
            };

            let mut module =
                CModule::load_on_device(&config.path, device).map_err(|e| ModelLoadError::Load {
                    path: config.path.clone(),
                    message: e.to_string(),
                })?;
            module.set_eval();

            log::info!(
                "Loaded model {} on {:?} ({:?} input, {:?} output)",
                config.path.display(),
                device,
                config.input_layout,
                config.output
            );

            let classifier = Self {
                module: Mutex::new(module),
                device,
                layout: config.input_layout,
                activation: config.output,
            };

            let probe = warm_up(&classifier)?;
            log::debug!("Warm-up probabilities: {:?}", probe);
            Ok(classifier)
        }

        fn to_input(&self, input: &PreprocessedTensor) -> Result<Tensor, InferenceError> {
            let side = INPUT_SIZE as i64;
            let tensor = Tensor::f_from_slice(&input.to_vec())
                .and_then(|t| t.f_view([1, side, side, 1]))
                .map_err(|e| InferenceError::Runtime(e.to_string()))?;
            let tensor = match self.layout {
                InputLayout::Nhwc => tensor,
                InputLayout::Nchw => tensor
                    .f_permute([0, 3, 1, 2])
                    .map_err(|e| InferenceError::Runtime(e.to_string()))?,
            };
            Ok(tensor.to_device(self.device))
        }
    }

    impl Classifier for TorchClassifier {
        fn predict(
            &self,
            input: &PreprocessedTensor,
        ) -> Result<ProbabilityVector, InferenceError> {
            let tensor = self.to_input(input)?;
            let module = self.module.lock().map_err(|_| InferenceError::Poisoned)?;
            let output = tch::no_grad(|| module.forward_ts(&[tensor]))
                .map_err(|e| InferenceError::Runtime(e.to_string()))?;
            drop(module);

            let output_flat = output
                .to_device(Device::Cpu)
                .to_kind(Kind::Float)
                .view([-1]);
            let num_elements = output_flat.size()[0] as usize;
            let mut output_vec = vec![0.0f32; num_elements];
            output_flat.copy_data(&mut output_vec, num_elements);
            to_probabilities(&output_vec, self.activation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::StubClassifier;
    use shared::{ClassLabel, EnumCount};

    struct FixedOutput(Vec<f32>);

    impl Classifier for FixedOutput {
        fn predict(&self, _: &PreprocessedTensor) -> Result<ProbabilityVector, InferenceError> {
            to_probabilities(&self.0, OutputActivation::Probabilities)
        }
    }

    #[test]
    fn logits_are_softmaxed() {
        let p = to_probabilities(&[2.0, 0.0, 0.0, 0.0], OutputActivation::Logits).unwrap();
        assert_eq!(p.argmax(), ClassLabel::Glioma);
        assert!((p.total() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn negative_probabilities_are_invalid_output() {
        let err = to_probabilities(&[-1.0, 1.0, 0.5, 0.5], OutputActivation::Probabilities)
            .unwrap_err();
        assert!(matches!(err, InferenceError::InvalidOutput(_)));
    }

    #[test]
    fn overflowing_probabilities_are_invalid_output() {
        let err = to_probabilities(&[3.0e38, 3.0e38, 0.0, 0.0], OutputActivation::Probabilities)
            .unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidOutput(ProbabilityError::Overflow)
        ));
    }

    #[test]
    fn warm_up_rejects_wrong_output_width() {
        let err = warm_up(&FixedOutput(vec![0.5, 0.5])).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::OutputWidth {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn warm_up_on_black_input_sums_to_one() {
        let first = warm_up(&StubClassifier::default()).unwrap();
        assert_eq!(first.len(), ClassLabel::COUNT);
        assert!((first.total() - 1.0).abs() <= 1e-5);
        assert_eq!(first, warm_up(&StubClassifier::default()).unwrap());
    }
}
