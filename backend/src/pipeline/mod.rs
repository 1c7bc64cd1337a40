pub mod model;
pub mod preprocess;
#[cfg(test)]
pub(crate) mod testing;

use actix_web::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::GenericImageView;
use shared::{AdviceRecord, Prediction};
use std::sync::Arc;

use model::{Classifier, InferenceError};
use preprocess::PreprocessError;

/// One uploaded file, held in memory for the duration of a request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePreview {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub file_name: String,
    pub preview: ImagePreview,
    pub prediction: Prediction,
    pub advice: &'static AdviceRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::Preprocess(PreprocessError::Decode(_) | PreprocessError::Empty) => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::Preprocess(PreprocessError::Shape(_)) | AnalysisError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show on the page.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Preprocess(PreprocessError::Decode(_)) => {
                "The uploaded file could not be read as an image. Please upload a JPG or PNG MRI scan."
                    .to_string()
            }
            AnalysisError::Preprocess(PreprocessError::Empty) => {
                "The uploaded image has no pixels.".to_string()
            }
            AnalysisError::Preprocess(PreprocessError::Shape(_))
            | AnalysisError::Inference(_) => {
                "The classifier failed to process this image. Please try again.".to_string()
            }
        }
    }
}

/// Decode, preprocess, classify, select, and look up advice for one upload.
#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<dyn Classifier>,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn analyze(&self, upload: &UploadedImage) -> Result<Analysis, AnalysisError> {
        let img = preprocess::decode(&upload.bytes)?;
        let (width, height) = img.dimensions();
        let tensor = preprocess::preprocess(&img)?;

        let probabilities = self.classifier.predict(&tensor)?;
        let prediction = Prediction::from_probabilities(probabilities);

        log::info!(
            "Classified {} ({}x{}) as {} with confidence {:.3}",
            upload.file_name,
            width,
            height,
            prediction.label,
            prediction.confidence()
        );

        Ok(Analysis {
            file_name: upload.file_name.clone(),
            preview: ImagePreview {
                data_uri: data_uri(&upload.bytes),
                width,
                height,
            },
            advice: prediction.label.advice(),
            prediction,
        })
    }
}

fn data_uri(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
