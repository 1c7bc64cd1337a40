use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use futures::{StreamExt, TryStreamExt};

use crate::pipeline::UploadedImage;

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
pub const FIELD_NAME: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no image was uploaded")]
    Missing,
    #[error("unsupported file type {0:?}")]
    UnsupportedType(String),
    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Missing | UploadError::Multipart(_) => StatusCode::BAD_REQUEST,
            UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            UploadError::Missing => "Please choose an MRI image to upload.".to_string(),
            UploadError::UnsupportedType(name) => format!(
                "\"{}\" is not a supported file. Accepted formats: JPG, JPEG, PNG.",
                name
            ),
            UploadError::TooLarge { limit } => format!(
                "The image is too large. The limit is {:.1} MB.",
                *limit as f64 / (1024.0 * 1024.0)
            ),
            UploadError::Multipart(_) => "The upload could not be read. Please try again.".to_string(),
        }
    }
}

/// Extension check on the client-supplied file name, case-insensitive.
pub fn check_extension(file_name: &str) -> Result<(), UploadError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(UploadError::UnsupportedType(file_name.to_string())),
    }
}

/// Reads the first file field into memory. The upload form names it `image`.
pub async fn read_image(mut payload: Multipart, max_bytes: usize) -> Result<UploadedImage, UploadError> {
    while let Some(mut field) = payload.try_next().await? {
        let file_name = field
            .content_disposition()
            .and_then(|d| d.get_filename())
            .map(str::to_string);

        let Some(file_name) = file_name else {
            // drain non-file fields so the stream can advance
            while field.next().await.is_some() {}
            continue;
        };
        if file_name.is_empty() {
            return Err(UploadError::Missing);
        }
        check_extension(&file_name)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if bytes.len() + data.len() > max_bytes {
                return Err(UploadError::TooLarge { limit: max_bytes });
            }
            bytes.extend_from_slice(&data);
        }
        if bytes.is_empty() {
            return Err(UploadError::Missing);
        }

        log::debug!("Received upload {} ({} bytes)", file_name, bytes.len());
        return Ok(UploadedImage { file_name, bytes });
    }
    Err(UploadError::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_extensions_ignore_case() {
        for name in ["scan.jpg", "scan.JPEG", "brain.v2.png", "x.Png"] {
            assert!(check_extension(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn other_extensions_are_unsupported() {
        for name in ["scan.gif", "scan", "notes.txt", "png"] {
            let err = check_extension(name).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }
    }

    #[test]
    fn size_limit_message_is_in_megabytes() {
        let err = UploadError::TooLarge {
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.user_message().contains("10.0 MB"));
    }
}
