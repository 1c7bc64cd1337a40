use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
#[cfg(test)]
use ndarray::ArrayView4;

/// Side length of the square model input.
pub const INPUT_SIZE: u32 = 168;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("uploaded file is not a readable image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Model input: shape `(1, INPUT_SIZE, INPUT_SIZE, 1)`, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedTensor(Array4<f32>);

impl PreprocessedTensor {
    pub fn zeros() -> Self {
        let side = INPUT_SIZE as usize;
        Self(Array4::zeros((1, side, side, 1)))
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }

    #[cfg(test)]
    pub(crate) fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    /// Row-major NHWC data.
    pub fn to_vec(&self) -> Vec<f32> {
        self.0.iter().copied().collect()
    }

    #[cfg(test)]
    pub(crate) fn mean(&self) -> f32 {
        self.0.mean().unwrap_or(0.0)
    }
}

/// Decodes an upload. The format is sniffed from the bytes, never from the file name.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PreprocessError::Empty);
    }
    Ok(img)
}

/// Resize (bicubic), grayscale (ITU-R 601-2 luma), scale to `[0, 1]`, add the batch axis.
pub fn preprocess(img: &DynamicImage) -> Result<PreprocessedTensor, PreprocessError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::Empty);
    }

    let resized = img.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
    let rgb = resized.to_rgb8();
    let pixels: Vec<f32> = rgb
        .pixels()
        .map(|p| luma_601(p.0) as f32 / 255.0)
        .collect();

    let side = INPUT_SIZE as usize;
    let array = Array4::from_shape_vec((1, side, side, 1), pixels)?;
    Ok(PreprocessedTensor(array))
}

pub fn preprocess_bytes(bytes: &[u8]) -> Result<PreprocessedTensor, PreprocessError> {
    preprocess(&decode(bytes)?)
}

/// Fixed-point `L = R * 299/1000 + G * 587/1000 + B * 114/1000`.
fn luma_601([r, g, b]: [u8; 3]) -> u8 {
    let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
    l as u8
}
