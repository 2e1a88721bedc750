use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

use crate::config::TensorLayout;

pub const INPUT_SIZE: u32 = 256;
pub const CHANNELS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Resize to 256x256, force RGB, scale to [0, 1] and add the batch axis.
pub fn to_tensor(image: &DynamicImage, layout: TensorLayout) -> Array4<f32> {
    let rgb: RgbImage = image
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();
    let side = INPUT_SIZE as usize;

    let value = |x: usize, y: usize, c: usize| -> f32 {
        f32::from(rgb.get_pixel(x as u32, y as u32)[c]) / 255.0
    };

    match layout {
        TensorLayout::Nhwc => {
            Array4::from_shape_fn((1, side, side, CHANNELS), |(_, y, x, c)| value(x, y, c))
        }
        TensorLayout::Nchw => {
            Array4::from_shape_fn((1, CHANNELS, side, side), |(_, c, y, x)| value(x, y, c))
        }
    }
}

pub fn preprocess(bytes: &[u8], layout: TensorLayout) -> Result<Array4<f32>, PreprocessError> {
    let image = decode(bytes)?;
    Ok(to_tensor(&image, layout))
}
