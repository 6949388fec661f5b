//! Environment map decoding
//!
//! Decodes an equirectangular HDR image into linear RGBA float rows ready
//! for texture upload. The alpha channel is synthesized since the render
//! pipeline binds an RGBA texture.

use std::path::Path;

use image::DynamicImage;

use super::AssetError;

/// Decoded equirectangular environment map, linear RGBA32F, row-major.
pub struct EnvironmentImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

impl EnvironmentImage {
    /// Byte view of the pixel data for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Loads and decodes an environment map from disk.
pub fn load(path: &Path) -> Result<EnvironmentImage, AssetError> {
    let image = image::open(path)?;
    log::info!(
        "decoded environment map {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(from_dynamic(image))
}

fn from_dynamic(image: DynamicImage) -> EnvironmentImage {
    let rgb = image.into_rgb32f();
    let (width, height) = rgb.dimensions();

    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for pixel in rgb.pixels() {
        pixels.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 1.0]);
    }

    EnvironmentImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_rgb_expands_to_rgba_with_unit_alpha() {
        let buffer = ImageBuffer::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([1.5f32, 0.25, 0.0])
            } else {
                Rgb([0.0f32, 2.0, 8.0])
            }
        });
        let env = from_dynamic(DynamicImage::ImageRgb32F(buffer));

        assert_eq!(env.width, 2);
        assert_eq!(env.height, 1);
        assert_eq!(env.pixels, vec![1.5, 0.25, 0.0, 1.0, 0.0, 2.0, 8.0, 1.0]);
    }

    #[test]
    fn test_byte_view_length() {
        let buffer = ImageBuffer::from_pixel(4, 2, Rgb([0.5f32, 0.5, 0.5]));
        let env = from_dynamic(DynamicImage::ImageRgb32F(buffer));
        assert_eq!(env.as_bytes().len(), 4 * 2 * 4 * std::mem::size_of::<f32>());
    }
}
