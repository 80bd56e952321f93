//! Conversion of loaded images into the float buffers batch consumers expect

use image::{DynamicImage, GrayImage};

/// Edge length of the placeholder mask emitted for images without alpha
const EMPTY_MASK_SIZE: u32 = 64;

/// Interleaved RGB float image, values scaled to `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `height * width * 3` values
    pub data: Vec<f32>,
}

/// Float mask, 1.0 where the source image was fully transparent
#[derive(Debug, Clone, PartialEq)]
pub struct MaskTensor {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

pub fn image_to_tensor(image: &DynamicImage) -> ImageTensor {
    let rgb = image.to_rgb8();
    ImageTensor {
        width: rgb.width(),
        height: rgb.height(),
        data: rgb.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect(),
    }
}

/// Invert an alpha mask into the mask convention (1 - alpha). Without a mask,
/// emit the fixed all-zero placeholder.
pub fn mask_to_tensor(mask: Option<&GrayImage>) -> MaskTensor {
    match mask {
        Some(mask) => MaskTensor {
            width: mask.width(),
            height: mask.height(),
            data: mask
                .as_raw()
                .iter()
                .map(|&a| 1.0 - f32::from(a) / 255.0)
                .collect(),
        },
        None => MaskTensor {
            width: EMPTY_MASK_SIZE,
            height: EMPTY_MASK_SIZE,
            data: vec![0.0; (EMPTY_MASK_SIZE * EMPTY_MASK_SIZE) as usize],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn image_tensor_scales_to_unit_range() {
        let img = RgbImage::from_pixel(2, 1, Rgb([255, 0, 51]));
        let tensor = image_to_tensor(&DynamicImage::ImageRgb8(img));
        assert_eq!((tensor.width, tensor.height), (2, 1));
        assert_eq!(tensor.data.len(), 6);
        assert!((tensor.data[0] - 1.0).abs() < 1e-6);
        assert!((tensor.data[1] - 0.0).abs() < 1e-6);
        assert!((tensor.data[2] - 51.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn mask_tensor_inverts_alpha() {
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(0, 0, Luma([255]));
        mask.put_pixel(1, 0, Luma([0]));
        let tensor = mask_to_tensor(Some(&mask));
        assert!((tensor.data[0] - 0.0).abs() < 1e-6);
        assert!((tensor.data[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_mask_becomes_zero_placeholder() {
        let tensor = mask_to_tensor(None);
        assert_eq!((tensor.width, tensor.height), (64, 64));
        assert_eq!(tensor.data.len(), 64 * 64);
        assert!(tensor.data.iter().all(|&v| v == 0.0));
    }
}
