// ruclass-preprocess/src/output.rs
//! Hand-off formats for the classifier and for display.

use image::RgbImage;
use ndarray::Array3;

#[inline]
fn rgb(px: u32) -> [u8; 3] {
    [(px >> 16) as u8, (px >> 8) as u8, px as u8]
}

/// ARGB pixels → (H, W, 3) RGB tensor normalised to 0‑1.0f32. Alpha is dropped.
/// `None` if the buffer size is off.
pub fn argb_to_tensor(pixels: &[u32], width: u32, height: u32) -> Option<Array3<f32>> {
    let w = width as usize;
    if pixels.len() != w * height as usize {
        return None;
    }
    Some(Array3::from_shape_fn((height as usize, w, 3), |(y, x, c)| {
        rgb(pixels[y * w + x])[c] as f32 / 255.0
    }))
}

/// ARGB pixels → `image::RgbImage`; `None` if the buffer size is off.
pub fn argb_to_rgb_image(pixels: &[u32], width: u32, height: u32) -> Option<RgbImage> {
    if pixels.len() != width as usize * height as usize {
        return None;
    }
    let raw: Vec<u8> = pixels.iter().flat_map(|&px| rgb(px)).collect();
    RgbImage::from_raw(width, height, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_layout_is_hwc() {
        let pixels = [0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFF80_8080];
        let t = argb_to_tensor(&pixels, 2, 2).expect("sized");
        assert_eq!(t.shape(), &[2, 2, 3]);
        assert_eq!(t[(0, 0, 0)], 1.0);
        assert_eq!(t[(0, 1, 1)], 1.0);
        assert_eq!(t[(1, 0, 2)], 1.0);
        assert_eq!(t[(1, 0, 0)], 0.0);
        assert!((t[(1, 1, 1)] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn tensor_rejects_wrong_length() {
        let pixels = [0xFF00_0000u32; 5];
        assert!(argb_to_tensor(&pixels, 2, 2).is_none());
        assert!(argb_to_tensor(&pixels[..3], 2, 2).is_none());
        assert!(argb_to_tensor(&[], 0, 0).is_some_and(|t| t.is_empty()));
    }

    #[test]
    fn image_matches_pixels() {
        let pixels = [0xFF11_2233, 0xFF44_5566];
        let img = argb_to_rgb_image(&pixels, 2, 1).expect("sized");
        assert_eq!(img.get_pixel(0, 0).0, [0x11, 0x22, 0x33]);
        assert_eq!(img.get_pixel(1, 0).0, [0x44, 0x55, 0x66]);
        assert!(argb_to_rgb_image(&pixels, 3, 1).is_none());
    }
}
