//! Export simulation grids as images.
//!
//! Heights become 8-bit grayscale, normals become RGB with `n·0.5 + 0.5`
//! encoding, and the full displacement field can be kept lossless as
//! 32-bit float RGBA `(dx, h, dz, 1)`.

use std::path::Path;

use image::{
    EncodableLayout, GrayImage, ImageBuffer, ImageFormat, Luma, Pixel, PixelWithColorType, Rgb,
    Rgba, Rgba32FImage, RgbImage,
};

use crate::grid::{DisplacementField, Grid, NormalField};

/// Errors that can occur while writing images.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Cannot export an empty grid")]
    EmptyGrid,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Heights normalized to the grid's own min/max range.
///
/// A flat grid maps to mid-gray.
pub fn height_image(height: &Grid<f32>) -> GrayImage {
    let n = height.resolution() as u32;
    let (lo, hi) = height
        .as_slice()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
            (lo.min(h), hi.max(h))
        });
    let range = hi - lo;

    GrayImage::from_fn(n, n, |x, y| {
        let h = *height.get(x as usize, y as usize);
        let t = if range > 0.0 { (h - lo) / range } else { 0.5 };
        Luma([to_byte(t)])
    })
}

/// Unit normals packed into RGB.
pub fn normal_image(normals: &NormalField) -> RgbImage {
    let n = normals.resolution() as u32;
    RgbImage::from_fn(n, n, |x, y| {
        let v = normals.get(x as usize, y as usize);
        Rgb([
            to_byte(v[0] * 0.5 + 0.5),
            to_byte(v[1] * 0.5 + 0.5),
            to_byte(v[2] * 0.5 + 0.5),
        ])
    })
}

/// Lossless displacement texture: `(dx, h, dz, 1)` per texel.
pub fn displacement_rgba32f(field: &DisplacementField) -> Rgba32FImage {
    let n = field.resolution() as u32;
    Rgba32FImage::from_fn(n, n, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let h = *field.height.get(x, y);
        let [dx, dz] = field
            .horizontal
            .as_ref()
            .map_or([0.0, 0.0], |horizontal| *horizontal.get(x, y));
        Rgba([dx, h, dz, 1.0])
    })
}

/// Write a height grid as a grayscale PNG.
pub fn save_height_png<P: AsRef<Path>>(height: &Grid<f32>, path: P) -> Result<(), ExportError> {
    if height.is_empty() {
        return Err(ExportError::EmptyGrid);
    }
    save_png(&height_image(height), path)
}

/// Write a normal field as an RGB PNG.
pub fn save_normal_png<P: AsRef<Path>>(normals: &NormalField, path: P) -> Result<(), ExportError> {
    if normals.is_empty() {
        return Err(ExportError::EmptyGrid);
    }
    save_png(&normal_image(normals), path)
}

/// Save any image buffer the PNG encoder supports.
pub fn save_png<P, Q>(img: &ImageBuffer<P, Vec<P::Subpixel>>, path: Q) -> Result<(), ExportError>
where
    P: Pixel + PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
    Q: AsRef<Path>,
{
    let path = path.as_ref();
    img.save_with_format(path, ImageFormat::Png)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn to_byte(t: f32) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_image_normalizes_range() {
        let height = Grid::from_fn(4, |x, _| x as f32 - 1.0);
        let img = height_image(&height);
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(0, 2)[0], 0);
        assert_eq!(img.get_pixel(3, 2)[0], 255);
    }

    #[test]
    fn test_flat_height_is_mid_gray() {
        let img = height_image(&Grid::new(2, 3.0));
        assert_eq!(img.get_pixel(1, 1)[0], 128);
    }

    #[test]
    fn test_up_normal_encoding() {
        let img = normal_image(&Grid::new(2, [0.0, 1.0, 0.0]));
        assert_eq!(img.get_pixel(0, 0).0, [128, 255, 128]);
    }

    #[test]
    fn test_displacement_channels() {
        let field = DisplacementField {
            height: Grid::new(2, 0.75),
            horizontal: Some(Grid::new(2, [0.1, -0.2])),
            imaginary_residual: 0.0,
        };
        let img = displacement_rgba32f(&field);
        assert_eq!(img.get_pixel(1, 0).0, [0.1, 0.75, -0.2, 1.0]);

        let flat = DisplacementField {
            horizontal: None,
            ..field
        };
        assert_eq!(displacement_rgba32f(&flat).get_pixel(0, 1).0, [0.0, 0.75, 0.0, 1.0]);
    }

    #[test]
    fn test_save_height_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("height.png");
        save_height_png(&Grid::from_fn(8, |x, y| (x + y) as f32), &path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), 8);
    }

    #[test]
    fn test_save_png_accepts_rgb_and_rgba16() {
        let dir = tempfile::tempdir().unwrap();

        let normals = normal_image(&Grid::new(4, [0.0, 1.0, 0.0]));
        let path = dir.path().join("normals.png");
        save_png(&normals, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.get_pixel(2, 2).0, [128, 255, 128]);

        let wide: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(3, 3, Rgba([1000, 2000, 3000, u16::MAX]));
        let path = dir.path().join("wide.png");
        save_png(&wide, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba16();
        assert_eq!(loaded.get_pixel(1, 1).0, [1000, 2000, 3000, u16::MAX]);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_normal_png(&Grid::new(0, [0.0, 1.0, 0.0]), dir.path().join("x.png"));
        assert!(matches!(result, Err(ExportError::EmptyGrid)));
    }
}
