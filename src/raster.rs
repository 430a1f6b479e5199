use crate::directory::IconSize;
use crate::encoder::Rasterizer;
use crate::error::IcoError;
use crate::surface::Surface;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io;
use std::path::Path;

//===========================================================================//

/// Decodes an image file held in memory.  The format is guessed from the
/// data.
pub fn load_image(data: &[u8]) -> Result<DynamicImage, IcoError> {
    let image = image::load_from_memory(data)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        "Decoded source image"
    );
    Ok(image)
}

/// Opens and decodes an image file.  The format is guessed from the path's
/// extension.
pub fn open_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, IcoError> {
    let image = image::open(path.as_ref())?;
    tracing::debug!(
        path = %path.as_ref().display(),
        width = image.width(),
        height = image.height(),
        "Opened source image"
    );
    Ok(image)
}

//===========================================================================//

/// A [`Rasterizer`] for `image::DynamicImage` sources.  The source is
/// stretched to fill each square, ignoring its aspect ratio, just as drawing
/// it into a `size × size` canvas would.
#[derive(Clone, Copy, Debug)]
pub struct ImageRasterizer {
    filter: FilterType,
}

impl ImageRasterizer {
    /// Creates a rasterizer that resamples with the given filter.
    pub fn new(filter: FilterType) -> ImageRasterizer {
        ImageRasterizer { filter }
    }

    /// Returns the resampling filter.
    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Default for ImageRasterizer {
    /// Bilinear resampling, the usual canvas default.
    fn default() -> ImageRasterizer {
        ImageRasterizer::new(FilterType::Triangle)
    }
}

impl Rasterizer for ImageRasterizer {
    type Source = DynamicImage;

    fn rasterize(
        &self,
        source: &DynamicImage,
        size: IconSize,
    ) -> io::Result<Surface> {
        if source.width() == 0 || source.height() == 0 {
            invalid_input!(
                "Can't rasterize an empty {}x{} image",
                source.width(),
                source.height()
            );
        }
        let pixels = size.pixels();
        let rgba = if source.width() == pixels && source.height() == pixels {
            source.to_rgba8()
        } else {
            image::imageops::resize(source, pixels, pixels, self.filter)
        };
        Surface::from_rgba_data(pixels, pixels, rgba.into_raw())
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{load_image, ImageRasterizer};
    use crate::directory::IconSize;
    use crate::encoder::Rasterizer;
    use crate::error::IcoError;
    use crate::surface::Surface;
    use image::imageops::FilterType;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        DynamicImage::ImageRgba8(image)
    }

    #[test]
    fn stretches_to_square() {
        let rasterizer = ImageRasterizer::default();
        let source = checkerboard(40, 10);
        let size = IconSize::new(16).unwrap();
        let surface = rasterizer.rasterize(&source, size).unwrap();
        assert_eq!(surface.width(), 16);
        assert_eq!(surface.height(), 16);
        assert_eq!(surface.rgba_data().len(), 16 * 16 * 4);
    }

    #[test]
    fn same_size_copies_pixels() {
        let rasterizer = ImageRasterizer::new(FilterType::Nearest);
        let source = checkerboard(4, 4);
        let size = IconSize::new(4).unwrap();
        let surface = rasterizer.rasterize(&source, size).unwrap();
        assert_eq!(surface.rgba_data(), source.to_rgba8().as_raw().as_slice());
    }

    #[test]
    fn encodes_png_that_decodes_to_same_pixels() {
        let rasterizer = ImageRasterizer::default();
        let source = checkerboard(8, 8);
        let size = IconSize::new(8).unwrap();
        let surface = rasterizer.rasterize(&source, size).unwrap();
        let png = rasterizer.encode_png(&surface).unwrap();
        let decoded = Surface::read_png(png.as_slice()).unwrap();
        assert_eq!(decoded, surface);
    }

    #[test]
    fn empty_source_fails() {
        let rasterizer = ImageRasterizer::default();
        let source = DynamicImage::new_rgba8(0, 0);
        let size = IconSize::new(16).unwrap();
        assert!(rasterizer.rasterize(&source, size).is_err());
    }

    #[test]
    fn load_rejects_garbage() {
        match load_image(b"definitely not an image") {
            Err(IcoError::Decode(_)) => {}
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn load_png_from_memory() {
        let surface = Surface::transparent(3, 2).unwrap();
        let image = load_image(&surface.to_png().unwrap()).unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
    }
}

//===========================================================================//
