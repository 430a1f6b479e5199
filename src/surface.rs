use std::io::{self, Read, Write};

//===========================================================================//

// Size limits for a rasterized surface:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

//===========================================================================//

/// An RGBA pixel surface, as produced by a
/// [`Rasterizer`](crate::Rasterizer).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl Surface {
    /// Creates a new surface with the given dimensions and RGBA data.  The
    /// `width` and `height` must be nonzero, and `rgba_data` must have `4 *
    /// width * height` bytes and be in row-major order from top to bottom.
    /// Returns an error if the dimensions are out of range or if `rgba_data`
    /// is the wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> io::Result<Surface> {
        if width < MIN_WIDTH {
            invalid_input!(
                "Invalid surface width (was {}, but must be at least {})",
                width,
                MIN_WIDTH
            );
        }
        if height < MIN_HEIGHT {
            invalid_input!(
                "Invalid surface height (was {}, but must be at least {})",
                height,
                MIN_HEIGHT
            );
        }
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            invalid_input!(
                "Invalid RGBA data length (was {}, but must be {} for {}x{} \
                 surface)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        Ok(Surface { width, height, rgba_data })
    }

    /// Creates a fully transparent surface of the given size.
    pub fn transparent(width: u32, height: u32) -> io::Result<Surface> {
        let len = (width as usize) * (height as usize) * 4;
        Surface::from_rgba_data(width, height, vec![0u8; len])
    }

    /// Returns the width of the surface, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the surface, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA data for this surface, in row-major order from top
    /// to bottom.
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    /// Consumes the surface, returning its RGBA data.
    pub fn into_rgba_data(self) -> Vec<u8> {
        self.rgba_data
    }

    /// Returns true if any pixel is less than fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.rgba_data.chunks_exact(4).any(|pixel| pixel[3] != u8::MAX)
    }

    /// Decodes a surface from PNG data.  Palette and sub-byte images are
    /// expanded and 16-bit channels are stripped, so any PNG yields 8-bit
    /// RGBA.  Returns an error if the PNG data is malformed.
    pub fn read_png<R: Read>(reader: R) -> io::Result<Surface> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16,
        );
        let mut png_reader = match decoder.read_info() {
            Ok(png_reader) => png_reader,
            Err(error) => invalid_data!("Malformed PNG data: {}", error),
        };
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        let frame = match png_reader.next_frame(&mut buffer) {
            Ok(frame) => frame,
            Err(error) => invalid_data!("Malformed PNG data: {}", error),
        };
        buffer.truncate(frame.buffer_size());
        let rgba_data = match frame.color_type {
            png::ColorType::Rgba => buffer,
            png::ColorType::Rgb => {
                let mut rgba = Vec::with_capacity((buffer.len() / 3) * 4);
                for pixel in buffer.chunks_exact(3) {
                    rgba.extend_from_slice(pixel);
                    rgba.push(u8::MAX);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let mut rgba = Vec::with_capacity(buffer.len() * 2);
                for pixel in buffer.chunks_exact(2) {
                    let (gray, alpha) = (pixel[0], pixel[1]);
                    rgba.extend_from_slice(&[gray, gray, gray, alpha]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let mut rgba = Vec::with_capacity(buffer.len() * 4);
                for gray in buffer.into_iter() {
                    rgba.extend_from_slice(&[gray, gray, gray, u8::MAX]);
                }
                rgba
            }
            png::ColorType::Indexed => {
                // EXPAND should have turned this into RGB(A).
                invalid_data!("Unexpected indexed PNG output");
            }
        };
        match Surface::from_rgba_data(frame.width, frame.height, rgba_data) {
            Ok(surface) => Ok(surface),
            Err(error) => invalid_data!("Malformed PNG data: {}", error),
        }
    }

    /// Encodes the surface as a PNG file.  Fully opaque surfaces are written
    /// as RGB, anything else as RGBA.
    pub fn write_png<W: Write>(&self, writer: W) -> io::Result<()> {
        self.write_png_internal(writer, self.has_alpha())
    }

    /// Encodes the surface as an 8-bit RGBA PNG (32 bits per pixel), even if
    /// it is fully opaque.
    pub fn write_rgba_png<W: Write>(&self, writer: W) -> io::Result<()> {
        self.write_png_internal(writer, true)
    }

    fn write_png_internal<W: Write>(
        &self,
        writer: W,
        with_alpha: bool,
    ) -> io::Result<()> {
        match self.write_png_enc(writer, with_alpha) {
            Ok(()) => Ok(()),
            Err(png::EncodingError::IoError(error)) => Err(error),
            Err(png::EncodingError::Format(error)) => {
                invalid_input!("PNG format error: {}", error);
            }
            Err(png::EncodingError::LimitsExceeded) => {
                invalid_input!("PNG limits exceeded");
            }
            Err(png::EncodingError::Parameter(error)) => {
                invalid_input!("PNG parameter error: {}", error);
            }
        }
    }

    /// Encodes the surface as a PNG and returns the encoded bytes.
    pub fn to_png(&self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write_png(&mut data)?;
        Ok(data)
    }

    /// Like `to_png`, but always RGBA.
    pub fn to_rgba_png(&self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write_rgba_png(&mut data)?;
        Ok(data)
    }

    fn write_png_enc<W: Write>(
        &self,
        writer: W,
        has_alpha: bool,
    ) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_depth(png::BitDepth::Eight);
        if has_alpha {
            encoder.set_color(png::ColorType::Rgba);
        } else {
            encoder.set_color(png::ColorType::Rgb);
        }
        let mut writer = encoder.write_header()?;
        if has_alpha {
            writer.write_image_data(&self.rgba_data)?;
        } else {
            let mut rgb_data =
                Vec::<u8>::with_capacity((self.rgba_data.len() / 4) * 3);
            for pixel in self.rgba_data.chunks_exact(4) {
                rgb_data.extend_from_slice(&pixel[..3]);
            }
            writer.write_image_data(&rgb_data)?;
        }
        writer.finish()
    }
}

//===========================================================================//


//===========================================================================//
