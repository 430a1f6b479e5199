use crate::directory::{
    write_ico, DirectoryLayout, IconSize, PNG_SIGNATURE,
};
use crate::error::IcoError;
use crate::surface::Surface;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io;

//===========================================================================//

/// The sizes encoded when the caller doesn't ask for any in particular.
pub const DEFAULT_SIZES: &[u32] = &[16, 32, 64];

/// The MIME type of an ICO file.
pub const ICO_MIME_TYPE: &str = "image/x-icon";

//===========================================================================//

/// Renders a source image into square pixel surfaces and PNG-encodes them.
pub trait Rasterizer {
    /// The decoded image this rasterizer draws from.
    type Source: ?Sized;

    /// Draws `source` into a new `size × size` surface.
    fn rasterize(
        &self,
        source: &Self::Source,
        size: IconSize,
    ) -> io::Result<Surface>;

    /// Encodes a surface as PNG data.  Directory entries declare 32 bits
    /// per pixel, so the PNG should be 8-bit RGBA.
    fn encode_png(&self, surface: &Surface) -> io::Result<Vec<u8>> {
        surface.to_rgba_png()
    }
}

impl<'a, R: Rasterizer + ?Sized> Rasterizer for &'a R {
    type Source = R::Source;

    fn rasterize(
        &self,
        source: &Self::Source,
        size: IconSize,
    ) -> io::Result<Surface> {
        (**self).rasterize(source, size)
    }

    fn encode_png(&self, surface: &Surface) -> io::Result<Vec<u8>> {
        (**self).encode_png(surface)
    }
}

//===========================================================================//

/// Settings for an [`IcoEncoder`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodeOptions {
    /// The pixel sizes to encode, in directory order.
    pub sizes: Vec<u32>,
    /// How directory entries are packed.
    pub layout: DirectoryLayout,
}

impl Default for EncodeOptions {
    fn default() -> EncodeOptions {
        EncodeOptions {
            sizes: DEFAULT_SIZES.to_vec(),
            layout: DirectoryLayout::default(),
        }
    }
}

//===========================================================================//

/// An encoded ICO file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcoFile {
    data: Vec<u8>,
}

impl IcoFile {
    /// Returns the MIME type of the file, `image/x-icon`.
    pub fn mime_type(&self) -> &'static str {
        ICO_MIME_TYPE
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the file, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the length of the file, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the file has no bytes, which never happens for a
    /// successfully encoded file.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for IcoFile {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

//===========================================================================//

/// Rasterizes a source image at several sizes and packs the PNG-encoded
/// results into an ICO file.
pub struct IcoEncoder<R> {
    rasterizer: R,
    layout: DirectoryLayout,
}

impl<R: Rasterizer> IcoEncoder<R> {
    /// Creates an encoder that writes the canonical directory layout.
    pub fn new(rasterizer: R) -> IcoEncoder<R> {
        IcoEncoder { rasterizer, layout: DirectoryLayout::default() }
    }

    /// Sets how directory entries are packed.
    pub fn with_layout(mut self, layout: DirectoryLayout) -> IcoEncoder<R> {
        self.layout = layout;
        self
    }

    /// Returns the directory layout this encoder writes.
    pub fn layout(&self) -> DirectoryLayout {
        self.layout
    }

    /// Returns the underlying rasterizer.
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Encodes `source` at each of `sizes`, in order.  Fails with
    /// `IcoError::InvalidInput` before doing any work if `sizes` is empty or
    /// holds a size outside `1..=256`, and with `IcoError::Encoding` if any
    /// size can't be rasterized or PNG-encoded.
    pub fn encode(
        &self,
        source: &R::Source,
        sizes: &[u32],
    ) -> Result<IcoFile, IcoError> {
        let sizes = IconSize::parse_list(sizes)?;
        let _span = tracing::debug_span!("encode_ico", count = sizes.len())
            .entered();
        let mut payloads = Vec::with_capacity(sizes.len());
        for &size in sizes.iter() {
            payloads.push((size, self.render(source, size)?));
        }
        self.assemble(payloads)
    }

    /// Creates an encoder with `rasterizer` and encodes `source` using the
    /// sizes and layout from `options`.
    pub fn encode_with_options(
        rasterizer: R,
        options: &EncodeOptions,
        source: &R::Source,
    ) -> Result<IcoFile, IcoError> {
        IcoEncoder::new(rasterizer)
            .with_layout(options.layout)
            .encode(source, &options.sizes)
    }

    /// Like `encode`, but renders every size concurrently on the rayon
    /// thread pool.  The output is byte-for-byte identical to `encode`.
    pub fn encode_parallel(
        &self,
        source: &R::Source,
        sizes: &[u32],
    ) -> Result<IcoFile, IcoError>
    where
        R: Sync,
        R::Source: Sync,
    {
        let sizes = IconSize::parse_list(sizes)?;
        let _span =
            tracing::debug_span!("encode_ico_parallel", count = sizes.len())
                .entered();
        // Collecting into a Result keeps input order and stops at the first
        // failure.
        let payloads = sizes
            .par_iter()
            .map(|&size| self.render(source, size).map(|png| (size, png)))
            .collect::<Result<Vec<_>, IcoError>>()?;
        self.assemble(payloads)
    }

    fn render(
        &self,
        source: &R::Source,
        size: IconSize,
    ) -> Result<Vec<u8>, IcoError> {
        let encoding_error = |error: io::Error| IcoError::Encoding {
            size: size.pixels(),
            source: error,
        };
        let surface =
            self.rasterizer.rasterize(source, size).map_err(encoding_error)?;
        if surface.width() != size.pixels() || surface.height() != size.pixels()
        {
            return Err(encoding_error(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Rasterizer produced a {}x{} surface",
                    surface.width(),
                    surface.height()
                ),
            )));
        }
        let png =
            self.rasterizer.encode_png(&surface).map_err(encoding_error)?;
        if !png.starts_with(PNG_SIGNATURE) {
            return Err(encoding_error(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Rasterizer produced {} bytes of non-PNG data",
                    png.len()
                ),
            )));
        }
        tracing::trace!(
            size = size.pixels(),
            bytes = png.len(),
            "Rendered icon"
        );
        Ok(png)
    }

    fn assemble(
        &self,
        payloads: Vec<(IconSize, Vec<u8>)>,
    ) -> Result<IcoFile, IcoError> {
        let data = write_ico(&payloads, self.layout)?;
        tracing::debug!(
            images = payloads.len(),
            bytes = data.len(),
            layout = ?self.layout,
            "Assembled ICO file"
        );
        Ok(IcoFile { data })
    }
}

//===========================================================================//


//===========================================================================//
