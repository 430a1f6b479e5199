//! A library for packing a rasterized image into ICO files.
//!
//! An [`IcoEncoder`] asks a [`Rasterizer`] to draw one source image at each
//! requested square size, PNG-encodes every result, and writes them out
//! behind an ICO header and directory:
//!
//! ```no_run
//! use icopack::{open_image, IcoEncoder, ImageRasterizer};
//!
//! let source = open_image("logo.png").unwrap();
//! let encoder = IcoEncoder::new(ImageRasterizer::default());
//! let ico = encoder.encode(&source, &[16, 32, 256]).unwrap();
//! std::fs::write("favicon.ico", ico.as_bytes()).unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod directory;
mod encoder;
mod error;
mod raster;
mod surface;

pub use crate::directory::{
    DirectoryLayout, IcoDirEntry, IcoDirectory, IconSize, ENTRY_LEN,
    HEADER_LEN, MAX_ICON_SIZE,
};
pub use crate::encoder::{
    EncodeOptions, IcoEncoder, IcoFile, Rasterizer, DEFAULT_SIZES,
    ICO_MIME_TYPE,
};
pub use crate::error::IcoError;
pub use crate::raster::{load_image, open_image, ImageRasterizer};
pub use crate::surface::Surface;

// Re-exported so callers can pick a resampling filter without depending on
// `image` themselves.
pub use image::imageops::FilterType;
