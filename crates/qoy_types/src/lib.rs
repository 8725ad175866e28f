//! This crate provides core data types and QOY image format support for
//! the `qoy-rs` project.
//!
//! QOY ("Quite OK `YCbCr420A`") stores images as `YCbCr` 4:2:0 blocks with an
//! optional alpha plane. Coding `YCbCrA` buffers is lossless; RGBA buffers
//! are converted on the fly, which is lossy.
//!
//! # Examples
//!
//! ```rust
//! use qoy_types::file::qoy::{Channels, Colorspace, Header, PixelFormat, decode, encode};
//!
//! # fn main() -> Result<(), qoy_types::QoyError> {
//! // Encode a 2x2 opaque red image from RGBA pixels
//! let header = Header::new(2, 2, Channels::Rgba, Colorspace::Srgb)?;
//! let pixels = [200u8, 30, 30, 255].repeat(4);
//! let encoded = encode(&pixels, &header, Channels::Rgba, PixelFormat::Rgba)?;
//!
//! // And decode it back
//! let (decoded_header, decoded) = decode(&encoded, None, PixelFormat::Rgba)?;
//! assert_eq!(decoded_header.width(), 2);
//! assert_eq!(decoded.len(), pixels.len());
//! # Ok(())
//! # }
//! ```

pub mod file;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	Channels, Colorspace, PixelFormat, QoyError, QoyFile, QoyHeader, decode, encode,
	rgba_to_ycbcra, ycbcra_size, ycbcra_to_rgba,
};
