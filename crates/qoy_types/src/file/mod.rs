//! File format support for the `qoy-rs` project.

mod error;

pub mod qoy;

// Re-export unified error type
pub use error::QoyError;

// Re-export main file types
pub use qoy::{
	Channels, Colorspace, File as QoyFile, Header as QoyHeader, PixelFormat, decode, encode,
	rgba_to_ycbcra, ycbcra_size, ycbcra_to_rgba,
};
