//! Error types for QOY encoding and decoding.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur when encoding or decoding QOY images
#[derive(Debug, Error)]
pub enum QoyError {
	/// Image width or height is zero
	#[error("Invalid image dimensions: {width}x{height}")]
	InvalidDimensions {
		/// Declared width in pixels
		width: u32,
		/// Declared height in pixels
		height: u32,
	},

	/// Internal pixel count exceeds the supported maximum
	#[error("Image too large: {width}x{height} exceeds the {max} pixel limit")]
	ImageTooLarge {
		/// Declared width in pixels
		width: u32,
		/// Declared height in pixels
		height: u32,
		/// Maximum supported internal pixel count
		max: u64,
	},

	/// Channel count other than 3 (no alpha) or 4 (alpha)
	#[error("Invalid channel count: {0}")]
	InvalidChannels(u8),

	/// Colorspace byte other than 0 (`sRGB`) or 1 (linear)
	#[error("Invalid colorspace: {0}")]
	InvalidColorspace(u8),

	/// Invalid magic number
	#[error("Invalid magic number: expected {expected:02X?}, got {actual:02X?}")]
	InvalidMagic {
		/// Expected magic bytes
		expected: [u8; 4],
		/// Actual magic bytes
		actual: [u8; 4],
	},

	/// Not enough data to parse
	#[error("Insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// End-of-file tag inside the block stream
	#[error("Unexpected end-of-file tag at offset {offset}")]
	UnexpectedEofTag {
		/// Byte offset of the offending tag
		offset: usize,
	},

	/// Tag byte that no chunk encoding matches
	#[error("Invalid tag byte {tag:#04x} at offset {offset}")]
	InvalidTag {
		/// The offending tag byte
		tag: u8,
		/// Byte offset of the offending tag
		offset: usize,
	},

	/// Buffer allocation failed
	#[error("Allocation failed: {0}")]
	Allocation(#[from] TryReserveError),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
