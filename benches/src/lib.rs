//! Benchmark helper utilities for qoy-rs
//!
//! This module generates synthetic RGBA test images with different
//! compression characteristics:
//!
//! - solid images compress almost entirely into runs
//! - gradients exercise the narrow difference chunks
//! - noise forces the wide chunks and the literal fallback

/// Generates a solid color RGBA image
pub fn solid_rgba(width: u32, height: u32) -> Vec<u8> {
	let mut data = Vec::with_capacity(width as usize * height as usize * 4);
	for _ in 0..width as usize * height as usize {
		data.extend_from_slice(&[90, 120, 180, 255]);
	}
	data
}

/// Generates a diagonal gradient RGBA image
pub fn gradient_rgba(width: u32, height: u32) -> Vec<u8> {
	let mut data = Vec::with_capacity(width as usize * height as usize * 4);
	for y in 0..height {
		for x in 0..width {
			let r = ((x * 255) / width.max(1)) as u8;
			let g = ((y * 255) / height.max(1)) as u8;
			let b = ((x + y) % 256) as u8;
			data.extend_from_slice(&[r, g, b, 255]);
		}
	}
	data
}

/// Generates a deterministic noise RGBA image
///
/// Uses a fixed-seed xorshift generator so every run benchmarks the same
/// input.
pub fn noise_rgba(width: u32, height: u32) -> Vec<u8> {
	let mut state = 0x2545_f491u32;
	let mut data = Vec::with_capacity(width as usize * height as usize * 4);
	for _ in 0..width as usize * height as usize * 4 {
		state ^= state << 13;
		state ^= state >> 17;
		state ^= state << 5;
		data.push(state as u8);
	}
	data
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Tiny image: 64x64 (4,096 pixels)
	pub const TINY: (u32, u32) = (64, 64);
	/// Small image: 256x256 (65,536 pixels)
	pub const SMALL: (u32, u32) = (256, 256);
	/// Medium image: 512x512 (262,144 pixels)
	pub const MEDIUM: (u32, u32) = (512, 512);
	/// Large image: 1920x1080 (2,073,600 pixels) - HD resolution
	pub const LARGE: (u32, u32) = (1920, 1080);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generators_produce_full_buffers() {
		assert_eq!(solid_rgba(8, 4).len(), 8 * 4 * 4);
		assert_eq!(gradient_rgba(8, 4).len(), 8 * 4 * 4);
		assert_eq!(noise_rgba(8, 4).len(), 8 * 4 * 4);
	}

	#[test]
	fn test_noise_is_deterministic() {
		assert_eq!(noise_rgba(16, 16), noise_rgba(16, 16));
	}
}
