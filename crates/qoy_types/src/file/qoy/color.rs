//! RGBA to `YCbCr` 4:2:0 A conversion and buffer sizing.
//!
//! Integer approximations of the JPEG full-range conversion. Y and alpha
//! are computed per pixel; Cb and Cr are computed once per 2x2 block from
//! the averaged RGB inputs. Conversion is lossy in both directions, which
//! is why the codec round-trips bit exactly only on `YCbCrA` buffers.
//!
//! Odd dimensions are handled at this boundary: an odd width repeats the
//! last pixel of each row, an odd height repeats the last row. Converting
//! back drops the repeated column and row again.

use crate::file::QoyError;

use super::{Block, Channels};

/// Returns the size in bytes of a `YCbCr` 4:2:0 (A) buffer for an image of
/// the given dimensions.
///
/// One 2x2 block contributes 4 Y + 1 Cb + 1 Cr (+ 4 A) samples over two
/// rows, so a buffer holds `ceil(height / 2)` block rows of
/// `round_up_even(width) / 2` blocks each.
pub fn ycbcra_size(width: u32, height: u32, channels: Channels) -> usize {
	let rows = (height as usize + 1) >> 1;
	let internal_width = (width as usize + 1) & !0x01;
	rows * (internal_width >> 1) * Block::stride(channels)
}

fn clamp_8bit(value: i32) -> u8 {
	value.clamp(0, 255) as u8
}

/// Converts a buffer from RGBA to `YCbCrA` colorspace.
///
/// `channels_in` and `channels_out` may differ; alpha missing from the
/// input reads as fully opaque. The output buffer must hold at least
/// [`ycbcra_size`]`(width, height, channels_out)` bytes.
///
/// Returns the number of bytes written.
pub fn rgba_to_ycbcra(
	rgba: &[u8],
	width: u32,
	height: u32,
	channels_in: Channels,
	channels_out: Channels,
	out: &mut [u8],
) -> Result<usize, QoyError> {
	let w = width as usize;
	let h = height as usize;

	let expected_in = w * h * channels_in.bytes_per_pixel();
	if rgba.len() < expected_in {
		return Err(QoyError::InsufficientData {
			expected: expected_in,
			actual: rgba.len(),
		});
	}
	let expected_out = ycbcra_size(width, height, channels_out);
	if out.len() < expected_out {
		return Err(QoyError::InsufficientData {
			expected: expected_out,
			actual: out.len(),
		});
	}

	let bpp = channels_in.bytes_per_pixel();
	let row_bytes = block_row_bytes(w, channels_out);
	let mut written = 0;
	for y in (0..h).step_by(2) {
		let lines = if h % 2 == 1 && y == h - 1 { 1 } else { 2 };
		let src = &rgba[y * w * bpp..][..lines * w * bpp];
		let dst = &mut out[(y >> 1) * row_bytes..][..row_bytes];
		written += rgba_to_ycbcra_lines(src, w, lines, channels_in, channels_out, dst);
	}

	Ok(written)
}

/// Converts a buffer from `YCbCrA` to RGBA colorspace.
///
/// `channels_in` and `channels_out` may differ; alpha missing from the
/// input reads as fully opaque. The output buffer must hold at least
/// `width * height * channels_out` bytes.
///
/// Returns the number of bytes written.
pub fn ycbcra_to_rgba(
	ycbcra: &[u8],
	width: u32,
	height: u32,
	channels_in: Channels,
	channels_out: Channels,
	out: &mut [u8],
) -> Result<usize, QoyError> {
	let w = width as usize;
	let h = height as usize;

	let expected_in = ycbcra_size(width, height, channels_in);
	if ycbcra.len() < expected_in {
		return Err(QoyError::InsufficientData {
			expected: expected_in,
			actual: ycbcra.len(),
		});
	}
	let bpp = channels_out.bytes_per_pixel();
	let expected_out = w * h * bpp;
	if out.len() < expected_out {
		return Err(QoyError::InsufficientData {
			expected: expected_out,
			actual: out.len(),
		});
	}

	let row_bytes = block_row_bytes(w, channels_in);
	let mut written = 0;
	for y in (0..h).step_by(2) {
		let lines = if h % 2 == 1 && y == h - 1 { 1 } else { 2 };
		let src = &ycbcra[(y >> 1) * row_bytes..][..row_bytes];
		let dst = &mut out[y * w * bpp..][..lines * w * bpp];
		written += ycbcra_to_rgba_lines(src, w, lines, channels_in, channels_out, dst);
	}

	Ok(written)
}

/// Bytes one row of blocks (two pixel rows) occupies
fn block_row_bytes(width: usize, channels: Channels) -> usize {
	(((width + 1) & !0x01) >> 1) * Block::stride(channels)
}

/// Converts up to two RGB(A) rows into one row of `YCbCrA` blocks.
///
/// `lines == 1` repeats the single input row; an odd `width` repeats the
/// last pixel of each row.
fn rgba_to_ycbcra_lines(
	src: &[u8],
	width: usize,
	lines: usize,
	channels_in: Channels,
	channels_out: Channels,
	dst: &mut [u8],
) -> usize {
	let bpp = channels_in.bytes_per_pixel();
	let stride = Block::stride(channels_out);
	let line2 = if lines == 2 { width * bpp } else { 0 };

	let sample = |line_offset: usize, column: usize| -> [u8; 4] {
		let px = &src[line_offset + column * bpp..];
		let a = if channels_in.has_alpha() { px[3] } else { 255 };
		[px[0], px[1], px[2], a]
	};

	let mut written = 0;
	for (bx, out) in dst.chunks_exact_mut(stride).enumerate() {
		let column = bx * 2;
		let column2 = if column + 1 < width { column + 1 } else { column };
		let px = [
			sample(0, column),
			sample(line2, column),
			sample(0, column2),
			sample(line2, column2),
		];

		let mut block = Block {
			y: [0; 4],
			cb: 0,
			cr: 0,
			a: [255; 4],
		};
		for (k, &[r, g, b, a]) in px.iter().enumerate() {
			let luma = 1_254_097 * u32::from(r) + 2_462_056 * u32::from(g) + 478_151 * u32::from(b);
			block.y[k] = (luma >> 22) as u8;
			block.a[k] = a;
		}

		let r4 = px.iter().map(|p| i32::from(p[0])).sum::<i32>();
		let g4 = px.iter().map(|p| i32::from(p[1])).sum::<i32>();
		let b4 = px.iter().map(|p| i32::from(p[2])).sum::<i32>();
		block.cb =
			clamp_8bit((134_217_728 - 44_233 * r4 - 86_839 * g4 + (b4 << 17) + (1 << 19)) >> 20);
		block.cr =
			clamp_8bit((134_217_728 + (r4 << 17) - 109_757 * g4 - 21_315 * b4 + (1 << 19)) >> 20);

		block.write_ycbcra(out, channels_out);
		written += stride;
	}

	written
}

/// Converts one row of `YCbCrA` blocks into up to two RGB(A) rows.
fn ycbcra_to_rgba_lines(
	src: &[u8],
	width: usize,
	lines: usize,
	channels_in: Channels,
	channels_out: Channels,
	dst: &mut [u8],
) -> usize {
	let bpp = channels_out.bytes_per_pixel();
	let stride = Block::stride(channels_in);
	let line2 = if lines == 2 { width * bpp } else { 0 };

	let mut written = 0;
	for (bx, chunk) in src.chunks_exact(stride).enumerate() {
		let block = Block::from_ycbcra(chunk, channels_in);
		let column = bx * 2;
		let column2 = if column + 1 < width { column + 1 } else { column };

		let r_diff = (11_760_828 * (i32::from(block.cr) - 128)) >> 23;
		let g_diff = (2_886_822 * (i32::from(block.cb) - 128)
			+ 5_990_607 * (i32::from(block.cr) - 128))
			>> 23;
		let b_diff = (14_864_613 * (i32::from(block.cb) - 128)) >> 23;

		let targets = [
			(0, column, 0),
			(line2, column, 1),
			(0, column2, 2),
			(line2, column2, 3),
		];
		for (line_offset, col, k) in targets {
			let luma = i32::from(block.y[k]);
			let px = &mut dst[line_offset + col * bpp..][..bpp];
			px[0] = clamp_8bit(luma + r_diff);
			px[1] = clamp_8bit(luma - g_diff);
			px[2] = clamp_8bit(luma + b_diff);
			if channels_out.has_alpha() {
				px[3] = block.a[k];
			}
		}
		written += bpp * 4;
	}

	written
}
