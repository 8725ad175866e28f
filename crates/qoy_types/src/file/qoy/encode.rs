//! QOY block stream encoder.
//!
//! ## Strategy
//!
//! Each block is predicted from the previous one and classified twice:
//! alpha first, then luma and chroma. Alpha that matches the prediction
//! emits nothing; otherwise the narrowest alpha chunk that holds the four
//! differences is chosen. The luma/chroma side picks the smallest chunk
//! whose field widths cover the observed differences, falling back to
//! full literals, or extends a run when every difference is zero.
//!
//! Runs are grown by rewriting the trailing run chunk in place: one byte
//! for a single repeat, then a two byte short form, then a three byte
//! long form. A written alpha chunk closes the current run, because the
//! decoder could otherwise not tell which block in the run the alpha
//! applies to.

use crate::file::QoyError;

use super::block::{Block, YccDiff};
use super::serial::BitWriter;
use super::{Channels, Header, PixelFormat, color, constants, ops};

/// One past the largest run count the encoder will grow a run to before
/// starting a new one
const RUN_SPLIT: u32 = 32770;

/// Encodes an RGB(A) or `YCbCr` 4:2:0 (A) pixel buffer into a QOY image in
/// memory.
///
/// `in_channels` describes the layout of `pixels` and need not match
/// `header.channels()`; alpha is synthesized as opaque or dropped as
/// needed. `in_format` selects between interleaved RGB(A) rows (converted
/// on the fly, lossy) and raw `YCbCrA` block rows (lossless).
///
/// Returns the complete file: header, block stream and end marker.
pub fn encode(
	pixels: &[u8],
	header: &Header,
	in_channels: Channels,
	in_format: PixelFormat,
) -> Result<Vec<u8>, QoyError> {
	let converted;
	let (src, src_channels) = match in_format {
		PixelFormat::Ycbcr420a => {
			let expected = color::ycbcra_size(header.width(), header.height(), in_channels);
			if pixels.len() < expected {
				return Err(QoyError::InsufficientData {
					expected,
					actual: pixels.len(),
				});
			}
			(&pixels[..expected], in_channels)
		}
		PixelFormat::Rgba => {
			let size = color::ycbcra_size(header.width(), header.height(), header.channels());
			let mut scratch = Vec::new();
			scratch.try_reserve_exact(size)?;
			scratch.resize(size, 0);
			color::rgba_to_ycbcra(
				pixels,
				header.width(),
				header.height(),
				in_channels,
				header.channels(),
				&mut scratch,
			)?;
			converted = scratch;
			(converted.as_slice(), header.channels())
		}
	};

	let block_bytes = if header.channels().has_alpha() { 12 } else { 7 };
	let max_size =
		Header::SIZE + header.block_count() * block_bytes + constants::PADDING.len();

	let mut encoder = Encoder::new(max_size, header.channels().has_alpha())?;
	encoder.writer.write_bytes(&header.to_bytes());

	let stride = Block::stride(src_channels);
	for chunk in src.chunks_exact(stride) {
		encoder.push(Block::from_ycbcra(chunk, src_channels));
	}

	Ok(encoder.finish())
}

/// State carried across blocks by the encoder
#[derive(Debug)]
struct Encoder {
	writer: BitWriter,
	prev: Block,
	run: u32,
	alpha: bool,
}

impl Encoder {
	fn new(capacity: usize, alpha: bool) -> Result<Self, QoyError> {
		Ok(Self {
			writer: BitWriter::with_capacity(capacity)?,
			prev: Block::initial(),
			run: 0,
			alpha,
		})
	}

	/// Encodes one block against the rolling prediction state.
	fn push(&mut self, block: Block) {
		let diff = block.ycc_diff(&self.prev);

		let alpha_written = if self.alpha { self.encode_alpha(&block) } else { false };

		if diff.is_zero() {
			self.run += 1;
			if alpha_written || self.run == RUN_SPLIT {
				self.run = 1;
			}
			self.extend_run();
		} else {
			self.run = 0;
			self.encode_ycc(&block, &diff);
		}

		self.prev = block;
	}

	/// Terminates the stream with the end marker and returns the encoded
	/// bytes.
	fn finish(mut self) -> Vec<u8> {
		self.writer.write_bytes(&constants::PADDING);
		self.writer.into_data()
	}

	/// Emits the alpha chunk for a block, or nothing when all four alpha
	/// samples repeat the prediction. Returns whether a chunk was
	/// written.
	fn encode_alpha(&mut self, block: &Block) -> bool {
		let a = block.a;
		if a[0] == a[1] && a[0] == a[2] && a[0] == a[3] {
			if a[0] == self.prev.a[2] {
				return false;
			}
			self.writer.write_u8(ops::OP_A18);
			self.writer.write_u8(a[0]);
			return true;
		}

		let da = block.alpha_diff(&self.prev);
		match alpha_bits(&da) {
			2 => {
				self.writer.write_u8(ops::OP_A42);
				for d in da {
					self.writer.write_bits(bias(d, 2), 2);
				}
			}
			4 => {
				self.writer.write_u8(ops::OP_A44);
				for d in da {
					self.writer.write_bits(bias(d, 8), 4);
				}
			}
			_ => {
				self.writer.write_u8(ops::OP_A48);
				self.writer.write_bytes(&a);
			}
		}
		true
	}

	/// Grows the trailing run chunk to cover `self.run` blocks, rewriting
	/// the previously emitted bytes in place.
	fn extend_run(&mut self) {
		match self.run {
			1 => self.writer.write_u8(ops::OP_RUN_1),
			2 => {
				let end = self.writer.len();
				self.writer.patch(end - 1, ops::OP_RUN_X);
				self.writer.write_u8(0);
			}
			3..=129 => {
				let end = self.writer.len();
				self.writer.patch(end - 1, (self.run - 2) as u8);
			}
			_ => {
				if self.run == 130 {
					self.writer.write_u8(0);
				}
				let count = self.run - 130;
				let end = self.writer.len();
				self.writer.patch(end - 2, 0x80 | (count >> 8) as u8);
				self.writer.patch(end - 1, (count & 0xff) as u8);
			}
		}
	}

	/// Emits the smallest luma/chroma chunk whose field widths cover the
	/// block's differences.
	fn encode_ycc(&mut self, block: &Block, diff: &YccDiff) {
		let y_bits = luma_bits(&diff.y);
		let cb_bits = cb_bits(diff.cb);
		let cr_bits = cr_bits(diff.cr);
		let w = &mut self.writer;

		if y_bits <= 3 && cb_bits <= 2 && cr_bits <= 1 {
			w.write_bits(0b0, 1);
			for d in diff.y {
				w.write_bits(bias(d, 4), 3);
			}
			w.write_bits(bias(diff.cb, 2), 2);
			w.write_bits(bias(diff.cr, 1), 1);
		} else if y_bits <= 4 && cb_bits <= 3 && cr_bits <= 3 {
			w.write_bits(0b10, 2);
			for d in diff.y {
				w.write_bits(bias(d, 8), 4);
			}
			w.write_bits(bias(diff.cb, 4), 3);
			w.write_bits(bias(diff.cr, 4), 3);
		} else if y_bits <= 5 && cb_bits <= 5 && cr_bits <= 4 {
			w.write_bits(0b110, 3);
			for d in diff.y {
				w.write_bits(bias(d, 16), 5);
			}
			w.write_bits(bias(diff.cb, 16), 5);
			w.write_bits(bias(diff.cr, 8), 4);
		} else if y_bits <= 6 && cb_bits <= 6 && cr_bits <= 6 {
			w.write_bits(0b1110, 4);
			for d in diff.y {
				w.write_bits(bias(d, 32), 6);
			}
			w.write_bits(bias(diff.cb, 32), 6);
			w.write_bits(bias(diff.cr, 32), 6);
		} else if cb_bits <= 6 && cr_bits <= 5 {
			w.write_bits(0b11110, 5);
			for d in diff.y {
				w.write_bits(bias(d, 128), 8);
			}
			w.write_bits(bias(diff.cb, 32), 6);
			w.write_bits(bias(diff.cr, 16), 5);
		} else {
			w.write_u8(ops::OP_888);
			w.write_bytes(&block.y);
			w.write_u8(block.cb);
			w.write_u8(block.cr);
		}
	}
}

/// Adds the field bias, mapping a signed difference onto its unsigned
/// bit-field value.
fn bias(diff: i8, bias: i32) -> u32 {
	(i32::from(diff) + bias) as u32
}

fn min_max(diffs: &[i8; 4]) -> (i8, i8) {
	let mut min = diffs[0];
	let mut max = diffs[0];
	for &d in &diffs[1..] {
		if d < min {
			min = d;
		}
		if d > max {
			max = d;
		}
	}
	(min, max)
}

/// Smallest luma field width (from the widths the chunk set offers) that
/// holds all four differences
fn luma_bits(diffs: &[i8; 4]) -> u32 {
	let (min, max) = min_max(diffs);
	if min >= -4 && max < 4 {
		3
	} else if min >= -8 && max < 8 {
		4
	} else if min >= -16 && max < 16 {
		5
	} else if min >= -32 && max < 32 {
		6
	} else {
		8
	}
}

/// Smallest cb field width that holds the difference. The chunk set has
/// no 4-bit cb field, so that rung is absent.
fn cb_bits(diff: i8) -> u32 {
	if (-2..2).contains(&diff) {
		2
	} else if (-4..4).contains(&diff) {
		3
	} else if (-16..16).contains(&diff) {
		5
	} else if (-32..32).contains(&diff) {
		6
	} else {
		8
	}
}

/// Smallest cr field width that holds the difference. The chunk set has
/// no 2-bit cr field, so that rung is absent.
fn cr_bits(diff: i8) -> u32 {
	if (-1..1).contains(&diff) {
		1
	} else if (-4..4).contains(&diff) {
		3
	} else if (-8..8).contains(&diff) {
		4
	} else if (-16..16).contains(&diff) {
		5
	} else if (-32..32).contains(&diff) {
		6
	} else {
		8
	}
}

/// Smallest alpha field width that holds all four differences
fn alpha_bits(diffs: &[i8; 4]) -> u32 {
	let (min, max) = min_max(diffs);
	if min >= -2 && max < 2 {
		2
	} else if min >= -8 && max < 8 {
		4
	} else {
		8
	}
}
