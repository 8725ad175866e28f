//! QOY block stream decoder.
//!
//! ## Dispatch
//!
//! Each block starts with one tag byte. When the image carries alpha and
//! no run is active, the byte is first tested against the shared alpha
//! prefix (`111110..`): a match applies the alpha chunk and a second tag
//! byte follows for the luma/chroma side, while a miss repeats the
//! previous block's top-right alpha into all four slots. The luma/chroma
//! tag is then matched exact-first (`EOF`, `RUN_1`, `RUN_X`, `888`) and
//! otherwise by prefix from longest mask to shortest.
//!
//! A run chunk primes a counter; while it is positive, subsequent blocks
//! repeat the prediction recurrence without touching the stream at all.
//! The alpha repeat rule applies to those blocks as well.

use crate::file::QoyError;

use super::serial::BitReader;
use super::{Block, Channels, Header, PixelFormat, color, constants, ops};

/// Decodes a QOY image from memory.
///
/// `out_channels` forces the channel count of the returned pixel data;
/// `None` uses the channel count from the file header. Alpha missing
/// from the stream is synthesized as opaque, alpha missing from the
/// requested layout is dropped. `out_format` selects between interleaved
/// RGB(A) rows (converted, lossy) and raw `YCbCrA` block rows (lossless).
///
/// Returns the parsed header and the pixel data.
pub fn decode(
	data: &[u8],
	out_channels: Option<Channels>,
	out_format: PixelFormat,
) -> Result<(Header, Vec<u8>), QoyError> {
	let min_size = Header::SIZE + constants::PADDING.len();
	if data.len() < min_size {
		return Err(QoyError::InsufficientData {
			expected: min_size,
			actual: data.len(),
		});
	}

	let header = Header::from_bytes(data)?;
	let out_channels = out_channels.unwrap_or(header.channels());

	let ycc_size = color::ycbcra_size(header.width(), header.height(), out_channels);
	let mut ycc = Vec::new();
	ycc.try_reserve_exact(ycc_size)?;
	ycc.resize(ycc_size, 0);

	let chunks = &data[Header::SIZE..data.len() - constants::PADDING.len()];
	let mut decoder = Decoder {
		reader: BitReader::new(chunks),
		px: Block::initial(),
		run: 0,
		alpha: header.channels().has_alpha(),
	};

	let stride = Block::stride(out_channels);
	for slot in ycc.chunks_exact_mut(stride) {
		let block = decoder.next_block()?;
		block.write_ycbcra(slot, out_channels);
	}

	let pixels = match out_format {
		PixelFormat::Ycbcr420a => ycc,
		PixelFormat::Rgba => {
			let rgba_size = header.width() as usize
				* header.height() as usize
				* out_channels.bytes_per_pixel();
			let mut rgba = Vec::new();
			rgba.try_reserve_exact(rgba_size)?;
			rgba.resize(rgba_size, 0);
			color::ycbcra_to_rgba(
				&ycc,
				header.width(),
				header.height(),
				out_channels,
				out_channels,
				&mut rgba,
			)?;
			rgba
		}
	};

	Ok((header, pixels))
}

/// State carried across blocks by the decoder
#[derive(Debug)]
struct Decoder<'a> {
	reader: BitReader<'a>,
	px: Block,
	run: u32,
	alpha: bool,
}

impl Decoder<'_> {
	/// Decodes the next block, mutating the rolling prediction state.
	fn next_block(&mut self) -> Result<Block, QoyError> {
		if self.run > 0 {
			self.run -= 1;
			self.repeat_luma();
			if self.alpha {
				self.px.a = [self.px.a[2]; 4];
			}
			return Ok(self.px);
		}

		if self.alpha {
			let tag = self.reader.peek_u8()?;
			if tag & ops::OP_A_MASK == ops::OP_A_ANY {
				self.reader.read_u8()?;
				self.apply_alpha(tag)?;
			} else {
				self.px.a[0] = self.px.a[2];
				self.px.a[1] = self.px.a[2];
				self.px.a[3] = self.px.a[2];
			}
		}

		let tag = self.reader.peek_u8()?;
		if tag == ops::OP_EOF {
			return Err(QoyError::UnexpectedEofTag {
				offset: self.offset(),
			});
		}

		if tag == ops::OP_RUN_1 {
			self.reader.read_u8()?;
			self.repeat_luma();
		} else if tag == ops::OP_RUN_X {
			self.reader.read_u8()?;
			self.repeat_luma();
			let count = if self.reader.read_bits(1)? == 0 {
				self.reader.read_bits(7)? + 2
			} else {
				self.reader.read_bits(15)? + 130
			};
			self.run = count - 1;
		} else if tag == ops::OP_888 {
			self.reader.read_u8()?;
			for y in &mut self.px.y {
				*y = self.reader.read_u8()?;
			}
			self.px.cb = self.reader.read_u8()?;
			self.px.cr = self.reader.read_u8()?;
		} else if tag & ops::OP_865_MASK == ops::OP_865 {
			self.reader.read_bits(5)?;
			self.apply_ycc_diff(8, 128, 6, 32, 5, 16)?;
		} else if tag & ops::OP_666_MASK == ops::OP_666 {
			self.reader.read_bits(4)?;
			self.apply_ycc_diff(6, 32, 6, 32, 6, 32)?;
		} else if tag & ops::OP_554_MASK == ops::OP_554 {
			self.reader.read_bits(3)?;
			self.apply_ycc_diff(5, 16, 5, 16, 4, 8)?;
		} else if tag & ops::OP_433_MASK == ops::OP_433 {
			self.reader.read_bits(2)?;
			self.apply_ycc_diff(4, 8, 3, 4, 3, 4)?;
		} else if tag & ops::OP_321_MASK == ops::OP_321 {
			self.reader.read_bits(1)?;
			self.apply_ycc_diff(3, 4, 2, 2, 1, 1)?;
		} else {
			// Only reachable for an alpha tag in a stream without alpha,
			// or an alpha tag where a luma/chroma tag is required
			return Err(QoyError::InvalidTag {
				tag,
				offset: self.offset(),
			});
		}

		Ok(self.px)
	}

	/// Absolute file offset of the next unread byte, for error reporting
	fn offset(&self) -> usize {
		Header::SIZE + self.reader.position()
	}

	/// The run recurrence for the luma plane: both columns collapse to
	/// the previous block's right column.
	fn repeat_luma(&mut self) {
		self.px.y[0] = self.px.y[2];
		self.px.y[1] = self.px.y[3];
	}

	/// Applies one alpha chunk to the prediction state.
	fn apply_alpha(&mut self, tag: u8) -> Result<(), QoyError> {
		match tag {
			ops::OP_A18 => {
				let a = self.reader.read_u8()?;
				self.px.a = [a; 4];
			}
			ops::OP_A42 => {
				let d0 = self.reader.read_bits(2)? as u8;
				let d1 = self.reader.read_bits(2)? as u8;
				let d2 = self.reader.read_bits(2)? as u8;
				let d3 = self.reader.read_bits(2)? as u8;
				self.px.a[0] = self.px.a[2].wrapping_add(d0).wrapping_sub(2);
				self.px.a[1] = self.px.a[3].wrapping_add(d1).wrapping_sub(2);
				self.px.a[2] = self.px.a[0].wrapping_add(d2).wrapping_sub(2);
				self.px.a[3] = self.px.a[1].wrapping_add(d3).wrapping_sub(2);
			}
			ops::OP_A44 => {
				let d0 = self.reader.read_bits(4)? as u8;
				let d1 = self.reader.read_bits(4)? as u8;
				let d2 = self.reader.read_bits(4)? as u8;
				let d3 = self.reader.read_bits(4)? as u8;
				self.px.a[0] = self.px.a[2].wrapping_add(d0).wrapping_sub(8);
				self.px.a[1] = self.px.a[3].wrapping_add(d1).wrapping_sub(8);
				self.px.a[2] = self.px.a[0].wrapping_add(d2).wrapping_sub(8);
				self.px.a[3] = self.px.a[1].wrapping_add(d3).wrapping_sub(8);
			}
			_ => {
				for a in &mut self.px.a {
					*a = self.reader.read_u8()?;
				}
			}
		}
		Ok(())
	}

	/// Reads the six biased difference fields of a luma/chroma chunk and
	/// applies them to the prediction state.
	///
	/// Application order matters: `y[0]`/`y[1]` rebase on the previous
	/// block's right column before `y[2]`/`y[3]` rebase on the freshly
	/// decoded left column.
	fn apply_ycc_diff(
		&mut self,
		y_bits: u32,
		y_bias: u8,
		cb_bits: u32,
		cb_bias: u8,
		cr_bits: u32,
		cr_bias: u8,
	) -> Result<(), QoyError> {
		let d0 = self.reader.read_bits(y_bits)? as u8;
		let d1 = self.reader.read_bits(y_bits)? as u8;
		let d2 = self.reader.read_bits(y_bits)? as u8;
		let d3 = self.reader.read_bits(y_bits)? as u8;
		let dcb = self.reader.read_bits(cb_bits)? as u8;
		let dcr = self.reader.read_bits(cr_bits)? as u8;

		self.px.y[0] = self.px.y[2].wrapping_add(d0).wrapping_sub(y_bias);
		self.px.y[1] = self.px.y[3].wrapping_add(d1).wrapping_sub(y_bias);
		self.px.y[2] = self.px.y[0].wrapping_add(d2).wrapping_sub(y_bias);
		self.px.y[3] = self.px.y[1].wrapping_add(d3).wrapping_sub(y_bias);
		self.px.cb = self.px.cb.wrapping_add(dcb).wrapping_sub(cb_bias);
		self.px.cr = self.px.cr.wrapping_add(dcr).wrapping_sub(cr_bias);

		Ok(())
	}
}
