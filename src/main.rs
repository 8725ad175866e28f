//! QOY image format command line utility
//!
//! Converts between common raster formats (PNG, BMP, ...) and `.qoy`
//! files, and inspects `.qoy` headers without decoding.
//!
//! # Usage
//!
//! ```bash
//! # Encode a PNG file to QOY
//! qoy-rs encode input.png output.qoy
//!
//! # Decode a QOY file to PNG
//! qoy-rs decode input.qoy output.png
//!
//! # Show the header of a QOY file
//! qoy-rs info image.qoy --json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use qoy_types::file::qoy::{self, Channels, Colorspace, Header, PixelFormat};

#[derive(Parser)]
#[command(name = "qoy-rs")]
#[command(version)]
#[command(about = "QOY image format utility - encode, decode, and inspect .qoy files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Encode an image file to QOY format
	Encode {
		/// Input image path (any format the image crate can read)
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output QOY file path
		#[arg(value_name = "OUTPUT_QOY")]
		output: PathBuf,

		/// Mark all channels as linear in the header (hint only)
		#[arg(long)]
		linear: bool,
	},

	/// Decode a QOY file to an image file
	Decode {
		/// Input QOY file path
		#[arg(value_name = "INPUT_QOY")]
		input: PathBuf,

		/// Output image path (format chosen by extension)
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},

	/// Print the header of a QOY file
	Info {
		/// Input QOY file path
		#[arg(value_name = "INPUT_QOY")]
		input: PathBuf,

		/// Emit machine readable JSON
		#[arg(long)]
		json: bool,
	},
}

fn main() -> Result<()> {
	env_logger::init();

	let cli = Cli::parse();
	match cli.command {
		Commands::Encode {
			input,
			output,
			linear,
		} => encode_image(&input, &output, linear),
		Commands::Decode {
			input,
			output,
		} => decode_image(&input, &output),
		Commands::Info {
			input,
			json,
		} => print_info(&input, json),
	}
}

fn encode_image(input: &Path, output: &Path, linear: bool) -> Result<()> {
	let img =
		image::open(input).with_context(|| format!("failed to open {}", input.display()))?;
	let colorspace = if linear { Colorspace::Linear } else { Colorspace::Srgb };

	// Preserve an alpha channel when the source has one, otherwise
	// encode three channels
	let (pixels, channels) = if img.color().has_alpha() {
		(img.to_rgba8().into_raw(), Channels::Rgba)
	} else {
		(img.to_rgb8().into_raw(), Channels::Rgb)
	};
	debug!("loaded {}: {}x{} {}", input.display(), img.width(), img.height(), channels);

	let header = Header::new(img.width(), img.height(), channels, colorspace)?;
	let encoded = qoy::encode(&pixels, &header, channels, PixelFormat::Rgba)?;

	info!(
		"encoded {}x{} {} ({} -> {} bytes)",
		img.width(),
		img.height(),
		channels,
		pixels.len(),
		encoded.len(),
	);

	fs::write(output, &encoded)
		.with_context(|| format!("failed to write {}", output.display()))?;
	Ok(())
}

fn decode_image(input: &Path, output: &Path) -> Result<()> {
	let data =
		fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
	let (header, pixels) = qoy::decode(&data, None, PixelFormat::Rgba)?;

	info!(
		"decoded {}x{} {} ({} -> {} bytes)",
		header.width(),
		header.height(),
		header.channels(),
		data.len(),
		pixels.len(),
	);

	match header.channels() {
		Channels::Rgba => {
			let img = image::RgbaImage::from_raw(header.width(), header.height(), pixels)
				.context("decoded pixel buffer has unexpected size")?;
			img.save(output)
				.with_context(|| format!("failed to write {}", output.display()))?;
		}
		Channels::Rgb => {
			let img = image::RgbImage::from_raw(header.width(), header.height(), pixels)
				.context("decoded pixel buffer has unexpected size")?;
			img.save(output)
				.with_context(|| format!("failed to write {}", output.display()))?;
		}
	}
	Ok(())
}

fn print_info(input: &Path, json: bool) -> Result<()> {
	let mut file = fs::File::open(input)
		.with_context(|| format!("failed to open {}", input.display()))?;
	let header = Header::from_reader(&mut file)?;

	if json {
		println!("{}", serde_json::to_string_pretty(&header)?);
	} else {
		println!("{header}");
	}
	Ok(())
}
