//! Loading GIFs into display frames.

use std::{
	fs::File,
	io::{BufRead, BufReader, Seek},
	path::{Path, PathBuf},
	time::Duration,
};

use image::{
	codecs::gif::GifDecoder,
	imageops::{self, BiLevel, FilterType},
	AnimationDecoder, Frame, GrayImage, ImageDecoder, ImageError, Luma, RgbaImage,
};
use miette::Diagnostic;
use ssd1306_oled::Bitmap;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error, Diagnostic)]
pub enum AnimationError {
	#[error("could not open {path:?}")]
	#[diagnostic(code(oledgif::animation::open))]
	Open {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("could not decode GIF")]
	#[diagnostic(
		code(oledgif::animation::decode),
		help("is this really a GIF file?")
	)]
	Decode(#[from] ImageError),

	#[error("GIF has no frames")]
	#[diagnostic(code(oledgif::animation::empty))]
	Empty,

	#[error("frame {index} is {}x{}, but the display is {}x{}", .found.0, .found.1, .expected.0, .expected.1)]
	#[diagnostic(
		code(oledgif::animation::frame_size),
		help("use --resize to scale frames to the display")
	)]
	FrameSize {
		index: usize,
		expected: (u32, u32),
		found: (u32, u32),
	},
}

/// How to turn GIF frames into bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
	/// Output width.
	pub width: u16,

	/// Output height.
	pub height: u16,

	/// Pixels with a luma strictly above this are lit.
	///
	/// Ignored when dithering.
	pub threshold: u8,

	/// Floyd-Steinberg dither to black and white instead of thresholding.
	pub dither: bool,

	/// Swap lit and dark.
	pub invert: bool,

	/// Scale frames to the output size instead of rejecting them.
	pub resize: bool,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			width: 128,
			height: 64,
			threshold: 200,
			dither: false,
			invert: false,
			resize: false,
		}
	}
}

impl LoadOptions {
	fn convert(&self, index: usize, frame: Frame) -> Result<(Bitmap, Duration), AnimationError> {
		let delay = Duration::from(frame.delay());
		let mut luma = luma_601(frame.buffer());

		let expected = (u32::from(self.width), u32::from(self.height));
		let found = luma.dimensions();
		if found != expected {
			if !self.resize {
				return Err(AnimationError::FrameSize {
					index,
					expected,
					found,
				});
			}

			luma = imageops::resize(&luma, expected.0, expected.1, FilterType::Triangle);
		}

		let threshold = if self.dither {
			imageops::dither(&mut luma, &BiLevel);
			// BiLevel maps to 0 or 255
			127
		} else {
			self.threshold
		};

		let mut bitmap = Bitmap::from_luma(self.width, self.height, luma.as_raw(), threshold);
		if self.invert {
			bitmap.invert();
		}

		Ok((bitmap, delay))
	}
}

/// Greyscale with the ITU-R 601 weights, which is what most GIF tooling thresholds against.
///
/// Alpha is ignored; transparent pixels come out as whatever colour they carry.
fn luma_601(rgba: &RgbaImage) -> GrayImage {
	GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
		let [r, g, b, _] = rgba.get_pixel(x, y).0;
		let weighted = u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114;
		Luma([((weighted + 500) / 1000) as u8])
	})
}

/// A decoded animation, ready to send.
///
/// Each frame keeps the delay it had in the GIF.
#[derive(Debug, Clone)]
pub struct Animation {
	frames: Vec<(Bitmap, Duration)>,
}

impl Animation {
	/// Load a GIF file.
	#[instrument(level = "debug", skip(options))]
	pub fn open(path: &Path, options: &LoadOptions) -> Result<Self, AnimationError> {
		let file = File::open(path).map_err(|source| AnimationError::Open {
			path: path.into(),
			source,
		})?;

		Self::decode(BufReader::new(file), options)
	}

	/// Decode a GIF from a reader.
	pub fn decode<R: BufRead + Seek>(
		reader: R,
		options: &LoadOptions,
	) -> Result<Self, AnimationError> {
		let decoder = GifDecoder::new(reader)?;
		let (width, height) = decoder.dimensions();
		debug!(width, height, "decoding GIF");

		let frames = decoder.into_frames().collect_frames()?;
		Self::from_frames(frames, options)
	}

	/// Convert already-decoded frames.
	pub fn from_frames(frames: Vec<Frame>, options: &LoadOptions) -> Result<Self, AnimationError> {
		if frames.is_empty() {
			return Err(AnimationError::Empty);
		}

		let frames = frames
			.into_iter()
			.enumerate()
			.map(|(index, frame)| options.convert(index, frame))
			.collect::<Result<Vec<_>, _>>()?;

		debug!(count = frames.len(), "converted frames");
		Ok(Self { frames })
	}

	pub fn frames(&self) -> &[(Bitmap, Duration)] {
		&self.frames
	}

	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Always false: loading rejects animations without frames.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Sum of the GIF delays.
	pub fn duration(&self) -> Duration {
		self.frames.iter().map(|(_, delay)| *delay).sum()
	}
}
