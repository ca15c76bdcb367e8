use crate::{
	buffer::Orientation,
	commands::{Command, DEFAULT_ADDRESS},
	error::{Error, Result},
};

/// Panel resolutions the SSD1306 is sold with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Geometry {
	#[default]
	W128H64,
	W128H32,
	W96H16,
	W64H48,
	W64H32,
}

impl Geometry {
	/// Look up a geometry by resolution.
	pub fn from_size(width: u16, height: u16) -> Result<Self> {
		Ok(match (width, height) {
			(128, 64) => Self::W128H64,
			(128, 32) => Self::W128H32,
			(96, 16) => Self::W96H16,
			(64, 48) => Self::W64H48,
			(64, 32) => Self::W64H32,
			_ => return Err(Error::UnsupportedSize { width, height }),
		})
	}

	pub fn width(self) -> u16 {
		match self {
			Self::W128H64 | Self::W128H32 => 128,
			Self::W96H16 => 96,
			Self::W64H48 | Self::W64H32 => 64,
		}
	}

	pub fn height(self) -> u16 {
		match self {
			Self::W128H64 => 64,
			Self::W64H48 => 48,
			Self::W128H32 | Self::W64H32 => 32,
			Self::W96H16 => 16,
		}
	}

	/// Number of 8-row pages.
	pub fn pages(self) -> u16 {
		self.height() / 8
	}

	/// Bytes in a full frame.
	pub fn frame_len(self) -> usize {
		usize::from(self.width()) * usize::from(self.pages())
	}

	fn clock_divide(self) -> u8 {
		match self {
			Self::W96H16 => 0x60,
			_ => 0x80,
		}
	}

	fn com_pins(self) -> u8 {
		match self {
			Self::W128H32 | Self::W96H16 => 0x02,
			_ => 0x12,
		}
	}
}

/// Display settings applied at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// 7-bit I2C address.
	pub address: u8,

	pub geometry: Geometry,

	/// Whether the panel is powered from an external VCC rather than the internal charge pump.
	pub external_vcc: bool,

	/// Contrast level, 0-255.
	pub contrast: u8,

	/// Show lit pixels dark and vice versa.
	pub invert: bool,

	pub orientation: Orientation,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			address: DEFAULT_ADDRESS,
			geometry: Geometry::default(),
			external_vcc: false,
			contrast: 0xFF,
			invert: false,
			orientation: Orientation::default(),
		}
	}
}

impl Config {
	/// Command bytes that bring the controller from reset to displaying RAM.
	pub fn init_sequence(&self) -> Vec<u8> {
		let geometry = self.geometry;
		vec![
			Command::DisplayOff.into(),
			Command::MemoryMode.into(),
			0x00, // horizontal
			Command::StartLine.into(), // line 0
			Command::SegmentRemap as u8
				| match self.orientation {
					Orientation::Normal => 0x01,
					Orientation::Flipped => 0x00,
				},
			Command::MuxRatio.into(),
			(geometry.height() - 1) as u8,
			Command::ComScanDirection.into(),
			Command::DisplayOffset.into(),
			0x00,
			Command::ComPins.into(),
			geometry.com_pins(),
			Command::ClockDivide.into(),
			geometry.clock_divide(),
			Command::Precharge.into(),
			if self.external_vcc { 0x22 } else { 0xF1 },
			Command::VcomDeselect.into(),
			0x50, // 0.83 * VCC
			Command::Contrast.into(),
			self.contrast,
			Command::EntireOn.into(),
			if self.invert {
				Command::Inverse.into()
			} else {
				Command::Normal.into()
			},
			Command::ChargePump.into(),
			if self.external_vcc { 0x10 } else { 0x14 },
			Command::DisplayOn.into(),
		]
	}

	/// Command bytes that set the whole screen as the write window.
	pub fn window_sequence(&self) -> [u8; 6] {
		[
			Command::ColumnAddress.into(),
			0,
			(self.geometry.width() - 1) as u8,
			Command::PageAddress.into(),
			0,
			(self.geometry.pages() - 1) as u8,
		]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_init_sequence() {
		assert_eq!(
			Config::default().init_sequence(),
			[
				0xAE, 0x20, 0x00, 0x40, 0xA1, 0xA8, 63, 0xC0, 0xD3, 0x00, 0xDA, 0x12, 0xD5, 0x80,
				0xD9, 0xF1, 0xDB, 0x50, 0x81, 0xFF, 0xA4, 0xA6, 0x8D, 0x14, 0xAF,
			]
		);
	}

	#[test]
	fn external_vcc_and_inverted() {
		let config = Config {
			external_vcc: true,
			invert: true,
			contrast: 0x7F,
			orientation: Orientation::Flipped,
			..Default::default()
		};

		let seq = config.init_sequence();
		assert_eq!(seq[4], 0xA0);
		assert_eq!(&seq[14..16], &[0xD9, 0x22]);
		assert_eq!(&seq[18..20], &[0x81, 0x7F]);
		assert_eq!(seq[21], 0xA7);
		assert_eq!(&seq[22..24], &[0x8D, 0x10]);
	}

	#[test]
	fn geometry_table() {
		let cases = [
			(128, 64, 0x80, 0x12, 1024),
			(128, 32, 0x80, 0x02, 512),
			(96, 16, 0x60, 0x02, 192),
			(64, 48, 0x80, 0x12, 384),
			(64, 32, 0x80, 0x12, 256),
		];

		for (width, height, clock, pins, len) in cases {
			let geometry = Geometry::from_size(width, height).unwrap();
			assert_eq!(geometry.width(), width);
			assert_eq!(geometry.height(), height);
			assert_eq!(geometry.frame_len(), len);

			let seq = Config {
				geometry,
				..Default::default()
			}
			.init_sequence();
			assert_eq!(seq[6], (height - 1) as u8, "{width}x{height} mux");
			assert_eq!(seq[11], pins, "{width}x{height} com pins");
			assert_eq!(seq[13], clock, "{width}x{height} clock");
		}
	}

	#[test]
	fn unsupported_geometry() {
		assert!(matches!(
			Geometry::from_size(128, 128),
			Err(Error::UnsupportedSize {
				width: 128,
				height: 128
			})
		));
	}

	#[test]
	fn window_covers_screen() {
		let config = Config {
			geometry: Geometry::W128H32,
			..Default::default()
		};
		assert_eq!(config.window_sequence(), [0x21, 0, 127, 0x22, 0, 3]);
	}
}
