use std::time::Duration;

use clap::Parser;
use ft232h_i2c::{Clock, I2cBus, Selector, UsbPort};
use miette::{Result, WrapErr};
use ssd1306_oled::{Config, Driver, Geometry, I2cInterface, Orientation};
use tracing::{debug, info, instrument};

/// A display opened and initialised over the FT232H.
pub type Oled = Driver<I2cInterface<UsbPort>>;

/// Which device to use and how the display is set up.
#[derive(Debug, Clone, Parser)]
pub struct DisplayArgs {
	/// FTDI device to use, by position in the device list.
	///
	/// See the `devices` subcommand for the list. Defaults to the first device.
	#[arg(long, env = "OLEDGIF_INDEX")]
	pub index: Option<u32>,

	/// FTDI device to use, by USB serial number.
	///
	/// Takes precedence over `--index`.
	#[arg(long, env = "OLEDGIF_SERIAL")]
	pub serial: Option<String>,

	/// I2C address of the display.
	///
	/// Most boards are 0x3C; those with the address jumper set are 0x3D.
	#[arg(long, env = "OLEDGIF_ADDRESS", default_value = "0x3C", value_parser = parse_address)]
	pub address: u8,

	/// MPSSE clock frequency in Hz.
	///
	/// The I2C bit rate ends up at about two thirds of this. Going too high makes the display
	/// miss bytes.
	#[arg(long, env = "OLEDGIF_FREQUENCY", default_value = "3000000")]
	pub frequency: u32,

	/// Use the undivided 60 MHz master clock.
	///
	/// Only needed for frequencies above 6 MHz.
	#[arg(long, env = "OLEDGIF_NO_DIVIDE_BY_5")]
	pub no_divide_by_5: bool,

	/// Horizontal resolution of the display.
	#[arg(long, env = "OLEDGIF_WIDTH", default_value = "128")]
	pub width: u16,

	/// Vertical resolution of the display.
	#[arg(long, env = "OLEDGIF_HEIGHT", default_value = "64")]
	pub height: u16,

	/// The display is powered from an external VCC rather than its charge pump.
	#[arg(long, env = "OLEDGIF_EXTERNAL_VCC")]
	pub external_vcc: bool,

	/// Contrast, from 0 to 255.
	#[arg(long, env = "OLEDGIF_CONTRAST", default_value = "255")]
	pub contrast: u8,

	/// Turn the picture 180 degrees.
	#[arg(long, env = "OLEDGIF_FLIPPED")]
	pub flipped: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
	let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
		Some(hex) => u8::from_str_radix(hex, 16),
		None => s.parse(),
	};

	match parsed {
		Ok(address) if address < 0x80 => Ok(address),
		Ok(address) => Err(format!("0x{address:02X} is not a 7-bit address")),
		Err(err) => Err(err.to_string()),
	}
}

impl DisplayArgs {
	pub fn selector(&self) -> Selector {
		match &self.serial {
			Some(serial) => Selector::Serial(serial.clone()),
			None => Selector::Index(self.index.unwrap_or(0)),
		}
	}

	pub fn clock(&self) -> Result<Clock> {
		Ok(Clock::new(self.frequency, !self.no_divide_by_5)?)
	}

	pub fn config(&self) -> Result<Config> {
		Ok(Config {
			address: self.address,
			geometry: Geometry::from_size(self.width, self.height)?,
			external_vcc: self.external_vcc,
			contrast: self.contrast,
			invert: false,
			orientation: if self.flipped {
				Orientation::Flipped
			} else {
				Orientation::Normal
			},
		})
	}

	/// Open the FTDI device and initialise the display.
	#[instrument(level = "debug", skip(self))]
	pub fn open(&self, settle: Duration) -> Result<Oled> {
		let config = self.config()?;
		let clock = self.clock()?;

		let mut port = UsbPort::open(&self.selector()).wrap_err("opening FTDI device")?;
		let info = port.info()?;
		info!(
			serial = info.serial_number,
			description = info.description,
			"opened FTDI device"
		);
		debug!(?info, "device info");

		port.configure(&clock).wrap_err("configuring MPSSE")?;
		let port = port.with_settle(settle);

		let mut oled = Driver::new(I2cInterface::new(I2cBus::new(port), config.address), config);
		oled.init().wrap_err("initialising display")?;
		Ok(oled)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> DisplayArgs {
		DisplayArgs::try_parse_from(std::iter::once("display").chain(args.iter().copied()))
			.unwrap()
	}

	#[test]
	fn addresses() {
		assert_eq!(parse_address("0x3C"), Ok(0x3C));
		assert_eq!(parse_address("0X3d"), Ok(0x3D));
		assert_eq!(parse_address("60"), Ok(60));
		assert!(parse_address("0x80").is_err());
		assert!(parse_address("banana").is_err());
	}

	#[test]
	fn serial_selects() {
		let args = parse(&["--serial", "FT4XYZ"]);
		assert_eq!(args.selector(), Selector::Serial("FT4XYZ".into()));

		let args = parse(&["--index", "2", "--serial", "FT4XYZ"]);
		assert_eq!(args.selector(), Selector::Serial("FT4XYZ".into()));

		assert_eq!(parse(&["--index", "2"]).selector(), Selector::Index(2));
	}

	#[test]
	fn defaults_and_env() {
		// the only test whose result depends on these variables
		let args = parse(&[]);
		assert_eq!(args.selector(), Selector::Index(0));
		assert_eq!(args.clock().unwrap(), Clock::default());
		assert_eq!(args.config().unwrap(), Config::default());

		std::env::set_var("OLEDGIF_INDEX", "1");
		std::env::set_var("OLEDGIF_NO_DIVIDE_BY_5", "true");

		let from_env = parse(&[]);
		let with_serial = DisplayArgs::try_parse_from(["display", "--serial", "FT1"]);

		std::env::remove_var("OLEDGIF_INDEX");
		std::env::remove_var("OLEDGIF_NO_DIVIDE_BY_5");

		assert_eq!(from_env.selector(), Selector::Index(1));
		assert!(from_env.no_divide_by_5);
		assert_eq!(
			with_serial.unwrap().selector(),
			Selector::Serial("FT1".into())
		);
	}

	#[test]
	fn custom_config() {
		let args = parse(&[
			"--width",
			"128",
			"--height",
			"32",
			"--flipped",
			"--external-vcc",
			"--contrast",
			"10",
			"--address",
			"0x3D",
		]);
		let config = args.config().unwrap();
		assert_eq!(config.geometry, Geometry::W128H32);
		assert_eq!(config.orientation, Orientation::Flipped);
		assert!(config.external_vcc);
		assert_eq!(config.contrast, 10);
		assert_eq!(config.address, 0x3D);
	}

	#[test]
	fn bad_size() {
		assert!(parse(&["--width", "100"]).config().is_err());
	}
}
