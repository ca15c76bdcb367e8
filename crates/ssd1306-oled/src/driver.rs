use tracing::{debug, instrument, trace};

use crate::{
	buffer::Bitmap,
	commands::Command,
	config::Config,
	error::{Error, Result},
};

/// How the driver talks to the controller.
pub trait Interface {
	/// Send command bytes, not checking they were received.
	fn send_commands(&mut self, commands: &[u8]) -> Result<()>;

	/// Send command bytes, failing if the controller didn't acknowledge them.
	///
	/// Defaults to [`Interface::send_commands`] for buses that can't tell.
	fn send_commands_checked(&mut self, commands: &[u8]) -> Result<()> {
		self.send_commands(commands)
	}

	/// Send display RAM data.
	fn send_data(&mut self, data: &[u8]) -> Result<()>;

	/// Send display RAM data, failing if it wasn't acknowledged.
	fn send_data_checked(&mut self, data: &[u8]) -> Result<()> {
		self.send_data(data)
	}

	/// Bring the bus back into a known state, if it needs that.
	fn resync(&mut self) -> Result<()> {
		Ok(())
	}
}

/// [`Interface`] over an FT232H I2C bus.
#[cfg(feature = "ft232h")]
#[derive(Debug)]
pub struct I2cInterface<P> {
	bus: ft232h_i2c::I2cBus<P>,
	address: u8,
}

#[cfg(feature = "ft232h")]
impl<P: ft232h_i2c::Port> I2cInterface<P> {
	pub fn new(bus: ft232h_i2c::I2cBus<P>, address: u8) -> Self {
		Self { bus, address }
	}

	pub fn bus(&mut self) -> &mut ft232h_i2c::I2cBus<P> {
		&mut self.bus
	}

	fn framed(control: u8, bytes: &[u8]) -> Vec<u8> {
		let mut payload = Vec::with_capacity(bytes.len() + 1);
		payload.push(control);
		payload.extend_from_slice(bytes);
		payload
	}
}

#[cfg(feature = "ft232h")]
impl<P: ft232h_i2c::Port> Interface for I2cInterface<P> {
	fn send_commands(&mut self, commands: &[u8]) -> Result<()> {
		let payload = Self::framed(crate::commands::CONTROL_COMMAND, commands);
		Ok(self.bus.write(self.address, &payload)?)
	}

	fn send_commands_checked(&mut self, commands: &[u8]) -> Result<()> {
		let payload = Self::framed(crate::commands::CONTROL_COMMAND, commands);
		Ok(self.bus.write_checked(self.address, &payload)?)
	}

	fn send_data(&mut self, data: &[u8]) -> Result<()> {
		let payload = Self::framed(crate::commands::CONTROL_DATA, data);
		Ok(self.bus.write(self.address, &payload)?)
	}

	fn send_data_checked(&mut self, data: &[u8]) -> Result<()> {
		let payload = Self::framed(crate::commands::CONTROL_DATA, data);
		Ok(self.bus.write_checked(self.address, &payload)?)
	}

	fn resync(&mut self) -> Result<()> {
		Ok(self.bus.resync()?)
	}
}

/// Driver for the OLED display.
#[derive(Debug)]
pub struct Driver<I> {
	interface: I,
	config: Config,
	verify: bool,
	awake: bool,
}

impl<I: Interface> Driver<I> {
	/// Wrap an interface.
	///
	/// This doesn't touch the display; call [`Driver::init`] next.
	pub fn new(interface: I, config: Config) -> Self {
		Self {
			interface,
			config,
			verify: false,
			awake: false,
		}
	}

	/// Check every frame write is acknowledged.
	///
	/// Off by default: it roughly halves the achievable frame rate.
	pub fn verify_writes(&mut self, verify: bool) {
		self.verify = verify;
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn interface(&mut self) -> &mut I {
		&mut self.interface
	}

	/// A blank bitmap of the display's size.
	pub fn bitmap(&self) -> Bitmap {
		Bitmap::new(self.config.geometry.width(), self.config.geometry.height())
	}

	/// Perform the init sequence and set the full-screen window.
	///
	/// The init write is always checked, so this is where an absent or miswired display shows
	/// up, as a NACK on the address byte.
	#[instrument(level = "debug", skip(self))]
	pub fn init(&mut self) -> Result<()> {
		let init = self.config.init_sequence();
		trace!(bytes=%format!("{init:02X?}"), "sending init sequence");
		self.interface.send_commands_checked(&init)?;
		self.awake = true;

		self.interface
			.send_commands_checked(&self.config.window_sequence())?;

		debug!(
			width = self.config.geometry.width(),
			height = self.config.geometry.height(),
			"display initialised"
		);
		Ok(())
	}

	/// Send a frame.
	#[instrument(level = "trace", skip(self, frame))]
	pub fn draw(&mut self, frame: &Bitmap) -> Result<()> {
		let expected = (self.config.geometry.width(), self.config.geometry.height());
		let found = (frame.width, frame.height);
		if expected != found {
			return Err(Error::Size { expected, found });
		}

		let data = frame.pack(self.config.orientation);
		trace!(length = data.len(), "writing frame");
		if self.verify {
			self.interface.send_data_checked(&data)
		} else {
			self.interface.send_data(&data)
		}
	}

	/// Blank the screen.
	#[instrument(level = "trace", skip(self))]
	pub fn clear(&mut self) -> Result<()> {
		let blank = self.bitmap();
		self.draw(&blank)
	}

	/// Turn the display on or off.
	///
	/// Off is the controller's sleep mode: RAM is kept, the panel is dark.
	#[instrument(level = "trace", skip(self))]
	pub fn display(&mut self, on: bool) -> Result<()> {
		if on == self.awake {
			return Ok(());
		}

		self.interface.send_commands(&[if on {
			u8::from(Command::DisplayOn)
		} else {
			u8::from(Command::DisplayOff)
		}])?;
		self.awake = on;
		Ok(())
	}

	/// Change the contrast.
	#[instrument(level = "trace", skip(self))]
	pub fn contrast(&mut self, level: u8) -> Result<()> {
		self.interface
			.send_commands(&[Command::Contrast.into(), level])?;
		self.config.contrast = level;
		Ok(())
	}

	/// Invert the display in hardware.
	#[instrument(level = "trace", skip(self))]
	pub fn invert(&mut self, invert: bool) -> Result<()> {
		self.interface.send_commands(&[if invert {
			u8::from(Command::Inverse)
		} else {
			u8::from(Command::Normal)
		}])?;
		self.config.invert = invert;
		Ok(())
	}

	/// Resynchronise the interface.
	pub fn resync(&mut self) -> Result<()> {
		self.interface.resync()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		buffer::Orientation,
		commands::{CONTROL_COMMAND, CONTROL_DATA},
		config::Geometry,
	};

	#[derive(Debug, Default)]
	struct Recorder {
		sent: Vec<(u8, bool, Vec<u8>)>,
		resyncs: usize,
	}

	impl Interface for Recorder {
		fn send_commands(&mut self, commands: &[u8]) -> Result<()> {
			self.sent.push((CONTROL_COMMAND, false, commands.to_vec()));
			Ok(())
		}

		fn send_commands_checked(&mut self, commands: &[u8]) -> Result<()> {
			self.sent.push((CONTROL_COMMAND, true, commands.to_vec()));
			Ok(())
		}

		fn send_data(&mut self, data: &[u8]) -> Result<()> {
			self.sent.push((CONTROL_DATA, false, data.to_vec()));
			Ok(())
		}

		fn send_data_checked(&mut self, data: &[u8]) -> Result<()> {
			self.sent.push((CONTROL_DATA, true, data.to_vec()));
			Ok(())
		}

		fn resync(&mut self) -> Result<()> {
			self.resyncs += 1;
			Ok(())
		}
	}

	fn driver() -> Driver<Recorder> {
		Driver::new(Recorder::default(), Config::default())
	}

	#[test]
	fn init_is_checked() {
		let mut oled = driver();
		oled.init().unwrap();

		let sent = &oled.interface().sent;
		assert_eq!(sent.len(), 2);
		assert_eq!(sent[0], (CONTROL_COMMAND, true, Config::default().init_sequence()));
		assert_eq!(
			sent[1],
			(CONTROL_COMMAND, true, vec![0x21, 0, 127, 0x22, 0, 7])
		);
	}

	#[test]
	fn draw_sends_packed_frame() {
		let mut oled = driver();
		let mut frame = oled.bitmap();
		frame.fill(true);
		oled.draw(&frame).unwrap();

		let (control, checked, data) = &oled.interface().sent[0];
		assert_eq!(*control, CONTROL_DATA);
		assert!(!checked);
		assert_eq!(data.len(), 1024);
		assert!(data.iter().all(|&b| b == 0xFF));
	}

	#[test]
	fn draw_checked_when_verifying() {
		let mut oled = driver();
		oled.verify_writes(true);
		oled.clear().unwrap();
		assert!(oled.interface().sent[0].1);
	}

	#[test]
	fn draw_rejects_wrong_size() {
		let mut oled = driver();
		let err = oled.draw(&Bitmap::new(128, 32)).unwrap_err();
		assert!(matches!(
			err,
			Error::Size {
				expected: (128, 64),
				found: (128, 32)
			}
		));
		assert!(oled.interface().sent.is_empty());
	}

	#[test]
	fn draw_uses_orientation() {
		let config = Config {
			geometry: Geometry::W64H32,
			orientation: Orientation::Flipped,
			..Default::default()
		};
		let mut oled = Driver::new(Recorder::default(), config);
		let mut frame = oled.bitmap();
		frame.set(0, 0, true);
		oled.draw(&frame).unwrap();

		let data = &oled.interface().sent[0].2;
		assert_eq!(data.len(), 256);
		assert_eq!(data[0], 0x01);
	}

	#[test]
	fn display_toggle_is_idempotent() {
		let mut oled = driver();
		oled.init().unwrap();
		oled.display(true).unwrap();
		oled.display(false).unwrap();
		oled.display(false).unwrap();

		let sent = &oled.interface().sent;
		assert_eq!(sent.len(), 3);
		assert_eq!(sent[2], (CONTROL_COMMAND, false, vec![0xAE]));
	}

	#[test]
	fn contrast_and_invert() {
		let mut oled = driver();
		oled.contrast(0x10).unwrap();
		oled.invert(true).unwrap();
		oled.resync().unwrap();

		assert_eq!(oled.config().contrast, 0x10);
		assert!(oled.config().invert);
		let recorder = oled.interface();
		assert_eq!(recorder.sent[0].2, [0x81, 0x10]);
		assert_eq!(recorder.sent[1].2, [0xA7]);
		assert_eq!(recorder.resyncs, 1);
	}
}
