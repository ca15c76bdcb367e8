//! MPSSE opcodes and clock configuration.
//!
//! Opcodes are from FTDI's [AN_108], "Command Processor for MPSSE and MCU Host Bus Emulation
//! Modes". Only the subset needed to bit-bang I2C is here.
//!
//! [AN_108]: https://ftdichip.com/wp-content/uploads/2020/08/AN_108_Command_Processor_for_MPSSE_and_MCU_Host_Bus_Emulation_Modes.pdf

use crate::error::{Error, Result};

/// Clock bytes out on the falling edge, MSB first. Followed by `len_low, len_high, bytes...`
/// where the length is the byte count minus one.
pub const WRITE_BYTES_FALLING_MSB: u8 = 0x11;

/// Clock bits in on the rising edge, MSB first. Followed by the bit count minus one.
pub const READ_BITS_RISING_MSB: u8 = 0x22;

/// Set the value and direction of the low byte (D0-D7). Followed by `value, direction`, where
/// a direction bit of 1 is an output.
pub const SET_LOW_BYTE: u8 = 0x80;

/// Connect TDI/DO to TDO/DI internally.
pub const LOOPBACK_ON: u8 = 0x84;

/// Disconnect the internal loopback.
pub const LOOPBACK_OFF: u8 = 0x85;

/// Set the clock divisor. Followed by `value_low, value_high`.
pub const SET_CLOCK_DIVISOR: u8 = 0x86;

/// Flush the chip's read buffer back to the host now.
pub const SEND_IMMEDIATE: u8 = 0x87;

/// Use the 60 MHz master clock.
pub const DIVIDE_BY_5_OFF: u8 = 0x8A;

/// Use the 60 MHz master clock divided by 5, i.e. 12 MHz.
pub const DIVIDE_BY_5_ON: u8 = 0x8B;

/// Data is valid on both clock edges, as I2C needs.
pub const THREE_PHASE_CLOCKING_ON: u8 = 0x8C;

pub const ADAPTIVE_CLOCKING_OFF: u8 = 0x97;

/// MPSSE clock settings.
///
/// The output clock is `base / 2 / (1 + divisor)`, where `base` is 12 MHz with divide-by-5
/// enabled and 60 MHz without. Note that with three-phase clocking on (which I2C setup enables)
/// each bit takes three half-periods, so the effective bus rate is two thirds of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
	divisor: u16,
	divide_by_5: bool,
}

impl Clock {
	/// Compute the divisor for the requested frequency.
	///
	/// The divisor is rounded to the nearest integer, so the actual frequency may differ; see
	/// [`Clock::actual_hz`].
	pub fn new(frequency: u32, divide_by_5: bool) -> Result<Self> {
		let out_of_range = Error::ClockOutOfRange {
			frequency,
			divide_by_5,
		};

		if frequency == 0 {
			return Err(out_of_range);
		}

		let base = Self::base_hz(divide_by_5);
		let divisor = (base / (2.0 * f64::from(frequency))).round() - 1.0;
		if !(0.0..=f64::from(u16::MAX)).contains(&divisor) {
			return Err(out_of_range);
		}

		Ok(Self {
			divisor: divisor as u16,
			divide_by_5,
		})
	}

	fn base_hz(divide_by_5: bool) -> f64 {
		if divide_by_5 {
			12e6
		} else {
			60e6
		}
	}

	pub fn divisor(&self) -> u16 {
		self.divisor
	}

	pub fn divide_by_5(&self) -> bool {
		self.divide_by_5
	}

	/// The frequency the chip will actually produce.
	pub fn actual_hz(&self) -> f64 {
		Self::base_hz(self.divide_by_5) / 2.0 / (1.0 + f64::from(self.divisor))
	}

	/// The MPSSE commands to apply this clock.
	pub fn commands(&self) -> [u8; 4] {
		let [low, high] = self.divisor.to_le_bytes();
		[
			if self.divide_by_5 {
				DIVIDE_BY_5_ON
			} else {
				DIVIDE_BY_5_OFF
			},
			SET_CLOCK_DIVISOR,
			low,
			high,
		]
	}
}

impl Default for Clock {
	/// 3 MHz from the divided clock.
	fn default() -> Self {
		Self {
			divisor: 1,
			divide_by_5: true,
		}
	}
}
