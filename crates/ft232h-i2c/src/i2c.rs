//! I2C framing as MPSSE command sequences.
//!
//! The low byte pins are used as: D0 = SCL, D1 = SDA out, D2 = SDA in. D1 and D2 are tied
//! together, and D0/D1 are driven high for idle rather than tri-stated, so the bus works with
//! just the target board's pull-ups.
//!
//! Each pin change is repeated a few times: the MPSSE executes commands back to back at the
//! master clock rate, and repeating is the cheapest way to hold a level long enough for the
//! target to see it.

use crate::mpsse::*;

/// Pin direction mask while we drive SDA: D0, D1, D3-D7 outputs, D2 input.
pub const DIRECTION_DRIVE: u8 = 0b1111_1011;

/// Pin direction mask while the target drives SDA (ACK bit): D1 released too.
pub const DIRECTION_RELEASE: u8 = 0b1111_1001;

const SCL: u8 = 0b01;
const SDA: u8 = 0b10;

const HOLD: usize = 3;

fn set_pins(out: &mut Vec<u8>, value: u8, direction: u8) {
	for _ in 0..HOLD {
		out.extend_from_slice(&[SET_LOW_BYTE, value, direction]);
	}
}

/// Pin state with both lines high.
pub fn idle() -> [u8; 3] {
	[SET_LOW_BYTE, SCL | SDA, DIRECTION_DRIVE]
}

/// Append a start condition: SDA falls while SCL is high, then SCL falls.
pub fn start(out: &mut Vec<u8>) {
	set_pins(out, SCL | SDA, DIRECTION_DRIVE);
	set_pins(out, SCL, DIRECTION_DRIVE);
	set_pins(out, 0, DIRECTION_DRIVE);
}

/// Append a stop condition: SCL rises, then SDA rises while SCL is high.
pub fn stop(out: &mut Vec<u8>) {
	set_pins(out, 0, DIRECTION_DRIVE);
	set_pins(out, SCL, DIRECTION_DRIVE);
	set_pins(out, SCL | SDA, DIRECTION_DRIVE);
}

/// Append a byte write followed by an ACK read.
///
/// The ACK bit is sampled into the chip's read buffer and flushed back to the host, so every
/// call produces exactly one byte to read later. Its bit 0 is clear for ACK, set for NACK.
pub fn write_byte(out: &mut Vec<u8>, byte: u8) {
	out.extend_from_slice(&[WRITE_BYTES_FALLING_MSB, 0, 0, byte]);
	out.extend_from_slice(&[SET_LOW_BYTE, 0, DIRECTION_RELEASE]);
	out.extend_from_slice(&[READ_BITS_RISING_MSB, 0]);
	out.push(SEND_IMMEDIATE);
	set_pins(out, SDA, DIRECTION_DRIVE);
}

/// Whether an ACK byte read back from the chip is a NACK.
pub fn is_nack(ack: u8) -> bool {
	ack & 0x01 != 0
}

/// A complete I2C write transaction, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
	bytes: Vec<u8>,
	acks: usize,
}

impl Packet {
	/// Frame a write of `payload` to the 7-bit `address`.
	///
	/// # Panics
	///
	/// Panics if `address` doesn't fit in 7 bits.
	pub fn write(address: u8, payload: &[u8]) -> Self {
		assert!(address < 0x80, "I2C address 0x{address:02X} is not 7-bit");

		// start + stop + per byte, see the functions above
		let mut bytes = Vec::with_capacity(2 * 9 * HOLD + (payload.len() + 1) * (10 + 3 * HOLD));
		start(&mut bytes);
		write_byte(&mut bytes, address << 1);
		for &byte in payload {
			write_byte(&mut bytes, byte);
		}
		stop(&mut bytes);

		Self {
			bytes,
			acks: payload.len() + 1,
		}
	}

	/// The MPSSE command stream.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// How many ACK bytes the chip will send back for this packet.
	pub fn acks(&self) -> usize {
		self.acks
	}
}
