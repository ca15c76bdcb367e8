use tracing::{instrument, trace, warn};

use crate::{
	error::{Error, Result},
	i2c::{is_nack, Packet},
	port::Port,
};

/// An I2C master over an MPSSE [`Port`].
///
/// Only writes are supported: that's all a display needs.
#[derive(Debug)]
pub struct I2cBus<P> {
	port: P,
	pending_acks: usize,
}

impl<P: Port> I2cBus<P> {
	/// Wrap a configured port.
	pub fn new(port: P) -> Self {
		Self {
			port,
			pending_acks: 0,
		}
	}

	/// Write to a target without reading back the ACK bits.
	///
	/// This is much faster than [`I2cBus::write_checked`], but a missing or misbehaving target
	/// goes unnoticed. The ACK bytes are left in the receive path; call [`I2cBus::resync`]
	/// regularly to get rid of them.
	#[instrument(level = "trace", skip(self, payload), fields(length = payload.len()))]
	pub fn write(&mut self, address: u8, payload: &[u8]) -> Result<()> {
		let packet = Packet::write(address, payload);
		self.port.write_all(packet.as_bytes())?;
		self.pending_acks += packet.acks();
		Ok(())
	}

	/// Write to a target and check every byte was acknowledged.
	///
	/// Fails with [`Error::Nack`] on the first unacknowledged byte. Index 0 is the address
	/// byte, index 1 the first payload byte, and so on.
	#[instrument(level = "trace", skip(self, payload), fields(length = payload.len()))]
	pub fn write_checked(&mut self, address: u8, payload: &[u8]) -> Result<()> {
		if self.pending_acks > 0 {
			self.resync()?;
		}

		let packet = Packet::write(address, payload);
		self.port.write_all(packet.as_bytes())?;

		let mut acks = vec![0; packet.acks()];
		self.port.read_exact(&mut acks)?;
		trace!(count = acks.len(), "read back ACKs");

		if let Some(index) = acks.iter().position(|&ack| is_nack(ack)) {
			warn!(address, index, "target did not acknowledge");
			return Err(Error::Nack { address, index });
		}

		Ok(())
	}

	/// Resynchronise the port, discarding unread ACKs.
	#[instrument(level = "trace", skip(self))]
	pub fn resync(&mut self) -> Result<()> {
		trace!(pending = self.pending_acks, "discarding unread ACKs");
		self.port.resync()?;
		self.pending_acks = 0;
		Ok(())
	}

	/// How many ACK bytes have been produced and not read.
	pub fn pending_acks(&self) -> usize {
		self.pending_acks
	}

	pub fn port(&mut self) -> &mut P {
		&mut self.port
	}

	pub fn into_port(self) -> P {
		self.port
	}
}
