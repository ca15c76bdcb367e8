use std::{fmt, thread::sleep, time::Duration};

use libftd2xx::{BitMode, DeviceInfo, Ft232h, Ftdi, FtdiCommon};
use libftd2xx_ffi::{FT_RestartInTask, FT_StopInTask};
use tracing::{debug, instrument, trace};

use crate::{
	error::{Error, Result},
	i2c,
	mpsse::{self, Clock},
};

/// A byte pipe to an MPSSE engine.
///
/// [`UsbPort`] is the real thing; the trait exists so the layers above can be exercised without
/// hardware.
pub trait Port {
	/// Send MPSSE commands.
	fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

	/// Read exactly `buf.len()` bytes the engine sent back.
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

	/// Discard anything buffered in either direction.
	fn purge(&mut self) -> Result<()>;

	/// Get the driver back into a known state.
	///
	/// Unread ACK bytes pile up in the receive path when writing without checking them; this
	/// clears them out. Defaults to a plain purge.
	fn resync(&mut self) -> Result<()> {
		self.purge()
	}
}

/// Which device to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
	/// Position in the D2XX device list.
	Index(u32),

	/// USB serial number.
	Serial(String),
}

impl Default for Selector {
	fn default() -> Self {
		Self::Index(0)
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Index(index) => write!(f, "index {index}"),
			Self::Serial(serial) => write!(f, "serial {serial:?}"),
		}
	}
}

/// List every device the D2XX driver can see.
#[instrument(level = "debug")]
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
	let devices = libftd2xx::list_devices()?;
	debug!(count = devices.len(), "listed FTDI devices");
	Ok(devices)
}

/// An FT232H opened through D2XX.
///
/// The device is closed when this is dropped.
pub struct UsbPort {
	ft: Ft232h,
	settle: Duration,
}

impl fmt::Debug for UsbPort {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UsbPort")
			.field("settle", &self.settle)
			.finish_non_exhaustive()
	}
}

impl UsbPort {
	/// How long [`Port::resync`] waits between steps by default.
	///
	/// Without these pauses the driver occasionally wedges; a twentieth of a 24 fps frame is
	/// enough in practice.
	pub const DEFAULT_SETTLE: Duration = Duration::from_micros(2085);

	/// Open a device.
	///
	/// This only opens the handle; call [`UsbPort::configure`] before using it.
	#[instrument(level = "debug")]
	pub fn open(selector: &Selector) -> Result<Self> {
		let devices = list_devices()?;
		if devices.is_empty() {
			return Err(Error::NoDevices);
		}

		let ft = match selector {
			Selector::Index(index) => {
				if *index as usize >= devices.len() {
					return Err(Error::NotFound(selector.to_string()));
				}

				let ftdi = Ftdi::with_index(*index as i32)?;
				Ft232h::try_from(ftdi)?
			}
			Selector::Serial(serial) => {
				if !devices.iter().any(|dev| &dev.serial_number == serial) {
					return Err(Error::NotFound(selector.to_string()));
				}

				Ft232h::with_serial_number(serial)?
			}
		};

		Ok(Self {
			ft,
			settle: Self::DEFAULT_SETTLE,
		})
	}

	/// Change the pause used by [`Port::resync`].
	pub fn with_settle(mut self, settle: Duration) -> Self {
		self.settle = settle;
		self
	}

	/// Info about the opened device.
	pub fn info(&mut self) -> Result<DeviceInfo> {
		Ok(self.ft.device_info()?)
	}

	/// Reset the device and put it in MPSSE mode, set up for I2C.
	#[instrument(level = "debug", skip(self))]
	pub fn configure(&mut self, clock: &Clock) -> Result<()> {
		self.ft.reset()?;
		self.ft.purge_all()?;

		self.ft.set_bit_mode(0x00, BitMode::Mpsse)?;
		self.ft.write_all(&[
			mpsse::LOOPBACK_ON,
			mpsse::THREE_PHASE_CLOCKING_ON,
			mpsse::ADAPTIVE_CLOCKING_OFF,
		])?;
		self.ft.write_all(&i2c::idle())?;

		self.ft.write_all(&clock.commands())?;
		debug!(
			divisor = clock.divisor(),
			divide_by_5 = clock.divide_by_5(),
			hz = clock.actual_hz(),
			"set MPSSE clock"
		);

		self.ft.set_latency_timer(Duration::from_millis(2))?;
		self.ft
			.set_timeouts(Duration::from_secs(5), Duration::from_secs(5))?;

		Ok(())
	}
}

impl Port for UsbPort {
	#[instrument(level = "trace", skip(self, bytes))]
	fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
		trace!(length = bytes.len(), "writing to USB");
		self.ft.write_all(bytes)?;
		Ok(())
	}

	#[instrument(level = "trace", skip(self, buf))]
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
		self.ft.read_all(buf)?;
		trace!(length = buf.len(), "read from USB");
		Ok(())
	}

	#[instrument(level = "trace", skip(self))]
	fn purge(&mut self) -> Result<()> {
		self.ft.purge_all()?;
		Ok(())
	}

	#[instrument(level = "trace", skip(self))]
	fn resync(&mut self) -> Result<()> {
		// SAFETY: the handle is open for as long as `self.ft` lives
		let status = unsafe { FT_StopInTask(self.ft.handle()) };
		in_task_status("FT_StopInTask", status.into())?;
		sleep(self.settle);

		// SAFETY: as above
		let status = unsafe { FT_RestartInTask(self.ft.handle()) };
		in_task_status("FT_RestartInTask", status.into())?;
		sleep(self.settle);
		self.ft.purge_all()?;
		sleep(self.settle);
		Ok(())
	}
}

/// The in-task calls aren't wrapped by `libftd2xx`, so their raw status is checked here.
fn in_task_status(call: &'static str, status: u64) -> Result<()> {
	if status == 0 {
		Ok(())
	} else {
		Err(Error::InTask { call, status })
	}
}

impl Drop for UsbPort {
	fn drop(&mut self) {
		// the handle itself closes when `ft` drops
		debug!("closing device");
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::collections::VecDeque;

	use super::*;

	/// Records writes and plays back queued replies.
	#[derive(Debug, Default)]
	pub(crate) struct MockPort {
		pub written: Vec<u8>,
		pub replies: VecDeque<u8>,
		pub reads: usize,
		pub resyncs: usize,
	}

	impl Port for MockPort {
		fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
			self.written.extend_from_slice(bytes);
			Ok(())
		}

		fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
			self.reads += 1;
			for byte in buf.iter_mut() {
				*byte = self.replies.pop_front().unwrap_or(0);
			}
			Ok(())
		}

		fn purge(&mut self) -> Result<()> {
			self.replies.clear();
			Ok(())
		}

		fn resync(&mut self) -> Result<()> {
			self.resyncs += 1;
			self.purge()
		}
	}

	#[test]
	fn in_task_status_checks() {
		assert!(in_task_status("FT_StopInTask", 0).is_ok());
		assert!(matches!(
			in_task_status("FT_RestartInTask", 4),
			Err(Error::InTask {
				call: "FT_RestartInTask",
				status: 4
			})
		));
	}

	#[test]
	fn selector_display() {
		assert_eq!(Selector::default().to_string(), "index 0");
		assert_eq!(
			Selector::Serial("FT7ABC".into()).to_string(),
			"serial \"FT7ABC\""
		);
	}

	#[test]
	fn default_resync_purges() {
		struct PurgeOnly(usize);
		impl Port for PurgeOnly {
			fn write_all(&mut self, _: &[u8]) -> Result<()> {
				Ok(())
			}
			fn read_exact(&mut self, _: &mut [u8]) -> Result<()> {
				Ok(())
			}
			fn purge(&mut self) -> Result<()> {
				self.0 += 1;
				Ok(())
			}
		}

		let mut port = PurgeOnly(0);
		port.resync().unwrap();
		assert_eq!(port.0, 1);
	}
}
