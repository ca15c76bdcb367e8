use libftd2xx::{DeviceTypeError, FtStatus, TimeoutError};

/// Error type for bus operations.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum Error {
	#[error("D2XX driver error: {0:?}")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("is the D2XX driver installed, and the device not held by another program?"))
	)]
	Ftdi(#[from] FtStatus),

	#[error("USB transfer failed")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("the device stopped responding; check the USB cable"))
	)]
	Timeout(#[from] TimeoutError),

	#[error("device is not usable")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("only FT232H devices have the MPSSE engine this needs"))
	)]
	DeviceType(#[from] DeviceTypeError),

	#[error("no FTDI devices connected")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("plug in the FT232H, or check the D2XX driver sees it (VCP driver may be claiming it)"))
	)]
	NoDevices,

	#[error("no FTDI device matches {0}")]
	#[cfg_attr(feature = "miette", diagnostic(help("list devices to see what is connected")))]
	NotFound(String),

	#[error("clock frequency {frequency} Hz is out of range (divide-by-5 {})", if *.divide_by_5 { "on" } else { "off" })]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("with divide-by-5 the range is ~92 Hz to 6 MHz, without it ~458 Hz to 30 MHz"))
	)]
	ClockOutOfRange { frequency: u32, divide_by_5: bool },

	#[error("{call} failed with D2XX status {status}")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("the driver could not pause or resume the device; try unplugging it"))
	)]
	InTask { call: &'static str, status: u64 },

	#[error("no acknowledgement from 0x{address:02X} at byte {index}")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("byte 0 is the address: if that one failed, nothing answered. Check wiring and pull-ups"))
	)]
	Nack { address: u8, index: usize },
}

/// Convenience type for Results in this crate.
pub type Result<T> = std::result::Result<T, Error>;
