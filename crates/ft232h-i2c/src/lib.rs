//! An I2C master for the FTDI FT232H, driven through its MPSSE engine.
//!
//! The FT232H has no I2C peripheral as such: the MPSSE executes byte-coded pin and clock commands
//! sent over USB, and this crate builds the command sequences that toggle D0 (SCL) and D1/D2 (SDA)
//! to produce I2C start/stop conditions and byte writes. USB itself is handled by FTDI's D2XX
//! driver via [`libftd2xx`].
//!
//! Wiring: D0 to SCL, D1 and D2 tied together to SDA. The bus pull-ups are expected to be on the
//! target board.
//!
//! # Example
//!
//! ```no_run
//! # use ft232h_i2c::{Clock, I2cBus, Result, Selector, UsbPort};
//! # fn main() -> Result<()> {
//! let mut port = UsbPort::open(&Selector::Index(0))?;
//! port.configure(&Clock::default())?;
//!
//! let mut bus = I2cBus::new(port);
//! bus.write_checked(0x3C, &[0x00, 0xAF])?;
//! # Ok(()) }
//! ```

#[doc(inline)]
pub use bus::I2cBus;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use i2c::Packet;

#[doc(inline)]
pub use mpsse::Clock;

#[doc(inline)]
pub use port::*;

pub use libftd2xx::{DeviceInfo, DeviceType};

mod bus;
mod error;
pub mod i2c;
pub mod mpsse;
mod port;
