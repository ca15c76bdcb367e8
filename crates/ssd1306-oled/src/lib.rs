//! A driver for SSD1306-based monochrome OLED displays.
//!
//! The display is driven in horizontal addressing mode with the full screen as the window, so a
//! frame is a single data write of `width * height / 8` bytes. Frames are composed in a
//! [`Bitmap`], which can be filled from greyscale pixels or drawn on with [`embedded_graphics`].
//!
//! The bus is abstracted by [`Interface`]; with the `ft232h` feature (on by default) it is
//! implemented for [`ft232h_i2c::I2cBus`].
//!
//! # Example
//!
//! ```no_run
//! # use ft232h_i2c::{Clock, I2cBus, Selector, UsbPort};
//! # use ssd1306_oled::{Bitmap, Config, Driver, I2cInterface};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut port = UsbPort::open(&Selector::default())?;
//! port.configure(&Clock::default())?;
//!
//! let config = Config::default();
//! let mut oled = Driver::new(I2cInterface::new(I2cBus::new(port), config.address), config);
//! oled.init()?;
//!
//! let mut frame = oled.bitmap();
//! frame.fill(true);
//! oled.draw(&frame)?;
//! # Ok(()) }
//! ```

#[doc(inline)]
pub use buffer::{Bitmap, Orientation};

#[doc(inline)]
pub use commands::Command;

#[doc(inline)]
pub use config::{Config, Geometry};

#[doc(inline)]
pub use driver::*;

#[doc(inline)]
pub use error::{Error, Result};

mod buffer;
pub mod commands;
mod config;
mod driver;
mod error;
mod graphics;
