/// Error type for driver operations.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum Error {
	#[cfg(feature = "ft232h")]
	#[error(transparent)]
	#[cfg_attr(feature = "miette", diagnostic(transparent))]
	I2c(#[from] ft232h_i2c::Error),

	#[error("display bus error")]
	#[cfg_attr(feature = "miette", diagnostic(help("error from a custom display interface")))]
	Bus(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("unsupported display size {width}x{height}")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("supported sizes are 128x64, 128x32, 96x16, 64x48, and 64x32"))
	)]
	UnsupportedSize { width: u16, height: u16 },

	#[error("frame is {}x{}, display is {}x{}", .found.0, .found.1, .expected.0, .expected.1)]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("frames must match the display resolution exactly"))
	)]
	Size {
		expected: (u16, u16),
		found: (u16, u16),
	},
}

/// Convenience type for Results in this crate.
pub type Result<T> = std::result::Result<T, Error>;
