//! SSD1306 commands.
//!
//! This is the subset of the command set needed to initialise the controller and stream frames.
//! Descriptions are from [the datasheet][SSD1306].
//!
//! [SSD1306]: https://cdn-shop.adafruit.com/datasheets/SSD1306.pdf

/// I2C control byte announcing that the rest of the transaction is commands.
pub const CONTROL_COMMAND: u8 = 0x00;

/// I2C control byte announcing that the rest of the transaction is display RAM data.
pub const CONTROL_DATA: u8 = 0x40;

/// Default I2C address (SA0 low). Boards with SA0 pulled high use 0x3D.
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Display commands.
///
/// Some commands take their argument in the low bits of the opcode itself; those are written as
/// `Command::X as u8 | arg`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
	/// Memory addressing mode. Followed by 0x00 (horizontal), 0x01 (vertical), or 0x02 (page).
	MemoryMode = 0x20,

	/// Column window for horizontal/vertical addressing. Followed by start and end column.
	ColumnAddress = 0x21,

	/// Page window for horizontal/vertical addressing. Followed by start and end page.
	PageAddress = 0x22,

	/// Set contrast. Followed by the level, 0-255.
	Contrast = 0x81,

	/// Charge pump setting. Followed by 0x14 (enable) or 0x10 (disable, external VCC).
	ChargePump = 0x8D,

	/// Display start line, in the low 6 bits.
	StartLine = 0x40,

	/// Segment remap: OR with 1 to map column 127 to SEG0.
	SegmentRemap = 0xA0,

	/// Follow RAM contents. OR with 1 to light every pixel regardless.
	EntireOn = 0xA4,

	/// Normal display: a set bit is a lit pixel.
	Normal = 0xA6,

	/// Inverse display: a set bit is a dark pixel.
	Inverse = 0xA7,

	/// Multiplex ratio. Followed by the number of rows minus one.
	MuxRatio = 0xA8,

	/// Display off (sleep).
	DisplayOff = 0xAE,

	/// Display on.
	DisplayOn = 0xAF,

	/// COM output scan direction: OR with 0x08 to scan from COM[N-1] to COM0.
	ComScanDirection = 0xC0,

	/// Vertical display offset. Followed by the offset in rows.
	DisplayOffset = 0xD3,

	/// Display clock divide ratio and oscillator frequency. Followed by the packed setting.
	ClockDivide = 0xD5,

	/// Pre-charge period. Followed by phase 2 << 4 | phase 1.
	Precharge = 0xD9,

	/// COM pins hardware configuration. Followed by 0x02 (sequential) or 0x12 (alternative).
	ComPins = 0xDA,

	/// VCOMH deselect level. Followed by the level.
	VcomDeselect = 0xDB,
}

impl From<Command> for u8 {
	fn from(command: Command) -> Self {
		command as u8
	}
}
