use clap::{Parser, ValueEnum};
use embedded_graphics::{
	mono_font::{
		ascii::{FONT_10X20, FONT_5X8, FONT_6X10},
		MonoFont, MonoTextStyle,
	},
	pixelcolor::BinaryColor,
	prelude::*,
	text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use ft232h_i2c::UsbPort;
use miette::Result;
use ssd1306_oled::Bitmap;
use tracing::{debug, info};

use crate::actions::{display::DisplayArgs, Context};

/// Print some text.
///
/// The text is centred on the screen. Use `\n` (either a real newline or the two characters) to
/// break lines. Anything that doesn't fit is cut off.
#[derive(Debug, Clone, Parser)]
pub struct TextArgs {
	/// Text to display.
	#[arg(name = "TEXT")]
	pub text: String,

	/// Font size.
	#[arg(long, default_value = "medium")]
	pub font: FontSize,

	/// Show dark text on a lit background.
	#[arg(long)]
	pub invert: bool,

	#[command(flatten)]
	pub display: DisplayArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum FontSize {
	/// 5x8 pixels per character
	Small,
	/// 6x10 pixels per character
	Medium,
	/// 10x20 pixels per character
	Large,
}

impl FontSize {
	fn font(self) -> &'static MonoFont<'static> {
		match self {
			Self::Small => &FONT_5X8,
			Self::Medium => &FONT_6X10,
			Self::Large => &FONT_10X20,
		}
	}
}

pub fn run(ctx: Context<TextArgs>) -> Result<()> {
	let TextArgs {
		text,
		font,
		invert,
		display,
	} = ctx.args_top;

	let mut oled = display.open(UsbPort::DEFAULT_SETTLE)?;

	let mut frame = oled.bitmap();
	render(&mut frame, &text.replace("\\n", "\n"), font.font());
	if invert {
		frame.invert();
	}
	oled.draw(&frame)?;

	info!(lines = text.lines().count(), "text shown");
	Ok(())
}

/// Draw text centred both ways.
fn render(frame: &mut Bitmap, text: &str, font: &MonoFont<'_>) {
	let lines = u32::try_from(text.split('\n').count()).unwrap_or(u32::MAX);
	let block = lines.saturating_mul(font.character_size.height);
	let top = (i64::from(frame.height) - i64::from(block)) / 2;
	debug!(lines, block, top, "laying out text");

	let position = Point::new(
		i32::from(frame.width) / 2,
		i32::try_from(top).unwrap_or(i32::MIN),
	);
	let text = Text::with_text_style(
		text,
		position,
		MonoTextStyle::new(font, BinaryColor::On),
		TextStyleBuilder::new()
			.alignment(Alignment::Center)
			.baseline(Baseline::Top)
			.build(),
	);

	match text.draw(frame) {
		Ok(_) => {}
		Err(never) => match never {},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lit(frame: &Bitmap) -> Vec<(u16, u16)> {
		let mut pixels = Vec::new();
		for y in 0..frame.height {
			for x in 0..frame.width {
				if frame.get(x, y) {
					pixels.push((x, y));
				}
			}
		}
		pixels
	}

	#[test]
	fn empty_text_is_blank() {
		let mut frame = Bitmap::new(128, 64);
		render(&mut frame, "", &FONT_6X10);
		assert_eq!(frame.count_lit(), 0);
	}

	#[test]
	fn single_character_is_centred() {
		let mut frame = Bitmap::new(128, 64);
		render(&mut frame, "I", &FONT_6X10);

		let pixels = lit(&frame);
		assert!(!pixels.is_empty());
		assert!(pixels
			.iter()
			.all(|&(x, y)| (61..67).contains(&x) && (27..37).contains(&y)));
	}

	#[test]
	fn lines_stack() {
		let mut frame = Bitmap::new(128, 64);
		render(&mut frame, "I\nI", &FONT_6X10);

		let pixels = lit(&frame);
		assert!(pixels.iter().all(|&(_, y)| (22..42).contains(&y)));
		assert!(pixels.iter().any(|&(_, y)| y < 32));
		assert!(pixels.iter().any(|&(_, y)| y >= 32));
	}

	#[test]
	fn overflow_is_clipped() {
		let mut frame = Bitmap::new(64, 32);
		render(&mut frame, &"W".repeat(40), &FONT_10X20);
		assert!(frame.count_lit() > 0);
	}
}
