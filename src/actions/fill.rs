use clap::{Parser, ValueEnum};
use ft232h_i2c::UsbPort;
use miette::Result;
use tracing::info;

use crate::actions::{display::DisplayArgs, Context};

/// Light or clear the whole screen.
///
/// Handy for checking wiring and looking for dead pixels.
#[derive(Debug, Clone, Parser)]
pub struct FillArgs {
	/// Whether pixels are lit.
	pub state: FillState,

	#[command(flatten)]
	pub display: DisplayArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum FillState {
	On,
	Off,
}

pub fn run(ctx: Context<FillArgs>) -> Result<()> {
	let mut oled = ctx.args_top.display.open(UsbPort::DEFAULT_SETTLE)?;

	let mut frame = oled.bitmap();
	frame.fill(ctx.args_top.state == FillState::On);
	oled.draw(&frame)?;

	info!(state = ?ctx.args_top.state, "filled");
	Ok(())
}
