use clap::Parser;
use ft232h_i2c::UsbPort;
use miette::Result;
use tracing::info;

use crate::actions::{display::DisplayArgs, Context};

/// Blank the display and put it to sleep.
#[derive(Debug, Clone, Parser)]
pub struct OffArgs {
	#[command(flatten)]
	pub display: DisplayArgs,
}

pub fn run(ctx: Context<OffArgs>) -> Result<()> {
	let mut oled = ctx.args_top.display.open(UsbPort::DEFAULT_SETTLE)?;
	oled.clear()?;
	oled.display(false)?;
	info!("display off");
	Ok(())
}
