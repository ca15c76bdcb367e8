use clap::Parser;
use ft232h_i2c::DeviceInfo;
use miette::{Result, WrapErr};
use tracing::debug;

use crate::actions::Context;

/// List connected FTDI devices.
///
/// The index shown is what `--index` takes. Devices that are open in another program show as
/// busy and can't be used until that program lets go.
#[derive(Debug, Clone, Parser)]
pub struct DevicesArgs {
	/// Print only the serial numbers, one per line.
	#[arg(long)]
	pub serials: bool,
}

pub fn run(ctx: Context<DevicesArgs>) -> Result<()> {
	let devices = ft232h_i2c::list_devices().wrap_err("listing FTDI devices")?;
	if devices.is_empty() {
		return Err(ft232h_i2c::Error::NoDevices.into());
	}

	for (index, device) in devices.iter().enumerate() {
		debug!(index, ?device, "device");
		if ctx.args_top.serials {
			println!("{}", device.serial_number);
		} else {
			println!("{}", describe(index, device));
		}
	}

	Ok(())
}

fn describe(index: usize, device: &DeviceInfo) -> String {
	format!(
		"{index}: {:?} {:04x}:{:04x} serial={:?} {:?}{}",
		device.device_type,
		device.vendor_id,
		device.product_id,
		device.serial_number,
		device.description,
		if device.port_open { " (busy)" } else { "" },
	)
}

#[cfg(test)]
mod tests {
	use ft232h_i2c::DeviceType;

	use super::*;

	#[test]
	fn describes_device() {
		let device = DeviceInfo {
			port_open: true,
			speed: None,
			device_type: DeviceType::FT232H,
			vendor_id: 0x0403,
			product_id: 0x6014,
			serial_number: "FT4XYZ".into(),
			description: "Single RS232-HS".into(),
		};

		assert_eq!(
			describe(2, &device),
			r#"2: FT232H 0403:6014 serial="FT4XYZ" "Single RS232-HS" (busy)"#
		);
	}
}
