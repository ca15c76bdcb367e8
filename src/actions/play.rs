use std::{
	path::PathBuf,
	time::{Duration, Instant},
};

use clap::Parser;
use indicatif::ProgressBar;
use miette::{miette, Result, WrapErr};
use ssd1306_oled::{Driver, Interface};
use tracing::{debug, info, instrument, warn};

use crate::{
	actions::{display::DisplayArgs, Context},
	animation::{Animation, LoadOptions},
	pacing::{Pacer, Timing},
};

/// Play a GIF animation.
///
/// Every frame is decoded up front, converted to black and white, and then sent to the display
/// in a loop until the loop count or duration is reached, or ctrl-c is pressed.
///
/// The GIF must be the same size as the display unless `--resize` is given.
#[derive(Debug, Clone, Parser)]
pub struct PlayArgs {
	/// GIF file to play.
	#[arg(name = "GIF")]
	pub gif: PathBuf,

	/// Frames per second.
	///
	/// With `--gif-timing`, this is only used for frames that have no delay of their own.
	#[arg(long, default_value = "23.976", value_parser = parse_fps)]
	pub fps: f64,

	/// Use the delays stored in the GIF instead of a fixed frame rate.
	#[arg(long)]
	pub gif_timing: bool,

	/// Brightness above which a pixel is lit, from 0 to 255.
	#[arg(long, default_value = "200", conflicts_with = "dither")]
	pub threshold: u8,

	/// Dither greys instead of thresholding.
	///
	/// Better for photographic content, worse for line art.
	#[arg(long)]
	pub dither: bool,

	/// Swap lit and dark pixels.
	#[arg(long)]
	pub invert: bool,

	/// Scale frames to the display size.
	///
	/// The aspect ratio is not kept.
	#[arg(long)]
	pub resize: bool,

	/// How many times to play the animation through.
	///
	/// 0 loops forever.
	#[arg(long, default_value = "0")]
	pub loops: u64,

	/// Stop after this long.
	#[arg(long, value_name = "DURATION")]
	pub duration: Option<humantime::Duration>,

	/// Check every frame is acknowledged by the display.
	///
	/// Slower, but fails fast when the display is disconnected mid-playback.
	#[arg(long)]
	pub verify_ack: bool,

	/// How long to pause when resynchronising the USB link between loops.
	#[arg(long, value_name = "DURATION", default_value = "2085us")]
	pub settle: humantime::Duration,

	/// Clear and turn off the display when playback stops.
	#[arg(long)]
	pub blank_on_exit: bool,

	#[command(flatten)]
	pub display: DisplayArgs,
}

fn parse_fps(s: &str) -> Result<f64, String> {
	let fps: f64 = s.parse().map_err(|err| format!("{err}"))?;
	if Timing::period_for_fps(fps).is_none() {
		return Err(format!("{s} is not a usable frame rate"));
	}
	Ok(fps)
}

/// When playback ends.
#[derive(Debug, Clone, Copy)]
struct Playback {
	timing: Timing,
	loops: u64,
	until: Option<Instant>,
}

pub fn run(ctx: Context<PlayArgs>) -> Result<()> {
	let args = &ctx.args_top;

	let period = Timing::period_for_fps(args.fps)
		.ok_or_else(|| miette!("{} is not a usable frame rate", args.fps))?;
	let timing = if args.gif_timing {
		Timing::Gif { fallback: period }
	} else {
		Timing::Fixed(period)
	};

	let options = LoadOptions {
		width: args.display.width,
		height: args.display.height,
		threshold: args.threshold,
		dither: args.dither,
		invert: args.invert,
		resize: args.resize,
	};

	let loading = ctx.spinner("loading");
	let animation = Animation::open(&args.gif, &options)
		.wrap_err_with(|| format!("loading {:?}", args.gif))?;
	loading.finish_and_clear();
	info!(
		frames = animation.len(),
		length = ?animation.duration(),
		?timing,
		"loaded animation"
	);

	ctx.stop_on_interrupt()?;

	let mut oled = args.display.open(args.settle.into())?;
	oled.verify_writes(args.verify_ack);

	let playback = Playback {
		timing,
		loops: args.loops,
		until: args.duration.map(|d| Instant::now() + Duration::from(d)),
	};

	let progress = ctx.spinner("frames");
	let mut pacer = Pacer::new();
	let result = play(
		&mut oled,
		&animation,
		playback,
		&progress,
		|period| pacer.wait(period),
		|| ctx.running(),
	);
	progress.finish_and_clear();

	if args.blank_on_exit {
		if let Err(err) = oled.clear().and_then(|()| oled.display(false)) {
			warn!(?err, "could not blank display");
		}
	}

	let shown = result?;
	info!(shown, "playback stopped");
	Ok(())
}

/// Send frames until told to stop, returning how many were shown.
///
/// The USB link is resynchronised before each pass over the frames. Before each frame, `wait` is
/// given how long the previous frame should stay up.
#[instrument(level = "debug", skip(oled, animation, progress, wait, running))]
fn play<I: Interface>(
	oled: &mut Driver<I>,
	animation: &Animation,
	playback: Playback,
	progress: &ProgressBar,
	mut wait: impl FnMut(Duration),
	running: impl Fn() -> bool,
) -> Result<u64> {
	let mut hold = Duration::ZERO;
	let mut shown = 0;
	let mut pass = 0;

	'passes: while playback.loops == 0 || pass < playback.loops {
		oled.resync().wrap_err("resynchronising")?;

		for (frame, delay) in animation.frames() {
			if !running() || playback.until.is_some_and(|until| Instant::now() >= until) {
				break 'passes;
			}

			wait(hold);
			oled.draw(frame)
				.wrap_err_with(|| format!("sending frame {shown}"))?;
			hold = playback.timing.period(*delay);

			shown += 1;
			progress.inc(1);
		}

		pass += 1;
		debug!(pass, shown, "finished pass");
	}

	Ok(shown)
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use image::{Delay, Frame, RgbaImage};
	use ssd1306_oled::Config;

	use super::*;

	#[derive(Debug, Default)]
	struct Counter {
		frames: usize,
		resyncs: usize,
		fail_after: Option<usize>,
	}

	impl Interface for Counter {
		fn send_commands(&mut self, _commands: &[u8]) -> ssd1306_oled::Result<()> {
			Ok(())
		}

		fn send_data(&mut self, data: &[u8]) -> ssd1306_oled::Result<()> {
			assert_eq!(data.len(), 1024);
			if self.fail_after.is_some_and(|limit| self.frames >= limit) {
				return Err(ssd1306_oled::Error::Bus("unplugged".into()));
			}
			self.frames += 1;
			Ok(())
		}

		fn resync(&mut self) -> ssd1306_oled::Result<()> {
			self.resyncs += 1;
			Ok(())
		}
	}

	fn animation(count: usize) -> Animation {
		timed(&vec![0; count])
	}

	fn timed(delays_ms: &[u32]) -> Animation {
		let frames = delays_ms
			.iter()
			.map(|&ms| {
				Frame::from_parts(
					RgbaImage::new(128, 64),
					0,
					0,
					Delay::from_numer_denom_ms(ms, 1),
				)
			})
			.collect();
		Animation::from_frames(frames, &LoadOptions::default()).unwrap()
	}

	fn fast(loops: u64) -> Playback {
		Playback {
			timing: Timing::Fixed(Duration::ZERO),
			loops,
			until: None,
		}
	}

	fn oled(counter: Counter) -> Driver<Counter> {
		Driver::new(counter, Config::default())
	}

	#[test]
	fn plays_requested_loops() {
		let mut oled = oled(Counter::default());
		let shown = play(
			&mut oled,
			&animation(3),
			fast(2),
			&ProgressBar::hidden(),
			|_| {},
			|| true,
		)
		.unwrap();

		assert_eq!(shown, 6);
		assert_eq!(oled.interface().frames, 6);
		assert_eq!(oled.interface().resyncs, 2);
	}

	#[test]
	fn each_delay_holds_its_own_frame() {
		let mut oled = oled(Counter::default());
		let mut waits = Vec::new();
		let playback = Playback {
			timing: Timing::Gif {
				fallback: Duration::from_millis(40),
			},
			loops: 2,
			until: None,
		};

		play(
			&mut oled,
			&timed(&[100, 0, 300]),
			playback,
			&ProgressBar::hidden(),
			|period| waits.push(period),
			|| true,
		)
		.unwrap();

		let ms = |n| Duration::from_millis(n);
		// the wait before a frame is the previous frame's delay
		assert_eq!(
			waits,
			[ms(0), ms(100), ms(40), ms(300), ms(100), ms(40)]
		);
	}

	#[test]
	fn stops_when_interrupted() {
		let mut oled = oled(Counter::default());
		let polls = Cell::new(0);
		let shown = play(
			&mut oled,
			&animation(3),
			fast(0),
			&ProgressBar::hidden(),
			|_| {},
			|| {
				polls.set(polls.get() + 1);
				polls.get() <= 4
			},
		)
		.unwrap();

		assert_eq!(shown, 4);
		assert_eq!(oled.interface().resyncs, 2);
	}

	#[test]
	fn stops_at_deadline() {
		let mut oled = oled(Counter::default());
		let playback = Playback {
			until: Some(Instant::now()),
			..fast(0)
		};
		let shown = play(
			&mut oled,
			&animation(3),
			playback,
			&ProgressBar::hidden(),
			|_| {},
			|| true,
		)
		.unwrap();

		assert_eq!(shown, 0);
	}

	#[test]
	fn bus_errors_stop_playback() {
		let mut oled = oled(Counter {
			fail_after: Some(2),
			..Default::default()
		});
		let err = play(
			&mut oled,
			&animation(3),
			fast(0),
			&ProgressBar::hidden(),
			|_| {},
			|| true,
		)
		.unwrap_err();

		assert!(format!("{err}").contains("sending frame 2"));
		assert_eq!(oled.interface().frames, 2);
	}

	#[test]
	fn fps_must_be_positive() {
		assert_eq!(parse_fps("10"), Ok(10.0));
		assert!(parse_fps("0").is_err());
		assert!(parse_fps("-1").is_err());
		assert!(parse_fps("fast").is_err());
	}

	#[test]
	fn args_defaults() {
		let args = PlayArgs::try_parse_from(["play", "cat.gif"]).unwrap();
		assert_eq!(args.fps, 23.976);
		assert_eq!(args.threshold, 200);
		assert_eq!(args.loops, 0);
		assert_eq!(Duration::from(args.settle), Duration::from_micros(2085));
		assert!(args.duration.is_none());
	}

	#[test]
	fn dither_conflicts_with_threshold() {
		assert!(PlayArgs::try_parse_from(["play", "cat.gif", "--dither", "--threshold", "10"]).is_err());
	}
}
