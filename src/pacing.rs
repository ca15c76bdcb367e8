//! Frame pacing.

use std::{
	thread::sleep,
	time::{Duration, Instant},
};

use tracing::trace;

/// How long each frame stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
	/// The same period for every frame.
	Fixed(Duration),

	/// The delay stored in the GIF, or the fallback period for frames with no delay.
	Gif { fallback: Duration },
}

impl Timing {
	/// The period for a frame rate.
	///
	/// Returns `None` for rates that aren't finite and positive.
	pub fn period_for_fps(fps: f64) -> Option<Duration> {
		if !fps.is_finite() || fps <= 0.0 {
			return None;
		}

		Duration::try_from_secs_f64(1.0 / fps).ok()
	}

	/// The period of a frame with the given GIF delay.
	pub fn period(&self, delay: Duration) -> Duration {
		match *self {
			Self::Fixed(period) => period,
			Self::Gif { fallback } if delay.is_zero() => fallback,
			Self::Gif { .. } => delay,
		}
	}
}

/// Sleeps between frames.
///
/// Each wait measures from when the previous wait returned, so time spent sending the frame
/// counts towards its period. The first wait returns immediately.
#[derive(Debug, Default)]
pub struct Pacer {
	last: Option<Instant>,
}

impl Pacer {
	pub fn new() -> Self {
		Self::default()
	}

	/// How long to sleep at `now` for a frame of `period`.
	pub fn remaining(&self, now: Instant, period: Duration) -> Duration {
		match self.last {
			None => Duration::ZERO,
			Some(last) => (last + period).saturating_duration_since(now),
		}
	}

	/// Sleep until the frame period is up, then start the next one.
	pub fn wait(&mut self, period: Duration) {
		let remaining = self.remaining(Instant::now(), period);
		if !remaining.is_zero() {
			trace!(?remaining, "pacing");
			sleep(remaining);
		}
		self.last = Some(Instant::now());
	}

	/// Forget the previous frame, so the next wait returns immediately.
	pub fn reset(&mut self) {
		self.last = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fps_periods() {
		assert_eq!(Timing::period_for_fps(10.0), Some(Duration::from_millis(100)));
		assert_eq!(
			Timing::period_for_fps(23.976).map(|p| p.as_micros()),
			Some(41708)
		);
		assert_eq!(Timing::period_for_fps(0.0), None);
		assert_eq!(Timing::period_for_fps(-5.0), None);
		assert_eq!(Timing::period_for_fps(f64::NAN), None);
		assert_eq!(Timing::period_for_fps(f64::INFINITY), None);
	}

	#[test]
	fn fixed_ignores_gif_delay() {
		let timing = Timing::Fixed(Duration::from_millis(40));
		assert_eq!(timing.period(Duration::from_millis(100)), Duration::from_millis(40));
		assert_eq!(timing.period(Duration::ZERO), Duration::from_millis(40));
	}

	#[test]
	fn gif_timing_falls_back_on_zero() {
		let timing = Timing::Gif {
			fallback: Duration::from_millis(40),
		};
		assert_eq!(timing.period(Duration::from_millis(100)), Duration::from_millis(100));
		assert_eq!(timing.period(Duration::ZERO), Duration::from_millis(40));
	}

	#[test]
	fn first_frame_is_immediate() {
		let pacer = Pacer::new();
		assert_eq!(
			pacer.remaining(Instant::now(), Duration::from_secs(10)),
			Duration::ZERO
		);
	}

	#[test]
	fn remaining_counts_from_last_frame() {
		let start = Instant::now();
		let pacer = Pacer { last: Some(start) };
		let period = Duration::from_millis(100);

		assert_eq!(pacer.remaining(start, period), period);
		assert_eq!(
			pacer.remaining(start + Duration::from_millis(30), period),
			Duration::from_millis(70)
		);
		assert_eq!(
			pacer.remaining(start + Duration::from_millis(250), period),
			Duration::ZERO
		);
	}

	#[test]
	fn wait_sleeps_and_resets() {
		let mut pacer = Pacer::new();
		let period = Duration::from_millis(20);

		let start = Instant::now();
		pacer.wait(period);
		pacer.wait(period);
		assert!(start.elapsed() >= period);

		pacer.reset();
		let again = Instant::now();
		pacer.wait(Duration::from_secs(10));
		assert!(again.elapsed() < Duration::from_secs(5));
	}
}
