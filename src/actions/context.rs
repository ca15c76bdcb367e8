use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::info;

#[derive(Clone, Debug)]
pub struct Context<A = (), B = ()> {
	pub args_top: A,
	pub args_sub: B,
	pub progress: MultiProgress,
	running: Arc<AtomicBool>,
}

impl Context {
	pub fn new() -> Self {
		Self {
			args_top: (),
			args_sub: (),
			progress: MultiProgress::new(),
			running: Arc::new(AtomicBool::new(true)),
		}
	}
}

impl<A, B> Context<A, B> {
	pub fn with_top<C>(self, args_top: C) -> Context<C, B> {
		Context::<C, B> {
			args_top,
			args_sub: self.args_sub,
			progress: self.progress,
			running: self.running,
		}
	}

	#[allow(dead_code)] // no nested subcommands yet
	pub fn with_sub<C>(self, args_sub: C) -> Context<A, C> {
		Context::<A, C> {
			args_top: self.args_top,
			args_sub,
			progress: self.progress,
			running: self.running,
		}
	}

	pub fn take_top(self) -> (A, Context<(), B>) {
		(
			self.args_top,
			Context::<(), B> {
				args_top: (),
				args_sub: self.args_sub,
				progress: self.progress,
				running: self.running,
			},
		)
	}

	pub fn spinner(&self, message: &'static str) -> ProgressBar {
		let bar = self.progress.add(
			ProgressBar::new_spinner()
				.with_style(
					ProgressStyle::default_spinner()
						.template("{spinner:.green} {msg} {human_pos}")
						.expect("spinner template invalid"),
				)
				.with_message(message),
		);
		bar.enable_steady_tick(Duration::from_millis(100));
		bar
	}

	/// Make ctrl-c clear the running flag instead of killing the process.
	///
	/// Can only be called once per process.
	pub fn stop_on_interrupt(&self) -> Result<()> {
		let running = self.running.clone();
		ctrlc::set_handler(move || {
			info!("ctrl-c received, stopping");
			running.store(false, Ordering::SeqCst);
		})
		.into_diagnostic()
		.wrap_err("ctrlc: set_handler")
	}

	/// Whether we should keep going.
	pub fn running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}

	#[cfg(test)]
	pub(crate) fn stop(&self) {
		self.running.store(false, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn args_move_between_slots() {
		let ctx = Context::new().with_top(5_u8).with_sub("sub");
		assert_eq!(ctx.args_top, 5);
		assert_eq!(ctx.args_sub, "sub");

		let (top, ctx) = ctx.take_top();
		assert_eq!(top, 5);
		assert_eq!(ctx.args_sub, "sub");
	}

	#[test]
	fn stop_is_shared_between_clones() {
		let ctx = Context::new();
		let other = ctx.clone().with_top(1);
		assert!(other.running());
		ctx.stop();
		assert!(!other.running());
	}
}
