use clap::Subcommand;
use miette::Result;
use tracing::{debug, trace};

pub use context::Context;
pub mod context;
pub mod display;

macro_rules! commands {
	(
		[$argtype:ty => $ctxcode:block]
		$(
			$modname:ident => $enumname:ident($argname:ident)
		),+
	) => {
		$(
			pub mod $modname;
		)*

		#[derive(Debug, Clone, Subcommand)]
		pub enum Action {
			$(
				$enumname($modname::$argname),
			)*
		}

		pub fn run(ctx: $argtype) -> Result<()> {
			let ctxfn = $ctxcode;
			match ctxfn(ctx)? {
				$(
					(Action::$enumname(args), ctx) => $modname::run(ctx.with_top(args)),
				)*
			}
		}
	};
}

use crate::args::Args;

commands! {
	[Args => {|args: Args| -> Result<(Action, Context<()>)> {
		let ctx = Context::new().with_top(args.action);
		debug!(version=%env!("CARGO_PKG_VERSION"), "starting up");
		trace!(?ctx, "context");
		Ok(ctx.take_top())
	}}]

	completions => Completions(CompletionsArgs),
	devices => Devices(DevicesArgs),
	fill => Fill(FillArgs),
	off => Off(OffArgs),
	play => Play(PlayArgs),
	text => Text(TextArgs)
}
