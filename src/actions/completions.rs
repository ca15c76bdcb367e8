use std::io::Write;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Generator, Shell};
use miette::Result;

use crate::actions::Context;

/// Generate a shell completions script.
///
/// Provides a completions script or configuration for the given shell.
#[derive(Debug, Clone, Parser)]
pub struct CompletionsArgs {
	/// Shell to generate a completions script for.
	#[arg(long, env = "SHELL")]
	pub shell: ShellCompletion,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ShellCompletion {
	#[value(alias("/usr/bin/bash"), alias("/bin/bash"))]
	Bash,

	#[value(alias("/usr/bin/elvish"))]
	Elvish,

	#[value(alias("/usr/bin/fish"), alias("/bin/fish"))]
	Fish,

	#[value(alias("/usr/bin/nu"))]
	Nu,

	#[value(alias("/usr/bin/pwsh"))]
	Powershell,

	#[value(alias("/usr/bin/zsh"), alias("/bin/zsh"))]
	Zsh,
}

pub fn run(ctx: Context<CompletionsArgs>) -> Result<()> {
	write_script(ctx.args_top.shell, &mut std::io::stdout());
	Ok(())
}

fn write_script(shell: ShellCompletion, out: &mut dyn Write) {
	fn generate(generator: impl Generator, out: &mut dyn Write) {
		let mut cmd = crate::args::Args::command();
		clap_complete::generate(generator, &mut cmd, env!("CARGO_PKG_NAME"), out);
	}

	match shell {
		ShellCompletion::Bash => generate(Shell::Bash, out),
		ShellCompletion::Elvish => generate(Shell::Elvish, out),
		ShellCompletion::Fish => generate(Shell::Fish, out),
		ShellCompletion::Nu => generate(clap_complete_nushell::Nushell, out),
		ShellCompletion::Powershell => generate(Shell::PowerShell, out),
		ShellCompletion::Zsh => generate(Shell::Zsh, out),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bash_script_knows_subcommands() {
		let mut out = Vec::new();
		write_script(ShellCompletion::Bash, &mut out);
		let script = String::from_utf8(out).unwrap();
		assert!(script.contains("oledgif"));
		assert!(script.contains("play"));
		assert!(script.contains("--gif-timing"));
	}

	#[test]
	fn shell_paths_are_accepted() {
		let args = CompletionsArgs::try_parse_from(["completions", "--shell", "/bin/zsh"]).unwrap();
		assert_eq!(args.shell, ShellCompletion::Zsh);
	}
}
