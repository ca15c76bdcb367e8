#![deny(rust_2018_idioms)]

pub use crate::actions::run;
pub use crate::args::get_args as args;

pub(crate) mod actions;
pub(crate) mod args;
pub mod animation;
pub mod pacing;
