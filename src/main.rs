#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> miette::Result<()> {
	let (args, _guard) = oledgif::args()?;
	oledgif::run(args)
}
