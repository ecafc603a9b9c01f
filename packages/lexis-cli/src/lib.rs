use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

/// Version string shown by `--version` on every Lexis binary.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (lexis)");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}
