use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = lexis_api::Args::parse();

	lexis_api::run(args).await
}
