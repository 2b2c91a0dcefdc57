use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = pod_api::Args::parse();

	pod_api::run(args).await
}
