use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = pod_indexer::Args::parse();

	pod_indexer::run(args).await
}
