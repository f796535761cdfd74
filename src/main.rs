//! perfume-db - perfume catalog API

use clap::Parser;
use tracing_subscriber::EnvFilter;

use perfume_db::cli::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    // RUST_LOG wins over --verbose when set
    let default = if app.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    app.run().await
}
