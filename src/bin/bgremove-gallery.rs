//! Background Removal Gallery CLI Tool
//!
//! Uploads images to a remote background removal service, lists the results
//! as a gallery and exports them over a chosen background colour.

#[cfg(feature = "cli")]
use bgremove_gallery::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
