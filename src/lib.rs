pub mod cli;
pub mod client;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod server;
pub mod storage;
pub mod transport;

use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    if args.is_client() {
        info!("--- Client Configuration ---");
        info!("Mode: {}", if args.chat { "chat" } else { "form" });
        info!("Origin: {}", args.origin);
        info!("Direct Backend URL: {}", args.direct_backend_url.as_deref().unwrap_or("(same-origin)"));
        info!("View: {:?}", args.view);
        info!("Saved Plan Path: {}", args.saved_plan_path);
        info!("----------------------------");
        return client::run(&args).await;
    }

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Backend URL: {}", args.backend_url);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, args);
    server.run().await?;

    Ok(())
}
