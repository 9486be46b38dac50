use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use gavalink::call::CallController;
use gavalink::context::CallContext;
use gavalink::http::{create_router, AppState};
use gavalink::moderation::RequestStore;
use gavalink::nats::RequestEventsClient;
use gavalink::vendor::{StaticMicrophoneGateway, VendorFactory};
use gavalink::widget::WidgetVisibility;
use gavalink::Config;

#[derive(Parser)]
#[command(name = "gavalink")]
#[command(about = "GavaLink voice call core daemon")]
struct Args {
    /// Config file path (without extension)
    #[arg(short, long, default_value = "config/gavalink")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("GavaLink voice core v0.1.0");
    info!("Loaded config: {}", cfg.service.name);

    let bind = args.bind.unwrap_or_else(|| cfg.service.http.bind.clone());
    let port = args.port.unwrap_or(cfg.service.http.port);

    // The live-update channel is optional; moderation works without the
    // broker, officers just fall back to refreshing.
    let events = if cfg.nats.enabled {
        match RequestEventsClient::connect(&cfg.nats.url).await {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("NATS unavailable, live updates disabled: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let context = CallContext::new();
    let vendor = VendorFactory::create(&cfg.voice)?;
    let microphone = Arc::new(StaticMicrophoneGateway::granted());
    let controller = Arc::new(CallController::new(
        cfg.voice.call_config(),
        context.clone(),
        vendor,
        microphone,
    ));
    let requests = RequestStore::new(events);
    let widget = WidgetVisibility::new(cfg.widget.routes.clone());

    let state = AppState::new(controller, context, requests, widget);
    let router = create_router(state);

    let addr = format!("{}:{}", bind, port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
