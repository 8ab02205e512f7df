//! Wordlink server binary.
//!
//! Environment:
//! - `WORDLINK_ADDR`: listen address (default `127.0.0.1:8080`)
//! - `WORDLINK_AUDIT_LOG`: if set, accepted words are appended to this
//!   file as JSON lines
//! - `RUST_LOG`: log filter (default `wordlink=info,wordlink_room=info`)

use tracing_subscriber::EnvFilter;
use wordlink::prelude::*;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), WordlinkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wordlink=info,wordlink_room=info")),
        )
        .init();

    let addr = std::env::var("WORDLINK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let mut builder = WordlinkServer::builder().bind(&addr);
    if let Ok(path) = std::env::var("WORDLINK_AUDIT_LOG") {
        tracing::info!(%path, "auditing accepted words");
        builder = builder.audit_sink(JsonLinesAuditSink::new(path));
    }

    let server = builder.build().await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
