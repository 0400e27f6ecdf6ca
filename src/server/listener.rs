use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::handler::Handler;

pub async fn run<H: Handler>(cfg: &Config, handler: H) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, cfg.clone(), Arc::new(handler)).await
}

/// Accepts connections forever, one task per connection.
pub async fn serve<H: Handler>(
    listener: TcpListener,
    cfg: Config,
    handler: Arc<H>,
) -> anyhow::Result<()> {
    let cfg = Arc::new(cfg);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let cfg = Arc::clone(&cfg);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let conn = Connection::new(socket, &cfg);
            if let Err(e) = conn.run(handler.as_ref()).await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
