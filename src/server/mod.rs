//! WebSocket front end.
//!
//! Each accepted connection gets its own task, its own strategy instance and
//! its own scan cursor. Nothing is shared between connections except the
//! read-only configuration and the market-data provider.

mod protocol;
mod session;

pub use protocol::{
    ControlMessage, ServerEvent, StockUpdate, StrategyDescriptor, SuggestedTrade, Summary,
    TradeProposal,
};
pub use session::{apply_control, ActiveStrategy, ScanSession};

use anyhow::{Context, Result};
use futures_util::{future, Sink, SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::TransportError;
use crate::market::MarketDataProvider;
use crate::signals::create_strategy;

/// Accepts clients and runs one [`ScanSession`] per connection.
pub struct ScanServer {
    config: Arc<Config>,
    provider: Arc<dyn MarketDataProvider>,
}

impl ScanServer {
    pub fn new(config: Config, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = &self.config.server.bind_addr;
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local = listener.local_addr().context("Listener has no local address")?;
        info!(
            "🚀 Listening on ws://{}{} ({} symbols, strategy {})",
            local,
            self.config.server.path,
            self.config.universe.len(),
            self.config.strategy.name
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let config = Arc::clone(&self.config);
                        let provider = Arc::clone(&self.provider);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, config, provider).await {
                                warn!(%peer, error = %e, "Connection ended with error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "Failed to accept connection"),
                },
            }
        }

        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<Config>,
    provider: Arc<dyn MarketDataProvider>,
) -> Result<()> {
    let expected = config.server.path.clone();
    let ws = accept_hdr_async(stream, |request: &Request, response: Response| {
        if request.uri().path() == expected {
            Ok(response)
        } else {
            let mut rejection = ErrorResponse::new(Some(format!(
                "no scan endpoint at {}",
                request.uri().path()
            )));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            Err(rejection)
        }
    })
    .await
    .map_err(TransportError::from)
    .context("WebSocket handshake failed")?;

    info!(%peer, "Client connected");

    let initial = create_strategy(&config.strategy.name, &config.strategy.params)
        .context("Default strategy is invalid")?;
    let session = ScanSession::new(provider, &config);

    let (sink, stream) = ws.split();
    let control = Box::pin(
        stream
            .take_while(|frame| {
                let open = match frame {
                    Ok(Message::Close(_)) => false,
                    Ok(_) => true,
                    Err(e) => {
                        debug!(error = %e, "Read failed");
                        false
                    }
                };
                future::ready(open)
            })
            .filter_map(|frame| {
                future::ready(match frame {
                    Ok(Message::Text(text)) => Some(text.to_string()),
                    _ => None,
                })
            }),
    );

    let (events_tx, events_rx) = mpsc::channel(config.server.event_buffer);

    let outcome = tokio::select! {
        res = session.run(initial, control, events_tx) => res,
        res = forward_events(events_rx, sink) => res,
    };

    info!(%peer, "Client disconnected");
    outcome.map_err(Into::into)
}

/// Serialize queued events onto the socket in order.
async fn forward_events<S>(
    mut events: mpsc::Receiver<ServerEvent>,
    mut sink: S,
) -> Result<(), TransportError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(event) = events.recv().await {
        let json = event.to_json()?;
        sink.send(Message::Text(json.into())).await?;
    }
    sink.close().await?;
    Ok(())
}
