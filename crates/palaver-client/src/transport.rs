//! WebSocket transport for the channel.
//!
//! Provides [`ConnectedChannel`] which handles WebSocket I/O for packet
//! transport. This is a thin layer that just sends/receives packets;
//! lifecycle logic stays in the Sans-IO [`crate::ChannelClient`].

use futures_util::{SinkExt, StreamExt};
use palaver_proto::Packet;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Handle to an open channel transport.
///
/// Packets are sent/received via the channels; an internal task handles the
/// WebSocket I/O. Dropping the receiver or calling [`stop`](Self::stop)
/// ends the task.
pub struct ConnectedChannel {
    /// Send packets to the server.
    pub to_server: mpsc::Sender<Packet>,
    /// Receive packets from the server.
    pub from_server: mpsc::Receiver<Packet>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedChannel {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Dial the chat server, presenting the token in the handshake.
///
/// The token rides a query parameter; the server reads it before accepting
/// the upgrade. Returns a [`ConnectedChannel`] with channels for packet
/// transport.
///
/// # Errors
///
/// Returns `TransportError::Connection` if the dial or upgrade fails.
pub async fn connect(server_url: &str, token: &str) -> Result<ConnectedChannel, TransportError> {
    let url = format!("{server_url}?token={token}");
    let (stream, _response) =
        connect_async(&url).await.map_err(|e| TransportError::Connection(e.to_string()))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<Packet>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<Packet>(32);

    let handle = tokio::spawn(run_connection(stream, to_server_rx, from_server_tx));

    Ok(ConnectedChannel {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Bridge between the packet channels and the WebSocket.
async fn run_connection(
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    mut to_server: mpsc::Receiver<Packet>,
    from_server: mpsc::Sender<Packet>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            outgoing = to_server.recv() => {
                let Some(packet) = outgoing else { break };
                let text = match packet.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping unencodable packet");
                        continue;
                    },
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::debug!(error = %e, "websocket send failed; closing");
                    break;
                }
            },
            incoming = source.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match Packet::decode(&text) {
                        Ok(packet) => {
                            if from_server.send(packet).await.is_err() {
                                break;
                            }
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, "dropping malformed frame");
                        },
                    },
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {},
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        tracing::debug!("ignoring non-text frame");
                    },
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "websocket receive failed; closing");
                        break;
                    },
                }
            },
        }
    }
}
