//! tokio-tungstenite [`StreamConnector`].
//!
//! Protocol-level pings are answered here; application-level heartbeats
//! (JSON `ping`/`pong`) belong to each exchange's feed protocol.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{info, trace};

use crate::error::Result;
use crate::port::{DuplexStream, Frame, StreamConnector};

/// Opens WebSocket connections over rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl StreamConnector for TungsteniteConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn DuplexStream>> {
        info!(url, "Connecting to WebSocket");
        let (ws, response) = connect_async(url).await?;
        info!(status = %response.status(), "WebSocket connected");
        Ok(Box::new(TungsteniteStream { ws }))
    }
}

struct TungsteniteStream {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl DuplexStream for TungsteniteStream {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(bytes) => Message::Binary(bytes),
        };
        self.ws.send(message).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Frame>> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(Frame::Text(text))),
                Ok(Message::Binary(bytes)) => return Some(Ok(Frame::Binary(bytes))),
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = self.ws.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    return None;
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
