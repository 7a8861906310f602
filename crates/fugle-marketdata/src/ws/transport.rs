/*
[INPUT]:  WebSocket URL, connect timeout, outbound frame channel
[OUTPUT]: Inbound text frames / transport errors and the final close info
[POS]:    WebSocket layer - socket plumbing over tokio-tungstenite
[UPDATE]: When changing connection options or frame handling
*/

use std::ops::ControlFlow;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::error::{FugleError, Result};

pub(crate) type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the receive loop hands to the client
#[derive(Debug)]
pub(crate) enum TransportEvent {
    Text(String),
    Error(String),
}

/// How the connection ended
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CloseInfo {
    pub code: Option<u16>,
    pub reason: String,
}

/// Open a socket, bounded by `timeout`
pub(crate) async fn open(url: &str, timeout: Duration) -> Result<Stream> {
    match tokio::time::timeout(timeout, connect_async(url)).await {
        Ok(Ok((stream, _response))) => Ok(stream),
        Ok(Err(err)) => Err(FugleError::WebSocket(err)),
        Err(_) => Err(FugleError::ConnectTimeout { duration: timeout }),
    }
}

/// Pump frames until either side closes.
///
/// Dropping every sender of `outbound_rx` closes the socket. Undecodable frames
/// are reported and the loop keeps reading; stream errors end it.
pub(crate) async fn run<F>(
    stream: Stream,
    mut outbound_rx: mpsc::UnboundedReceiver<WsMessage>,
    mut on_event: F,
) -> CloseInfo
where
    F: FnMut(TransportEvent) -> ControlFlow<()>,
{
    let (mut write, mut read) = stream.split();
    let mut close = CloseInfo::default();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(message) => {
                        if let Err(err) = write.send(message).await {
                            let _ = on_event(TransportEvent::Error(err.to_string()));
                            close.reason = err.to_string();
                            break;
                        }
                    }
                    None => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        close.reason = "client disconnect".to_string();
                        break;
                    }
                }
            }
            incoming = read.next() => {
                let event = match incoming {
                    Some(Ok(WsMessage::Text(text))) => TransportEvent::Text(text.as_str().to_string()),
                    Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => TransportEvent::Text(text),
                        Err(err) => TransportEvent::Error(format!("binary frame is not utf-8: {err}")),
                    },
                    Some(Ok(WsMessage::Close(frame))) => {
                        if let Some(frame) = frame {
                            close.code = Some(u16::from(frame.code));
                            close.reason = frame.reason.as_str().to_string();
                        }
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        let _ = on_event(TransportEvent::Error(err.to_string()));
                        close.reason = err.to_string();
                        break;
                    }
                    None => {
                        debug!("ws stream ended");
                        break;
                    }
                };
                if on_event(event).is_break() {
                    let _ = write.send(WsMessage::Close(None)).await;
                    break;
                }
            }
        }
    }

    close
}
