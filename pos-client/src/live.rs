//! Live channel client
//!
//! Connects to `/ws` with the session cookie, sends `auth{tenantId}` first,
//! then forwards commands and applies every broadcast to the query cache.

use futures::{SinkExt, StreamExt};
use http::HeaderValue;
use shared::live::{LiveCommand, LiveMessage};
use shared::models::{OrderItemStatus, OrderStatus, TableStatus};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::cache::{QueryClient, QueryFetcher};
use crate::{ClientConfig, ClientError, ClientResult};

const COMMAND_BUFFER: usize = 32;

pub struct LiveClient {
    commands: mpsc::Sender<LiveCommand>,
    task: Option<JoinHandle<()>>,
}

impl LiveClient {
    pub async fn connect<F>(
        config: &ClientConfig,
        cookie: Option<HeaderValue>,
        tenant_id: i64,
        queries: QueryClient<F>,
    ) -> ClientResult<Self>
    where
        F: QueryFetcher + 'static,
    {
        let url = config.ws_url();
        let mut request = url.as_str().into_client_request()?;
        if let Some(cookie) = cookie {
            request.headers_mut().insert(http::header::COOKIE, cookie);
        }

        let (ws, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| {
                if let tungstenite::Error::Http(ref resp) = e
                    && resp.status() == http::StatusCode::UNAUTHORIZED
                {
                    return ClientError::Unauthorized;
                }
                ClientError::WebSocket(e)
            })?;
        tracing::info!(url = %url, tenant_id, "Live channel connected");

        let (mut sink, stream) = ws.split();
        sink.send(Message::Text(
            encode_command(&LiveCommand::Auth { tenant_id })?.into(),
        ))
        .await?;

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(sink, stream, rx, queries));
        Ok(Self {
            commands: tx,
            task: Some(task),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_sender(commands: mpsc::Sender<LiveCommand>) -> Self {
        Self {
            commands,
            task: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.commands.is_closed()
    }

    pub async fn send(&self, cmd: LiveCommand) -> ClientResult<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    pub async fn update_table_status(&self, table_id: i64, status: TableStatus) -> ClientResult<()> {
        self.send(LiveCommand::TableUpdate { table_id, status }).await
    }

    pub async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> ClientResult<()> {
        self.send(LiveCommand::OrderUpdate { order_id, status }).await
    }

    pub async fn update_order_item_status(
        &self,
        order_item_id: i64,
        status: OrderItemStatus,
    ) -> ClientResult<()> {
        self.send(LiveCommand::OrderItemUpdate {
            order_item_id,
            status,
        })
        .await
    }
}

impl Drop for LiveClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<F, Si, St>(
    mut sink: Si,
    mut stream: St,
    mut commands: mpsc::Receiver<LiveCommand>,
    queries: QueryClient<F>,
) where
    F: QueryFetcher,
    Si: futures::Sink<Message, Error = tungstenite::Error> + Unpin,
    St: futures::Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                };
                match encode_command(&cmd) {
                    Ok(json) => {
                        if let Err(e) = sink.send(Message::Text(json.into())).await {
                            tracing::warn!(error = %e, "Live send failed");
                            break;
                        }
                    }
                    Err(e) => tracing::error!(kind = cmd.kind(), "Failed to encode command: {e}"),
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(msg) = decode_message(&text)
                            && let Err(e) = queries.apply_live(&msg)
                        {
                            tracing::warn!(kind = msg.kind(), error = %e, "Failed to apply live message");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Live channel error");
                        break;
                    }
                    // pings are answered by tungstenite itself
                    _ => {}
                }
            }
        }
    }
    tracing::info!("Live channel closed");
}

pub fn encode_command(cmd: &LiveCommand) -> ClientResult<String> {
    Ok(serde_json::to_string(cmd)?)
}

/// Malformed frames are logged and skipped
pub fn decode_message(text: &str) -> Option<LiveMessage> {
    match serde_json::from_str(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            tracing::warn!(error = %e, "Malformed live message dropped");
            None
        }
    }
}
