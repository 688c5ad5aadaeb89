use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::models::DiscordTimestamp;
use super::render::TimestampRenderer;
use crate::utils::phrases::RelativePhrases;

/// A timestamp that keeps re-rendering itself while it is alive.
///
/// Every new text is pushed to the channel handed to [`LiveTimestamp::spawn`].
/// Relative timestamps sleep for exactly as long as their phrase stays
/// accurate; absolute ones render once and finish. Dropping the handle
/// cancels the pending refresh.
pub struct LiveTimestamp {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LiveTimestamp {
    pub fn spawn<P>(
        timestamp: DiscordTimestamp,
        renderer: Arc<TimestampRenderer<P>>,
        tx: UnboundedSender<String>,
    ) -> Self
    where
        P: RelativePhrases + Send + Sync + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            refresh_loop(timestamp, renderer, tx, token).await;
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel the pending refresh, if any.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Wait for the refresh task to end on its own (or after [`stop`](Self::stop)).
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::error!("Live timestamp task failed: {}", e);
        }
    }
}

impl Drop for LiveTimestamp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn refresh_loop<P: RelativePhrases>(
    timestamp: DiscordTimestamp,
    renderer: Arc<TimestampRenderer<P>>,
    tx: UnboundedSender<String>,
    cancel: CancellationToken,
) {
    let mut last_text: Option<String> = None;

    loop {
        let rendered = match renderer.render_now(&timestamp) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!("Failed to render {}: {}", timestamp.markup(), e);
                break;
            }
        };

        if last_text.as_deref() != Some(rendered.text.as_str()) {
            if tx.send(rendered.text.clone()).is_err() {
                break;
            }
            last_text = Some(rendered.text);
        }

        let Some(delay) = rendered.next_update else {
            break;
        };
        tracing::debug!(?delay, markup = %timestamp.markup(), "scheduling refresh");

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tx.closed() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!(markup = %timestamp.markup(), "live timestamp stopped");
}
