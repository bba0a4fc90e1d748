use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::services::bot_client::BotApi;
use crate::services::update_service::UpdateService;

/// Long-poll loop feeding `getUpdates` results to the [`UpdateService`] one at a
/// time, in arrival order.
pub struct PollingService {
    bot: Arc<dyn BotApi>,
    updates: UpdateService,
    timeout_secs: u64,
    offset: Option<i64>,
}

impl PollingService {
    pub fn new(bot: Arc<dyn BotApi>, updates: UpdateService, timeout_secs: u64) -> Self {
        Self {
            bot,
            updates,
            timeout_secs,
            offset: None,
        }
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Fetches one batch and handles it. Returns how many updates were seen.
    ///
    /// A failing handler does not stop the batch and its update is not fetched
    /// again.
    pub async fn run_once(&mut self) -> Result<usize> {
        let batch = self.bot.get_updates(self.offset, self.timeout_secs).await?;
        let count = batch.len();

        for update in batch {
            let update_id = update.update_id;
            self.offset = Some(self.offset.map_or(update_id + 1, |o| o.max(update_id + 1)));
            if let Err(e) = self.updates.handle_update(update).await {
                tracing::error!(update_id, error = ?e, "Update handler error");
            }
        }

        Ok(count)
    }

    pub async fn run(mut self) {
        tracing::info!(timeout_secs = self.timeout_secs, "Polling Telegram for updates");
        loop {
            match self.run_once().await {
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = ?e, "Polling error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}
