use std::sync::Arc;

use serde_json::json;

use crate::dto::telegram_dto::{Message, Update};
use crate::error::Result;
use crate::models::payment::PaymentEvent;
use crate::services::bot_client::BotApi;
use crate::services::payment_service::PaymentService;

pub const START_TEXT: &str =
    "Привет! 🎁\nЖми на кнопку ниже, чтобы открыть мини-приложение и забрать подарки.";

/// Routes a single update to the payment flow or to the `/start` greeting.
#[derive(Clone)]
pub struct UpdateService {
    bot: Arc<dyn BotApi>,
    payments: PaymentService,
    mini_app_url: String,
    mini_app_button: String,
}

impl UpdateService {
    pub fn new(
        bot: Arc<dyn BotApi>,
        payments: PaymentService,
        mini_app_url: String,
        mini_app_button: String,
    ) -> Self {
        Self {
            bot,
            payments,
            mini_app_url,
            mini_app_button,
        }
    }

    pub async fn handle_update(&self, update: Update) -> Result<()> {
        tracing::debug!(update_id = update.update_id, "Handling update");

        if let Some(event) = PaymentEvent::from_update(&update) {
            return self.payments.handle(event).await;
        }

        if let Some(message) = &update.message {
            if is_start_command(message) {
                return self.send_start(message).await;
            }
        }

        Ok(())
    }

    async fn send_start(&self, message: &Message) -> Result<()> {
        if let Some(from) = &message.from {
            tracing::info!(user_id = from.id, "Handling /start from {}", from.first_name);
        }
        self.bot
            .send_message(message.chat.id, START_TEXT, Some(self.start_keyboard()))
            .await
    }

    pub fn start_keyboard(&self) -> serde_json::Value {
        json!({
            "inline_keyboard": [[
                {
                    "text": self.mini_app_button,
                    "web_app": { "url": self.mini_app_url }
                }
            ]]
        })
    }
}

/// `/start`, `/start payload` and `/start@BotName` all count.
fn is_start_command(message: &Message) -> bool {
    let Some(text) = message.text.as_deref() else {
        return false;
    };
    let command = text.split_whitespace().next().unwrap_or("");
    let command = command.split('@').next().unwrap_or("");
    command == "/start"
}
