use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::dto::telegram_dto::{
    AnswerPreCheckoutQuery, ApiResponse, CreateInvoiceLink, GetUpdates, Message, SendMessage,
    Update,
};
use crate::error::{Error, Result};

/// Update kinds requested from `getUpdates`.
pub const ALLOWED_UPDATES: [&str; 2] = ["message", "pre_checkout_query"];

/// The Bot API calls this service depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn create_invoice_link(&self, request: &CreateInvoiceLink) -> Result<String>;

    async fn answer_pre_checkout_query(
        &self,
        query_id: &str,
        ok: bool,
        error_message: Option<String>,
    ) -> Result<()>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<serde_json::Value>,
    ) -> Result<()>;

    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>>;
}

#[derive(Clone)]
pub struct TelegramBotClient {
    client: Client,
    base_url: String,
}

impl TelegramBotClient {
    /// `api_url` is the Bot API root, normally `https://api.telegram.org`.
    pub fn new(api_url: &str, bot_token: &str, poll_timeout_secs: u64) -> Result<Self> {
        // Long polls hold the connection open for `poll_timeout_secs`.
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 30))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            tracing::warn!(
                method,
                %status,
                error_code = ?envelope.error_code,
                description = ?envelope.description,
                "Telegram API call failed"
            );
            return Err(Error::Telegram {
                code: envelope.error_code,
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope.result.ok_or_else(|| Error::Telegram {
            code: None,
            description: format!("{} returned ok without a result", method),
        })
    }
}

#[async_trait]
impl BotApi for TelegramBotClient {
    async fn create_invoice_link(&self, request: &CreateInvoiceLink) -> Result<String> {
        self.call("createInvoiceLink", request).await
    }

    async fn answer_pre_checkout_query(
        &self,
        query_id: &str,
        ok: bool,
        error_message: Option<String>,
    ) -> Result<()> {
        let body = AnswerPreCheckoutQuery {
            pre_checkout_query_id: query_id,
            ok,
            error_message: error_message.as_deref(),
        };
        let _: bool = self.call("answerPreCheckoutQuery", &body).await?;
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<serde_json::Value>,
    ) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            reply_markup: reply_markup.as_ref(),
        };
        let _: Message = self.call("sendMessage", &body).await?;
        Ok(())
    }

    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &ALLOWED_UPDATES,
        };
        self.call("getUpdates", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::telegram_dto::LabeledPrice;
    use crate::error::IssueFailure;

    const SECRET_TOKEN: &str = "7000000001:AAH-super-secret";

    fn invoice() -> CreateInvoiceLink {
        CreateInvoiceLink {
            title: "Random Gift".to_string(),
            description: "Покупка подарка за 25 звезд.".to_string(),
            payload: "gift:25:42".to_string(),
            provider_token: String::new(),
            currency: "XTR".to_string(),
            prices: vec![LabeledPrice {
                label: "25 Stars".to_string(),
                amount: 25,
            }],
        }
    }

    #[tokio::test]
    async fn transport_errors_do_not_expose_the_token() {
        let client = TelegramBotClient::new("http://127.0.0.1:1", SECRET_TOKEN, 0).unwrap();
        let err = client.create_invoice_link(&invoice()).await.unwrap_err();
        assert!(matches!(err, Error::Reqwest(_)));

        let wrapped = Error::from(IssueFailure::UpstreamUnavailable(err.to_string()));
        for rendered in [
            format!("{}", err),
            format!("{:?}", err),
            format!("{}", wrapped),
            format!("{:?}", wrapped),
        ] {
            assert!(!rendered.contains(SECRET_TOKEN), "{rendered}");
            assert!(!rendered.contains("AAH-super-secret"), "{rendered}");
        }
    }
}
