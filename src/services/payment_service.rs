use std::sync::Arc;

use crate::error::Result;
use crate::models::invoice::InvoicePayload;
use crate::models::payment::PaymentEvent;
use crate::services::bot_client::BotApi;

pub const PAYMENT_SUCCESS_TEXT: &str = "Оплата прошла успешно! 🎉";

/// Answers the platform's payment callbacks. Holds no state between events:
/// the amount was validated when the invoice was issued, so pre-checkout is
/// always approved.
#[derive(Clone)]
pub struct PaymentService {
    bot: Arc<dyn BotApi>,
}

impl PaymentService {
    pub fn new(bot: Arc<dyn BotApi>) -> Self {
        Self { bot }
    }

    pub async fn handle(&self, event: PaymentEvent) -> Result<()> {
        let stage = event.stage().as_str();
        let payload = event.invoice_payload().parse::<InvoicePayload>();
        if let Err(e) = &payload {
            tracing::warn!(stage, error = %e, "Payment callback with unrecognised payload");
        }

        match event {
            PaymentEvent::PreCheckout(query) => {
                self.bot
                    .answer_pre_checkout_query(&query.id, true, None)
                    .await?;
                tracing::info!(
                    stage,
                    query_id = %query.id,
                    from = query.from.id,
                    total_amount = query.total_amount,
                    "Pre-checkout approved"
                );
            }
            PaymentEvent::SuccessfulPayment { chat_id, payment } => {
                tracing::info!(
                    stage,
                    chat_id,
                    total_amount = payment.total_amount,
                    currency = %payment.currency,
                    charge_id = %payment.telegram_payment_charge_id,
                    gift_amount = ?payload.as_ref().ok().map(|p| p.amount),
                    user = payload.as_ref().map(|p| p.user_tag.as_str()).unwrap_or(""),
                    "Payment confirmed"
                );
                self.bot
                    .send_message(chat_id, PAYMENT_SUCCESS_TEXT, None)
                    .await?;
            }
        }
        Ok(())
    }
}
