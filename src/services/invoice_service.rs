use std::collections::BTreeSet;
use std::num::IntErrorKind;
use std::sync::Arc;

use crate::dto::telegram_dto::{CreateInvoiceLink, LabeledPrice};
use crate::error::IssueFailure;
use crate::models::init_data::VerifiedIdentity;
use crate::models::invoice::{InvoicePayload, MAX_PAYLOAD_LEN};
use crate::models::payment::PaymentStage;
use crate::services::bot_client::BotApi;

/// Telegram Stars.
pub const STARS_CURRENCY: &str = "XTR";
pub const INVOICE_TITLE: &str = "Random Gift";

#[derive(Clone)]
pub struct InvoiceService {
    bot: Arc<dyn BotApi>,
    allowed_amounts: Arc<BTreeSet<i64>>,
}

impl InvoiceService {
    pub fn new(bot: Arc<dyn BotApi>, allowed_amounts: BTreeSet<i64>) -> Self {
        Self {
            bot,
            allowed_amounts: Arc::new(allowed_amounts),
        }
    }

    /// Checks `amount_raw` against the allow-list and asks the platform for an
    /// invoice link tagged with the caller's user id.
    pub async fn issue(
        &self,
        identity: &VerifiedIdentity,
        amount_raw: &str,
    ) -> Result<String, IssueFailure> {
        let amount = self.parse_amount(amount_raw)?;
        let mut payload = InvoicePayload::new(amount, identity.user_tag());
        if payload.to_string().len() > MAX_PAYLOAD_LEN {
            tracing::warn!(amount, "User tag too long for invoice payload, dropping it");
            payload.user_tag.clear();
        }
        let request = invoice_request(&payload);

        let link = self
            .bot
            .create_invoice_link(&request)
            .await
            .map_err(|e| IssueFailure::UpstreamUnavailable(e.to_string()))?;

        tracing::info!(
            amount,
            user = %payload.user_tag,
            stage = PaymentStage::Invoiced.as_str(),
            "Invoice link created"
        );
        Ok(link)
    }

    pub fn parse_amount(&self, amount_raw: &str) -> Result<i64, IssueFailure> {
        let amount = match amount_raw.trim().parse::<i64>() {
            Ok(amount) => amount,
            Err(e) => {
                return Err(match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                        IssueFailure::UnsupportedAmount
                    }
                    _ => IssueFailure::InvalidAmount,
                })
            }
        };

        if !self.allowed_amounts.contains(&amount) {
            return Err(IssueFailure::UnsupportedAmount);
        }
        Ok(amount)
    }
}

pub fn invoice_request(payload: &InvoicePayload) -> CreateInvoiceLink {
    let amount = payload.amount;
    CreateInvoiceLink {
        title: INVOICE_TITLE.to_string(),
        description: format!("Покупка подарка за {} звезд.", amount),
        payload: payload.to_string(),
        provider_token: String::new(),
        currency: STARS_CURRENCY.to_string(),
        prices: vec![LabeledPrice {
            label: format!("{} Stars", amount),
            amount,
        }],
    }
}
