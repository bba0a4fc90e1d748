use crate::dto::telegram_dto::{PreCheckoutQuery, SuccessfulPayment, Update};

/// Where a payment stands once an event has been handled. Never stored; used to
/// label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStage {
    Invoiced,
    PreCheckoutPending,
    Confirmed,
}

impl PaymentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStage::Invoiced => "invoiced",
            PaymentStage::PreCheckoutPending => "pre_checkout_pending",
            PaymentStage::Confirmed => "confirmed",
        }
    }
}

/// Payment callback delivered by the platform.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    /// Must be answered before the platform lets the payment proceed.
    PreCheckout(PreCheckoutQuery),
    /// Terminal. `chat_id` is the chat the payment was made from.
    SuccessfulPayment {
        chat_id: i64,
        payment: SuccessfulPayment,
    },
}

impl PaymentEvent {
    /// Extracts the payment event carried by an update, if any.
    pub fn from_update(update: &Update) -> Option<Self> {
        if let Some(query) = &update.pre_checkout_query {
            return Some(PaymentEvent::PreCheckout(query.clone()));
        }
        let message = update.message.as_ref()?;
        let payment = message.successful_payment.clone()?;
        Some(PaymentEvent::SuccessfulPayment {
            chat_id: message.chat.id,
            payment,
        })
    }

    /// Stage the payment is in while this event is being handled.
    pub fn stage(&self) -> PaymentStage {
        match self {
            PaymentEvent::PreCheckout(_) => PaymentStage::PreCheckoutPending,
            PaymentEvent::SuccessfulPayment { .. } => PaymentStage::Confirmed,
        }
    }

    pub fn invoice_payload(&self) -> &str {
        match self {
            PaymentEvent::PreCheckout(query) => &query.invoice_payload,
            PaymentEvent::SuccessfulPayment { payment, .. } => &payment.invoice_payload,
        }
    }
}
