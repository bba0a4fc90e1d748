use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub amount: Option<String>,
}

impl InvoiceQuery {
    /// Reads the query string leniently: the first `amount` wins and anything
    /// else is ignored, so a malformed query never fails before auth runs.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let amount = raw.and_then(|raw| {
            url::form_urlencoded::parse(raw.as_bytes())
                .find(|(key, _)| key == "amount")
                .map(|(_, value)| value.into_owned())
        });
        Self { amount }
    }

    /// The raw amount, `"0"` when the parameter is absent.
    pub fn amount_or_zero(&self) -> &str {
        self.amount.as_deref().unwrap_or("0")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLinkResponse {
    pub invoice_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_amount_wins() {
        let query = InvoiceQuery::from_raw(Some("amount=25&amount=50"));
        assert_eq!(query.amount_or_zero(), "25");
    }

    #[test]
    fn missing_amount_is_zero() {
        assert_eq!(InvoiceQuery::from_raw(None).amount_or_zero(), "0");
        assert_eq!(InvoiceQuery::from_raw(Some("other=1")).amount_or_zero(), "0");
        assert_eq!(InvoiceQuery::from_raw(Some("amount=")).amount_or_zero(), "");
        assert_eq!(
            InvoiceQuery::from_raw(Some("amount=%2025")).amount.as_deref(),
            Some(" 25")
        );
    }
}
