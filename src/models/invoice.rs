use std::fmt;
use std::str::FromStr;

const PAYLOAD_PREFIX: &str = "gift";

/// Telegram rejects invoice payloads longer than this.
pub const MAX_PAYLOAD_LEN: usize = 128;

/// Correlation handle attached to an invoice and echoed back by the platform in
/// the pre-checkout and successful-payment callbacks.
///
/// Wire format: `gift:<amount>:<user tag>`, where the tag may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicePayload {
    pub amount: i64,
    pub user_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised invoice payload: {0}")]
pub struct PayloadParseError(pub String);

impl InvoicePayload {
    pub fn new(amount: i64, user_tag: impl Into<String>) -> Self {
        Self {
            amount,
            user_tag: user_tag.into(),
        }
    }
}

impl fmt::Display for InvoicePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", PAYLOAD_PREFIX, self.amount, self.user_tag)
    }
}

impl FromStr for InvoicePayload {
    type Err = PayloadParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PayloadParseError(s.to_string());
        let rest = s
            .strip_prefix(PAYLOAD_PREFIX)
            .and_then(|r| r.strip_prefix(':'))
            .ok_or_else(err)?;
        let (amount, user_tag) = rest.split_once(':').ok_or_else(err)?;
        let amount = amount.parse().map_err(|_| err())?;
        Ok(Self::new(amount, user_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_wire_format() {
        assert_eq!(InvoicePayload::new(25, "42").to_string(), "gift:25:42");
        assert_eq!(InvoicePayload::new(100, "").to_string(), "gift:100:");
    }

    #[test]
    fn parses_echoed_payloads() {
        assert_eq!(
            "gift:50:123456789".parse::<InvoicePayload>(),
            Ok(InvoicePayload::new(50, "123456789"))
        );
        assert_eq!(
            "gift:25:".parse::<InvoicePayload>(),
            Ok(InvoicePayload::new(25, ""))
        );
    }

    #[test]
    fn rejects_foreign_payloads() {
        for raw in ["", "gift", "gift:", "gift:abc:1", "order:25:1", "gift:25"] {
            assert!(raw.parse::<InvoicePayload>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn realistic_payload_fits_platform_limit() {
        let payload = InvoicePayload::new(100, i64::MAX.to_string());
        assert!(payload.to_string().len() <= MAX_PAYLOAD_LEN);
    }
}
