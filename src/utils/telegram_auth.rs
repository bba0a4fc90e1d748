//! Verification of the init data a Telegram mini app sends with each request.
//!
//! The client signs every field except `hash` with HMAC-SHA256. The key is the
//! SHA-256 digest of the bot token and the message is the "data-check string":
//! the remaining `key=value` pairs sorted by key and joined with `\n`.
//!
//! No freshness check is applied to `auth_date`, so a captured init-data string
//! stays valid for as long as the bot token does.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use subtle::ConstantTimeEq;

use crate::error::AuthFailure;
use crate::models::init_data::VerifiedIdentity;

type HmacSha256 = Hmac<Sha256>;

pub const HASH_FIELD: &str = "hash";

/// Decodes a query-string blob. Blank values are kept and the last occurrence of a
/// repeated key wins.
pub fn parse_init_data(init_data: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(init_data.as_bytes())
        .into_owned()
        .collect()
}

pub fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn calculate_hash(data_check_string: &str, bot_token: &str) -> Option<String> {
    let secret_key = Sha256::digest(bot_token.as_bytes());
    let mut mac = HmacSha256::new_from_slice(&secret_key).ok()?;
    mac.update(data_check_string.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Lowercase hex signature for `fields` (which must not contain `hash`).
pub fn sign_fields(fields: &BTreeMap<String, String>, bot_token: &str) -> Option<String> {
    calculate_hash(&data_check_string(fields), bot_token)
}

pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<VerifiedIdentity, AuthFailure> {
    let mut fields = parse_init_data(init_data);

    let received_hash = fields
        .remove(HASH_FIELD)
        .filter(|h| !h.is_empty())
        .ok_or(AuthFailure::MissingSignature)?;
    if !received_hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AuthFailure::MalformedPayload);
    }

    let calculated_hash =
        sign_fields(&fields, bot_token).ok_or(AuthFailure::SignatureMismatch)?;

    let matches: bool = calculated_hash
        .as_bytes()
        .ct_eq(received_hash.to_ascii_lowercase().as_bytes())
        .into();
    if !matches {
        return Err(AuthFailure::SignatureMismatch);
    }

    Ok(VerifiedIdentity::from_verified(fields))
}
