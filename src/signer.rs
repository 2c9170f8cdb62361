//! HMAC-SHA256 signing of private REST requests.
//!
//! The exchange verifies the signature over the exact query string it
//! receives, so parameters keep the order they were added in. `timestamp` and
//! `recvWindow` are appended last, then `signature` after them.

use crate::defines::{Endpoint, PRICE_DECIMAL_PLACES, RECV_WINDOW_MS};
use crate::types::{Error, Result};

use ring::hmac;
use rust_decimal::Decimal;

/// Keys the builder owns and will not take from the caller.
const RESERVED_KEYS: [&str; 3] = ["timestamp", "recvWindow", "signature"];

/// Ordered request parameters, plus the keys the target endpoint requires.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
    required: &'static [&'static str],
}

impl RequestParams {
    pub fn for_endpoint(endpoint: &Endpoint) -> Self {
        Self {
            pairs: Vec::new(),
            required: endpoint.required,
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Add a price, always as fixed-point with 8 decimals.
    pub fn with_price(mut self, key: &str, price: Decimal) -> Self {
        self.push(key, format_price(price));
        self
    }

    pub fn push(&mut self, key: &str, value: impl ToString) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// URL-encoded `k=v&k=v` in insertion order
    pub fn query_string(&self) -> String {
        encode(&self.pairs)
    }

    pub(crate) fn check_required(&self) -> Result<()> {
        for key in self.required {
            match self.get(key) {
                Some(v) if !v.is_empty() => {}
                _ => return Err(Error::MissingParameter(key.to_string())),
            }
        }
        Ok(())
    }
}

/// Parameters ready to be sent to a private endpoint.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    params: Vec<(String, String)>,
    timestamp_ms: i64,
    recv_window_ms: u64,
    signature: String,
}

impl SignedRequest {
    /// Signed parameters, `timestamp` and `recvWindow` included, `signature` excluded.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn recv_window_ms(&self) -> u64 {
        self.recv_window_ms
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Full query string to send, `signature` last.
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(self.params.iter());
        serializer.append_pair("signature", &self.signature);
        serializer.finish()
    }
}

/// Sign `params` with the account secret, stamped with the current time.
pub fn sign(params: &RequestParams, secret: &str) -> Result<SignedRequest> {
    sign_at(params, secret, chrono::Utc::now().timestamp_millis())
}

/// Sign `params` as of `timestamp_ms`.
pub fn sign_at(params: &RequestParams, secret: &str, timestamp_ms: i64) -> Result<SignedRequest> {
    if secret.is_empty() {
        return Err(Error::MissingParameter("secret".to_string()));
    }
    params.check_required()?;

    let mut pairs: Vec<(String, String)> = params
        .pairs()
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    pairs.push(("timestamp".to_string(), timestamp_ms.to_string()));
    pairs.push(("recvWindow".to_string(), RECV_WINDOW_MS.to_string()));

    let signature = hmac_sha256_hex(secret, &encode(&pairs));

    Ok(SignedRequest {
        params: pairs,
        timestamp_ms,
        recv_window_ms: RECV_WINDOW_MS,
        signature,
    })
}

/// Lowercase hex of HMAC-SHA256(secret, message)
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let tag = hmac::sign(&key, message.as_bytes());
    hex::encode(tag.as_ref())
}

/// Fixed-point, 8 decimals. Never scientific notation.
pub fn format_price(price: Decimal) -> String {
    format!("{:.*}", PRICE_DECIMAL_PLACES, price.round_dp(PRICE_DECIMAL_PLACES as u32))
}

fn encode(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}
