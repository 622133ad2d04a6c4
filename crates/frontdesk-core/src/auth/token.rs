//! Structural decoding of bearer credentials.
//!
//! Only the payload segment of a three-segment token is inspected. Signatures
//! are never verified; the client has no key material and the backend remains
//! the authority on whether a credential is accepted.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Number of dot-separated segments in a signed token (header.payload.signature)
const TOKEN_SEGMENTS: usize = 3;

/// Name of the expiry claim, seconds since the Unix epoch
const EXPIRY_CLAIM: &str = "exp";

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Signed tokens use base64url; some issuers emit the standard alphabet.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("credential has {0} segments, not a signed token")]
    NotStructured(usize),

    #[error("payload segment is not base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("payload segment is not a JSON object: {0}")]
    Payload(String),
}

/// Claims extracted from a credential's payload segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenClaims {
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenClaims {
    /// Strict comparison: a token expiring exactly at `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Decode the payload of a three-segment credential.
///
/// Anything that is not exactly three segments yields
/// [`DecodeError::NotStructured`]; callers treat such credentials as opaque.
pub fn decode(credential: &str) -> Result<TokenClaims, DecodeError> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != TOKEN_SEGMENTS {
        return Err(DecodeError::NotStructured(segments.len()));
    }

    let payload = decode_segment(segments[1])?;
    let payload: Value =
        serde_json::from_slice(&payload).map_err(|e| DecodeError::Payload(e.to_string()))?;

    let Value::Object(claims) = payload else {
        return Err(DecodeError::Payload("expected an object".to_string()));
    };

    Ok(TokenClaims {
        expiry: claims.get(EXPIRY_CLAIM).and_then(expiry_from_claim),
    })
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, DecodeError> {
    match URL_SAFE.decode(segment) {
        Ok(bytes) => Ok(bytes),
        Err(_) => Ok(STANDARD.decode(segment)?),
    }
}

/// Interpret an `exp` claim. Zero, non-numeric and missing values mean
/// "no expiry"; numeric strings are accepted the way loosely typed issuers
/// emit them.
fn expiry_from_claim(claim: &Value) -> Option<DateTime<Utc>> {
    let seconds = match claim {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if seconds == 0.0 || !seconds.is_finite() {
        return None;
    }

    let millis = (seconds * 1000.0).floor();
    if millis >= i64::MAX as f64 {
        return Some(DateTime::<Utc>::MAX_UTC);
    }
    if millis <= i64::MIN as f64 {
        return Some(DateTime::<Utc>::MIN_UTC);
    }
    match DateTime::from_timestamp_millis(millis as i64) {
        Some(expiry) => Some(expiry),
        None if millis < 0.0 => Some(DateTime::<Utc>::MIN_UTC),
        None => Some(DateTime::<Utc>::MAX_UTC),
    }
}
