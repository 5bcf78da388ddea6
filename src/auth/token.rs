use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

/// Issuer tag stamped into every access token.
pub const ISSUER: &str = "pepi";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenHeader {
    pub alg: String,
    pub typ: String,
}

impl AccessTokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Build claims for `subject`, valid from `now` for `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if `subject` is the nil UUID or `ttl_seconds` is not
    /// positive.
    pub fn new(subject: Uuid, now: i64, ttl_seconds: i64) -> Result<Self, Error> {
        if subject.is_nil() {
            return Err(Error::InvalidSubject);
        }
        if ttl_seconds <= 0 {
            return Err(Error::InvalidTtl);
        }

        Ok(Self {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        })
    }

    /// Subject parsed back into an identity.
    ///
    /// # Errors
    ///
    /// Returns an error if `sub` is not a UUID.
    pub fn subject(&self) -> Result<Uuid, Error> {
        self.sub.parse().map_err(|_| Error::InvalidSubject)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid issuer")]
    InvalidIssuer,
    #[error("token expired")]
    Expired,
    #[error("invalid token ttl")]
    InvalidTtl,
    #[error("invalid subject")]
    InvalidSubject,
}

impl Error {
    /// Whether this is a policy rejection of a structurally valid token
    /// (forged, expired, or issued for someone else) rather than garbage
    /// input. Callers collapse rejections into an opaque unauthorized
    /// outcome and reserve hard-error logging for the rest.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::InvalidIssuer | Self::Expired
        )
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Create an HS256 signed access token in the compact
/// `header.payload.signature` encoding.
///
/// # Errors
///
/// Returns an error if claims/header JSON cannot be encoded or the key is
/// rejected by the MAC.
pub fn sign_hs256(secret: &[u8], claims: &AccessTokenClaims) -> Result<String, Error> {
    let header_b64 = b64e_json(&AccessTokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}

/// Verify an HS256 access token and return its decoded claims.
///
/// Expiry is exact: a token whose `exp` is at or before `now_unix_seconds`
/// is rejected, with no clock-skew allowance.
///
/// # Errors
///
/// Returns an error if:
/// - the token is malformed or contains invalid base64/json,
/// - the signature does not verify under `secret`,
/// - the claims fail validation (`iss`, `exp`).
pub fn verify_hs256(
    token: &str,
    secret: &[u8],
    now_unix_seconds: i64,
) -> Result<AccessTokenClaims, Error> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
    if parts.next().is_some() {
        return Err(Error::TokenFormat);
    }

    let header: AccessTokenHeader = b64d_json(header_b64)?;
    if header.alg != "HS256" {
        return Err(Error::UnsupportedAlg(header.alg));
    }

    let signing_input = format!("{header_b64}.{claims_b64}");
    let signature_bytes = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| Error::InvalidSignature)?;

    let claims: AccessTokenClaims = b64d_json(claims_b64)?;
    if claims.iss != ISSUER {
        return Err(Error::InvalidIssuer);
    }
    if claims.exp <= now_unix_seconds {
        return Err(Error::Expired);
    }

    Ok(claims)
}
