//! Login credential handling.
//!
//! The login credential is an opaque Google ID token. The backend verifies
//! it and issues the bearer token; this side only decodes the payload
//! segment to pick up the display claims (email, name, picture). No
//! signature verification happens here - the backend is the verifier, and
//! a tampered credential would fail the exchange anyway.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use tiffinbox_core::Email;

/// Errors decoding the identity claims out of a credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential is not a three-part JWT")]
    MalformedCredential,
    #[error("credential payload is not valid base64url")]
    BadEncoding,
    #[error("credential claims are unusable: {0}")]
    BadClaims(String),
}

/// Identity claims decoded from the credential payload.
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub email: Email,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Decode the display claims from a Google ID token.
///
/// # Errors
///
/// Returns an error if the token does not split into three segments, the
/// payload is not base64url JSON, or the email claim is missing/invalid.
pub fn decode_identity_claims(id_token: &str) -> Result<IdentityClaims, CredentialError> {
    let mut segments = id_token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(CredentialError::MalformedCredential);
    };

    // Google issues unpadded base64url; strip padding if something else
    // added it.
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| CredentialError::BadEncoding)?;

    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| CredentialError::BadClaims(e.to_string()))?;

    let email =
        Email::parse(&raw.email).map_err(|e| CredentialError::BadClaims(e.to_string()))?;
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.as_str().to_string());

    Ok(IdentityClaims {
        email,
        name,
        picture: raw.picture,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decodes_claims() {
        let token = token_with_payload(&serde_json::json!({
            "email": "ravi@example.com",
            "name": "Ravi",
            "picture": "https://img.example/ravi.png"
        }));
        let claims = decode_identity_claims(&token).unwrap();
        assert_eq!(claims.email.as_str(), "ravi@example.com");
        assert_eq!(claims.name, "Ravi");
        assert_eq!(claims.picture.as_deref(), Some("https://img.example/ravi.png"));
    }

    #[test]
    fn test_missing_name_falls_back_to_email() {
        let token = token_with_payload(&serde_json::json!({"email": "ravi@example.com"}));
        let claims = decode_identity_claims(&token).unwrap();
        assert_eq!(claims.name, "ravi@example.com");
    }

    #[test]
    fn test_rejects_non_jwt() {
        assert!(matches!(
            decode_identity_claims("not-a-jwt"),
            Err(CredentialError::MalformedCredential)
        ));
        assert!(matches!(
            decode_identity_claims("a.b.c.d"),
            Err(CredentialError::MalformedCredential)
        ));
    }

    #[test]
    fn test_rejects_bad_email_claim() {
        let token = token_with_payload(&serde_json::json!({"email": "not-an-email"}));
        assert!(matches!(
            decode_identity_claims(&token),
            Err(CredentialError::BadClaims(_))
        ));
    }
}
