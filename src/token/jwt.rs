use super::{Error, RoleAssignment};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        }
    }
}

/// Session claims carried by a credential.
///
/// Identifiers stay as strings and role records stay as raw JSON values so the
/// session layer can reconstruct them and report a bad record explicitly
/// instead of failing the whole decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: String,
    pub company_id: String,
    #[serde(default)]
    pub roles: Vec<Value>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        company_id: Uuid,
        roles: &[RoleAssignment],
        iat: i64,
        exp: i64,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            company_id: company_id.to_string(),
            roles: roles
                .iter()
                .map(|role| {
                    json!({
                        "id": role.id.to_string(),
                        "name": role.name,
                        "company_id": role.company_id.to_string(),
                    })
                })
                .collect(),
            iat,
            exp,
        }
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| Error::Malformed)
}

fn mac_for(secret: &[u8], header_b64: &str, claims_b64: &str) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidKey)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    Ok(mac)
}

/// Create an HS256 signed session token (JWT).
///
/// # Errors
///
/// Returns an error if the header or claims cannot be encoded or the key is rejected.
pub fn sign_hs256(secret: &[u8], claims: &Claims) -> Result<String, Error> {
    let header_b64 = b64e_json(&TokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;

    let signature = mac_for(secret, &header_b64, &claims_b64)?
        .finalize()
        .into_bytes();
    let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

    Ok(format!("{header_b64}.{claims_b64}.{signature_b64}"))
}

/// Verify an HS256 session token and return its decoded claims.
///
/// The header algorithm is checked before the secret is used, so a token
/// advertising any other algorithm never reaches MAC verification.
///
/// # Errors
///
/// Returns an error if:
/// - the token does not have exactly three segments or its header/claims cannot be parsed,
/// - the header algorithm is not `HS256` or the signature does not verify,
/// - `now_unix_seconds` is at or past `exp`.
pub fn verify_hs256(token: &str, secret: &[u8], now_unix_seconds: i64) -> Result<Claims, Error> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(Error::Malformed)?;
    let claims_b64 = parts.next().ok_or(Error::Malformed)?;
    let sig_b64 = parts.next().ok_or(Error::Malformed)?;
    if parts.next().is_some() {
        return Err(Error::Malformed);
    }

    let header: TokenHeader = b64d_json(header_b64)?;
    if header.alg != ALGORITHM {
        return Err(Error::InvalidSignature);
    }

    let signature =
        Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::InvalidSignature)?;
    mac_for(secret, header_b64, claims_b64)?
        .verify_slice(&signature)
        .map_err(|_| Error::InvalidSignature)?;

    let claims: Claims = b64d_json(claims_b64)?;
    if now_unix_seconds >= claims.exp {
        return Err(Error::Expired);
    }

    Ok(claims)
}
