//! Key records: loosely-shaped JSON descriptions of keys.
//!
//! Keystore exports in the wild disagree on field names (`kid` vs `keyId`,
//! `pk` vs `publicKey`). Records are normalized through one alias table.

use serde_json::Value;
use zkpip_seal_core::{AliasTable, Ed25519PublicKey, FieldAliases, Keypair};

use crate::error::{KeyError, Result};

/// Field aliases accepted in key records, in priority order.
pub const KEY_RECORD_ALIASES: AliasTable = AliasTable::new(&[
    FieldAliases {
        field: "keyId",
        aliases: &["keyId", "kid", "id"],
    },
    FieldAliases {
        field: "publicKey",
        aliases: &["publicKey", "publicKeyHex", "pub", "pk"],
    },
    FieldAliases {
        field: "privateKey",
        aliases: &["privateKey", "secretKey", "seed", "sk"],
    },
]);

/// A normalized key record.
///
/// A record with private material can sign and verify. A record with only a
/// public key can verify.
#[derive(Debug, Clone)]
pub struct KeyRecord {
    pub key_id: String,
    pub public_key: Ed25519PublicKey,
    pub keypair: Option<Keypair>,
}

impl KeyRecord {
    /// Normalize one JSON record.
    ///
    /// When both a private and a public key are given they must agree.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| KeyError::InvalidRecord("key record must be an object".into()))?;

        let key_id = KEY_RECORD_ALIASES
            .get_str(object, "keyId")
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| KeyError::InvalidRecord("missing keyId".into()))?
            .to_string();

        let keypair = match KEY_RECORD_ALIASES.get(object, "privateKey") {
            Some(v) => Some(Keypair::from_text(text_field(v, &key_id, "privateKey")?)?),
            None => None,
        };
        let declared = match KEY_RECORD_ALIASES.get(object, "publicKey") {
            Some(v) => Some(Ed25519PublicKey::from_text(text_field(v, &key_id, "publicKey")?)?),
            None => None,
        };

        let public_key = match (&keypair, declared) {
            (Some(kp), Some(pk)) if kp.public_key() != pk => {
                return Err(KeyError::InvalidRecord(format!(
                    "{key_id}: publicKey does not match privateKey"
                )));
            }
            (Some(kp), _) => kp.public_key(),
            (None, Some(pk)) => pk,
            (None, None) => {
                return Err(KeyError::InvalidRecord(format!("{key_id}: no key material")));
            }
        };

        Ok(Self {
            key_id,
            public_key,
            keypair,
        })
    }

    /// Normalize an array of records, or a single record object.
    pub fn from_values(value: &Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            Value::Object(_) => Ok(vec![Self::from_value(value)?]),
            _ => Err(KeyError::InvalidRecord(
                "expected an array of key records".into(),
            )),
        }
    }
}

fn text_field<'a>(value: &'a Value, key_id: &str, field: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| KeyError::InvalidRecord(format!("{key_id}: {field} must be a string")))
}
