//! JSON form of stored response headers.
//!
//! UTF-8 values are written as plain strings, anything else as
//! `{"hex": "..."}`, so every value read back is byte-identical.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Text(String),
    Raw { hex: String },
}

pub(crate) fn serialize<S: Serializer>(
    headers: &[(String, Vec<u8>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(headers.iter().map(|(name, value)| {
        let value = match std::str::from_utf8(value) {
            Ok(text) => StoredValue::Text(text.to_string()),
            Err(_) => StoredValue::Raw {
                hex: hex::encode(value),
            },
        };
        (name, value)
    }))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, Vec<u8>)>, D::Error> {
    let stored = Vec::<(String, StoredValue)>::deserialize(deserializer)?;
    stored
        .into_iter()
        .map(|(name, value)| {
            let bytes = match value {
                StoredValue::Text(text) => text.into_bytes(),
                StoredValue::Raw { hex: encoded } => {
                    hex::decode(&encoded).map_err(D::Error::custom)?
                }
            };
            Ok((name, bytes))
        })
        .collect()
}
