use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ProcessorError;
use crate::value::StructuredData;

/// Change kind captured by the upstream engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Snapshot,
}

/// Payload image: opaque bytes the processor does not interpret, or a
/// parsed field map it can reshape.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Raw(Vec<u8>),
    Structured(StructuredData),
}

impl Data {
    pub fn as_structured(&self) -> Option<&StructuredData> {
        match self {
            Data::Structured(data) => Some(data),
            Data::Raw(_) => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Data::Structured(_))
    }
}

impl Serialize for Data {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Data", 2)?;
        match self {
            Data::Structured(data) => {
                s.serialize_field("format", "structured")?;
                s.serialize_field("data", data)?;
            }
            Data::Raw(bytes) => {
                // Base64 for undecoded wire bytes
                s.serialize_field("format", "raw")?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                s.serialize_field("data", &encoded)?;
            }
        }
        s.end()
    }
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Two accepted shapes:
        // 1. {"format":"structured","data":{...}} / {"format":"raw","data":"base64..."}
        // 2. <bare JSON object> — legacy envelope, treated as structured
        let raw = serde_json::Value::deserialize(deserializer)?;

        if let serde_json::Value::Object(ref map) = raw {
            if let (Some(fmt_val), Some(data_val)) = (map.get("format"), map.get("data")) {
                if let Some(fmt) = fmt_val.as_str() {
                    return match fmt {
                        "structured" => {
                            let data = StructuredData::deserialize(data_val)
                                .map_err(serde::de::Error::custom)?;
                            Ok(Data::Structured(data))
                        }
                        "raw" => {
                            let b64 = data_val.as_str().ok_or_else(|| {
                                serde::de::Error::custom("expected base64 string for raw payload")
                            })?;
                            let bytes = base64::engine::general_purpose::STANDARD
                                .decode(b64)
                                .map_err(serde::de::Error::custom)?;
                            Ok(Data::Raw(bytes))
                        }
                        other => Err(serde::de::Error::custom(format!(
                            "unknown payload format '{other}'"
                        ))),
                    };
                }
            }
        } else {
            return Err(serde::de::Error::custom("payload image must be a JSON object"));
        }

        let data = StructuredData::deserialize(&raw).map_err(serde::de::Error::custom)?;
        Ok(Data::Structured(data))
    }
}

/// Before/after images of the change event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Data>,
}

/// One change event as delivered by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Event timestamp in milliseconds (Unix epoch).
    pub ts_ms: i64,
    pub operation: Operation,
    /// Partition / primary key of the changed entity.
    pub key: String,
    /// Connector and engine metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub payload: Payload,
}

impl Record {
    /// After-image as structured data, if the payload carries one.
    pub fn structured_after(&self) -> Option<&StructuredData> {
        self.payload.after.as_ref().and_then(Data::as_structured)
    }

    /// Replace the after-image with a new structured payload.
    pub fn replace_after(&mut self, data: StructuredData) {
        self.payload.after = Some(Data::Structured(data));
    }

    /// Decode a record from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProcessorError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode the record to its JSON wire form.
    pub fn to_json(&self) -> Result<Vec<u8>, ProcessorError> {
        Ok(serde_json::to_vec(self)?)
    }
}
