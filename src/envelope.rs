use serde::{Deserialize, Deserializer};

/// One poll response from the tester: a progress counter plus a full
/// snapshot of the diagnostic payload. Ephemeral — read once per attempt.
///
/// The device serializes both counters as numeric strings. They are parsed
/// to integers here so the completion check is an integer comparison;
/// comparing the raw strings would only work for single-digit totals.
#[derive(Debug, Clone, Deserialize)]
pub struct PollEnvelope {
    #[serde(rename = "finItemCount", deserialize_with = "int_from_string")]
    pub fin_item_count: u32,
    #[serde(rename = "totalItemCount", deserialize_with = "int_from_string")]
    pub total_item_count: u32,
    /// Opaque session identifier; carried through, never interpreted.
    pub id: i64,
    /// Raw diagnostic payload. Kept untyped so a complete envelope with a
    /// malformed payload is a decode-time schema error, not a transient
    /// parse failure of the whole body.
    pub payload: serde_json::Value,
}

impl PollEnvelope {
    /// The device exposes no other progress signal: a run is complete iff
    /// every sub-test it intends to run has finished.
    pub fn is_complete(&self) -> bool {
        self.fin_item_count == self.total_item_count
    }
}

fn int_from_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| serde::de::Error::custom(format!("expected an integer string, got {:?}", raw)))
}
