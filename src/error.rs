/// Terminal failures crossing the poller boundary. Transient per-attempt
/// failures (`transport::FetchError`) never surface individually; only the
/// aggregate outcome does.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("device never reported a complete test run after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("completed payload failed to decode: {0}")]
    Schema(#[from] SchemaError),
}

/// A complete envelope whose payload violates the section/field contract.
/// Indicates firmware/protocol drift, so it is never retried.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required field: {path}")]
    Missing { path: String },

    #[error("expected an object at {path}")]
    NotAnObject { path: String },

    #[error("unrecognized result code {value:?} in section {section}")]
    UnknownOutcome { section: &'static str, value: String },

    #[error("unrecognized status {value:?} in section {section}")]
    UnknownState { section: &'static str, value: String },
}

impl SchemaError {
    pub fn missing(path: impl Into<String>) -> Self {
        SchemaError::Missing { path: path.into() }
    }
}
