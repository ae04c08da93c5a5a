use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty artifact name, bad path, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A slot list contained something other than slot numbers 30-61.
    #[error("invalid slot list '{value}': {reason}")]
    SlotList { value: String, reason: String },
    /// Slot taxonomy rows that break the one-descriptor-per-keyword rule.
    #[error("slot taxonomy: {0}")]
    Taxonomy(String),
    /// Tabular source could not be read or decoded.
    #[error("{source_name}: {message}")]
    Csv { source_name: String, message: String },
    /// Record snapshot (de)serialization error.
    #[error("record snapshot error: {0}")]
    Json(#[from] serde_json::Error),
    /// A record the engine asked for is not in the store.
    #[error("record not found: {0}")]
    RecordNotFound(String),
    /// The store refused a write.
    #[error("cannot write {field} on {record}: {message}")]
    Store {
        record: String,
        field: &'static str,
        message: String,
    },
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl ReconError {
    pub(crate) fn csv(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Csv {
            source_name: source_name.into(),
            message: err.to_string(),
        }
    }
}
