use thiserror::Error;

pub type Result<T> = std::result::Result<T, HaploError>;

/// Errors raised while loading trees, reading samples and classifying them.
#[derive(Debug, Error)]
pub enum HaploError {
    /// The tree or weight table violates a structural invariant.
    #[error("Malformed phylotree: {0}")]
    MalformedTree(String),

    /// A coverage range or polymorphism position is outside the mtDNA coordinates.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Non-fatal: the sample was classified but carries no in-range evidence.
    #[error("Sample '{0}' has no polymorphisms inside its coverage range")]
    EmptySample(String),

    #[error("Unknown ranking metric '{0}' (expected 1/kulczynski, 2/hamming or 3/jaccard)")]
    UnknownMetric(String),

    #[error("Invalid polymorphism '{0}'")]
    InvalidPolymorphism(String),

    #[error("Invalid input at line {line}: {message}")]
    InvalidInput { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compression error: {0}")]
    Compression(#[from] niffler::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("VCF error: {0}")]
    Vcf(#[from] rust_htslib::errors::Error),
}

impl HaploError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        HaploError::MalformedTree(message.into())
    }

    pub(crate) fn input(line: usize, message: impl Into<String>) -> Self {
        HaploError::InvalidInput {
            line,
            message: message.into(),
        }
    }
}
