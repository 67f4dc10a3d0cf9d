use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Garderobe.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GarderobeError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Persistence ─────────────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Wardrobe collection ─────────────────────────────────────────────
    #[error("wardrobe: {0}")]
    Wardrobe(#[from] WardrobeError),

    // ── Outfit workflow ─────────────────────────────────────────────────
    #[error("workflow: {0}")]
    Workflow(#[from] WorkflowError),

    // ── Generation service ──────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Classification service ──────────────────────────────────────────
    #[error("classify: {0}")]
    Classify(#[from] ClassifyError),

    // ── Credential ──────────────────────────────────────────────────────
    #[error("credential: {0}")]
    Credential(#[from] CredentialError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Persistence errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize {key}: {message}")]
    Serialize { key: String, message: String },

    #[error("deserialize {key}: {message}")]
    Deserialize { key: String, message: String },
}

// ─── Wardrobe errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WardrobeError {
    #[error("item {id} not found")]
    NotFound { id: String },

    #[error("item {id} has no category to confirm")]
    NothingToConfirm { id: String },

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("classification failed: {0}")]
    Classification(#[from] ClassifyError),
}

// ─── Outfit workflow errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("wardrobe is empty")]
    EmptyWardrobe,

    #[error("no items selected")]
    NothingSelected,

    #[error("selection limit of {limit} items reached")]
    SelectionLimit { limit: usize },

    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        phase: &'static str,
        action: &'static str,
    },

    #[error("no API credential configured")]
    MissingCredential,
}

// ─── Generation service errors ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("service returned no image")]
    NoImageReturned,

    #[error("request failed: {0}")]
    Request(String),

    #[error("service error ({status}): {message}")]
    Api { status: u16, message: String },
}

// ─── Classification service errors ──────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("service returned an empty label")]
    EmptyLabel,
}

// ─── Credential errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("vault: {0}")]
    Vault(String),

    #[error("stored credential is not valid UTF-8")]
    Encoding,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GarderobeError>;
