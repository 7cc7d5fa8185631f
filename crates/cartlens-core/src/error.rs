use thiserror::Error;

/// All the ways the pipeline and store can go wrong
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
///
/// Every failure is scoped to one operation - nothing here is fatal to
/// the process, and no variant ever leaves a half-committed item behind.
#[derive(Error, Debug)]
pub enum Error {
    /// A live image handle could not be read into its storable encoding
    #[error("image encoding failed: {0}")]
    Encoding(String),

    /// The vision service was unreachable, refused, or replied with
    /// something unusable. Messages carry the raw reply for debugging.
    #[error("{0}")]
    Analysis(String),

    /// The durable list store could not be reached or written
    #[error("list persistence failed: {0}")]
    Persistence(String),

    /// A submission was missing required data or an accepted item lacked
    /// a name
    #[error("invalid submission: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
