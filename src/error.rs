use thiserror::Error;

#[derive(Error, Debug)]
pub enum GachaError {
    /// Weights of the active table do not add up to 100%.
    #[error("outcome table weights sum to {sum}, expected 100")]
    InvalidTable { sum: f64 },

    #[error("config '{path}': {reason}")]
    Config { path: String, reason: String },

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A batch job panicked on the worker pool.
    #[error("worker task failed: {0}")]
    Worker(String),
}
