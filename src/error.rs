use crate::operation::{supported_methods_list, MethodKind};

/// Rejections produced while interpreting the command line.
/// None of these touch the network.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UsageError {
    /// Wrong number of arguments; the caller prints the full usage text.
    #[error("missing or unexpected arguments")]
    Arguments,

    #[error("Invalid method. Supported methods: {}", supported_methods_list(.supported))]
    InvalidMethod {
        method: String,
        supported: Vec<MethodKind>,
    },

    #[error("Invalid value. Must be true or false")]
    InvalidBool { value: String },
}

/// Failures that abort a prune run after the arguments were accepted.
#[derive(Debug, thiserror::Error)]
pub enum PruneError {
    #[error("Error: {0:#}")]
    Decode(#[source] anyhow::Error),

    #[error("There was an error deleting {id} ({completed} deletes completed before it): {source:#}")]
    Delete {
        id: String,
        completed: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("{} of {attempted} deletes failed: {}", .failed.len(), .failed.join(", "))]
    DeletesFailed {
        failed: Vec<String>,
        attempted: usize,
    },

    #[error("writing output: {0}")]
    Output(#[from] std::io::Error),
}
