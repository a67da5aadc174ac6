use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LabspecError {
    #[error("failed to load profile from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile from {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("failed to write {path}")]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("node '{name}' is already declared in this request")]
    DuplicateNode { name: String },

    #[error("this context already has a request bound to it")]
    RequestAlreadyBound,

    #[error("no request has been bound to this context")]
    RequestNotBound,

    #[error("the request specification was already printed")]
    AlreadyPrinted,

    #[error("specification serialization failed: {message}")]
    Serialize { message: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("init cancelled")]
    InitCancelled,
}
