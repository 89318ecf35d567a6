use thiserror::Error;

/// Failure to load a project configuration.
#[derive(Error, Debug)]
pub enum ConfigReadError {
    #[error("Project configuration file '{name}' does not exist")]
    Missing { name: String },

    #[error("Project configuration file '{name}' does not exist")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Project configuration is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Malformed project configuration at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Invalid project configuration at line {line}: {message}")]
    Invalid { line: usize, message: String },
}

impl ConfigReadError {
    /// 1-based line of the problem, 1 when the location is unknown.
    pub fn line(&self) -> usize {
        match self {
            ConfigReadError::Malformed { line, .. } | ConfigReadError::Invalid { line, .. } => {
                (*line).max(1)
            }
            _ => 1,
        }
    }
}

/// Failure to persist a project configuration.
#[derive(Error, Debug)]
pub enum ConfigWriteError {
    #[error("Unable to write project configuration '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to encode project configuration: {0}")]
    Encoding(#[from] quick_xml::Error),

    #[error("Configuration without a project cannot be written")]
    NullConfig,
}
