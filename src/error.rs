use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for WSDL discovery and generation
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    /// Invalid endpoint URI, or a style map missing a required key
    Configuration(String),
    /// A reflected operation carries no prototype at all
    NoPrototype { operation: String },
    /// A class, function or manifest could not be reflected
    Reflection(String),
    /// A type expression that cannot be mapped to a schema type
    SchemaGeneration { type_name: String, message: String },
    /// Dump, serialization or type lookup requested before a document exists
    DocumentNotInitialized(&'static str),
    /// A call sequence that would leave the document inconsistent
    InconsistentState(String),
    SerializationError(String),
}

impl Error {
    pub(crate) fn schema(type_name: &str, message: impl Into<String>) -> Self {
        Error::SchemaGeneration {
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::NoPrototype { operation } => write!(
                f,
                "No prototypes could be found for the '{}' function",
                operation
            ),
            Error::Reflection(msg) => write!(f, "Reflection error: {}", msg),
            Error::SchemaGeneration { type_name, message } => {
                write!(f, "Cannot generate schema type for '{}': {}", type_name, message)
            }
            Error::DocumentNotInitialized(action) => write!(
                f,
                "Cannot {} autodiscovered contents, WSDL file has not been generated yet",
                action
            ),
            Error::InconsistentState(msg) => write!(f, "Inconsistent document state: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML error: {}", err))
    }
}

impl From<xmltree::Error> for Error {
    fn from(err: xmltree::Error) -> Self {
        Error::SerializationError(format!("XML error: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_prototype_message_names_operation() {
        let err = Error::NoPrototype {
            operation: "getList".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No prototypes could be found for the 'getList' function"
        );
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error as _;

        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(Error::Configuration("x".to_string()).source().is_none());
    }
}
