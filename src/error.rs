use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    InvalidArgument(String),
    TypeSyntax { input: String, position: usize, message: String },
    PathSyntax { path: String, message: String },
    UnknownType(String),
    UnknownInterceptor { service: String, interceptor: String },
    IncompatibleParameterType { name: String, existing: String, incoming: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "parse error in {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::TypeSyntax {
                input,
                position,
                message,
            } => write!(
                f,
                "invalid type expression '{}' at offset {}: {}",
                input, position, message
            ),
            Error::PathSyntax { path, message } => {
                write!(f, "invalid resource path '{}': {}", path, message)
            }
            Error::UnknownType(name) => write!(f, "unknown type: {}", name),
            Error::UnknownInterceptor {
                service,
                interceptor,
            } => write!(
                f,
                "service '{}' references unknown interceptor '{}'",
                service, interceptor
            ),
            Error::IncompatibleParameterType {
                name,
                existing,
                incoming,
            } => write!(
                f,
                "incompatible types for parameter '{}': '{}' and '{}'",
                name, existing, incoming
            ),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
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
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}
