use thiserror::Error;

/// Top-level error type for the Outfitter system.
///
/// Each variant wraps a subsystem-specific message. Subsystem crates return
/// this type directly so the `?` operator works across crate boundaries.
///
/// An empty vector index is deliberately NOT an error: a search against an
/// empty index produces a no-match response, while `DataConsistency` is
/// reserved for index/store drift (an entry pointing at a product that no
/// longer exists).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutfitterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Vector index error: {0}")]
    Vector(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Generation provider error: {0}")]
    Generation(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Data consistency error: {0}")]
    DataConsistency(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for OutfitterError {
    fn from(err: toml::de::Error) -> Self {
        OutfitterError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for OutfitterError {
    fn from(err: toml::ser::Error) -> Self {
        OutfitterError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OutfitterError {
    fn from(err: serde_json::Error) -> Self {
        OutfitterError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Outfitter operations.
pub type Result<T> = std::result::Result<T, OutfitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OutfitterError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OutfitterError = io_err.into();
        assert!(matches!(err, OutfitterError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(OutfitterError, &str)> = vec![
            (
                OutfitterError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                OutfitterError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                OutfitterError::Vector("lock poisoned".to_string()),
                "Vector index error: lock poisoned",
            ),
            (
                OutfitterError::Embedding("quota exceeded".to_string()),
                "Embedding provider error: quota exceeded",
            ),
            (
                OutfitterError::Generation("model overloaded".to_string()),
                "Generation provider error: model overloaded",
            ),
            (
                OutfitterError::Template("bundle unreadable".to_string()),
                "Template error: bundle unreadable",
            ),
            (
                OutfitterError::DataConsistency("no product for id 7".to_string()),
                "Data consistency error: no product for id 7",
            ),
            (
                OutfitterError::Api("failed to bind".to_string()),
                "API error: failed to bind",
            ),
            (
                OutfitterError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_provider_variants_are_distinguishable() {
        let embed = OutfitterError::Embedding("timeout".to_string());
        let gen = OutfitterError::Generation("timeout".to_string());
        assert!(matches!(embed, OutfitterError::Embedding(_)));
        assert!(matches!(gen, OutfitterError::Generation(_)));
        assert_ne!(embed.to_string(), gen.to_string());
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let err: OutfitterError = err.unwrap_err().into();
        assert!(matches!(err, OutfitterError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let err: OutfitterError = err.unwrap_err().into();
        assert!(matches!(err, OutfitterError::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(OutfitterError::Config("fail".to_string()))
        }

        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = OutfitterError::DataConsistency("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("DataConsistency"));
        assert!(debug_str.contains("test debug"));
    }
}
