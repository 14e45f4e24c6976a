//! Tests for error handling

#[cfg(test)]
mod tests {
    use super::super::helpers::error_chain;
    use super::super::types::ConsoleError;
    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_deref()
                .map(|layer| layer as &(dyn std::error::Error + 'static))
        }
    }

    // ==================== Helper Function Tests ====================

    #[test]
    fn test_config_helper() {
        let error = ConsoleError::config("missing port");
        assert!(matches!(error, ConsoleError::Config(msg) if msg == "missing port"));
    }

    #[test]
    fn test_cluster_helper() {
        let error = ConsoleError::cluster("no service account token");
        assert!(matches!(error, ConsoleError::Cluster(_)));
        assert_eq!(
            error.to_string(),
            "Cluster client error: no service account token"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "token file");
        let error: ConsoleError = io.into();
        assert!(matches!(error, ConsoleError::Io(_)));
    }

    // ==================== Error Chain Tests ====================

    #[test]
    fn test_error_chain_joins_sources() {
        let error = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "tcp connect error",
                source: Some(Box::new(Layer {
                    message: "Connection refused (os error 111)",
                    source: None,
                })),
            })),
        };

        assert_eq!(
            error_chain(&error),
            "error sending request: tcp connect error: Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_error_chain_skips_repeated_source() {
        let error = Layer {
            message: "dispatch failure: io error",
            source: Some(Box::new(Layer {
                message: "io error",
                source: None,
            })),
        };

        assert_eq!(error_chain(&error), "dispatch failure: io error");
    }
}
