/*!
Tests for error handling and error types.
*/

#[cfg(test)]
mod tests {
    use crate::error::CvError;
    use std::io;

    #[test]
    fn test_cv_error_display() {
        let error = CvError::validation("test validation error");
        assert_eq!(error.to_string(), "Validation error: test validation error");

        let error = CvError::render("renderer crashed");
        assert_eq!(error.to_string(), "Render error: renderer crashed");

        let error = CvError::Storage("test storage error".to_string());
        assert_eq!(error.to_string(), "Storage error: test storage error");
    }

    #[test]
    fn test_unknown_field_names_form_and_field() {
        let error = CvError::unknown_field("experience", "salary");
        let message = error.to_string();

        assert!(message.contains("salary"));
        assert!(message.contains("experience"));
    }

    #[test]
    fn test_cv_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let cv_error = CvError::from(io_error);

        match cv_error {
            CvError::Io(_) => {} // Expected
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_cv_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let cv_error = CvError::from(json_error);

        match cv_error {
            CvError::Json(_) => {} // Expected
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_unsupported_format_message() {
        let error = CvError::unsupported_format("pdf (no renderer configured)");
        assert!(error.to_string().starts_with("Unsupported export format"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<CvError>();
        assert_sync::<CvError>();
    }

    #[test]
    fn test_error_chain_with_question_mark() {
        fn read_missing() -> crate::Result<String> {
            let contents = std::fs::read_to_string("/definitely/not/here/cvkit.json")?;
            Ok(contents)
        }

        let result = read_missing();
        assert!(matches!(result, Err(CvError::Io(_))));
    }
}
