use thiserror::Error;

/// An existing sheet with no data rows is not an error.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("sheet \"{sheet}\" does not exist")]
    Missing { sheet: String },

    #[error("failed to read sheet \"{sheet}\": {message}")]
    Access { sheet: String, message: String },

    #[error("failed to write to sheet \"{sheet}\": {message}")]
    Write { sheet: String, message: String },
}

impl SourceError {
    pub fn access(sheet: &str, err: impl std::fmt::Display) -> Self {
        SourceError::Access {
            sheet: sheet.to_string(),
            message: err.to_string(),
        }
    }

    pub fn write(sheet: &str, err: impl std::fmt::Display) -> Self {
        SourceError::Write {
            sheet: sheet.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SourceError::Missing { .. })
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} is not a valid date and time: {value}")]
    InvalidDateTime { field: &'static str, value: String },

    #[error("invalid class count \"{0}\", expected <class>=<count>")]
    InvalidClassCount(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_sheet() {
        let err = SourceError::access("Sessions", "permission denied");
        assert_eq!(
            err.to_string(),
            "failed to read sheet \"Sessions\": permission denied"
        );
        assert!(!err.is_missing());

        let missing = SourceError::Missing {
            sheet: "Schools".to_string(),
        };
        assert!(missing.is_missing());
        assert_eq!(missing.to_string(), "sheet \"Schools\" does not exist");
    }
}
