use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed criterion: {message}")]
    MalformedCriterion { message: String },
}

impl FilterError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FilterError::MalformedCriterion {
            message: message.into(),
        }
    }
}
