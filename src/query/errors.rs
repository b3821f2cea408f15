use crate::filter::FilterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid conversion: {message}")]
    InvalidConversion { message: String },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl QueryError {
    pub(crate) fn invalid_conversion(message: impl Into<String>) -> Self {
        QueryError::InvalidConversion {
            message: message.into(),
        }
    }
}
