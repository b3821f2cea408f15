use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("unterminated token starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("unexpected '[' at byte {offset} inside a token")]
    NestedOpen { offset: usize },

    #[error("expected exactly one token in {input:?}, found {found}")]
    NotSingular { input: String, found: usize },

    #[error("empty token value at byte {offset}")]
    EmptyValue { offset: usize },
}
