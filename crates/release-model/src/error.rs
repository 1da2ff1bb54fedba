use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown delimiter '{0}' (expected comma or semicolon)")]
    UnknownDelimiter(String),
    #[error("duplicate item number {0} in request manifest")]
    DuplicateItem(u32),
    #[error("item number 0 in request manifest (item numbers start at 1)")]
    ZeroItemNumber,
}

pub type Result<T> = std::result::Result<T, ModelError>;
