use derive_more::Display;
use record_sort::SortError;

#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "internal error: {:#}", _0)]
    Internal(anyhow::Error),

    #[display(fmt = "bad request: {}", _0)]
    BadClientData(String),

    #[display(fmt = "not found")]
    NotFound,

    #[display(fmt = "{}", _0)]
    Sort(SortError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Sort(err) => Some(err),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Internal(err)
    }
}

impl From<SortError> for ServiceError {
    fn from(err: SortError) -> Self {
        ServiceError::Sort(err)
    }
}
