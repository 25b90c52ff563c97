use thiserror::Error;

#[derive(Error, Debug)]
pub enum FacetError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Config file error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, FacetError>;

/// A stored parameter value that a filter could not use.
///
/// Never returned to callers: filters log it and carry on as if the
/// parameter were absent, so stale or hand-edited URLs show everything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    #[error("cannot parse {value:?} for `{param}`")]
    Unparseable { param: String, value: String },

    #[error("{value:?} is not one of the choices for `{param}`")]
    OutOfDomain { param: String, value: String },

    #[error("`{param}` is set without its coarser level")]
    Orphaned { param: String },
}

impl DecodeWarning {
    pub(crate) fn log(&self) {
        tracing::debug!(warning = %self, "ignoring filter parameter");
    }
}
