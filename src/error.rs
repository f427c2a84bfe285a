use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::{OrderNumber, UserId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Ledger and registry rejections returned to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("order {order} already exists")]
    OrderAlreadyExists { order: OrderNumber },

    #[error("order {order} was uploaded by another user")]
    OrderOwnedByOtherUser { order: OrderNumber },

    #[error("order {order} not found")]
    OrderNotFound { order: OrderNumber },

    #[error("user '{login}' not found")]
    UserNotFound { login: String },

    #[error("unknown user id {user}")]
    UnknownUser { user: UserId },

    #[error("login '{login}' is already taken")]
    LoginTaken { login: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Storage or network hiccup worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Database(_) | Error::Http(_) | Error::Io(_)
        )
    }

    /// A definite answer to the caller: bad input, conflict, not found,
    /// insufficient funds.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Domain(_) | Error::Ledger(_))
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
