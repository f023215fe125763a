use std::fmt;

use crate::data::AccountId;

/// A request that could not be completed at the transport level.
#[derive(Debug)]
pub enum TransportError {
    /// The HTTP exchange itself failed (connection refused, reset, TLS, ...).
    Http(reqwest::Error),
    /// The endpoint answered with a non-success status and no GraphQL body.
    Status { code: u16, body: String },
    /// The response body was not a GraphQL response, or `data` did not have the
    /// shape the operation expects.
    Malformed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http(e) => write!(f, "HTTP request failed: {e}"),
            TransportError::Status { code, body } if body.is_empty() => {
                write!(f, "Endpoint returned status {code}")
            }
            TransportError::Status { code, body } => {
                write!(f, "Endpoint returned status {code}: {body}")
            }
            TransportError::Malformed(reason) => write!(f, "Malformed response: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Http(e)
    }
}

/// A single-entity query came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Account(AccountId),
    Address(AccountId),
    Balance(AccountId),
    Transaction { account: AccountId, txid: String },
    NoTransactions(AccountId),
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Account(id) => write!(f, "Account {id} not found"),
            NotFound::Address(id) => write!(f, "No address for account {id}"),
            NotFound::Balance(id) => write!(f, "No balance for account {id}"),
            NotFound::Transaction { account, txid } => {
                write!(f, "Transaction {txid} not found in account {account}")
            }
            NotFound::NoTransactions(id) => write!(f, "Account {id} has no transactions yet"),
        }
    }
}

#[derive(Debug)]
pub enum InitError {
    /// The version probe could not reach the backend.
    Unreachable(TransportError),
    /// The backend answered, but without a usable API version.
    NotReady(Option<String>),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Unreachable(e) => write!(f, "Backend unreachable: {e}"),
            InitError::NotReady(None) => write!(f, "Backend not ready: no API version reported"),
            InitError::NotReady(Some(reason)) => write!(f, "Backend not ready: {reason}"),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Transport(TransportError),
    /// The backend executed the request and reported application errors.
    Backend(Vec<String>),
    NotFound(NotFound),
    Initialization(InitError),
    AccountCreationRejected(Vec<String>),
    UnknownOperation(String),
    MissingOperation,
    InvalidArgument {
        position: usize,
        name: &'static str,
        reason: String,
    },
    InvalidAmount(usize),
    InvalidRecipient(usize),
    Output(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "{e}"),
            Error::Backend(messages) => write!(f, "Backend error: {}", messages.join("; ")),
            Error::NotFound(e) => write!(f, "{e}"),
            Error::Initialization(e) => write!(f, "{e}"),
            Error::AccountCreationRejected(messages) => {
                write!(f, "Account creation rejected: {}", messages.join("; "))
            }
            Error::UnknownOperation(name) => write!(f, "Unknown operation \"{name}\""),
            Error::MissingOperation => write!(f, "Please provide an operation name"),
            Error::InvalidArgument {
                position,
                name,
                reason,
            } => write!(f, "Invalid argument {position} ({name}): {reason}"),
            Error::InvalidAmount(idx) => {
                write!(f, "Recipient {idx} invalid: amount must be positive")
            }
            Error::InvalidRecipient(idx) => {
                write!(f, "Recipient {idx} invalid: address must not be empty")
            }
            Error::Output(e) => write!(f, "Failed to serialize result: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<NotFound> for Error {
    fn from(e: NotFound) -> Self {
        Error::NotFound(e)
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Error::Initialization(e)
    }
}
