// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary-level failures and their process exit codes.
//!
//! Exit codes follow the BSD `sysexits.h` convention so that service
//! managers can tell a bad configuration apart from a crashed server.

use thiserror::Error;

/// Process exit codes.
pub mod exit {
    /// The command line was used incorrectly.
    pub const USAGE: i32 = 64;
    /// A required service could not be reached or kept running.
    pub const UNAVAILABLE: i32 = 69;
    /// Internal failure.
    pub const SOFTWARE: i32 = 70;
    /// Reading or writing a file or stream failed.
    pub const IO: i32 = 74;
    /// The configuration is unusable.
    pub const CONFIG: i32 = 78;
}

/// Result alias used throughout the binary.
pub type BinResult<T> = Result<T, BinError>;

/// A failure that ends the `gatehouse` process.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration could not be turned into a running gate.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A command argument was rejected.
    #[error("invalid usage: {0}")]
    Usage(String),

    /// Wiring the gate failed before it could serve.
    #[error("startup failed: {0}")]
    Startup(String),

    /// Anything else that went wrong inside the binary.
    #[error("{0}")]
    Internal(String),

    /// A file or stream operation failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("server stopped: {0}")]
    Server(#[from] gatehouse_api::ApiError),

    /// Loading or validating the configuration file failed.
    #[error(transparent)]
    Settings(#[from] gatehouse_config::ConfigError),

    /// A credential operation failed outside a request.
    #[error(transparent)]
    Auth(#[from] gatehouse_core::AuthError),

    /// Wraps another failure with what was being attempted.
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted.
        context: String,
        /// The failure itself.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// An unusable configuration value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// A rejected command argument.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// A failure while wiring components.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Any other failure.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Prefixes the error with what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The exit code the process should end with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::Settings(_) => exit::CONFIG,
            Self::Usage(_) => exit::USAGE,
            Self::Startup(_) | Self::Internal(_) | Self::Auth(_) => exit::SOFTWARE,
            Self::Io(_) => exit::IO,
            Self::Server(_) => exit::UNAVAILABLE,
            Self::Context { source, .. } => source.exit_code(),
        }
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", err))
    }
}

/// Prints the error and every cause beneath it to stderr, then exits.
pub fn report_error_and_exit(error: BinError) -> ! {
    eprintln!("gatehouse: {}", error);

    // `Context` already renders its source inline.
    let mut cause = match &error {
        BinError::Context { source, .. } => std::error::Error::source(source.as_ref()),
        other => std::error::Error::source(other),
    };
    while let Some(inner) = cause {
        eprintln!("  because: {}", inner);
        cause = inner.source();
    }

    std::process::exit(error.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            BinError::config("port out of range").to_string(),
            "invalid configuration: port out of range"
        );
        assert_eq!(BinError::internal("boom").to_string(), "boom");
    }

    #[test]
    fn test_context_keeps_exit_code() {
        let err = BinError::config("jwt secret missing").with_context("loading gatehouse.yaml");
        assert_eq!(
            err.to_string(),
            "loading gatehouse.yaml: invalid configuration: jwt secret missing"
        );
        assert_eq!(err.exit_code(), exit::CONFIG);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::usage("empty password").exit_code(), exit::USAGE);
        assert_eq!(BinError::startup("seed").exit_code(), exit::SOFTWARE);
        assert_eq!(
            BinError::from(std::io::Error::other("disk")).exit_code(),
            exit::IO
        );
        assert_eq!(
            BinError::from(gatehouse_config::ConfigError::missing_field("security.jwt_secret"))
                .exit_code(),
            exit::CONFIG
        );
    }

    #[test]
    fn test_anyhow_conversion_keeps_chain() {
        let err = anyhow::anyhow!("broken pipe").context("reading password from stdin");
        assert_eq!(
            BinError::from(err).to_string(),
            "reading password from stdin: broken pipe"
        );
    }
}
