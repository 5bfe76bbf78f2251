// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Why a configuration could not be loaded.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A configuration that could not be read, parsed or accepted.
///
/// Field paths use dotted notation matching the YAML layout, e.g.
/// `security.jwt_secret`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// The file was read but is not a well-formed document.
    #[error("{} is not valid configuration: {message}", path.display())]
    Malformed {
        /// The offending file.
        path: PathBuf,
        /// Parser diagnostics.
        message: String,
    },

    /// The file extension maps to no known format.
    #[error("cannot infer configuration format from '{extension}'")]
    UnknownFormat {
        /// The extension, or a placeholder when there is none.
        extension: String,
    },

    /// A value was parsed but is not acceptable.
    #[error("{field} {message}")]
    Invalid {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A required value is absent after all overrides.
    #[error("{field} is required")]
    Missing {
        /// Dotted path of the field.
        field: String,
    },

    /// A `GATEHOUSE_*` override could not be applied.
    #[error("environment override {name}: {message}")]
    BadOverride {
        /// The variable name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// Converting between in-memory and textual forms failed.
    #[error("{0}")]
    Encoding(String),
}

impl ConfigError {
    /// A read failure for `path`.
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// A missing file, reported the same way as any other read failure.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::unreadable(path, io::Error::from(io::ErrorKind::NotFound))
    }

    /// A parse failure in `path`.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// An extension with no matching format.
    pub fn unknown_format(extension: impl Into<String>) -> Self {
        Self::UnknownFormat {
            extension: extension.into(),
        }
    }

    /// Rejects `field` with a message that reads after the field name,
    /// e.g. `validation("server.port", "must not be 0")`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A required field with no value.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// A rejected environment override.
    pub fn bad_override(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadOverride {
            name: name.into(),
            message: message.into(),
        }
    }

    /// A (de)serialization failure.
    pub fn encoding(message: impl ToString) -> Self {
        Self::Encoding(message.to_string())
    }

    /// Whether the file itself was unavailable.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Unreadable { .. })
    }

    /// Whether the content was understood but refused.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Invalid { .. } | Self::Missing { .. } | Self::BadOverride { .. }
        )
    }
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
