//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Ji.
//! The Ji project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Ji Error Module
//!
//! This module defines the error types and utilities used throughout the Ji
//! plugin cache for consistent error handling and reporting.
//!
//! ## Error Handling Philosophy
//!
//! Ji uses a structured error approach with the following principles:
//!
//! - **Explicit Error Types**: Each error variant represents a specific
//!   category of failure, making it easier to handle errors appropriately
//! - **Contained Failures**: Only the archive-decomposition path of a cache
//!   operation propagates hard failures; registry lookups degrade to
//!   `None`/`false`/empty results so request-serving threads never crash on
//!   an absent plugin
//! - **Serde Support**: Errors can be serialized/deserialized for logging,
//!   persistence, and network transmission
//!
//! ## Error Categories
//!
//! - **Io**: Filesystem and stream errors
//! - **Archive**: Failures while decomposing a plugin distribution archive
//! - **NotFound**: A code unit or resource absent from a plugin and its
//!   parent resolver chain
//! - **Validation**: Input validation failures
//! - **Serde**: Serialization/deserialization errors
//! - **Zip**: ZIP archive operation errors
//! - **Internal**: Unexpected internal failures

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;

/// Convenience result type used throughout Ji.
pub type Result<T> = std::result::Result<T, JiError>;

/// Canonical error enumeration for the Ji plugin cache.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum JiError {
    /// Errors originating from filesystem or stream IO.
    #[error("io error: {0}")]
    Io(String),

    /// Failure reading or decomposing a plugin distribution archive. Fatal
    /// to the cache operation that triggered it; no partial state is
    /// published.
    #[error("archive error for plugin '{plugin}': {message}")]
    Archive { plugin: String, message: String },

    /// A requested code unit or resource exists in neither the plugin's own
    /// maps nor the parent resolver chain.
    #[error("'{name}' was not found")]
    NotFound { name: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors originating from ZIP file operations.
    #[error("zip error: {0}")]
    Zip(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for JiError {
    fn from(err: io::Error) -> Self {
        JiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for JiError {
    fn from(err: serde_json::Error) -> Self {
        JiError::Serde(err.to_string())
    }
}

impl From<ZipError> for JiError {
    fn from(err: ZipError) -> Self {
        JiError::Zip(err.to_string())
    }
}

impl JiError {
    /// Helper to construct archive errors.
    pub fn archive(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        JiError::Archive {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Helper to construct not-found errors.
    pub fn not_found<T: Into<String>>(name: T) -> Self {
        JiError::NotFound { name: name.into() }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        JiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        JiError::Internal(message.into())
    }

    /// True if this error represents a routine resolution miss rather than
    /// a hard failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, JiError::NotFound { .. })
    }
}
