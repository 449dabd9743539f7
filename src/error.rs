/*
 * This file is part of Busmap.
 *
 * Copyright (C) 2025 Busmap contributors
 *
 * Busmap is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Busmap is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Busmap. If not, see <https://www.gnu.org/licenses/>.
 */

//! Error type for the parts of Busmap that can actually fail.
//!
//! Topology resolution never fails: a missing attribute is an absent field.
//! Errors only come from loading configuration and from the command line.

use std::io;

/// Result type alias using BusmapError
pub type Result<T> = std::result::Result<T, BusmapError>;

#[derive(thiserror::Error, Debug)]
pub enum BusmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Not an I2C bus name: {0}")]
    InvalidBusName(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl BusmapError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BusmapError::invalid_config("sysfs_root", "must be absolute");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for sysfs_root: must be absolute"
        );

        let err = BusmapError::InvalidBusName("1-0050".to_string());
        assert_eq!(err.to_string(), "Not an I2C bus name: 1-0050");

        let err = BusmapError::InvalidArgument("--frobnicate".to_string());
        assert_eq!(err.to_string(), "Invalid argument: --frobnicate");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "test");
        let err: BusmapError = io_err.into();
        assert!(matches!(err, BusmapError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BusmapError = json_err.into();
        assert!(matches!(err, BusmapError::JsonParse(_)));
    }
}
