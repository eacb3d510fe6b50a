// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Error types for the exporter

use thiserror::Error;

use crate::instrument::InstrumentKind;

/// Errors raised while building filters, registering instruments or collecting
#[derive(Error, Debug)]
pub enum ExporterError {
    /// A filter rule's regex did not compile
    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidFilterPattern {
        /// The pattern as written in the configuration
        pattern: String,
        /// Compilation error
        #[source]
        source: fancy_regex::Error,
    },

    /// A name is already bound to an instrument of another kind
    #[error("Instrument '{name}' is already registered as a {existing}")]
    InstrumentConflict {
        /// Instrument name
        name: String,
        /// Kind of the instrument holding the name
        existing: InstrumentKind,
    },

    /// A gauge with this name already exists
    #[error("Instrument '{0}' is already registered")]
    AlreadyRegistered(String),

    /// A producer failed while refreshing a family
    #[error("Failed to collect metric family '{family}': {reason}")]
    CollectionFailed {
        /// Family being refreshed
        family: String,
        /// Producer-supplied reason
        reason: String,
    },

    /// A lock was poisoned by a panicking thread
    #[error("Lock poisoned: {0}")]
    Poisoned(&'static str),

    /// Prometheus encoding error
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Result alias for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;
