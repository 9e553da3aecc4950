//! Error types for typed records, collections and the coercion engine.
//!
//! Coercion itself is lenient: most malformed input is coerced or ignored
//! rather than reported. The errors here cover the structural contracts that
//! are never relaxed.
//!
//! ## Error Categories
//!
//! - **Field errors**: direct access to a field the schema never declared
//! - **Length errors**: [`TypedCollection::combine`](crate::TypedCollection::combine)
//!   with a key list of the wrong size
//! - **Encoding errors**: values that have no JSON/string representation
//! - **Type mismatches**: an object class refusing a whole-value construction
//! - **Schema errors**: an inconsistent schema definition caught at build time
//!
//! ## Examples
//!
//! ```rust
//! use typed_class::{FieldDescriptor, Schema, TypedRecord, Error};
//!
//! let schema = Schema::builder("Point")
//!     .field(FieldDescriptor::int("x"))
//!     .build()
//!     .unwrap();
//! let record = TypedRecord::new(&schema).unwrap();
//!
//! match record.get_value("z") {
//!     Err(Error::FieldNotFound { field, .. }) => assert_eq!(field, "z"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all errors surfaced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Direct get/set of a name that is neither a field nor an alias
    #[error("Field not found: {record} has no field named \"{field}\"")]
    FieldNotFound { record: String, field: String },

    /// Re-keying a collection with a key list of a different length
    #[error("Length mismatch: expected {expected} keys, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Value cannot be rendered as JSON text
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An object class could not be built from the given value
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Inconsistent schema definition
    #[error("Schema error: {0}")]
    Schema(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a field-not-found error for the record type `record`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::Error;
    ///
    /// let err = Error::field_not_found("User", "emial");
    /// assert!(err.to_string().contains("emial"));
    /// ```
    pub fn field_not_found(record: &str, field: &str) -> Self {
        Error::FieldNotFound {
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    /// Creates a length mismatch error.
    pub fn length_mismatch(expected: usize, found: usize) -> Self {
        Error::LengthMismatch { expected, found }
    }

    /// Creates an encoding error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::Error;
    ///
    /// let err = Error::encoding("NaN is not representable");
    /// assert!(err.to_string().starts_with("Encoding error"));
    /// ```
    pub fn encoding<T: fmt::Display>(msg: T) -> Self {
        Error::Encoding(msg.to_string())
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a schema definition error.
    pub fn schema<T: fmt::Display>(msg: T) -> Self {
        Error::Schema(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Encoding(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
