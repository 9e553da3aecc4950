//! Configuration options for structural export.
//!
//! Export options are a bit-set. Every schema and collection carries a default
//! set, and each `to_array_with` call can override it.
//!
//! ## Examples
//!
//! ```rust
//! use typed_class::{ExportOptions, FieldDescriptor, Schema, TypedRecord, value};
//!
//! let schema = Schema::builder("Note")
//!     .field(FieldDescriptor::string("title"))
//!     .field(FieldDescriptor::string("body"))
//!     .export_options(ExportOptions::OMIT_EMPTY)
//!     .build()
//!     .unwrap();
//!
//! let note = TypedRecord::from_value(&schema, &value!({ "title": "hi" })).unwrap();
//! assert_eq!(note.to_array().unwrap().len(), 1);
//! ```

use bitflags::bitflags;

bitflags! {
    /// Flags controlling what [`TypedRecord::to_array`](crate::TypedRecord::to_array)
    /// and [`TypedCollection::to_array`](crate::TypedCollection::to_array) emit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExportOptions: u32 {
        /// Drop null, false, zero, `""`, `"0"` and empty-map values.
        const OMIT_EMPTY = 1;
        /// Drop resource objects (non-data handles).
        const OMIT_RESOURCE = 1 << 1;
        /// Render date-formattable objects as their canonical string.
        const DATE_TO_STRING = 1 << 2;
        /// Render every stringable object as its string form.
        const ALL_OBJECTS_TO_STRING = 1 << 3;
        /// Export an `_id` holding a 24-digit hex string as `{"$oid": ...}`.
        const CAST_ID_TO_OBJECTID = 1 << 4;
        /// Drop scalar fields that still hold their declared default.
        const OMIT_DEFAULTS = 1 << 5;
    }
}

impl ExportOptions {
    /// Options suited to a document-store hand-off.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::ExportOptions;
    ///
    /// let opts = ExportOptions::document();
    /// assert!(opts.contains(ExportOptions::CAST_ID_TO_OBJECTID));
    /// assert!(!opts.contains(ExportOptions::DATE_TO_STRING));
    /// ```
    #[must_use]
    pub fn document() -> Self {
        ExportOptions::OMIT_EMPTY
            | ExportOptions::OMIT_RESOURCE
            | ExportOptions::CAST_ID_TO_OBJECTID
    }

    /// Options suited to JSON text output.
    #[must_use]
    pub fn json() -> Self {
        ExportOptions::OMIT_RESOURCE
            | ExportOptions::DATE_TO_STRING
            | ExportOptions::ALL_OBJECTS_TO_STRING
    }
}
