//! Field descriptors and record schemas.
//!
//! A [`Schema`] is the static shape of a [`TypedRecord`]: an ordered list of
//! [`FieldDescriptor`]s plus a rename table. It is built once, validated, and
//! shared read-only between every record of that shape.
//!
//! ## Examples
//!
//! ```rust
//! use typed_class::{FieldDescriptor, Schema, TimestampClass};
//!
//! let address = Schema::builder("Address")
//!     .field(FieldDescriptor::string("street"))
//!     .field(FieldDescriptor::string("city"))
//!     .build()
//!     .unwrap();
//!
//! let person = Schema::builder("Person")
//!     .field(FieldDescriptor::string("name").alias("full_name"))
//!     .field(FieldDescriptor::int("age").nullable())
//!     .field(FieldDescriptor::record("address", &address))
//!     .field(FieldDescriptor::object("born", TimestampClass).nullable())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(person.len(), 4);
//! assert_eq!(person.resolve("full_name"), Some(0));
//! ```

use crate::cast::Kind;
use crate::object::ObjectClass;
use crate::slot::Slot;
use crate::{Error, ExportOptions, Result, TypedRecord, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Declared type of a record field or collection element.
#[derive(Debug, Clone)]
pub enum FieldType {
    Scalar(Kind),
    Record(Arc<Schema>),
    Collection(Box<FieldType>),
    Object(Arc<dyn ObjectClass>),
    Any,
}

impl FieldType {
    /// A printable type name, e.g. `int`, `Address` or `Collection<int>`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            FieldType::Scalar(kind) => kind.name().to_string(),
            FieldType::Record(schema) => schema.name().to_string(),
            FieldType::Collection(element) => format!("Collection<{}>", element.name()),
            FieldType::Object(class) => class.name().to_string(),
            FieldType::Any => "any".to_string(),
        }
    }

    /// Scalar kinds and `Any` hold plain values; everything else holds a
    /// container or object.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldType::Scalar(_) | FieldType::Any)
    }
}

impl PartialEq for FieldType {
    /// Records compare by schema name and objects by class name.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Scalar(a), FieldType::Scalar(b)) => a == b,
            (FieldType::Record(a), FieldType::Record(b)) => a.name() == b.name(),
            (FieldType::Collection(a), FieldType::Collection(b)) => a == b,
            (FieldType::Object(a), FieldType::Object(b)) => a.name() == b.name(),
            (FieldType::Any, FieldType::Any) => true,
            _ => false,
        }
    }
}

impl From<Kind> for FieldType {
    fn from(kind: Kind) -> Self {
        FieldType::Scalar(kind)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Hook run after every assignment to enforce cross-field invariants.
pub type RelatedHook = Arc<dyn Fn(&mut TypedRecord) -> Result<()> + Send + Sync>;

/// One declared field: name, type, nullability, default and aliases.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    nullable: bool,
    default: Value,
    aliases: Vec<String>,
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            field_type,
            nullable: false,
            default: Value::Null,
            aliases: Vec::new(),
        }
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, FieldType::Scalar(Kind::Bool))
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, FieldType::Scalar(Kind::Int))
    }

    pub fn float(name: &str) -> Self {
        Self::new(name, FieldType::Scalar(Kind::Float))
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldType::Scalar(Kind::String))
    }

    /// An untyped ordered-map field.
    pub fn array(name: &str) -> Self {
        Self::new(name, FieldType::Scalar(Kind::RawArray))
    }

    /// A field that stores whatever it is given.
    pub fn any(name: &str) -> Self {
        Self::new(name, FieldType::Any)
    }

    pub fn record(name: &str, schema: &Arc<Schema>) -> Self {
        Self::new(name, FieldType::Record(Arc::clone(schema)))
    }

    pub fn collection(name: &str, element: impl Into<FieldType>) -> Self {
        Self::new(name, FieldType::Collection(Box::new(element.into())))
    }

    pub fn object<C: ObjectClass + 'static>(name: &str, class: C) -> Self {
        Self::new(name, FieldType::Object(Arc::new(class)))
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the initial value. Defaults are coerced like any other input.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Adds an incoming name that maps onto this field.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// A freshly built slot holding this field's default.
    pub(crate) fn default_slot(&self) -> Result<Slot> {
        Slot::for_field(&self.field_type, &self.default, self.nullable)
    }
}

/// The shape of a [`TypedRecord`].
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    export_options: ExportOptions,
    related: Option<RelatedHook>,
}

impl Schema {
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            fields: Vec::new(),
            aliases: Vec::new(),
            export_options: ExportOptions::empty(),
            related: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the field `name` refers to. The rename table is consulted
    /// before the field names.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.aliases
            .get(name)
            .or_else(|| self.index.get(name))
            .copied()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.resolve(name).map(|i| &self.fields[i])
    }

    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        self.export_options
    }

    pub(crate) fn related_hook(&self) -> Option<RelatedHook> {
        self.related.clone()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("aliases", &self.aliases)
            .field("export_options", &self.export_options)
            .field("related", &self.related.is_some())
            .finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    aliases: Vec<(String, String)>,
    export_options: ExportOptions,
    related: Option<RelatedHook>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Maps the incoming name `from` onto the field `to`.
    #[must_use]
    pub fn alias(mut self, from: &str, to: &str) -> Self {
        self.aliases.push((from.to_string(), to.to_string()));
        self
    }

    #[must_use]
    pub fn export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    /// Installs a hook run after every assignment entry point.
    ///
    /// Writes made from inside the hook do not re-trigger it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{FieldDescriptor, Schema, TypedRecord, value, Value};
    ///
    /// let range = Schema::builder("Range")
    ///     .field(FieldDescriptor::int("start"))
    ///     .field(FieldDescriptor::int("end"))
    ///     .related(|r: &mut TypedRecord| {
    ///         let start = r.get_value("start")?;
    ///         let end = r.get_value("end")?;
    ///         if end.as_i64() < start.as_i64() {
    ///             r.set("end", start)?;
    ///         }
    ///         Ok(())
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// let r = TypedRecord::from_value(&range, &value!({ "start": 10, "end": 3 })).unwrap();
    /// assert_eq!(r.get_value("end").unwrap(), Value::from(10));
    /// ```
    #[must_use]
    pub fn related<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut TypedRecord) -> Result<()> + Send + Sync + 'static,
    {
        self.related = Some(Arc::new(hook));
        self
    }

    /// Validates the definition and freezes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for duplicate field names, aliases that
    /// collide with a field or another alias, aliases to unknown fields, and
    /// defaults that cannot be coerced to their field's type.
    pub fn build(self) -> Result<Arc<Schema>> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            if index.insert(field.name.clone(), i).is_some() {
                return Err(Error::schema(format!(
                    "{}: duplicate field \"{}\"",
                    self.name, field.name
                )));
            }
        }

        let declared = self.fields.iter().enumerate().flat_map(|(i, field)| {
            field
                .aliases
                .iter()
                .map(move |alias| (alias.clone(), field.name.clone(), i))
        });
        let mut aliases = HashMap::new();
        let mut pairs = Vec::new();
        for (from, to) in &self.aliases {
            let target = *index.get(to).ok_or_else(|| {
                Error::schema(format!(
                    "{}: alias \"{}\" points at unknown field \"{}\"",
                    self.name, from, to
                ))
            })?;
            pairs.push((from.clone(), to.clone(), target));
        }
        for (from, to, target) in declared.chain(pairs) {
            if index.contains_key(&from) {
                return Err(Error::schema(format!(
                    "{}: alias \"{}\" for \"{}\" shadows a field",
                    self.name, from, to
                )));
            }
            if aliases.insert(from.clone(), target).is_some() {
                return Err(Error::schema(format!(
                    "{}: alias \"{}\" declared twice",
                    self.name, from
                )));
            }
        }

        for field in &self.fields {
            field.default_slot().map_err(|err| {
                Error::schema(format!(
                    "{}: invalid default for \"{}\": {}",
                    self.name, field.name, err
                ))
            })?;
        }

        Ok(Arc::new(Schema {
            name: self.name,
            fields: self.fields,
            index,
            aliases,
            export_options: self.export_options,
            related: self.related,
        }))
    }
}
