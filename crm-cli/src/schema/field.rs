//! Field specifications and per-table schemas

use serde_json::Value;

/// How a UI value is converted before it is sent to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Sent unchanged
    None,
    /// Strings are trimmed
    Trim,
    /// Whole numbers; numeric strings are parsed
    Integer,
    /// Decimal numbers; numeric strings are parsed
    Float,
}

/// Default substituted for an absent value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Str(&'static str),
    Int(i64),
    Float(f64),
}

impl DefaultValue {
    pub fn to_json(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Float(f) => Value::from(f),
        }
    }
}

/// Who may write a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Set by the store only (ids, timestamps)
    ReadOnly,
    /// Set on create and by dedicated operations, never by a caller update
    Managed,
    /// Freely writable
    Writable,
}

/// Denormalized display-name column paired with a lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupName {
    /// UI field holding the name (e.g., "contactName")
    pub ui: &'static str,
    /// Column storing the denormalized name (e.g., "contact_name_c")
    pub column: &'static str,
    /// Read default when neither the reference nor the column has a name
    pub default: Option<DefaultValue>,
}

/// One UI field ↔ column correspondence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub ui: &'static str,
    pub column: &'static str,
    pub coercion: Coercion,
    pub access: Access,
    /// Must be present and non-empty on create, and never blanked on update
    pub required: bool,
    /// Substituted on read when the column is absent or falsy
    pub read_default: Option<DefaultValue>,
    /// Sent on create when the caller did not supply the field
    pub create_default: Option<DefaultValue>,
    /// Additional column written with the same value (e.g., the system `Name`)
    pub mirror: Option<&'static str>,
    /// Present when the column is a lookup to another table
    pub lookup: Option<LookupName>,
}

impl FieldSpec {
    pub const fn new(ui: &'static str, column: &'static str) -> Self {
        Self {
            ui,
            column,
            coercion: Coercion::None,
            access: Access::Writable,
            required: false,
            read_default: None,
            create_default: None,
            mirror: None,
            lookup: None,
        }
    }

    pub const fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    pub const fn managed(mut self) -> Self {
        self.access = Access::Managed;
        self
    }

    pub const fn trimmed(mut self) -> Self {
        self.coercion = Coercion::Trim;
        self
    }

    pub const fn integer(mut self) -> Self {
        self.coercion = Coercion::Integer;
        self
    }

    pub const fn float(mut self) -> Self {
        self.coercion = Coercion::Float;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Same default on read and on create
    pub const fn default_to(mut self, value: DefaultValue) -> Self {
        self.read_default = Some(value);
        self.create_default = Some(value);
        self
    }

    pub const fn read_default(mut self, value: DefaultValue) -> Self {
        self.read_default = Some(value);
        self
    }

    pub const fn create_default(mut self, value: DefaultValue) -> Self {
        self.create_default = Some(value);
        self
    }

    pub const fn mirrored_to(mut self, column: &'static str) -> Self {
        self.mirror = Some(column);
        self
    }

    /// Lookup column with its denormalized name column; ids are integers and
    /// default to null on create
    pub const fn lookup(
        mut self,
        name_ui: &'static str,
        name_column: &'static str,
        name_default: Option<DefaultValue>,
    ) -> Self {
        self.coercion = Coercion::Integer;
        self.create_default = Some(DefaultValue::Null);
        self.lookup = Some(LookupName {
            ui: name_ui,
            column: name_column,
            default: name_default,
        });
        self
    }
}

/// What a UI field name refers to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldTarget<'a> {
    Field(&'a FieldSpec),
    LookupName(&'a FieldSpec, &'a LookupName),
}

/// Field table for one store table
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Store table name (e.g., "activity_c")
    pub table: &'static str,
    /// Singular display name used in log lines and notifications
    pub entity: &'static str,
    /// Plural lower-case name (e.g., "activities")
    pub collection: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Every column to request on a full fetch, in declaration order
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        let mut push = |column: &'static str| {
            if !columns.contains(&column) {
                columns.push(column);
            }
        };

        for spec in self.fields {
            push(spec.column);
            if let Some(mirror) = spec.mirror {
                push(mirror);
            }
            if let Some(lookup) = &spec.lookup {
                push(lookup.column);
            }
        }
        columns
    }

    /// Resolve a UI field name
    pub fn resolve(&self, ui: &str) -> Option<FieldTarget<'static>> {
        let fields: &'static [FieldSpec] = self.fields;
        fields.iter().find_map(|spec| {
            if spec.ui == ui {
                return Some(FieldTarget::Field(spec));
            }
            match &spec.lookup {
                Some(lookup) if lookup.ui == ui => Some(FieldTarget::LookupName(spec, lookup)),
                _ => None,
            }
        })
    }

    /// Column behind a UI field name
    pub fn column(&self, ui: &str) -> Option<&'static str> {
        self.resolve(ui).map(|target| match target {
            FieldTarget::Field(spec) => spec.column,
            FieldTarget::LookupName(_, lookup) => lookup.column,
        })
    }
}
