// Strongly-typed IR for Flow declarations. No schema types and no text here.

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    String,
    Number,
    Boolean,
    Mixed,                   // the unconstrained type
    Literals(Vec<String>),   // already-encoded literal texts, schema order
    List(Box<Ty>),
    Tuple(Vec<Ty>),          // exact arity
    Ref(String),             // another declaration, by name
    Wrapped {
        wrapper: Wrapper,
        inner: Box<Ty>,
    },
    Expression,              // untyped expression array
    Object(Object),
}

/// Generic value wrappers declared in the preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    /// literal, camera function, or expression
    PropertyValue,
    /// additionally source and composite functions
    DataDrivenPropertyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub fields: Vec<Field>,  // declared order
    pub exact: bool,         // false iff an indexer is present (or forced open)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: FieldKey,
    pub ty: Ty,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    Named(String),
    Indexer,                 // any string key
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Object { name: String, object: Object },
    Alias { name: String, ty: Ty },
    Union { name: String, members: Vec<String> },
}

impl Wrapper {
    pub fn name(self) -> &'static str {
        match self {
            Wrapper::PropertyValue => "PropertyValueSpecification",
            Wrapper::DataDrivenPropertyValue => "DataDrivenPropertyValueSpecification",
        }
    }
}

impl Object {
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| matches!(&f.key, FieldKey::Named(k) if k == key))
    }

    pub fn indexer(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == FieldKey::Indexer)
    }
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Object { name, .. } | Decl::Alias { name, .. } | Decl::Union { name, .. } => name,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Decl::Object { object, .. } => Some(object),
            _ => None,
        }
    }
}
