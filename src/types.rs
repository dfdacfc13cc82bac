/*!
 * Core types and data structures for the Elixir compiler
 */

use std::collections::BTreeMap;

use strum::{Display, EnumString};

/// Property holding the in-game name of every instance
pub const NAME_PROPERTY: &str = "Name";

/// Property holding a script's source code
pub const SOURCE_PROPERTY: &str = "Source";

/// Property holding a script's disabled flag
pub const DISABLED_PROPERTY: &str = "Disabled";

/// Semantic kind of a property value
///
/// The `Display` form is the element tag used for the property in the
/// serialized model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ValueKind {
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "string")]
    String,
    /// Long text such as script sources, subject to chunking
    #[strum(serialize = "ProtectedString")]
    ProtectedString,
    /// Numeric asset reference
    #[strum(serialize = "Content")]
    Content,
    #[strum(serialize = "Vector2")]
    Vector2,
    #[strum(serialize = "Vector3")]
    Vector3,
    /// Position plus rotation matrix
    #[strum(serialize = "CoordinateFrame")]
    CFrame,
}

/// Two dimensional vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

/// Three dimensional vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Position and row-major 3x3 rotation matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CFrame {
    pub position: Vector3,
    pub rotation: [[f64; 3]; 3],
}

impl CFrame {
    /// Frame at `position` with no rotation
    pub fn at(position: Vector3) -> Self {
        Self {
            position,
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl Default for CFrame {
    fn default() -> Self {
        Self::at(Vector3::default())
    }
}

/// A typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    ProtectedString(String),
    /// Raw asset reference, expected to be numeric
    Content(String),
    Vector2(Vector2),
    Vector3(Vector3),
    CFrame(CFrame),
}

impl PropertyValue {
    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Int(_) => ValueKind::Int,
            PropertyValue::Double(_) => ValueKind::Double,
            PropertyValue::String(_) => ValueKind::String,
            PropertyValue::ProtectedString(_) => ValueKind::ProtectedString,
            PropertyValue::Content(_) => ValueKind::Content,
            PropertyValue::Vector2(_) => ValueKind::Vector2,
            PropertyValue::Vector3(_) => ValueKind::Vector3,
            PropertyValue::CFrame(_) => ValueKind::CFrame,
        }
    }

    /// Boolean from a loosely typed string, Lua style.
    ///
    /// Only an empty string, `false` and `nil` are falsy.
    pub fn truthy(raw: &str) -> Self {
        let raw = raw.trim();
        let falsy = raw.is_empty()
            || raw.eq_ignore_ascii_case("false")
            || raw.eq_ignore_ascii_case("nil");
        PropertyValue::Bool(!falsy)
    }

    /// Text content, if this is a text kind
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::ProtectedString(s) => Some(s),
            _ => None,
        }
    }
}

/// One element of the compiled model
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Class name (type tag) of the instance
    pub class_name: String,
    /// Properties ordered by name
    pub properties: BTreeMap<String, PropertyValue>,
    /// Child instances in traversal order
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node of `class_name` called `name`.
    ///
    /// An empty name falls back to the class name, the same default the
    /// host application uses for fresh instances.
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let mut name = name.into();
        if name.is_empty() {
            name = class_name.clone();
        }

        let mut properties = BTreeMap::new();
        properties.insert(NAME_PROPERTY.to_string(), PropertyValue::String(name));

        Self {
            class_name,
            properties,
            children: Vec::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.set_property(name, value);
        self
    }

    /// Set a property, replacing any previous value
    ///
    /// An empty `Name` is ignored so the node keeps a usable name.
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        if name == NAME_PROPERTY && value.as_text().map_or(true, str::is_empty) {
            return;
        }
        self.properties.insert(name, value);
    }

    /// Get a property value
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// The node's name
    pub fn name(&self) -> &str {
        self.properties
            .get(NAME_PROPERTY)
            .and_then(PropertyValue::as_text)
            .unwrap_or(&self.class_name)
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}
