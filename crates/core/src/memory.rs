//! Owned in-memory tree implementing the capability traits
//!
//! `MemoryNode` is the reference backend: tests build trees with the
//! builder methods, the store writer packs them onto disk, and fault
//! injection hooks simulate every way a real store can fail partway:
//! - a value that cannot be read ([`MemoryValue::unavailable`])
//! - a child that enumerates but does not resolve
//!   ([`MemoryNode::with_unavailable_child`])
//! - a property or child listing that fails after N items
//!   ([`MemoryNode::cut_properties_after`], [`MemoryNode::cut_children_after`])

use crate::fragment::{FragmentId, FragmentUnavailable, ReadResult};
use crate::source::{NameIter, NodeSource, PropertyIter, PropertySource};
use crate::types::{TypeTag, ValueKind};
use std::io::{Cursor, Read};
use std::iter;

/// One value slot of an in-memory property.
#[derive(Debug, Clone)]
pub enum MemoryValue {
    /// A string-renderable value, already in its final string form.
    Text(String),
    /// A binary value held as owned bytes.
    Bytes(Vec<u8>),
    /// A value whose backing fragment cannot be read.
    Unavailable(FragmentId),
}

impl MemoryValue {
    /// A string-renderable value.
    pub fn text(value: impl Into<String>) -> Self {
        MemoryValue::Text(value.into())
    }

    /// A binary value.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        MemoryValue::Bytes(value.into())
    }

    /// A value that fails to read, reporting the given fragment.
    pub fn unavailable(fragment: impl Into<FragmentId>) -> Self {
        MemoryValue::Unavailable(fragment.into())
    }
}

/// An in-memory property: a name, a tag, and its value slots.
#[derive(Debug, Clone)]
pub struct MemoryProperty {
    name: String,
    tag: TypeTag,
    values: Vec<MemoryValue>,
}

impl MemoryProperty {
    /// A scalar property holding exactly one value.
    pub fn scalar(name: impl Into<String>, kind: ValueKind, value: MemoryValue) -> Self {
        MemoryProperty {
            name: name.into(),
            tag: TypeTag::scalar(kind),
            values: vec![value],
        }
    }

    /// An array property holding the given values in order.
    pub fn array(
        name: impl Into<String>,
        kind: ValueKind,
        values: impl IntoIterator<Item = MemoryValue>,
    ) -> Self {
        MemoryProperty {
            name: name.into(),
            tag: TypeTag::array(kind),
            values: values.into_iter().collect(),
        }
    }
}

impl PropertySource for MemoryProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_tag(&self) -> TypeTag {
        self.tag
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn text(&self, index: usize) -> ReadResult<String> {
        match &self.values[index] {
            MemoryValue::Text(value) => Ok(value.clone()),
            MemoryValue::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            MemoryValue::Unavailable(fragment) => Err(FragmentUnavailable::new(fragment.clone())),
        }
    }

    fn binary(&self, index: usize) -> ReadResult<Box<dyn Read + '_>> {
        match &self.values[index] {
            MemoryValue::Text(value) => Ok(Box::new(Cursor::new(value.clone().into_bytes()))),
            MemoryValue::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            MemoryValue::Unavailable(fragment) => Err(FragmentUnavailable::new(fragment.clone())),
        }
    }
}

#[derive(Debug, Clone)]
enum ChildSlot {
    Node(MemoryNode),
    Unavailable(FragmentId),
}

#[derive(Debug, Clone)]
struct Cut {
    after: usize,
    fragment: FragmentId,
}

impl Cut {
    fn fail(&self) -> FragmentUnavailable {
        FragmentUnavailable::new(self.fragment.clone())
    }
}

/// An owned in-memory node.
///
/// Properties and children keep insertion order, which is the store order
/// observed by consumers.
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    properties: Vec<MemoryProperty>,
    children: Vec<(String, ChildSlot)>,
    property_cut: Option<Cut>,
    child_cut: Option<Cut>,
}

impl MemoryNode {
    /// An empty node.
    pub fn new() -> Self {
        MemoryNode::default()
    }

    /// Add a property.
    pub fn with_property(mut self, property: MemoryProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a scalar STRING property.
    pub fn with_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_property(MemoryProperty::scalar(
            name,
            ValueKind::String,
            MemoryValue::text(value),
        ))
    }

    /// Add a STRINGS array property.
    pub fn with_strings<I, S>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_property(MemoryProperty::array(
            name,
            ValueKind::String,
            values.into_iter().map(MemoryValue::text),
        ))
    }

    /// Add a scalar LONG property.
    pub fn with_long(self, name: impl Into<String>, value: i64) -> Self {
        self.with_property(MemoryProperty::scalar(
            name,
            ValueKind::Long,
            MemoryValue::text(value.to_string()),
        ))
    }

    /// Add a LONGS array property.
    pub fn with_longs(self, name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        self.with_property(MemoryProperty::array(
            name,
            ValueKind::Long,
            values.into_iter().map(|v| MemoryValue::text(v.to_string())),
        ))
    }

    /// Add a scalar DOUBLE property.
    pub fn with_double(self, name: impl Into<String>, value: f64) -> Self {
        self.with_property(MemoryProperty::scalar(
            name,
            ValueKind::Double,
            MemoryValue::text(value.to_string()),
        ))
    }

    /// Add a scalar BOOLEAN property.
    pub fn with_boolean(self, name: impl Into<String>, value: bool) -> Self {
        self.with_property(MemoryProperty::scalar(
            name,
            ValueKind::Boolean,
            MemoryValue::text(value.to_string()),
        ))
    }

    /// Add a scalar BINARY property.
    pub fn with_binary(self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.with_property(MemoryProperty::scalar(
            name,
            ValueKind::Binary,
            MemoryValue::bytes(value),
        ))
    }

    /// Add a child node.
    pub fn with_child(mut self, name: impl Into<String>, child: MemoryNode) -> Self {
        self.children.push((name.into(), ChildSlot::Node(child)));
        self
    }

    /// Add a child that enumerates but fails to resolve.
    pub fn with_unavailable_child(
        mut self,
        name: impl Into<String>,
        fragment: impl Into<FragmentId>,
    ) -> Self {
        self.children
            .push((name.into(), ChildSlot::Unavailable(fragment.into())));
        self
    }

    /// Make the property listing fail after yielding `after` items.
    pub fn cut_properties_after(mut self, after: usize, fragment: impl Into<FragmentId>) -> Self {
        self.property_cut = Some(Cut {
            after,
            fragment: fragment.into(),
        });
        self
    }

    /// Make the child-name listing fail after yielding `after` items.
    pub fn cut_children_after(mut self, after: usize, fragment: impl Into<FragmentId>) -> Self {
        self.child_cut = Some(Cut {
            after,
            fragment: fragment.into(),
        });
        self
    }
}

impl NodeSource for MemoryNode {
    fn properties(&self) -> PropertyIter<'_> {
        let items = self
            .properties
            .iter()
            .map(|property| Ok(Box::new(property) as Box<dyn PropertySource + '_>));
        match &self.property_cut {
            Some(cut) => Box::new(items.take(cut.after).chain(iter::once(Err(cut.fail())))),
            None => Box::new(items),
        }
    }

    fn child_names(&self) -> NameIter<'_> {
        let names = self.children.iter().map(|(name, _)| Ok(name.clone()));
        match &self.child_cut {
            Some(cut) => Box::new(names.take(cut.after).chain(iter::once(Err(cut.fail())))),
            None => Box::new(names),
        }
    }

    fn child(&self, name: &str) -> ReadResult<Box<dyn NodeSource + '_>> {
        match self.children.iter().find(|(n, _)| n == name) {
            Some((_, ChildSlot::Node(node))) => Ok(Box::new(node)),
            Some((_, ChildSlot::Unavailable(fragment))) => {
                Err(FragmentUnavailable::new(fragment.clone()))
            }
            None => Err(FragmentUnavailable::new(format!("child/{name}"))),
        }
    }
}
