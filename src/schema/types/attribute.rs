//! Search-time attribute descriptors.
//!
//! An attribute is the in-memory, per-document storage representation
//! derived from a field's declared value type. The derivation is a closed
//! mapping; value types with no attribute representation are rejected.

use serde::{Deserialize, Serialize};

use super::errors::SchemaError;
use super::value_type::{TensorSpec, ValueType};

/// Scalar storage type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Predicate,
    Tensor,
    Reference,
}

/// Collection shape of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionType {
    #[default]
    Single,
    Array,
    WeightedSet,
}

/// One attribute of a field.
///
/// The performance flags default to off and may be flipped by later
/// pipeline stages; the descriptor itself is fixed at derivation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub attribute_type: AttributeType,
    pub collection: CollectionType,
    /// Weighted-set entries whose weight reaches zero are dropped
    pub remove_if_zero: bool,
    /// Updates to absent weighted-set keys create the entry
    pub create_if_nonexistent: bool,
    pub tensor_spec: Option<TensorSpec>,
    pub reference_target: Option<String>,
    pub fast_search: bool,
    pub fast_access: bool,
    pub paged: bool,
    pub mutable: bool,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            collection: CollectionType::Single,
            remove_if_zero: false,
            create_if_nonexistent: false,
            tensor_spec: None,
            reference_target: None,
            fast_search: false,
            fast_access: false,
            paged: false,
            mutable: false,
        }
    }

    pub fn with_collection(mut self, collection: CollectionType) -> Self {
        self.collection = collection;
        self
    }

    /// Derives the attribute descriptor for a field of the given value type.
    ///
    /// Collections recurse into the element type for the scalar type and
    /// take the collection shape from the outer wrapper; weighted sets copy
    /// their update flags at construction.
    ///
    /// # Errors
    /// Returns `SchemaError::UnsupportedAttributeType` for value types with
    /// no attribute representation (structs, maps, and collections of them).
    pub fn derive(name: &str, value_type: &ValueType) -> Result<Self, SchemaError> {
        let unsupported = || SchemaError::UnsupportedAttributeType {
            field: name.to_string(),
            value_type: value_type.to_string(),
        };
        match value_type {
            ValueType::Array(element) => {
                let mut attribute = Self::derive(name, element)?;
                if attribute.collection != CollectionType::Single {
                    return Err(unsupported());
                }
                attribute.collection = CollectionType::Array;
                Ok(attribute)
            }
            ValueType::WeightedSet {
                element,
                remove_if_zero,
                create_if_nonexistent,
            } => {
                let mut attribute = Self::derive(name, element)?;
                if attribute.collection != CollectionType::Single {
                    return Err(unsupported());
                }
                attribute.collection = CollectionType::WeightedSet;
                attribute.remove_if_zero = *remove_if_zero;
                attribute.create_if_nonexistent = *create_if_nonexistent;
                Ok(attribute)
            }
            ValueType::Byte | ValueType::Raw => Ok(Self::new(name, AttributeType::Byte)),
            ValueType::Int => Ok(Self::new(name, AttributeType::Integer)),
            ValueType::Long => Ok(Self::new(name, AttributeType::Long)),
            ValueType::Float => Ok(Self::new(name, AttributeType::Float)),
            ValueType::Double => Ok(Self::new(name, AttributeType::Double)),
            ValueType::String => Ok(Self::new(name, AttributeType::String)),
            ValueType::Predicate => Ok(Self::new(name, AttributeType::Predicate)),
            ValueType::Tensor(spec) => {
                let mut attribute = Self::new(name, AttributeType::Tensor);
                attribute.tensor_spec = Some(spec.clone());
                Ok(attribute)
            }
            ValueType::Reference(target) => {
                let mut attribute = Self::new(name, AttributeType::Reference);
                attribute.reference_target = Some(target.clone());
                Ok(attribute)
            }
            ValueType::Struct(_) | ValueType::Map { .. } => Err(unsupported()),
        }
    }

    /// Whether two descriptors describe the same stored entity.
    ///
    /// The name is excluded: two differently named attributes with equal
    /// type, collection, and knobs are the same entity.
    pub fn is_compatible_with(&self, other: &Attribute) -> bool {
        self.attribute_type == other.attribute_type
            && self.collection == other.collection
            && self.remove_if_zero == other.remove_if_zero
            && self.create_if_nonexistent == other.create_if_nonexistent
            && self.tensor_spec == other.tensor_spec
            && self.reference_target == other.reference_target
            && self.fast_search == other.fast_search
            && self.fast_access == other.fast_access
            && self.paged == other.paged
            && self.mutable == other.mutable
    }
}
