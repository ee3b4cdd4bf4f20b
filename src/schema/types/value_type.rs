//! The closed set of field value types.
//!
//! Every consumer of [`ValueType`] matches exhaustively, so adding a new
//! kind cannot be silently unhandled anywhere in the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SchemaError;

/// Declared value type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueType {
    /// 8-bit integer (also the representation of raw byte content)
    Byte,
    /// Uninterpreted byte content
    Raw,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    String,
    Predicate,
    Array(Box<ValueType>),
    WeightedSet {
        element: Box<ValueType>,
        remove_if_zero: bool,
        create_if_nonexistent: bool,
    },
    Map {
        key: Box<ValueType>,
        value: Box<ValueType>,
    },
    /// Named struct type, resolved against the declaring scope
    Struct(String),
    Tensor(TensorSpec),
    /// Reference to another document type
    Reference(String),
}

/// Cell type of a tensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorCellType {
    Float,
    Double,
    Int8,
    BFloat16,
}

/// One named tensor dimension. `size` is `Some` for indexed dimensions
/// (`x[10]`) and `None` for mapped dimensions (`x{}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorDimension {
    pub name: String,
    pub size: Option<usize>,
}

/// Shape of a tensor value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    pub cell_type: TensorCellType,
    pub dimensions: Vec<TensorDimension>,
}

impl ValueType {
    /// Parses the compact textual form used by raw declarations, e.g.
    /// `"int"`, `"array<string>"`, `"map<string,long>"`,
    /// `"tensor<float>(x[10])"`, `"reference<product>"`, or a declared
    /// struct name.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidValueType` on unrecognized syntax.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let t = text.trim();
        match t {
            "byte" => return Ok(Self::Byte),
            "raw" => return Ok(Self::Raw),
            "int" => return Ok(Self::Int),
            "long" => return Ok(Self::Long),
            "float" => return Ok(Self::Float),
            "double" => return Ok(Self::Double),
            "string" => return Ok(Self::String),
            "predicate" => return Ok(Self::Predicate),
            _ => {}
        }

        if let Some(inner) = wrapped(t, "array") {
            return Ok(Self::Array(Box::new(Self::parse(inner)?)));
        }
        if let Some(inner) = wrapped(t, "weightedset") {
            return Ok(Self::WeightedSet {
                element: Box::new(Self::parse(inner)?),
                remove_if_zero: false,
                create_if_nonexistent: false,
            });
        }
        if let Some(inner) = wrapped(t, "map") {
            let (key, value) = split_top_level(inner).ok_or_else(|| invalid(
                text,
                "map takes exactly two comma-separated type parameters",
            ))?;
            return Ok(Self::Map {
                key: Box::new(Self::parse(key)?),
                value: Box::new(Self::parse(value)?),
            });
        }
        if let Some(inner) = wrapped(t, "reference") {
            let target = inner.trim();
            if !is_bare_name(target) {
                return Err(invalid(text, "reference target must be a document type name"));
            }
            return Ok(Self::Reference(target.to_string()));
        }
        if t.starts_with("tensor") {
            return Ok(Self::Tensor(TensorSpec::parse(t)?));
        }
        if is_bare_name(t) {
            return Ok(Self::Struct(t.to_string()));
        }
        Err(invalid(text, "unrecognized value type syntax"))
    }

    /// Strips outer array/weighted-set wrapping down to the innermost type.
    pub fn strip_collections(&self) -> &ValueType {
        match self {
            Self::Array(element) => element.strip_collections(),
            Self::WeightedSet { element, .. } => element.strip_collections(),
            other => other,
        }
    }

    /// Whether this type decomposes into synthetic child fields.
    pub fn decomposes(&self) -> bool {
        matches!(
            self.strip_collections(),
            Self::Struct(_) | Self::Map { .. }
        )
    }

    /// Whether the type can be stored as a search-time attribute.
    pub fn attribute_capable(&self) -> bool {
        match self {
            Self::Array(element) => element.is_scalar_like(),
            Self::WeightedSet { element, .. } => element.is_scalar_like(),
            Self::Map { .. } | Self::Struct(_) => false,
            _ => true,
        }
    }

    fn is_scalar_like(&self) -> bool {
        !matches!(
            self,
            Self::Array(_) | Self::WeightedSet { .. } | Self::Map { .. } | Self::Struct(_)
        )
    }

    /// Collects the names of all document types referenced anywhere inside
    /// this type, recursing through collection and map shapes.
    pub fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            Self::Reference(target) => out.push(target.clone()),
            Self::Array(element) => element.collect_references(out),
            Self::WeightedSet { element, .. } => element.collect_references(out),
            Self::Map { key, value } => {
                key.collect_references(out);
                value.collect_references(out);
            }
            _ => {}
        }
    }
}

impl TensorSpec {
    /// Parses `tensor<cell>(dim,...)`; the cell type defaults to double when
    /// omitted (`tensor(x[10])`).
    fn parse(text: &str) -> Result<Self, SchemaError> {
        let rest = text
            .strip_prefix("tensor")
            .ok_or_else(|| invalid(text, "tensor type must start with 'tensor'"))?;
        let (cell_type, dims_part) = if let Some(rest) = rest.strip_prefix('<') {
            let close = rest
                .find('>')
                .ok_or_else(|| invalid(text, "unterminated tensor cell type"))?;
            let cell = match rest[..close].trim() {
                "float" => TensorCellType::Float,
                "double" => TensorCellType::Double,
                "int8" => TensorCellType::Int8,
                "bfloat16" => TensorCellType::BFloat16,
                other => {
                    return Err(invalid(text, &format!("unknown tensor cell type '{other}'")))
                }
            };
            (cell, &rest[close + 1..])
        } else {
            (TensorCellType::Double, rest)
        };

        let dims_part = dims_part.trim();
        let inner = dims_part
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| invalid(text, "tensor dimensions must be parenthesized"))?;

        let mut dimensions = Vec::new();
        for dim in inner.split(',') {
            let dim = dim.trim();
            if let Some(name) = dim.strip_suffix("{}") {
                if !is_bare_name(name) {
                    return Err(invalid(text, &format!("bad tensor dimension '{dim}'")));
                }
                dimensions.push(TensorDimension {
                    name: name.to_string(),
                    size: None,
                });
            } else if let Some(open) = dim.find('[') {
                let name = &dim[..open];
                let size_text = dim[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| invalid(text, &format!("bad tensor dimension '{dim}'")))?;
                let size: usize = size_text.parse().map_err(|_| {
                    invalid(text, &format!("bad tensor dimension size in '{dim}'"))
                })?;
                if !is_bare_name(name) {
                    return Err(invalid(text, &format!("bad tensor dimension '{dim}'")));
                }
                dimensions.push(TensorDimension {
                    name: name.to_string(),
                    size: Some(size),
                });
            } else {
                return Err(invalid(text, &format!("bad tensor dimension '{dim}'")));
            }
        }
        if dimensions.is_empty() {
            return Err(invalid(text, "tensor needs at least one dimension"));
        }
        Ok(Self {
            cell_type,
            dimensions,
        })
    }
}

fn invalid(text: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidValueType {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

/// Returns the `T` of `name<T>`, or `None` if `text` is not that shape.
fn wrapped<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)?
        .strip_prefix('<')?
        .strip_suffix('>')
}

/// Splits `K,V` at the single top-level comma, ignoring commas nested
/// inside angle brackets or parentheses.
fn split_top_level(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                let (key, value) = text.split_at(i);
                return Some((key, &value[1..]));
            }
            _ => {}
        }
    }
    None
}

fn is_bare_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => write!(f, "byte"),
            Self::Raw => write!(f, "raw"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Predicate => write!(f, "predicate"),
            Self::Array(element) => write!(f, "array<{}>", element),
            Self::WeightedSet { element, .. } => write!(f, "weightedset<{}>", element),
            Self::Map { key, value } => write!(f, "map<{},{}>", key, value),
            Self::Struct(name) => write!(f, "{}", name),
            Self::Tensor(spec) => write!(f, "{}", spec),
            Self::Reference(target) => write!(f, "reference<{}>", target),
        }
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = match self.cell_type {
            TensorCellType::Float => "float",
            TensorCellType::Double => "double",
            TensorCellType::Int8 => "int8",
            TensorCellType::BFloat16 => "bfloat16",
        };
        write!(f, "tensor<{}>(", cell)?;
        for (i, dim) in self.dimensions.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match dim.size {
                Some(size) => write!(f, "{}[{}]", dim.name, size)?,
                None => write!(f, "{}{{}}", dim.name)?,
            }
        }
        write!(f, ")")
    }
}
