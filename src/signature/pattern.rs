//! Type names, unions and positional patterns.

use std::fmt;

use crate::error::SignatureError;

use super::value::Value;

/// A reflected type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Undefined,
    Null,
    Function,
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
    Regex,
    /// Wildcard, matches every tag.
    Any,
}

impl TypeTag {
    /// Parses a type name; `None` for names outside the recognized set.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "undefined" => TypeTag::Undefined,
            "null" => TypeTag::Null,
            "function" => TypeTag::Function,
            "string" => TypeTag::String,
            "number" => TypeTag::Number,
            "boolean" => TypeTag::Boolean,
            "date" => TypeTag::Date,
            "array" => TypeTag::Array,
            "object" => TypeTag::Object,
            "regex" => TypeTag::Regex,
            "any" => TypeTag::Any,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Undefined => "undefined",
            TypeTag::Null => "null",
            TypeTag::Function => "function",
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Regex => "regex",
            TypeTag::Any => "any",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A union of type tags (`number|string`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(Vec<TypeTag>);

impl TypeSet {
    /// A single-tag set.
    pub fn of(tag: TypeTag) -> Self {
        Self(vec![tag])
    }

    fn parse(union: &str, pattern: &str) -> Result<Self, SignatureError> {
        union
            .split('|')
            .map(str::trim)
            .map(|name| {
                TypeTag::parse(name).ok_or_else(|| SignatureError::UnknownType {
                    name: name.to_owned(),
                    pattern: pattern.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// True if the sets share a tag, or either side contains `any`.
    pub fn overlaps(&self, other: &TypeSet) -> bool {
        self.is_any() || other.is_any() || self.0.iter().any(|t| other.0.contains(t))
    }

    fn is_any(&self) -> bool {
        self.0.contains(&TypeTag::Any)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}

/// An ordered list of positions, e.g. `"number, function|object"`.
///
/// The empty string is the zero-argument pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    slots: Vec<TypeSet>,
}

impl Pattern {
    /// Parses a pattern.
    ///
    /// # Errors
    /// [`SignatureError::UnknownType`] for an unrecognized type name.
    pub fn parse(source: &str) -> Result<Self, SignatureError> {
        if source.trim().is_empty() {
            return Ok(Self { slots: Vec::new() });
        }
        let slots = source
            .split(',')
            .map(|union| TypeSet::parse(union, source))
            .collect::<Result<_, _>>()?;
        Ok(Self { slots })
    }

    /// Number of positions.
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// True if `args` has this arity and every argument fits its position.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.slots.len() == args.len()
            && self
                .slots
                .iter()
                .zip(args)
                .all(|(slot, arg)| slot.overlaps(&TypeSet::of(arg.type_tag())))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{slot}")?;
        }
        Ok(())
    }
}

/// Renders the reflected shape of `args`, e.g. `"number, function"`.
pub(crate) fn shape_of(args: &[Value]) -> String {
    args.iter()
        .map(|a| a.type_tag().as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
