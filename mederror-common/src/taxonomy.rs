//! Error taxonomy: category → type → description
//!
//! Loaded from a user-supplied YAML document shaped as
//!
//! ```yaml
//! Medication:
//!   Wrong dose: Dose differs from the prescribed amount
//!   Wrong drug: Drug name mismatched
//! Diagnosis:
//!   Missed finding: A documented finding was not captured
//! ```
//!
//! Categories and types keep their file order so the UI lists them the way
//! the author wrote them. The taxonomy is read-only once built; reloading
//! replaces it wholesale.

use serde::Serialize;
use serde_yaml::Value;

use crate::{Error, Result};

/// One error type inside a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorType {
    pub name: String,
    pub description: String,
}

/// One top-level category and its types, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub types: Vec<ErrorType>,
}

impl Category {
    /// Look up a type by name within this category
    pub fn get(&self, type_name: &str) -> Option<&ErrorType> {
        self.types.iter().find(|t| t.name == type_name)
    }
}

/// A flattened `(category, type, description)` entry for editor dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeOption {
    pub category: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
}

/// Hierarchical category definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Parse a taxonomy from YAML text.
    ///
    /// All-or-nothing: any syntax error or shape mismatch yields
    /// [`Error::Parse`] and no partial taxonomy.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        let root = untag(&root);

        let mapping = match root {
            Value::Mapping(m) => m,
            Value::Null => {
                return Err(Error::Parse("taxonomy document is empty".to_string()));
            }
            other => {
                return Err(Error::Parse(format!(
                    "taxonomy root must be a mapping of categories, found {}",
                    kind_of(other)
                )));
            }
        };

        let mut categories = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = scalar_to_string(key).ok_or_else(|| {
                Error::Parse(format!("category name must be a scalar, found {}", kind_of(key)))
            })?;

            let types = match untag(value) {
                // `Category:` with nothing under it
                Value::Null => Vec::new(),
                Value::Mapping(entries) => {
                    let mut types = Vec::with_capacity(entries.len());
                    for (type_key, description) in entries {
                        let type_name = scalar_to_string(type_key).ok_or_else(|| {
                            Error::Parse(format!(
                                "type name in category '{}' must be a scalar, found {}",
                                name,
                                kind_of(type_key)
                            ))
                        })?;
                        let description = match untag(description) {
                            Value::Null => String::new(),
                            other => scalar_to_string(other).ok_or_else(|| {
                                Error::Parse(format!(
                                    "description of '{}: {}' must be text, found {}",
                                    name,
                                    type_name,
                                    kind_of(other)
                                ))
                            })?,
                        };
                        if types.iter().any(|t: &ErrorType| t.name == type_name) {
                            return Err(Error::Parse(format!(
                                "type '{}' appears twice in category '{}'",
                                type_name, name
                            )));
                        }
                        types.push(ErrorType {
                            name: type_name,
                            description,
                        });
                    }
                    types
                }
                other => {
                    return Err(Error::Parse(format!(
                        "category '{}' must map type names to descriptions, found {}",
                        name,
                        kind_of(other)
                    )));
                }
            };

            if categories.iter().any(|c: &Category| c.name == name) {
                return Err(Error::Parse(format!("category '{}' appears twice", name)));
            }
            categories.push(Category { name, types });
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Types of one category, empty if the category is unknown
    pub fn types(&self, category: &str) -> &[ErrorType] {
        self.category(category)
            .map(|c| c.types.as_slice())
            .unwrap_or(&[])
    }

    pub fn description(&self, category: &str, type_name: &str) -> Option<&str> {
        self.category(category)
            .and_then(|c| c.get(type_name))
            .map(|t| t.description.as_str())
    }

    /// Category that owns `type_name`.
    ///
    /// Type names are only unique within a category; when several categories
    /// contain the same name the first one in file order wins.
    pub fn owning_category(&self, type_name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.get(type_name).is_some())
            .map(|c| c.name.as_str())
    }

    pub fn contains_type(&self, type_name: &str) -> bool {
        self.owning_category(type_name).is_some()
    }

    /// Every distinct type name under its owning category, in file order.
    ///
    /// A name repeated in a later category is left out: picking it there
    /// would store the first category anyway.
    pub fn type_options(&self) -> Vec<TypeOption> {
        let mut options: Vec<TypeOption> = Vec::with_capacity(self.type_count());
        for category in &self.categories {
            for t in &category.types {
                if options.iter().any(|o| o.type_name == t.name) {
                    continue;
                }
                options.push(TypeOption {
                    category: category.name.clone(),
                    type_name: t.name.clone(),
                    description: t.description.clone(),
                });
            }
        }
        options
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn type_count(&self) -> usize {
        self.categories.iter().map(|c| c.types.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
