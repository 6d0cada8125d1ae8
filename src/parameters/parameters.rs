//! Typed parameter tree loaded from TOML.
//!
//! Every leaf is an inline table carrying its value and type tag:
//!
//! ```toml
//! [quadcopter]
//! mass = { val = 2.5, type = "float" }
//! inertia = { val = [0.0023, 0.0023, 0.004], type = "float[]" }
//! ```
//!
//! Any other table is a node. Paths are dot separated, relative to the map
//! they are looked up from.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Error deserializing parameters")]
    Deserialize(#[from] toml::de::Error),

    #[error("Cannot read parameter file '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Parameter toml does not have the right structure (error in '{0}')")]
    BadToml(String),

    #[error("Element '{path}' not found")]
    NotFound { path: String },

    #[error("Cannot cast parameter '{path}' to {dtype}")]
    BadCast { path: String, dtype: String },

    #[error("Element '{path}' is not a parameter")]
    NotAParameter { path: String },

    #[error("Element '{path}' is not a map")]
    NotAMap { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ParameterValue {
    #[serde(rename = "float")]
    Float { val: f64 },
    #[serde(rename = "float[]")]
    FloatArray { val: Vec<f64> },
}

impl ParameterValue {
    fn dtype(&self) -> &'static str {
        match self {
            ParameterValue::Float { .. } => "float",
            ParameterValue::FloatArray { .. } => "float[]",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    path: String,
    value: ParameterValue,
}

impl Parameter {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn bad_cast(&self, dtype: &str) -> Error {
        Error::BadCast {
            path: self.path.clone(),
            dtype: dtype.to_string(),
        }
    }

    pub fn value_float(&self) -> Result<f64, Error> {
        if let ParameterValue::Float { val } = self.value {
            Ok(val)
        } else {
            Err(self.bad_cast("float"))
        }
    }

    pub fn value_float_arr(&self) -> Result<&[f64], Error> {
        if let ParameterValue::FloatArray { val } = &self.value {
            Ok(val)
        } else {
            Err(self.bad_cast("float[]"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterMap {
    path: String,
    map: BTreeMap<String, ParameterTree>,
}

impl ParameterMap {
    pub fn get(&self, rel_path: &str) -> Result<&ParameterTree, Error> {
        let not_found = || Error::NotFound {
            path: append_path(&self.path, rel_path),
        };

        let mut parts = rel_path.split('.');
        // split always yields at least one element
        let first = parts.next().unwrap_or_default();
        let mut elem = self.map.get(first).ok_or_else(not_found)?;

        for part in parts {
            match elem {
                ParameterTree::Node(n) => {
                    elem = n.map.get(part).ok_or_else(not_found)?;
                }
                ParameterTree::Leaf(_) => return Err(not_found()),
            }
        }

        Ok(elem)
    }

    pub fn get_param(&self, rel_path: &str) -> Result<&Parameter, Error> {
        self.get(rel_path)?.as_param()
    }

    /// Like [`ParameterMap::get_param`], but a missing element is `Ok(None)`.
    pub fn get_param_opt(&self, rel_path: &str) -> Result<Option<&Parameter>, Error> {
        match self.get(rel_path) {
            Ok(tree) => tree.as_param().map(Some),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_map(&self, rel_path: &str) -> Result<&ParameterMap, Error> {
        self.get(rel_path)?.as_map()
    }

    pub fn get_map_opt(&self, rel_path: &str) -> Result<Option<&ParameterMap>, Error> {
        match self.get(rel_path) {
            Ok(tree) => tree.as_map().map(Some),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterTree {
    Node(ParameterMap),
    Leaf(Parameter),
}

impl ParameterTree {
    fn as_param(&self) -> Result<&Parameter, Error> {
        match self {
            Self::Leaf(p) => Ok(p),
            Self::Node(m) => Err(Error::NotAParameter {
                path: m.path.clone(),
            }),
        }
    }

    fn as_map(&self) -> Result<&ParameterMap, Error> {
        match self {
            Self::Node(m) => Ok(m),
            Self::Leaf(p) => Err(Error::NotAMap {
                path: p.path.clone(),
            }),
        }
    }
}

pub fn parse_file(path: &Path) -> Result<ParameterMap, Error> {
    let toml_str = fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    parse_string(&toml_str)
}

pub fn parse_string(toml_str: &str) -> Result<ParameterMap, Error> {
    let table = toml::from_str::<Table>(toml_str)?;

    parse_table(table)
}

pub fn parse_table(table: Table) -> Result<ParameterMap, Error> {
    parse_table_recursive(table, String::new())
}

fn parse_table_recursive(table: Table, root: String) -> Result<ParameterMap, Error> {
    let mut nodes = BTreeMap::new();

    for (key, val) in table.into_iter() {
        let path = append_path(root.as_str(), key.as_str());
        match val {
            Value::Table(val) => {
                if val.contains_key("type") {
                    let value = val
                        .try_into::<ParameterValue>()
                        .map_err(|_| Error::BadToml(path.clone()))?;
                    nodes.insert(key, ParameterTree::Leaf(Parameter { path, value }));
                } else {
                    nodes.insert(key, ParameterTree::Node(parse_table_recursive(val, path)?));
                }
            }
            _ => {
                return Err(Error::BadToml(path));
            }
        }
    }

    Ok(ParameterMap {
        path: root,
        map: nodes,
    })
}

fn append_path(root: &str, key: &str) -> String {
    format!("{root}.{key}")
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.path, self.value.dtype())
    }
}
