use thiserror::Error;

use crate::parameters;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidParameter { name: String, value: String },

    #[error("Quaternion with norm {norm} cannot be normalized")]
    DegenerateQuaternion { norm: f64 },

    #[error("State field '{field}' contains non finite values")]
    NonFiniteState { field: &'static str },

    #[error(transparent)]
    Parameters(#[from] parameters::Error),
}

impl Error {
    pub(crate) fn invalid_param(name: &str, value: impl ToString) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
