use crate::Thermodynamics::DBhandlers::thermo_api::ThermoError;
use thiserror::Error;

/// error kinds of the reaction-rate engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KinError {
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("LawName = {0} exists as a built-in law. Changing a built-in law is prohibited.")]
    ProtectedKey(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ThermoError> for KinError {
    fn from(err: ThermoError) -> Self {
        match err {
            ThermoError::NoCoefficientsFound { .. } | ThermoError::SubstanceNotFound(_) => {
                KinError::NotFound(err.to_string())
            }
            ThermoError::InvalidTemperatureRange(_) | ThermoError::SerdeError(_) => {
                KinError::InvalidParameter(err.to_string())
            }
        }
    }
}

/// formats a value the way the validity messages print it: `label = value: what is prohibited.`
pub(crate) fn prohibited(label: &str, value: f64, what: &str) -> String {
    format!("{} = {:18.16e}: {} is prohibited.", label, value, what)
}
