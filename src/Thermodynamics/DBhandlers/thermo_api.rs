//! Interface between the reaction-rate engine and whatever store keeps the
//! thermodynamic coefficients of species.
//!
//! The engine only ever asks one question: "give me the 7 NASA coefficients of
//! this species valid at this temperature". Anything that can answer it
//! (a parsed NASA library, a database wrapper, a closure in a test) implements
//! [`ThermoSource`].
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ThermoError {
    NoCoefficientsFound {
        species: String,
        temperature: f64,
        range: String,
    },
    SubstanceNotFound(String),
    InvalidTemperatureRange(String),
    SerdeError(String),
}

impl fmt::Display for ThermoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ThermoError::NoCoefficientsFound {
                species,
                temperature,
                range,
            } => {
                write!(
                    f,
                    "Species = \"{}\", T = {} K. No coefficients found. Valid range: {}",
                    species, temperature, range
                )
            }
            ThermoError::SubstanceNotFound(species) => {
                write!(f, "Species = \"{}\". No match in the database.", species)
            }
            ThermoError::InvalidTemperatureRange(species) => {
                write!(
                    f,
                    "Invalid temperature range in coefficient data of \"{}\"",
                    species
                )
            }
            ThermoError::SerdeError(msg) => {
                write!(f, "Failed to deserialize NASA data: {}", msg)
            }
        }
    }
}

impl Error for ThermoError {}

impl From<serde_json::Error> for ThermoError {
    fn from(err: serde_json::Error) -> Self {
        ThermoError::SerdeError(err.to_string())
    }
}

/// NASA-7 coefficients `a0..a6` of one species in one temperature range
pub type NASA7 = [f64; 7];

/// source of thermodynamic coefficients used by reversible reaction systems
pub trait ThermoSource {
    /// coefficients of `species` valid at temperature `T`
    #[allow(non_snake_case)]
    fn lookup(&self, species: &str, T: f64) -> Result<NASA7, ThermoError>;
}

impl<F> ThermoSource for F
where
    F: Fn(&str, f64) -> Result<NASA7, ThermoError>,
{
    #[allow(non_snake_case)]
    fn lookup(&self, species: &str, T: f64) -> Result<NASA7, ThermoError> {
        self(species, T)
    }
}
