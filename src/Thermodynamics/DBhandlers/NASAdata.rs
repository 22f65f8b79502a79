use super::thermo_api::{NASA7, ThermoError, ThermoSource};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// dimensionless heat capacity Cp/R
pub fn Cp_over_R(a: &NASA7, t: f64) -> f64 {
    a[0] + a[1] * t + a[2] * t.powi(2) + a[3] * t.powi(3) + a[4] * t.powi(4)
}
/// dimensionless enthalpy H/RT
pub fn H_over_RT(a: &NASA7, t: f64) -> f64 {
    a[0] + a[1] * t / 2.0
        + a[2] * t.powi(2) / 3.0
        + a[3] * t.powi(3) / 4.0
        + a[4] * t.powi(4) / 5.0
        + a[5] / t
}
/// dimensionless entropy S/R
pub fn S_over_R(a: &NASA7, t: f64) -> f64 {
    a[0] * t.ln()
        + a[1] * t
        + a[2] * t.powi(2) / 2.0
        + a[3] * t.powi(3) / 3.0
        + a[4] * t.powi(4) / 4.0
        + a[6]
}

/// raw record of one species as it is stored in a NASA library
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NASAinput {
    /// temperature bounds followed by the 7 coefficients of every range:
    /// `[T1, T2, a0..a6]`, `[T1, T2, T3, a0..a6, a0..a6]` or `[T1, T2, T3, T4, 3 x a0..a6]`
    pub Cp: Vec<f64>,
    #[serde(default)]
    pub model: Option<String>,
}

/// NASA-7 data of one species
#[derive(Debug, Clone, PartialEq)]
pub struct NASAdata {
    pub name: String,
    pub input: NASAinput,
    /// coefficients selected by the last `extract_coefficients` call
    pub coeffs: NASA7,
}

impl NASAdata {
    pub fn new(name: &str, Cp: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            input: NASAinput { Cp, model: None },
            coeffs: [0.0; 7],
        }
    }
    /// takes serde Value and parse it into structure
    pub fn from_serde(name: &str, serde: Value) -> Result<Self, ThermoError> {
        let input: NASAinput = serde_json::from_value(serde)?;
        Ok(Self {
            name: name.to_string(),
            input,
            coeffs: [0.0; 7],
        })
    }

    fn extract_coefficients_(name: &str, c_data: &[f64], t: f64) -> Result<NASA7, ThermoError> {
        let get_range_str = |temps: &[f64]| {
            temps
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" - ")
        };
        let take = |start: usize| -> NASA7 {
            let mut a = [0.0; 7];
            a.copy_from_slice(&c_data[start..start + 7]);
            a
        };
        let not_found = |temps: &[f64]| ThermoError::NoCoefficientsFound {
            species: name.to_string(),
            temperature: t,
            range: get_range_str(temps),
        };

        match c_data.len() {
            25 => {
                let (t1, t2, t3, t4) = (c_data[0], c_data[1], c_data[2], c_data[3]);
                if t1 <= t && t <= t2 {
                    Ok(take(4))
                } else if t2 < t && t <= t3 {
                    Ok(take(11))
                } else if t3 < t && t <= t4 {
                    Ok(take(18))
                } else {
                    Err(not_found(&[t1, t2, t3, t4]))
                }
            }
            17 => {
                let (t1, t2, t3) = (c_data[0], c_data[1], c_data[2]);
                if t1 <= t && t <= t2 {
                    Ok(take(3))
                } else if t2 < t && t <= t3 {
                    Ok(take(10))
                } else {
                    Err(not_found(&[t1, t2, t3]))
                }
            }
            9 => {
                let (t1, t2) = (c_data[0], c_data[1]);
                if t1 <= t && t <= t2 {
                    Ok(take(2))
                } else {
                    Err(not_found(&[t1, t2]))
                }
            }
            _ => Err(ThermoError::InvalidTemperatureRange(name.to_string())),
        }
    }
    /// get the 7 constants of NASA7 format for concrete temperature
    pub fn extract_coefficients(&mut self, t: f64) -> Result<NASA7, ThermoError> {
        let a = Self::extract_coefficients_(&self.name, &self.input.Cp, t)?;
        self.coeffs = a;
        Ok(a)
    }
    /// Cp/R, H/RT and S/R at temperature t
    pub fn calculate_Cp_dH_dS(&self, t: f64) -> Result<(f64, f64, f64), ThermoError> {
        let a = Self::extract_coefficients_(&self.name, &self.input.Cp, t)?;
        Ok((Cp_over_R(&a, t), H_over_RT(&a, t), S_over_R(&a, t)))
    }
}

/// library of NASA-7 records keyed by species name
#[derive(Debug, Clone, Default)]
pub struct NASAbase {
    pub substances: HashMap<String, NASAdata>,
}

impl NASAbase {
    pub fn new() -> Self {
        Self {
            substances: HashMap::new(),
        }
    }
    /// parses `{ "H2": {"Cp": [...]}, "O2": {...} }`
    pub fn from_serde(serde: Value) -> Result<Self, ThermoError> {
        let map = match serde {
            Value::Object(map) => map,
            other => {
                return Err(ThermoError::SerdeError(format!(
                    "expected an object of species records, got {}",
                    other
                )));
            }
        };
        let mut base = Self::new();
        for (name, record) in map {
            let data = NASAdata::from_serde(&name, record)?;
            base.substances.insert(name, data);
        }
        info!("NASA base with {} species loaded", base.substances.len());
        Ok(base)
    }
    pub fn insert(&mut self, data: NASAdata) {
        self.substances.insert(data.name.clone(), data);
    }
    pub fn contains(&self, species: &str) -> bool {
        self.substances.contains_key(species)
    }
}

impl ThermoSource for NASAbase {
    fn lookup(&self, species: &str, T: f64) -> Result<NASA7, ThermoError> {
        let data = self
            .substances
            .get(species)
            .ok_or_else(|| ThermoError::SubstanceNotFound(species.to_string()))?;
        debug!("NASA lookup: {} at {} K", species, T);
        NASAdata::extract_coefficients_(&data.name, &data.input.Cp, T)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_extract_coefficients() {
        let mut nasa_data =
            NASAdata::new("X", vec![300.0, 1000.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        assert!(nasa_data.extract_coefficients(500.0).is_ok());
        assert_eq!(nasa_data.coeffs, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        // bounds are inclusive
        assert!(nasa_data.extract_coefficients(300.0).is_ok());
        assert!(nasa_data.extract_coefficients(1000.0).is_ok());
    }

    #[test]
    fn test_extract_coefficients_two_ranges() {
        let mut cp = vec![200.0, 1000.0, 3500.0];
        cp.extend([1.0; 7]);
        cp.extend([2.0; 7]);
        let mut nasa_data = NASAdata::new("X", cp);
        assert_eq!(nasa_data.extract_coefficients(500.0).unwrap(), [1.0; 7]);
        assert_eq!(nasa_data.extract_coefficients(1000.0).unwrap(), [1.0; 7]);
        assert_eq!(nasa_data.extract_coefficients(1500.0).unwrap(), [2.0; 7]);
    }

    #[test]
    fn test_extract_coefficients_out_of_range() {
        let mut nasa_data =
            NASAdata::new("X", vec![300.0, 1000.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let result = nasa_data.extract_coefficients(1500.0);
        assert!(matches!(
            result,
            Err(ThermoError::NoCoefficientsFound {
                temperature: 1500.0,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_layout() {
        let mut nasa_data = NASAdata::new("X", vec![300.0, 1000.0, 1.0]);
        assert_eq!(
            nasa_data.extract_coefficients(500.0),
            Err(ThermoError::InvalidTemperatureRange("X".to_string()))
        );
    }

    #[test]
    fn test_dimensionless_properties() {
        // a0 only: Cp/R = a0, H/RT = a0, S/R = a0 ln T
        let nasa_data = NASAdata::new("X", vec![100.0, 5000.0, 3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let (cp, h, s) = nasa_data.calculate_Cp_dH_dS(400.0).unwrap();
        assert_relative_eq!(cp, 3.5, epsilon = 1e-12);
        assert_relative_eq!(h, 3.5, epsilon = 1e-12);
        assert_relative_eq!(s, 3.5 * 400.0_f64.ln(), epsilon = 1e-12);

        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let t = 2.0;
        assert_relative_eq!(Cp_over_R(&a, t), 1.0 + 4.0 + 12.0 + 32.0 + 80.0);
        assert_relative_eq!(
            H_over_RT(&a, t),
            1.0 + 2.0 + 4.0 + 8.0 + 16.0 + 3.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            S_over_R(&a, t),
            2.0_f64.ln() + 4.0 + 6.0 + 32.0 / 3.0 + 20.0 + 7.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_base_from_serde_and_lookup() {
        let base = NASAbase::from_serde(json!({
            "H2": {"Cp": [200.0, 1000.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]},
            "O2": {"Cp": [200.0, 1000.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], "model": "NASA7"}
        }))
        .unwrap();
        assert!(base.contains("H2"));
        assert_eq!(base.lookup("O2", 300.0).unwrap()[0], 7.0);
        assert!(matches!(
            base.lookup("N2", 300.0),
            Err(ThermoError::SubstanceNotFound(_))
        ));
        assert!(matches!(
            base.lookup("H2", 3000.0),
            Err(ThermoError::NoCoefficientsFound { .. })
        ));
    }

    #[test]
    fn test_base_from_wrong_json() {
        assert!(matches!(
            NASAbase::from_serde(json!([1, 2, 3])),
            Err(ThermoError::SerdeError(_))
        ));
        assert!(matches!(
            NASAbase::from_serde(json!({"H2": {"coefficients": []}})),
            Err(ThermoError::SerdeError(_))
        ));
    }
}
