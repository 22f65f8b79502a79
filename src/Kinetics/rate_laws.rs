//! Laws of the reaction rate coefficient.
//!
//! Every law is a small mathematical model: a set of implicit coefficients fixed at construction
//! (`k`, or `A, E, R`, or `A, b, E, R`), a validity check of those coefficients, a validity check
//! of the state it is evaluated at (temperature) and a kernel.
//!
//! | law                | coefficients (defaults)              | k(T)                       |
//! |--------------------|--------------------------------------|----------------------------|
//! | Constant           | k = 1                                | k                          |
//! | Arrhenius          | A = 1, E = 0, R = 8.314              | A exp(-E/(RT))             |
//! | ModifiedArrhenius  | A = 1, b = 0, E = 0, R = 8.314       | A T^b exp(-E/(RT))         |
//!
//! `k`, `A` and `R` must be strictly positive, `T` must be strictly positive at compute time.
//! When no temperature is supplied the sentinel [`DEFAULT_T`] is used, so with default coefficients
//! every law collapses to the constant `1`.
use crate::Kinetics::errors::{KinError, prohibited};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// gas constant used by the Arrhenius laws unless the user overrides `R`
pub const R_DEFAULT: f64 = 8.314;
/// temperature used when the state does not carry one
pub const DEFAULT_T: f64 = 1e-16;

/// named coefficients of a law
pub type LawParams = BTreeMap<String, f64>;

/// state at which a rate coefficient is evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateState {
    pub T: Option<f64>,
}

impl RateState {
    pub fn at(T: f64) -> Self {
        Self { T: Some(T) }
    }
    pub fn T_or_default(&self) -> f64 {
        self.T.unwrap_or(DEFAULT_T)
    }
}

/// merges user values over the law defaults; keys the law does not know are dropped
fn merge_with_defaults(law: &str, defaults: &[(&str, f64)], params: &LawParams) -> LawParams {
    let mut merged: LawParams = defaults.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    for (key, value) in params {
        if merged.contains_key(key) {
            merged.insert(key.clone(), *value);
        } else {
            warn!("{}: unknown coefficient '{}' = {} ignored", law, key, value);
        }
    }
    merged
}

fn check_positive(label: &str, value: f64, term: &str) -> Result<(), KinError> {
    if !(value > 0.0) {
        return Err(KinError::InvalidParameter(prohibited(
            label,
            value,
            &format!("non-positive {}", term),
        )));
    }
    Ok(())
}

fn check_temperature(state: &RateState) -> Result<(), KinError> {
    check_positive("T", state.T_or_default(), "temperature")
}

#[enum_dispatch]
pub trait RateLawModel {
    /// name under which the law is known to the registry
    fn name(&self) -> String;
    /// validity of the implicit coefficients
    fn check_coeffparams(&self) -> Result<(), KinError>;
    /// validity of the model input
    fn check_stateparams(&self, state: &RateState) -> Result<(), KinError>;
    /// the math itself, no checks
    fn kernel(&self, state: &RateState) -> f64;
    /// owned copy of the implicit coefficients
    fn get_coeffparams(&self) -> LawParams;
    /// rate coefficient at `state`; `check = false` skips the state validation in hot loops
    fn compute(&self, state: &RateState, check: bool) -> Result<f64, KinError> {
        if check {
            self.check_stateparams(state)?;
        }
        Ok(self.kernel(state))
    }
}

/////////////////////////////CONSTANT////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub k: f64,
}

impl Constant {
    pub const DEFAULTS: [(&'static str, f64); 1] = [("k", 1.0)];

    pub fn new(k: f64) -> Result<Self, KinError> {
        let law = Self { k };
        law.check_coeffparams()?;
        Ok(law)
    }
    pub fn from_params(params: &LawParams, check: bool) -> Result<Self, KinError> {
        let p = merge_with_defaults("Constant", &Self::DEFAULTS, params);
        let law = Self { k: p["k"] };
        if check {
            law.check_coeffparams()?;
        }
        Ok(law)
    }
    pub fn K_expr(&self) -> Expr {
        Expr::Const(self.k)
    }
}

impl RateLawModel for Constant {
    fn name(&self) -> String {
        "Constant".to_string()
    }
    fn check_coeffparams(&self) -> Result<(), KinError> {
        check_positive("k", self.k, "reaction rate coefficient")
    }
    fn check_stateparams(&self, _state: &RateState) -> Result<(), KinError> {
        Ok(())
    }
    fn kernel(&self, _state: &RateState) -> f64 {
        self.k
    }
    fn get_coeffparams(&self) -> LawParams {
        LawParams::from([("k".to_string(), self.k)])
    }
}

/////////////////////////////ARRHENIUS////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub struct Arrhenius {
    pub A: f64,
    pub E: f64,
    pub R: f64,
}

impl Arrhenius {
    pub const DEFAULTS: [(&'static str, f64); 3] = [("A", 1.0), ("E", 0.0), ("R", R_DEFAULT)];

    pub fn new(A: f64, E: f64, R: f64) -> Result<Self, KinError> {
        let law = Self { A, E, R };
        law.check_coeffparams()?;
        Ok(law)
    }
    pub fn from_params(params: &LawParams, check: bool) -> Result<Self, KinError> {
        let p = merge_with_defaults("Arrhenius", &Self::DEFAULTS, params);
        let law = Self {
            A: p["A"],
            E: p["E"],
            R: p["R"],
        };
        if check {
            law.check_coeffparams()?;
        }
        Ok(law)
    }
    /// A*exp(-E/(R*T)) as a function of the symbolic variable "T"
    pub fn K_expr(&self) -> Expr {
        let T = Expr::Var("T".to_owned());
        let (A, E, R) = (Expr::Const(self.A), Expr::Const(self.E), Expr::Const(self.R));
        A * (-E / (R * T)).exp()
    }
}

impl RateLawModel for Arrhenius {
    fn name(&self) -> String {
        "Arrhenius".to_string()
    }
    fn check_coeffparams(&self) -> Result<(), KinError> {
        check_positive("A", self.A, "Arrhenius prefactor")?;
        check_positive("R", self.R, "ideal gas constant")
    }
    fn check_stateparams(&self, state: &RateState) -> Result<(), KinError> {
        check_temperature(state)
    }
    fn kernel(&self, state: &RateState) -> f64 {
        let T = state.T_or_default();
        self.A * f64::exp(-self.E / (self.R * T))
    }
    fn get_coeffparams(&self) -> LawParams {
        LawParams::from([
            ("A".to_string(), self.A),
            ("E".to_string(), self.E),
            ("R".to_string(), self.R),
        ])
    }
}

/////////////////////////////MODIFIED ARRHENIUS////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedArrhenius {
    pub A: f64,
    pub b: f64,
    pub E: f64,
    pub R: f64,
}

impl ModifiedArrhenius {
    pub const DEFAULTS: [(&'static str, f64); 4] =
        [("A", 1.0), ("b", 0.0), ("E", 0.0), ("R", R_DEFAULT)];

    pub fn new(A: f64, b: f64, E: f64, R: f64) -> Result<Self, KinError> {
        let law = Self { A, b, E, R };
        law.check_coeffparams()?;
        Ok(law)
    }
    pub fn from_params(params: &LawParams, check: bool) -> Result<Self, KinError> {
        let p = merge_with_defaults("modArrhenius", &Self::DEFAULTS, params);
        let law = Self {
            A: p["A"],
            b: p["b"],
            E: p["E"],
            R: p["R"],
        };
        if check {
            law.check_coeffparams()?;
        }
        Ok(law)
    }
    /// A*T^b*exp(-E/(R*T)) as a function of the symbolic variable "T"
    pub fn K_expr(&self) -> Expr {
        let T = Expr::Var("T".to_owned());
        let (A, b, E, R) = (
            Expr::Const(self.A),
            Expr::Const(self.b),
            Expr::Const(self.E),
            Expr::Const(self.R),
        );
        A * T.clone().pow(b) * (-E / (R * T)).exp()
    }
}

impl RateLawModel for ModifiedArrhenius {
    fn name(&self) -> String {
        "modArrhenius".to_string()
    }
    fn check_coeffparams(&self) -> Result<(), KinError> {
        check_positive("A", self.A, "Arrhenius prefactor")?;
        check_positive("R", self.R, "ideal gas constant")
    }
    fn check_stateparams(&self, state: &RateState) -> Result<(), KinError> {
        check_temperature(state)
    }
    fn kernel(&self, state: &RateState) -> f64 {
        let T = state.T_or_default();
        self.A * T.powf(self.b) * f64::exp(-self.E / (self.R * T))
    }
    fn get_coeffparams(&self) -> LawParams {
        LawParams::from([
            ("A".to_string(), self.A),
            ("b".to_string(), self.b),
            ("E".to_string(), self.E),
            ("R".to_string(), self.R),
        ])
    }
}

/////////////////////////////USER DEFINED////////////////////////////////
/// contract a user law has to fulfil to be registered next to the built-in ones
pub trait CustomLawModel: fmt::Debug + Send + Sync {
    /// coefficients and their default values
    fn defaults(&self) -> LawParams {
        LawParams::new()
    }
    fn check_coeffparams(&self, _params: &LawParams) -> Result<(), KinError> {
        Ok(())
    }
    fn check_stateparams(&self, _params: &LawParams, _state: &RateState) -> Result<(), KinError> {
        Ok(())
    }
    fn kernel(&self, params: &LawParams, state: &RateState) -> f64;
}

/// a user law bound to concrete coefficients
#[derive(Debug, Clone)]
pub struct CustomLaw {
    pub name: String,
    model: Arc<dyn CustomLawModel>,
    params: LawParams,
}

impl CustomLaw {
    pub fn from_params(
        name: &str,
        model: Arc<dyn CustomLawModel>,
        params: &LawParams,
        check: bool,
    ) -> Result<Self, KinError> {
        let mut merged = model.defaults();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), *v)));
        let law = Self {
            name: name.to_string(),
            model,
            params: merged,
        };
        if check {
            law.check_coeffparams()?;
        }
        Ok(law)
    }
}

impl RateLawModel for CustomLaw {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn check_coeffparams(&self) -> Result<(), KinError> {
        self.model.check_coeffparams(&self.params)
    }
    fn check_stateparams(&self, state: &RateState) -> Result<(), KinError> {
        self.model.check_stateparams(&self.params, state)
    }
    fn kernel(&self, state: &RateState) -> f64 {
        self.model.kernel(&self.params, state)
    }
    fn get_coeffparams(&self) -> LawParams {
        self.params.clone()
    }
}

/// a law bound to its coefficients, owned by exactly one reaction
#[derive(Debug, Clone)]
#[enum_dispatch(RateLawModel)]
pub enum RateLaw {
    Constant(Constant),
    Arrhenius(Arrhenius),
    ModifiedArrhenius(ModifiedArrhenius),
    Custom(CustomLaw),
}

impl RateLaw {
    /// symbolic rate coefficient k(T); user laws have no symbolic form
    pub fn K_expr(&self) -> Option<Expr> {
        match self {
            RateLaw::Constant(law) => Some(law.K_expr()),
            RateLaw::Arrhenius(law) => Some(law.K_expr()),
            RateLaw::ModifiedArrhenius(law) => Some(law.K_expr()),
            RateLaw::Custom(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(pairs: &[(&str, f64)]) -> LawParams {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_constant() {
        let law = Constant::new(2.0).unwrap();
        assert_eq!(law.compute(&RateState::default(), true).unwrap(), 2.0);
        // the state does not matter
        assert_eq!(law.compute(&RateState::at(-5.0), true).unwrap(), 2.0);
        assert_eq!(law.compute(&RateState::at(1e6), false).unwrap(), 2.0);
        assert!(matches!(
            Constant::new(0.0),
            Err(KinError::InvalidParameter(_))
        ));
        assert!(Constant::new(-1.0).is_err());
        assert!(matches!(
            Constant::new(f64::NAN),
            Err(KinError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_arrhenius_matches_formula() {
        for &(A, E, R, T) in &[
            (1.0e13, 2.0e4, 8.314, 1000.0),
            (std::f64::consts::E, 8.314, 8.314, 1.0),
            (3.5, -100.0, 1.987, 300.0),
        ] {
            let law = Arrhenius::new(A, E, R).unwrap();
            let k = law.compute(&RateState::at(T), true).unwrap();
            assert_relative_eq!(k, A * f64::exp(-E / (R * T)), max_relative = 1e-12);
        }
        // E = 0 gives A
        let law = Arrhenius::new(7.0, 0.0, 8.314).unwrap();
        assert_relative_eq!(law.compute(&RateState::at(500.0), true).unwrap(), 7.0);
        // textbook example: A = e, E = R, T = 1 -> 1
        let law = Arrhenius::new(std::f64::consts::E, 8.314, 8.314).unwrap();
        assert_relative_eq!(law.compute(&RateState::at(1.0), true).unwrap(), 1.0);
    }

    #[test]
    fn test_arrhenius_validation() {
        assert!(matches!(
            Arrhenius::new(0.0, 1.0, 8.314),
            Err(KinError::InvalidParameter(_))
        ));
        assert!(matches!(
            Arrhenius::new(1.0, 1.0, -8.314),
            Err(KinError::InvalidParameter(_))
        ));
        let law = Arrhenius::new(1.0, 1.0, 8.314).unwrap();
        let err = law.compute(&RateState::at(0.0), true).unwrap_err();
        assert!(matches!(&err, KinError::InvalidParameter(msg) if msg.contains("temperature")));
        assert!(law.compute(&RateState::at(-10.0), true).is_err());
        assert!(law.compute(&RateState::at(f64::NAN), true).is_err());
        assert!(Arrhenius::new(f64::NAN, 1.0, 8.314).is_err());
        assert!(Arrhenius::new(1.0, 1.0, f64::NAN).is_err());
        assert!(ModifiedArrhenius::new(f64::NAN, 0.5, 1.0, 8.314).is_err());
    }

    #[test]
    fn test_arrhenius_defaults_behave_like_constant() {
        let law = Arrhenius::from_params(&LawParams::new(), true).unwrap();
        assert_eq!(law.compute(&RateState::default(), true).unwrap(), 1.0);
        assert_eq!(law.compute(&RateState::at(1234.0), true).unwrap(), 1.0);
        assert_eq!(law.get_coeffparams(), params(&[("A", 1.0), ("E", 0.0), ("R", 8.314)]));
    }

    #[test]
    fn test_modified_arrhenius() {
        let law = ModifiedArrhenius::new(std::f64::consts::E, -1.0, 4.157, 8.314).unwrap();
        assert_relative_eq!(
            law.compute(&RateState::at(0.5), true).unwrap(),
            2.0,
            max_relative = 1e-12
        );
        let (A, b, E, R, T) = (1.0e8, 0.5, 5.0e4, 8.314, 1500.0);
        let law = ModifiedArrhenius::new(A, b, E, R).unwrap();
        assert_relative_eq!(
            law.compute(&RateState::at(T), true).unwrap(),
            A * T.powf(b) * f64::exp(-E / (R * T)),
            max_relative = 1e-12
        );
        assert!(ModifiedArrhenius::new(-1.0, 0.0, 0.0, 8.314).is_err());
    }

    #[test]
    fn test_modified_arrhenius_with_default_b_equals_arrhenius() {
        for &(A, E, R, T) in &[(2.0, 1.0e3, 8.314, 300.0), (1.0e10, 4.0e4, 1.987, 2000.0)] {
            let arr = Arrhenius::new(A, E, R).unwrap();
            let modarr =
                ModifiedArrhenius::from_params(&params(&[("A", A), ("E", E), ("R", R)]), true)
                    .unwrap();
            assert_eq!(modarr.b, 0.0);
            assert_relative_eq!(
                arr.compute(&RateState::at(T), true).unwrap(),
                modarr.compute(&RateState::at(T), true).unwrap(),
                max_relative = 1e-14
            );
        }
    }

    #[test]
    fn test_unknown_coefficients_are_dropped() {
        let law = Constant::from_params(&params(&[("k", 3.0), ("A", 10.0)]), true).unwrap();
        assert_eq!(law.get_coeffparams(), params(&[("k", 3.0)]));
    }

    #[test]
    fn test_unchecked_construction() {
        // check = false lets invalid coefficients through; the caller is responsible
        let law = Constant::from_params(&params(&[("k", -1.0)]), false).unwrap();
        assert_eq!(law.k, -1.0);
        assert!(law.check_coeffparams().is_err());
    }

    #[test]
    fn test_enum_dispatch() {
        let laws: Vec<RateLaw> = vec![
            Constant::new(10.0).unwrap().into(),
            Arrhenius::new(10.0, 0.0, 8.314).unwrap().into(),
            ModifiedArrhenius::new(10.0, 0.0, 0.0, 8.314).unwrap().into(),
        ];
        let names: Vec<String> = laws.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["Constant", "Arrhenius", "modArrhenius"]);
        for law in &laws {
            assert_relative_eq!(law.compute(&RateState::at(300.0), true).unwrap(), 10.0);
        }
    }

    #[test]
    fn test_symbolic_rate_constant() {
        let law = ModifiedArrhenius::new(1.0e8, 0.5, 5.0e4, 8.314).unwrap();
        let k_sym = RateLaw::from(law.clone()).K_expr().unwrap();
        let k_fun = k_sym.lambdify1D();
        let T: f64 = 1200.0;
        assert_relative_eq!(
            k_fun(T),
            law.compute(&RateState::at(T), true).unwrap(),
            max_relative = 1e-10
        );

        let law = Arrhenius::new(1.0e13, 2.0e4, 8.314).unwrap();
        let k_fun = law.K_expr().lambdify1D();
        assert_relative_eq!(
            k_fun(T),
            law.compute(&RateState::at(T), true).unwrap(),
            max_relative = 1e-10
        );
    }

    #[derive(Debug)]
    struct Linear;
    impl CustomLawModel for Linear {
        fn defaults(&self) -> LawParams {
            LawParams::from([("A".to_string(), 1.0)])
        }
        fn check_coeffparams(&self, params: &LawParams) -> Result<(), KinError> {
            if params["A"] == 0.0 {
                return Err(KinError::InvalidParameter("A = 0".to_string()));
            }
            Ok(())
        }
        fn kernel(&self, params: &LawParams, state: &RateState) -> f64 {
            params["A"] * state.T_or_default()
        }
    }

    #[test]
    fn test_custom_law() {
        let law = CustomLaw::from_params("sl", Arc::new(Linear), &params(&[("A", 2.0)]), true)
            .unwrap();
        let law = RateLaw::from(law);
        assert_eq!(law.name(), "sl");
        assert_relative_eq!(law.compute(&RateState::at(0.1), true).unwrap(), 0.2);
        assert!(law.K_expr().is_none());
        assert!(
            CustomLaw::from_params("sl", Arc::new(Linear), &params(&[("A", 0.0)]), true).is_err()
        );
    }
}
