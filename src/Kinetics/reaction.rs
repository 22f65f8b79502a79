//! # Elementary reaction
//!
//! A [`Reaction`] is built from a [`ReactionRecord`], the flat parameter record a mechanism file
//! provides for every reaction:
//!
//! ```json
//! {"id": "reaction01", "reversible": "no", "type": "Elementary",
//!  "coeffLaw": "Arrhenius", "coeffParams": {"A": 1e13, "E": 2e4},
//!  "coeffUnits": {"A": "1/s", "E": "J/mol"},
//!  "reactants": {"H2": 1, "O2": 1}, "products": {"OH": 2}}
//! ```
//!
//! Construction validates everything at once: stoichiometric coefficients must be non-negative
//! integers, the reaction type must be "Elementary", the law must be known to the registry and
//! its coefficients must pass the law's own check. The reaction then owns the bound rate law.
//! Updates go through [`Reaction::update`] and are all-or-nothing.
use crate::Kinetics::errors::{KinError, prohibited};
use crate::Kinetics::law_registry::LawRegistry;
use crate::Kinetics::rate_laws::{LawParams, RateLaw, RateLawModel, RateState};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::info;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// species -> stoichiometric coefficient
pub type Stoich = BTreeMap<String, u32>;

pub const ELEMENTARY: &str = "Elementary";

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

fn flag_to_bool<E: de::Error>(flag: Flag) -> Result<bool, E> {
    match flag {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.to_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            _ => Err(de::Error::custom(format!(
                "reversible must be \"yes\" or \"no\", got \"{}\"",
                s
            ))),
        },
    }
}

/// accepts `true`/`false` as well as `"yes"`/`"no"`
fn deserialize_reversible<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    flag_to_bool(Flag::deserialize(deserializer)?)
}

fn deserialize_reversible_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        Some(flag) => flag_to_bool(flag).map(Some),
        None => Ok(None),
    }
}

fn default_kind() -> String {
    ELEMENTARY.to_string()
}
fn default_law() -> String {
    "Constant".to_string()
}

/// constructor input of a [`Reaction`]; stoichiometry is kept raw so that it can be validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub id: String,
    #[serde(deserialize_with = "deserialize_reversible", default)]
    pub reversible: bool,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(rename = "coeffLaw", default = "default_law")]
    pub law_name: String,
    #[serde(rename = "coeffParams", default)]
    pub law_params: LawParams,
    #[serde(rename = "coeffUnits", default)]
    pub law_units: BTreeMap<String, String>,
    #[serde(default)]
    pub reactants: BTreeMap<String, f64>,
    #[serde(default)]
    pub products: BTreeMap<String, f64>,
}

fn to_map<V: Clone>(pairs: &[(&str, V)]) -> BTreeMap<String, V> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

impl ReactionRecord {
    /// irreversible elementary reaction with a unit constant rate coefficient
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            reversible: false,
            kind: default_kind(),
            law_name: default_law(),
            law_params: LawParams::new(),
            law_units: BTreeMap::new(),
            reactants: BTreeMap::new(),
            products: BTreeMap::new(),
        }
    }
    pub fn reversible(mut self, reversible: bool) -> Self {
        self.reversible = reversible;
        self
    }
    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }
    pub fn law(mut self, name: &str, params: &[(&str, f64)]) -> Self {
        self.law_name = name.to_string();
        self.law_params = to_map(params);
        self
    }
    pub fn units(mut self, units: &[(&str, &str)]) -> Self {
        self.law_units = units
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }
    pub fn reactants(mut self, reactants: &[(&str, f64)]) -> Self {
        self.reactants = to_map(reactants);
        self
    }
    pub fn products(mut self, products: &[(&str, f64)]) -> Self {
        self.products = to_map(products);
        self
    }
}

/// partial update of a reaction; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionUpdate {
    #[serde(deserialize_with = "deserialize_reversible_opt", default)]
    pub reversible: Option<bool>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "coeffLaw", default)]
    pub law_name: Option<String>,
    #[serde(rename = "coeffParams", default)]
    pub law_params: Option<LawParams>,
    #[serde(rename = "coeffUnits", default)]
    pub law_units: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub reactants: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub products: Option<BTreeMap<String, f64>>,
}

fn check_stoich(side: &str, raw: &BTreeMap<String, f64>) -> Result<Stoich, KinError> {
    let mut stoich = Stoich::new();
    for (species, &nu) in raw {
        let label = format!("{}[{}]", side, species);
        if !nu.is_finite() || nu.fract() != 0.0 {
            return Err(KinError::InvalidParameter(prohibited(
                &label,
                nu,
                "non-integer stoichiometric coefficient",
            )));
        }
        if nu < 0.0 {
            return Err(KinError::InvalidParameter(prohibited(
                &label,
                nu,
                "negative stoichiometric coefficient",
            )));
        }
        if nu > u32::MAX as f64 {
            return Err(KinError::InvalidParameter(prohibited(
                &label,
                nu,
                "stoichiometric coefficient out of range",
            )));
        }
        stoich.insert(species.clone(), nu as u32);
    }
    Ok(stoich)
}

/// everything a record turns into once it is known to be valid
struct Validated {
    reactants: Stoich,
    products: Stoich,
    law: RateLaw,
}

fn validate(record: &ReactionRecord, registry: &LawRegistry) -> Result<Validated, KinError> {
    let reactants = check_stoich("reactants", &record.reactants)?;
    let products = check_stoich("products", &record.products)?;
    if record.kind != ELEMENTARY {
        return Err(KinError::UnsupportedFeature(format!(
            "type = {}: only {} reactions are supported.",
            record.kind, ELEMENTARY
        )));
    }
    let kind = registry.get(&record.law_name).map_err(|_| {
        KinError::UnsupportedFeature(format!(
            "coeffLaw = {} is not a registered rate law.",
            record.law_name
        ))
    })?;
    let law = kind.instantiate(&record.law_name, &record.law_params, true)?;
    Ok(Validated {
        reactants,
        products,
        law,
    })
}

#[derive(Clone)]
pub struct Reaction {
    id: String,
    reversible: bool,
    kind: String,
    law_name: String,
    /// coefficients as the user gave them
    law_params: LawParams,
    law_units: BTreeMap<String, String>,
    reactants: Stoich,
    products: Stoich,
    law: RateLaw,
}

impl Reaction {
    pub fn new(record: ReactionRecord, registry: &LawRegistry) -> Result<Self, KinError> {
        let Validated {
            reactants,
            products,
            law,
        } = validate(&record, registry)?;
        Ok(Self {
            id: record.id,
            reversible: record.reversible,
            kind: record.kind,
            law_name: record.law_name,
            law_params: record.law_params,
            law_units: record.law_units,
            reactants,
            products,
            law,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn is_reversible(&self) -> bool {
        self.reversible
    }
    pub fn law_name(&self) -> &str {
        &self.law_name
    }
    pub fn law(&self) -> &RateLaw {
        &self.law
    }
    pub fn reactants(&self) -> Stoich {
        self.reactants.clone()
    }
    pub fn products(&self) -> Stoich {
        self.products.clone()
    }
    /// coefficient of `species` on the reactant side, 0 if absent
    pub fn reactant_coeff(&self, species: &str) -> u32 {
        self.reactants.get(species).copied().unwrap_or(0)
    }
    pub fn product_coeff(&self, species: &str) -> u32 {
        self.products.get(species).copied().unwrap_or(0)
    }
    /// union of reactant and product species, sorted
    pub fn species(&self) -> BTreeSet<String> {
        self.reactants
            .keys()
            .chain(self.products.keys())
            .cloned()
            .collect()
    }

    /// owned record of the current state; `coeffParams` carries the final coefficients with defaults filled in
    pub fn get_params(&self) -> ReactionRecord {
        let to_raw = |s: &Stoich| -> BTreeMap<String, f64> {
            s.iter().map(|(k, v)| (k.clone(), *v as f64)).collect()
        };
        ReactionRecord {
            id: self.id.clone(),
            reversible: self.reversible,
            kind: self.kind.clone(),
            law_name: self.law_name.clone(),
            law_params: self.law.get_coeffparams(),
            law_units: self.law_units.clone(),
            reactants: to_raw(&self.reactants),
            products: to_raw(&self.products),
        }
    }

    /// merges `update` into the current parameters, validates the result as a whole and commits it;
    /// on error the reaction is left untouched
    pub fn update(
        &mut self,
        update: ReactionUpdate,
        registry: &LawRegistry,
    ) -> Result<&mut Self, KinError> {
        let mut record = self.get_params();
        record.law_params = self.law_params.clone();
        if let Some(reversible) = update.reversible {
            record.reversible = reversible;
        }
        if let Some(kind) = update.kind {
            record.kind = kind;
        }
        if let Some(law_name) = update.law_name {
            record.law_name = law_name;
        }
        if let Some(law_params) = update.law_params {
            record.law_params = law_params;
        }
        if let Some(law_units) = update.law_units {
            record.law_units = law_units;
        }
        if let Some(reactants) = update.reactants {
            record.reactants = reactants;
        }
        if let Some(products) = update.products {
            record.products = products;
        }
        let Validated {
            reactants,
            products,
            law,
        } = validate(&record, registry)?;

        if record.law_name != self.law_name || record.law_params != self.law_params {
            info!(
                "reaction {}: rate law rebound to {} {:?}",
                self.id,
                record.law_name,
                law.get_coeffparams()
            );
            self.law = law;
        }
        self.reversible = record.reversible;
        self.kind = record.kind;
        self.law_name = record.law_name;
        self.law_params = record.law_params;
        self.law_units = record.law_units;
        self.reactants = reactants;
        self.products = products;
        Ok(self)
    }

    /// forwards to the bound law
    pub fn rate_coefficient(&self, state: &RateState, check: bool) -> Result<f64, KinError> {
        self.law.compute(state, check)
    }
    /// rate coefficient at temperature T (K)
    pub fn K_const(&self, T: f64) -> Result<f64, KinError> {
        self.rate_coefficient(&RateState::at(T), true)
    }
    /// rate coefficients for n temperatures from T0 (included) towards Tend (excluded)
    pub fn rate_coefficients_for_T_range(
        &self,
        T0: f64,
        Tend: f64,
        n: usize,
    ) -> Result<Vec<f64>, KinError> {
        (0..n)
            .map(|i| T0 + i as f64 * (Tend - T0) / n as f64)
            .map(|Ti| self.K_const(Ti))
            .collect()
    }
    pub fn K_expr(&self) -> Option<Expr> {
        self.law.K_expr()
    }

    fn side_to_string(side: &Stoich) -> String {
        side.iter()
            .map(|(species, nu)| format!("{}{}", nu, species))
            .collect::<Vec<String>>()
            .join(" + ")
    }
    /// `2H2 + 1O2 => 2H2O`
    pub fn equation(&self) -> String {
        let arrow = if self.reversible { "<=>" } else { "=>" };
        format!(
            "{} {} {}",
            Self::side_to_string(&self.reactants),
            arrow,
            Self::side_to_string(&self.products)
        )
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .law
            .get_coeffparams()
            .iter()
            .map(|(k, v)| format!("{} = {}", k, v))
            .collect();
        let units: Vec<String> = self
            .law_units
            .iter()
            .map(|(k, v)| format!("{} = {}", k, v))
            .collect();
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(f, "Reaction Equation:")?;
        writeln!(f, "{}", self.equation())?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(f, "Reaction Info:")?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "TYPE: {}", self.kind)?;
        writeln!(f, "reversible: {}", if self.reversible { "yes" } else { "no" })?;
        writeln!(f, "coeffLaw: {}", self.law_name)?;
        writeln!(f, "coeffParams: [{}]", params.join(", "))?;
        writeln!(f, "coeffUnits: [{}]", units.join(", "))?;
        write!(f, "{}", "=".repeat(40))
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction")
            .field("id", &self.id)
            .field("reversible", &self.reversible)
            .field("type", &self.kind)
            .field("coeffLaw", &self.law_name)
            .field("coeffParams", &self.law.get_coeffparams())
            .field("coeffUnits", &self.law_units)
            .field("reactants", &self.reactants)
            .field("products", &self.products)
            .finish()
    }
}
