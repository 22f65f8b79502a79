//! # Reaction system
//!
//! Aggregates a list of [`Reaction`]s over a common species order and turns a state
//! (temperature, concentrations) into rates:
//!
//! ```text
//! kf[j]       = k_j(T)
//! kb[j]       = kf[j] / Ke[j]            reversible reactions, 0 otherwise
//! progress[j] = kf[j] * Π_i c_i^R[i,j] - kb[j] * Π_i c_i^P[i,j]
//! net         = (P - R) * progress
//! ```
//!
//! `R` and `P` are the (species x reactions) stoichiometry matrices of reactants and products.
//! `Ke` needs NASA-7 coefficients of every species, they are taken from a [`ThermoSource`] and
//! cached per temperature. Every mutating operation validates and computes first and commits last,
//! so a failed call leaves the system as it was.
use crate::Kinetics::errors::{KinError, prohibited};
use crate::Kinetics::law_registry::LawRegistry;
use crate::Kinetics::rate_laws::RateState;
use crate::Kinetics::reaction::{Reaction, ReactionUpdate};
use crate::Thermodynamics::ChemEquilibrium::BackwardLaw::BackwardLaw;
use crate::Thermodynamics::DBhandlers::NASAdata::NASAbase;
use crate::Thermodynamics::DBhandlers::thermo_api::ThermoSource;
use crate::Utils::load_from_file::MechanismData;
use crate::settings::KineticsConfig;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use prettytable::{Table, row};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// species -> concentration
pub type Concentrations = BTreeMap<String, f64>;

/// optional inputs of [`ReactionSystem::new`]
#[derive(Clone)]
pub struct SystemOptions {
    /// species order; empty means derive it from the reactions
    pub species: Vec<String>,
    pub thermo: Option<Arc<dyn ThermoSource>>,
    pub initial_T: f64,
    pub initial_concs: Concentrations,
    pub backward: BackwardLaw,
    /// revalidate the state on every rate-coefficient evaluation
    pub check_state: bool,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            species: Vec::new(),
            thermo: None,
            initial_T: 273.0,
            initial_concs: Concentrations::new(),
            backward: BackwardLaw::new(),
            check_state: true,
        }
    }
}

impl SystemOptions {
    pub fn from_config(config: &KineticsConfig) -> Self {
        Self {
            initial_T: config.default_temperature,
            backward: BackwardLaw::with_constants(config.reference_pressure, config.gas_constant),
            check_state: config.check_state,
            ..Default::default()
        }
    }
    pub fn with_species(mut self, species: &[&str]) -> Self {
        self.species = species.iter().map(|s| s.to_string()).collect();
        self
    }
    pub fn with_thermo(mut self, thermo: Arc<dyn ThermoSource>) -> Self {
        self.thermo = Some(thermo);
        self
    }
    pub fn with_T(mut self, T: f64) -> Self {
        self.initial_T = T;
        self
    }
    pub fn with_concentrations(mut self, concs: &[(&str, f64)]) -> Self {
        self.initial_concs = concs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self
    }
}

/// state that depends on the reaction list and has to change together with it
struct Derived {
    species: Vec<String>,
    stoich_reactants: DMatrix<f64>,
    stoich_products: DMatrix<f64>,
    thermo_cache: Option<DMatrix<f64>>,
}

pub struct ReactionSystem {
    reactions: Vec<Reaction>,
    /// species order as given by the user, possibly empty
    user_species: Vec<String>,
    species: Vec<String>,
    T: f64,
    concentrations: Option<Concentrations>,
    thermo: Option<Arc<dyn ThermoSource>>,
    /// (species x 7) NASA coefficients valid at `T`
    thermo_cache: Option<DMatrix<f64>>,
    backward: BackwardLaw,
    check_state: bool,
    stoich_reactants: DMatrix<f64>,
    stoich_products: DMatrix<f64>,
}

fn check_temperature(T: f64) -> Result<(), KinError> {
    if !(T > 0.0) {
        return Err(KinError::InvalidParameter(prohibited(
            "T",
            T,
            "non-positive temperature",
        )));
    }
    Ok(())
}

/// user order extended with new species in order of appearance, or all species sorted
fn derive_species(user_species: &[String], reactions: &[Reaction]) -> Vec<String> {
    if user_species.is_empty() {
        let all: BTreeSet<String> = reactions.iter().flat_map(|r| r.species()).collect();
        return all.into_iter().collect();
    }
    let mut species = user_species.to_vec();
    let mut seen: HashSet<String> = species.iter().cloned().collect();
    for reaction in reactions {
        for s in reaction.species() {
            if seen.insert(s.clone()) {
                species.push(s);
            }
        }
    }
    species
}

fn stoich_matrices(species: &[String], reactions: &[Reaction]) -> (DMatrix<f64>, DMatrix<f64>) {
    let reactants = DMatrix::from_fn(species.len(), reactions.len(), |i, j| {
        reactions[j].reactant_coeff(&species[i]) as f64
    });
    let products = DMatrix::from_fn(species.len(), reactions.len(), |i, j| {
        reactions[j].product_coeff(&species[i]) as f64
    });
    (reactants, products)
}

/// one lookup per species; only needed when some reaction is reversible
fn thermo_matrix(
    thermo: &Option<Arc<dyn ThermoSource>>,
    species: &[String],
    reactions: &[Reaction],
    T: f64,
) -> Result<Option<DMatrix<f64>>, KinError> {
    let Some(thermo) = thermo else {
        return Ok(None);
    };
    if !reactions.iter().any(|r| r.is_reversible()) {
        return Ok(None);
    }
    let mut a = DMatrix::<f64>::zeros(species.len(), 7);
    for (i, s) in species.iter().enumerate() {
        let coeffs = thermo.lookup(s, T)?;
        for (k, c) in coeffs.iter().enumerate() {
            a[(i, k)] = *c;
        }
    }
    debug!("thermo coefficients refreshed at T = {} for {} species", T, species.len());
    Ok(Some(a))
}

impl ReactionSystem {
    pub fn new(reactions: Vec<Reaction>, options: SystemOptions) -> Result<Self, KinError> {
        if reactions.is_empty() {
            return Err(KinError::InvalidInput(
                "a reaction system needs at least one reaction".to_string(),
            ));
        }
        let mut unique: HashSet<&str> = HashSet::new();
        let duplicate = options
            .species
            .iter()
            .find(|s| !unique.insert(s.as_str()))
            .cloned();
        if let Some(dup) = duplicate {
            return Err(KinError::InvalidInput(format!(
                "species '{}' is listed twice",
                dup
            )));
        }
        drop(unique);
        check_temperature(options.initial_T)?;
        let mut system = Self {
            reactions: Vec::new(),
            user_species: options.species,
            species: Vec::new(),
            T: options.initial_T,
            concentrations: None,
            thermo: options.thermo,
            thermo_cache: None,
            backward: options.backward,
            check_state: options.check_state,
            stoich_reactants: DMatrix::zeros(0, 0),
            stoich_products: DMatrix::zeros(0, 0),
        };
        let derived = system.derive(&reactions, system.T)?;
        system.commit(reactions, derived);
        if !options.initial_concs.is_empty() {
            system.set_concentrations(options.initial_concs)?;
        }
        Ok(system)
    }

    /// builds a system from a loaded mechanism file, optionally from a sub-range of its reactions
    pub fn from_mechanism(
        mechanism: &MechanismData,
        registry: &LawRegistry,
        mut options: SystemOptions,
        range: Option<Range<usize>>,
    ) -> Result<Self, KinError> {
        let records = match range {
            Some(range) => mechanism.reactions.get(range.clone()).ok_or_else(|| {
                KinError::InvalidInput(format!(
                    "reaction range {:?} is out of bounds, mechanism has {} reactions",
                    range,
                    mechanism.reactions.len()
                ))
            })?,
            None => &mechanism.reactions[..],
        };
        let reactions = records
            .iter()
            .map(|record| Reaction::new(record.clone(), registry))
            .collect::<Result<Vec<Reaction>, KinError>>()?;
        if options.species.is_empty() {
            if let Some(species) = &mechanism.species {
                let used: BTreeSet<String> = reactions.iter().flat_map(|r| r.species()).collect();
                options.species = species.iter().filter(|s| used.contains(*s)).cloned().collect();
            }
        }
        if options.thermo.is_none() {
            if let Some(thermo) = &mechanism.thermo {
                options.thermo = Some(Arc::new(NASAbase::from_serde(thermo.clone())?));
            }
        }
        info!(
            "reaction system created from mechanism with {} of {} reactions",
            reactions.len(),
            mechanism.reactions.len()
        );
        Self::new(reactions, options)
    }

    fn derive(&self, reactions: &[Reaction], T: f64) -> Result<Derived, KinError> {
        let species = derive_species(&self.user_species, reactions);
        let (stoich_reactants, stoich_products) = stoich_matrices(&species, reactions);
        let thermo_cache = thermo_matrix(&self.thermo, &species, reactions, T)?;
        Ok(Derived {
            species,
            stoich_reactants,
            stoich_products,
            thermo_cache,
        })
    }

    fn commit(&mut self, reactions: Vec<Reaction>, derived: Derived) {
        if derived.species != self.species {
            info!("species of the reaction system: {:?}", derived.species);
        }
        self.reactions = reactions;
        self.species = derived.species;
        self.stoich_reactants = derived.stoich_reactants;
        self.stoich_products = derived.stoich_products;
        self.thermo_cache = derived.thermo_cache;
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
    pub fn species(&self) -> Vec<String> {
        self.species.clone()
    }
    /// re-derives the species order and the stoichiometry from the current reactions
    pub fn refresh_species(&mut self) -> Result<Vec<String>, KinError> {
        let derived = self.derive(&self.reactions, self.T)?;
        let reactions = std::mem::take(&mut self.reactions);
        self.commit(reactions, derived);
        Ok(self.species.clone())
    }
    pub fn temperature(&self) -> f64 {
        self.T
    }
    pub fn concentrations(&self) -> Option<Concentrations> {
        self.concentrations.clone()
    }
    pub fn thermo_coefficients(&self) -> Option<DMatrix<f64>> {
        self.thermo_cache.clone()
    }

    pub fn set_temperature(&mut self, T: f64) -> Result<(), KinError> {
        check_temperature(T)?;
        let cache = thermo_matrix(&self.thermo, &self.species, &self.reactions, T)?;
        self.T = T;
        self.thermo_cache = cache;
        Ok(())
    }

    pub fn set_concentrations(&mut self, concs: Concentrations) -> Result<(), KinError> {
        if concs.len() != self.species.len() {
            return Err(KinError::InvalidParameter(format!(
                "{} concentrations given for {} species {:?}",
                concs.len(),
                self.species.len(),
                self.species
            )));
        }
        for (species, &c) in &concs {
            if !self.species.contains(species) {
                return Err(KinError::InvalidParameter(format!(
                    "concentration of unknown species '{}'",
                    species
                )));
            }
            if !(c >= 0.0) {
                return Err(KinError::InvalidParameter(prohibited(
                    &format!("c[{}]", species),
                    c,
                    "negative concentration",
                )));
            }
        }
        self.concentrations = Some(concs);
        Ok(())
    }

    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), KinError> {
        let mut reactions = self.reactions.clone();
        reactions.push(reaction);
        let derived = self.derive(&reactions, self.T)?;
        self.commit(reactions, derived);
        Ok(())
    }

    /// updates the reaction with the given id and re-derives everything that depends on it
    pub fn update_reaction(
        &mut self,
        id: &str,
        update: ReactionUpdate,
        registry: &LawRegistry,
    ) -> Result<(), KinError> {
        let index = self
            .reactions
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| KinError::NotFound(format!("no reaction with id '{}'", id)))?;
        let mut reactions = self.reactions.clone();
        reactions[index].update(update, registry)?;
        let derived = self.derive(&reactions, self.T)?;
        self.commit(reactions, derived);
        Ok(())
    }

    pub fn stoichiometry_reactants(&self) -> DMatrix<f64> {
        self.stoich_reactants.clone()
    }
    pub fn stoichiometry_products(&self) -> DMatrix<f64> {
        self.stoich_products.clone()
    }
    /// products minus reactants
    pub fn stoichiometry_net(&self) -> DMatrix<f64> {
        &self.stoich_products - &self.stoich_reactants
    }

    pub fn forward_backward_rate_coefficients(
        &self,
    ) -> Result<(DVector<f64>, DVector<f64>), KinError> {
        let state = RateState::at(self.T);
        let kf = self
            .reactions
            .iter()
            .map(|r| r.rate_coefficient(&state, self.check_state))
            .collect::<Result<Vec<f64>, KinError>>()?;
        let kf = DVector::from_vec(kf);
        let reversible: Vec<bool> = self.reactions.iter().map(|r| r.is_reversible()).collect();
        if !reversible.iter().any(|&r| r) {
            let n = kf.len();
            return Ok((kf, DVector::zeros(n)));
        }
        let a = self.thermo_cache.as_ref().ok_or_else(|| {
            KinError::InvalidState(
                "reversible reactions need thermodynamic coefficients, no thermo source was given"
                    .to_string(),
            )
        })?;
        let Ke = self
            .backward
            .equilibrium_coeffs(a, &self.stoichiometry_net(), self.T)?;
        let kb = self.backward.backward_coeffs(&kf, &Ke, &reversible)?;
        Ok((kf, kb))
    }

    /// concentrations in species order
    fn concentration_vector(&self) -> Result<DVector<f64>, KinError> {
        let concs = self.concentrations.as_ref().ok_or_else(|| {
            KinError::InvalidState("concentrations are not set".to_string())
        })?;
        if concs.len() != self.species.len() {
            return Err(KinError::InvalidState(format!(
                "concentrations are set for {} species, the system has {}",
                concs.len(),
                self.species.len()
            )));
        }
        let c = self
            .species
            .iter()
            .map(|s| {
                concs.get(s).copied().ok_or_else(|| {
                    KinError::InvalidState(format!("concentration of '{}' is not set", s))
                })
            })
            .collect::<Result<Vec<f64>, KinError>>()?;
        Ok(DVector::from_vec(c))
    }

    /// Π_i c_i^nu[i,j] for every column j
    fn mass_action(c: &DVector<f64>, nu: &DMatrix<f64>) -> DVector<f64> {
        DVector::from_iterator(
            nu.ncols(),
            nu.column_iter().map(|nu_j| {
                nu_j.iter()
                    .zip(c.iter())
                    .map(|(&n, &ci)| ci.powi(n as i32))
                    .product::<f64>()
            }),
        )
    }

    pub fn progress_rates(&self) -> Result<DVector<f64>, KinError> {
        let c = self.concentration_vector()?;
        let (kf, kb) = self.forward_backward_rate_coefficients()?;
        let forward = kf.component_mul(&Self::mass_action(&c, &self.stoich_reactants));
        let backward = kb.component_mul(&Self::mass_action(&c, &self.stoich_products));
        Ok(forward - backward)
    }

    /// net production rate of every species, or of the named ones in the given order
    pub fn net_species_rates(&self, subset: Option<&[&str]>) -> Result<DVector<f64>, KinError> {
        let rates = self.stoichiometry_net() * self.progress_rates()?;
        let Some(subset) = subset else {
            return Ok(rates);
        };
        let rows = subset
            .iter()
            .map(|name| {
                self.species
                    .iter()
                    .position(|s| s == name)
                    .map(|i| rates[i])
                    .ok_or_else(|| {
                        KinError::InvalidParameter(format!(
                            "'{}' is not a species of the system",
                            name
                        ))
                    })
            })
            .collect::<Result<Vec<f64>, KinError>>()?;
        Ok(DVector::from_vec(rows))
    }

    pub fn net_species_rates_map(&self) -> Result<BTreeMap<String, f64>, KinError> {
        let rates = self.net_species_rates(None)?;
        Ok(self.species.iter().cloned().zip(rates.iter().copied()).collect())
    }

    /// kf, kb and progress rate of every reaction
    pub fn rates_table(&self) -> Result<Table, KinError> {
        let (kf, kb) = self.forward_backward_rate_coefficients()?;
        let progress = self.progress_rates()?;
        let mut table = Table::new();
        table.add_row(row!["ID", "Equation", "kf", "kb", "progress rate"]);
        for (j, reaction) in self.reactions.iter().enumerate() {
            table.add_row(row![
                reaction.id(),
                reaction.equation(),
                format!("{:.6e}", kf[j]),
                format!("{:.6e}", kb[j]),
                format!("{:.6e}", progress[j])
            ]);
        }
        Ok(table)
    }

    /// concentration and net rate of every species
    pub fn species_rates_table(&self) -> Result<Table, KinError> {
        let c = self.concentration_vector()?;
        let rates = self.net_species_rates(None)?;
        let mut table = Table::new();
        table.add_row(row!["Species", "Concentration", "Net rate"]);
        for (i, species) in self.species.iter().enumerate() {
            table.add_row(row![
                species,
                format!("{:.6e}", c[i]),
                format!("{:.6e}", rates[i])
            ]);
        }
        Ok(table)
    }
}

impl fmt::Display for ReactionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ReactionSystem object with following Reactions:")?;
        for reaction in &self.reactions {
            writeln!(f, "{}", reaction)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ReactionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionSystem")
            .field("reactions", &self.reactions)
            .field("species", &self.species)
            .field("T", &self.T)
            .field("concentrations", &self.concentrations)
            .field("has_thermo", &self.thermo.is_some())
            .finish()
    }
}
