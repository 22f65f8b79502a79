use crate::Kinetics::errors::KinError;
use crate::Kinetics::law_registry::{LawKind, LawRegistry};
use crate::Kinetics::rate_laws::{CustomLawModel, LawParams, RateState};
use crate::Kinetics::reaction::{Reaction, ReactionRecord};
use crate::Kinetics::reaction_system::{ReactionSystem, SystemOptions};
use crate::Thermodynamics::DBhandlers::NASAdata::NASAbase;
use serde_json::json;
use std::sync::Arc;

/// k = A * (T/T0)^n, a user law for the registry example
#[derive(Debug)]
struct PowerLaw;

impl CustomLawModel for PowerLaw {
    fn defaults(&self) -> LawParams {
        LawParams::from([
            ("A".to_string(), 1.0),
            ("n".to_string(), 1.0),
            ("T0".to_string(), 298.15),
        ])
    }
    fn check_coeffparams(&self, params: &LawParams) -> Result<(), KinError> {
        if !(params["T0"] > 0.0) {
            return Err(KinError::InvalidParameter(format!(
                "T0 = {}: non-positive reference temperature is prohibited.",
                params["T0"]
            )));
        }
        Ok(())
    }
    fn kernel(&self, params: &LawParams, state: &RateState) -> f64 {
        params["A"] * (state.T_or_default() / params["T0"]).powf(params["n"])
    }
}

/// NASA-7 records (two ranges) of the H2/O2 example species
fn h2_o2_thermo() -> serde_json::Value {
    json!({
        "H": {"Cp": [200.0, 1000.0, 3500.0,
            2.5, 7.05332819e-13, -1.99591964e-15, 2.30081632e-18,
            -9.27732332e-22, 25473.6599, -0.446682853,
            2.50000001, -2.30842973e-11, 1.61561948e-14, -4.73515235e-18,
            4.98197357e-22, 25473.6599, -0.446682914]},
        "O": {"Cp": [200.0, 1000.0, 3500.0,
            3.1682671, -3.27931884e-03, 6.64306396e-06, -6.12806624e-09,
            2.11265971e-12, 29122.2592, 2.05193346,
            2.56942078, -8.59741137e-05, 4.19484589e-08, -1.00177799e-11,
            1.22833691e-15, 29217.5791, 4.78433864]},
        "H2": {"Cp": [200.0, 1000.0, 3500.0,
            2.34433112, 7.98052075e-03, -1.9478151e-05, 2.01572094e-08,
            -7.37611761e-12, -917.935173, 0.683010238,
            3.3372792, -4.94024731e-05, 4.99456778e-07, -1.79566394e-10,
            2.00255376e-14, -950.158922, -3.20502331]},
        "OH": {"Cp": [200.0, 1000.0, 3500.0,
            3.99201543, -2.40131752e-03, 4.61793841e-06, -3.88113333e-09,
            1.3641147e-12, 3615.08056, -0.103925458,
            3.09288767, 5.48429716e-04, 1.26505228e-07, -8.79461556e-11,
            1.17412376e-14, 3858.657, 4.4766961]}
    })
}

pub fn kin_examples(kintask: usize) -> Result<(), KinError> {
    match kintask {
        0 => {
            // RATE COEFFICIENTS OF A SINGLE REACTION
            let registry = LawRegistry::new();
            let record = ReactionRecord::new("reaction01")
                .law("modArrhenius", &[("A", 3.87e4), ("b", 2.7), ("E", 26191.0)])
                .units(&[("A", "cm3/mol/s"), ("E", "J/mol")])
                .reactants(&[("H2", 1.0), ("O", 1.0)])
                .products(&[("H", 1.0), ("OH", 1.0)]);
            let reaction = Reaction::new(record, &registry)?;
            println!("{}", reaction);
            println!("k(1000 K) = {:e}", reaction.K_const(1000.0)?);
            let k_values = reaction.rate_coefficients_for_T_range(500.0, 2500.0, 5)?;
            println!("k for T = 500, 900, ... 2100 K: {:?}", k_values);
            if let Some(k_sym) = reaction.K_expr() {
                println!("symbolic k(T) = {}", k_sym);
                let k_fun = k_sym.lambdify1D();
                println!("k(1000 K) from the symbolic form = {:e}", k_fun(1000.0));
            }
        }
        1 => {
            // USER LAWS IN THE REGISTRY
            let mut registry = LawRegistry::new();
            registry.register("power", LawKind::Custom(Arc::new(PowerLaw)))?;
            if let Err(e) = registry.register("Arrhenius", LawKind::Constant) {
                println!("as expected: {}", e);
            }
            let record = ReactionRecord::new("r1")
                .law("power", &[("A", 2.0), ("n", 0.5)])
                .reactants(&[("A", 1.0)])
                .products(&[("B", 1.0)]);
            let reaction = Reaction::new(record, &registry)?;
            println!("k(1192.6 K) = {}", reaction.K_const(1192.6)?);
            println!("laws: {:?}", registry.names());
            registry.reset();
            println!("laws after reset: {:?}", registry.names());
        }
        2 => {
            // IRREVERSIBLE SYSTEM: PROGRESS AND NET SPECIES RATES
            let registry = LawRegistry::new();
            let r1 = ReactionRecord::new("r1")
                .law("Constant", &[("k", 10.0)])
                .reactants(&[("A", 1.0), ("B", 2.0)])
                .products(&[("C", 1.0)]);
            let r2 = ReactionRecord::new("r2")
                .law("Constant", &[("k", 10.0)])
                .reactants(&[("C", 2.0)])
                .products(&[("A", 1.0), ("B", 2.0)]);
            let reactions = vec![Reaction::new(r1, &registry)?, Reaction::new(r2, &registry)?];
            let options =
                SystemOptions::default().with_concentrations(&[("A", 1.0), ("B", 2.0), ("C", 1.0)]);
            let system = ReactionSystem::new(reactions, options)?;
            println!("{}", system);
            println!("species: {:?}", system.species());
            println!("stoichiometry of reactants: {}", system.stoichiometry_reactants());
            println!("progress rates: {}", system.progress_rates()?);
            println!("net species rates: {:?}", system.net_species_rates_map()?);
            system.rates_table()?.printstd();
            system.species_rates_table()?.printstd();
        }
        3 => {
            // REVERSIBLE SYSTEM WITH NASA THERMO DATA
            let registry = LawRegistry::new();
            let thermo = NASAbase::from_serde(h2_o2_thermo())?;
            let record = ReactionRecord::new("reaction01")
                .reversible(true)
                .law("modArrhenius", &[("A", 3.87e4), ("b", 2.7), ("E", 26191.0)])
                .reactants(&[("H2", 1.0), ("O", 1.0)])
                .products(&[("H", 1.0), ("OH", 1.0)]);
            let reaction = Reaction::new(record, &registry)?;
            let options = SystemOptions::default()
                .with_thermo(Arc::new(thermo))
                .with_T(1500.0)
                .with_concentrations(&[("H", 1e-3), ("H2", 1.0), ("O", 1e-2), ("OH", 1e-3)]);
            let mut system = ReactionSystem::new(vec![reaction], options)?;
            for T in [800.0, 1500.0, 2500.0] {
                system.set_temperature(T)?;
                let (kf, kb) = system.forward_backward_rate_coefficients()?;
                println!("T = {} K: kf = {:e}, kb = {:e}", T, kf[0], kb[0]);
            }
            system.rates_table()?.printstd();
            system.species_rates_table()?.printstd();
        }
        _ => {
            println!("Invalid task number");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_run() {
        for task in 0..4 {
            kin_examples(task).unwrap();
        }
    }
}
