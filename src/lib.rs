//! # KiRates
//!
//! Reaction-rate kinetics of networks of elementary reactions:
//! rate-coefficient laws (constant, Arrhenius, modified Arrhenius and user laws),
//! equilibrium constants from NASA-7 fits for reversible reactions,
//! stoichiometry matrices, progress rates and net species production rates.
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Kinetics;
#[allow(non_snake_case)]
pub mod Thermodynamics;
#[allow(non_snake_case)]
pub mod Utils;
#[allow(non_snake_case)]
pub mod cli;
pub mod settings;
