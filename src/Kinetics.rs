/// error kinds of the rate engine
pub mod errors;
/// laws of the rate coefficient: Constant, Arrhenius, modified Arrhenius, user laws
/// # Examples
/// ```
/// use KiRates::Kinetics::rate_laws::{Arrhenius, RateLawModel, RateState};
/// let law = Arrhenius::new(std::f64::consts::E, 8.314, 8.314).unwrap();
/// let k = law.compute(&RateState::at(1.0), true).unwrap();
/// assert!((k - 1.0).abs() < 1e-12);
/// ```
pub mod rate_laws;
/// built-in and user rate laws by name
pub mod law_registry;
/// elementary reaction: stoichiometry plus a bound rate law
/// # Examples
/// ```
/// use KiRates::Kinetics::law_registry::LawRegistry;
/// use KiRates::Kinetics::reaction::{Reaction, ReactionRecord};
/// let registry = LawRegistry::new();
/// let record = ReactionRecord::new("r1")
///     .law("Arrhenius", &[("A", 1e13), ("E", 2e4)])
///     .reactants(&[("H2", 1.0), ("O2", 1.0)])
///     .products(&[("OH", 2.0)]);
/// let reaction = Reaction::new(record, &registry).unwrap();
/// println!("{}", reaction);
/// println!("k(1000 K) = {}", reaction.K_const(1000.0).unwrap());
/// ```
pub mod reaction;
/// stoichiometry matrices, rate coefficients, progress rates and net species rates of a set of reactions
/// # Examples
/// ```
/// use KiRates::Kinetics::law_registry::LawRegistry;
/// use KiRates::Kinetics::reaction::{Reaction, ReactionRecord};
/// use KiRates::Kinetics::reaction_system::{ReactionSystem, SystemOptions};
/// let registry = LawRegistry::new();
/// let record = ReactionRecord::new("r1")
///     .law("Constant", &[("k", 10.0)])
///     .reactants(&[("A", 1.0), ("B", 2.0)])
///     .products(&[("C", 2.0)]);
/// let reaction = Reaction::new(record, &registry).unwrap();
/// let options = SystemOptions::default().with_concentrations(&[("A", 1.0), ("B", 2.0), ("C", 1.0)]);
/// let system = ReactionSystem::new(vec![reaction], options).unwrap();
/// assert_eq!(system.progress_rates().unwrap()[0], 40.0);
/// ```
pub mod reaction_system;
