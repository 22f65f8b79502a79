use super::cli_examples::examples_menu;
use crate::Kinetics::reaction_system::{Concentrations, ReactionSystem, SystemOptions};
use crate::Utils::load_from_file::load_mechanism;
use crate::settings::{CONFIG_FILE, KineticsConfig};
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io::{self, BufRead, Write};

pub const USAGE: &str = "usage: KiRates <mechanism file> <T> [species=concentration ...] [-v]";

/// one command line run: mechanism file, temperature and concentrations
#[derive(Debug, Clone, PartialEq)]
pub struct CliTask {
    pub mechanism: String,
    pub T: f64,
    pub concentrations: Concentrations,
    pub verbose: bool,
}

pub fn parse_args(args: &[String]) -> Result<CliTask, String> {
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let mut positional = args.iter().filter(|a| *a != "-v" && *a != "--verbose");
    let mechanism = positional
        .next()
        .ok_or_else(|| format!("missing mechanism file\n{}", USAGE))?
        .clone();
    let T_arg = positional
        .next()
        .ok_or_else(|| format!("missing temperature\n{}", USAGE))?;
    let T: f64 = T_arg
        .parse()
        .map_err(|_| format!("temperature '{}' is not a number", T_arg))?;
    let mut concentrations = Concentrations::new();
    for pair in positional {
        let (species, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("'{}' is not of the form species=concentration", pair))?;
        let value: f64 = value
            .parse()
            .map_err(|_| format!("concentration '{}' of {} is not a number", value, species))?;
        concentrations.insert(species.trim().to_string(), value);
    }
    Ok(CliTask {
        mechanism,
        T,
        concentrations,
        verbose,
    })
}

/// builds the system from the task and renders the rate tables; species not given are set to 0
pub fn run_task(task: &CliTask, config: &KineticsConfig) -> Result<String, String> {
    let mechanism = load_mechanism(&task.mechanism)?;
    let registry = config.registry();
    // the thermo cache is filled at the initial T
    let options = SystemOptions::from_config(config).with_T(task.T);
    let mut system = ReactionSystem::from_mechanism(&mechanism, &registry, options, None)
        .map_err(|e| e.to_string())?;
    let species = system.species();
    if let Some(unknown) = task
        .concentrations
        .keys()
        .find(|s| !species.contains(*s))
    {
        return Err(format!("'{}' is not a species of the mechanism", unknown));
    }
    let concentrations: Concentrations = species
        .iter()
        .map(|s| (s.clone(), task.concentrations.get(s).copied().unwrap_or(0.0)))
        .collect();
    system
        .set_concentrations(concentrations)
        .map_err(|e| e.to_string())?;
    info!("{} reactions, {} species at T = {} K", system.len(), species.len(), task.T);

    let reactions = system.rates_table().map_err(|e| e.to_string())?;
    let species_rates = system.species_rates_table().map_err(|e| e.to_string())?;
    Ok(format!("{}\n{}", reactions, species_rates))
}

fn init_logger(level: LevelFilter) {
    // fails only if a logger is already installed
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}

/// entry point of the binary; no arguments opens the interactive menu
pub fn run_cli(args: &[String]) -> Result<(), String> {
    let config = KineticsConfig::load_config(CONFIG_FILE);
    if args.is_empty() {
        init_logger(config.level_filter());
        run_interactive_menu(&config);
        return Ok(());
    }
    let task = parse_args(args)?;
    let level = if task.verbose {
        LevelFilter::Debug
    } else {
        config.level_filter()
    };
    init_logger(level);
    let report = run_task(&task, &config)?;
    println!("{}", report);
    Ok(())
}

pub fn run_interactive_menu(config: &KineticsConfig) {
    loop {
        show_main_menu();
        let Some(choice) = get_user_input() else {
            break;
        };

        match choice.trim() {
            "1" => rates_from_file(config),
            "2" => examples_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn show_main_menu() {
    println!("\x1b[34m\n KiRates: reaction rates of elementary reaction mechanisms \n\x1b[0m");
    println!("\x1b[33m1. Rates from mechanism file\x1b[0m");
    println!("\x1b[33m2. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}

fn rates_from_file(config: &KineticsConfig) {
    print!("\x1b[36mEnter file path, T and concentrations (species=value): \x1b[0m");
    let _ = io::stdout().flush();
    let Some(input) = get_user_input() else {
        return;
    };
    let args: Vec<String> = input.split_whitespace().map(|s| s.to_string()).collect();
    match parse_args(&args).and_then(|task| run_task(&task, config)) {
        Ok(report) => println!("{}", report),
        Err(e) => println!("Error: {}", e),
    }
}

/// one line from `reader`; `None` at end of input or on a read error
fn read_line_from<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input),
    }
}

pub(crate) fn get_user_input() -> Option<String> {
    read_line_from(&mut io::stdin().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let task = parse_args(&args(&["mech.txt", "1000", "H2=1.5", "-v", "O2=0.5"])).unwrap();
        assert_eq!(task.mechanism, "mech.txt");
        assert_eq!(task.T, 1000.0);
        assert!(task.verbose);
        assert_eq!(task.concentrations["H2"], 1.5);
        assert_eq!(task.concentrations.len(), 2);

        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["mech.txt"])).is_err());
        assert!(parse_args(&args(&["mech.txt", "hot"])).is_err());
        assert!(parse_args(&args(&["mech.txt", "300", "H2"])).is_err());
        assert!(parse_args(&args(&["mech.txt", "300", "H2=x"])).is_err());
    }

    #[test]
    fn test_read_line_stops_at_end_of_input() {
        let mut input = io::Cursor::new("1\n0\n");
        assert_eq!(read_line_from(&mut input).as_deref(), Some("1\n"));
        assert_eq!(read_line_from(&mut input).as_deref(), Some("0\n"));
        assert_eq!(read_line_from(&mut input), None);
        assert_eq!(read_line_from(&mut io::Cursor::new("")), None);
    }

    #[test]
    fn test_run_task() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"REACTIONS
[{{"id": "r1", "reversible": "no", "coeffLaw": "Constant", "coeffParams": {{"k": 10.0}},
   "reactants": {{"A": 1, "B": 2}}, "products": {{"C": 1}}}}]
"#
        )
        .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let config = KineticsConfig::default();

        let task = parse_args(&args(&[path.as_str(), "300", "A=1", "B=2"])).unwrap();
        let report = run_task(&task, &config).unwrap();
        assert!(report.contains("r1"));
        assert!(report.contains("4.000000e1"));

        let task = parse_args(&args(&[path.as_str(), "300", "X=1"])).unwrap();
        assert!(run_task(&task, &config).is_err());
        let task = parse_args(&args(&[path.as_str(), "-5"])).unwrap();
        assert!(run_task(&task, &config).is_err());
    }

    #[test]
    fn test_run_task_reversible_above_default_temperature() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"REACTIONS
[{{"id": "r1", "reversible": "yes", "coeffLaw": "Constant", "coeffParams": {{"k": 10.0}},
   "reactants": {{"A": 1}}, "products": {{"B": 1}}}}]
THERMO
{{"A": {{"Cp": [300.0, 5000.0, 3.5, 0.0, 0.0, 0.0, 0.0, -1000.0, 4.0]}},
  "B": {{"Cp": [300.0, 5000.0, 3.0, 1.0e-4, 0.0, 0.0, 0.0, -2000.0, 2.0]}}}}
"#
        )
        .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let config = KineticsConfig::default();
        assert!(config.default_temperature < 300.0);

        let task = parse_args(&args(&[path.as_str(), "1000", "A=1", "B=1"])).unwrap();
        let report = run_task(&task, &config).unwrap();
        assert!(report.contains("r1"));
        assert!(report.contains("A <=> "));

        // outside the NASA range
        let task = parse_args(&args(&[path.as_str(), "6000", "A=1", "B=1"])).unwrap();
        assert!(run_task(&task, &config).is_err());
    }
}
