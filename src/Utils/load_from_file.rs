use crate::Kinetics::reaction::ReactionRecord;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// content of a mechanism file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MechanismData {
    /// species order from the SPECIES section, if any
    pub species: Option<Vec<String>>,
    pub reactions: Vec<ReactionRecord>,
    /// raw NASA records from the THERMO section, if any
    pub thermo: Option<Value>,
}

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_mechanism(&self) -> Result<MechanismData, String> {
        load_mechanism(&self.file_name)
    }
    pub fn load_reactions(&self) -> Result<Vec<ReactionRecord>, String> {
        let lines = read_lines(&self.file_name)?;
        load_reactions(&lines, &self.file_name)
    }
    pub fn load_species_list(&self) -> Result<Vec<String>, String> {
        let lines = read_lines(&self.file_name)?;
        load_species_list(&lines, &self.file_name)?
            .ok_or_else(|| format!("No 'SPECIES' header found in file '{}'", self.file_name))
    }
}

const REACTION_HEADERS: [&str; 2] = ["REACTIONS", "KINETICS"];
const SPECIES_HEADERS: [&str; 2] = ["SPECIES", "SUBSTANCES"];
const THERMO_HEADERS: [&str; 2] = ["THERMO", "THERMO DATA"];

fn read_lines(file_name: &str) -> Result<Vec<String>, String> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(format!("File '{}' does not exist", file_name));
    }
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Err(format!("Failed to open file '{}': {}", file_name, e)),
    };
    let reader = BufReader::new(file);
    Ok(reader.lines().map_while(Result::ok).collect())
}

/// only known headers end a section: species such as "CO" are all upper case too
fn is_header(line: &str) -> bool {
    let upper = line.trim().to_uppercase();
    REACTION_HEADERS
        .iter()
        .chain(SPECIES_HEADERS.iter())
        .chain(THERMO_HEADERS.iter())
        .any(|h| *h == upper)
}

/// lines between one of `headers` and the next header (or the end of file), as [start, end)
fn find_section(lines: &[String], headers: &[&str]) -> Option<(usize, usize)> {
    let start = lines
        .iter()
        .position(|line| headers.contains(&line.trim().to_uppercase().as_str()))?
        + 1;
    let end = (start..lines.len())
        .find(|&i| is_header(&lines[i]))
        .unwrap_or(lines.len());
    Some((start, end))
}

/// parses a section as JSON; errors point at the line and column in the file
fn parse_section<T: DeserializeOwned>(
    lines: &[String],
    (start, end): (usize, usize),
    what: &str,
    file_name: &str,
) -> Result<T, String> {
    let section = lines[start..end].join("\n");
    match serde_json::from_str::<T>(&section) {
        Ok(data) => {
            info!("Successfully parsed {} from file '{}'", what, file_name);
            Ok(data)
        }
        Err(e) => {
            let error_line = e.line();
            let error_column = e.column();
            // index of the offending line in `lines`
            let actual_line = start + error_line.saturating_sub(1);
            let error_msg = format!(
                "Error parsing {} at line {}, column {} (line {} in file): {}",
                what,
                error_line,
                error_column,
                actual_line + 1,
                e
            );
            error!("{}", error_msg);
            if actual_line < lines.len() {
                let problem_line = &lines[actual_line];
                error!("Problematic line: {}", problem_line);
                if error_column <= problem_line.len() {
                    let pointer = " ".repeat(error_column.saturating_sub(1)) + "^";
                    error!("{}", pointer);
                }
            }
            Err(error_msg)
        }
    }
}

/// reactions as a JSON array of records, or an object `{id: record}`
fn load_reactions(lines: &[String], file_name: &str) -> Result<Vec<ReactionRecord>, String> {
    let section = find_section(lines, &REACTION_HEADERS).ok_or_else(|| {
        format!(
            "No 'REACTIONS' or 'KINETICS' header found in file '{}'",
            file_name
        )
    })?;
    let raw: Value = parse_section(lines, section, "reaction data", file_name)?;
    let records: Vec<Value> = match raw {
        Value::Array(records) => records,
        Value::Object(map) => map
            .into_iter()
            .map(|(id, mut record)| {
                if let Value::Object(fields) = &mut record {
                    fields.entry("id").or_insert(Value::String(id));
                }
                record
            })
            .collect(),
        other => {
            return Err(format!(
                "Reaction data in file '{}' must be an array or an object, got {}",
                file_name, other
            ));
        }
    };
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::from_value::<ReactionRecord>(record).map_err(|e| {
                let msg = format!("Invalid reaction record #{} in file '{}': {}", i, file_name, e);
                error!("{}", msg);
                msg
            })
        })
        .collect()
}

/// species as a JSON array or as a comma separated list
fn load_species_list(lines: &[String], file_name: &str) -> Result<Option<Vec<String>>, String> {
    let Some((start, end)) = find_section(lines, &SPECIES_HEADERS) else {
        return Ok(None);
    };
    let text = lines[start..end].join("\n");
    let species: Vec<String> = if text.trim_start().starts_with('[') {
        parse_section(lines, (start, end), "species list", file_name)?
    } else {
        text.replace('\n', ", ")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    if species.is_empty() {
        return Err(format!("No species found in file '{}'", file_name));
    }
    Ok(Some(species))
}

fn load_thermo(lines: &[String], file_name: &str) -> Result<Option<Value>, String> {
    let Some(section) = find_section(lines, &THERMO_HEADERS) else {
        return Ok(None);
    };
    let thermo: Value = parse_section(lines, section, "thermo data", file_name)?;
    if !thermo.is_object() {
        return Err(format!(
            "Thermo data in file '{}' must be an object of species records",
            file_name
        ));
    }
    Ok(Some(thermo))
}

/// Loads a mechanism file: REACTIONS (or KINETICS) is required, SPECIES and THERMO are optional.
pub fn load_mechanism(file_name: &str) -> Result<MechanismData, String> {
    let lines = read_lines(file_name)?;
    let reactions = load_reactions(&lines, file_name)?;
    let species = load_species_list(&lines, file_name)?;
    let thermo = load_thermo(&lines, file_name)?;

    if reactions.is_empty() {
        warn!("Mechanism file '{}' contains no reactions", file_name);
    }
    if let Some(species) = &species {
        let listed: BTreeSet<&String> = species.iter().collect();
        for record in &reactions {
            for name in record.reactants.keys().chain(record.products.keys()) {
                if !listed.contains(name) {
                    warn!(
                        "species '{}' of reaction '{}' is not in the SPECIES list",
                        name, record.id
                    );
                }
            }
        }
    }
    info!(
        "Loaded mechanism from file '{}': {} reactions",
        file_name,
        reactions.len()
    );
    Ok(MechanismData {
        species,
        reactions,
        thermo,
    })
}
