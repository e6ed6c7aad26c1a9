//! Bulk-seed import of program requirements from a flat CSV export.
//!
//! One row per requirement. A row without a subject declares a program that has no
//! subject requirements (only the points threshold).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::info;

use super::requirements::domain::{
    Grade, OrGroupId, Program, ProgramId, ProgramRequirementSet, RequirementId,
    RequirementRecord, SubjectId, SubjectLevel, DEFAULT_MIN_IB_POINTS,
};
use super::requirements::validation::{validate_requirement_set, ValidationError};

#[derive(Debug)]
pub enum SeedImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
    Validation {
        program: ProgramId,
        source: ValidationError,
    },
}

impl std::fmt::Display for SeedImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedImportError::Io(err) => write!(f, "failed to read seed file: {}", err),
            SeedImportError::Csv(err) => write!(f, "invalid seed CSV data: {}", err),
            SeedImportError::InvalidRow { line, reason } => {
                write!(f, "invalid seed row on line {}: {}", line, reason)
            }
            SeedImportError::Validation { program, source } => {
                write!(f, "program {} failed validation: {}", program, source)
            }
        }
    }
}

impl std::error::Error for SeedImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedImportError::Io(err) => Some(err),
            SeedImportError::Csv(err) => Some(err),
            SeedImportError::InvalidRow { .. } => None,
            SeedImportError::Validation { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for SeedImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SeedImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ProgramSeedImporter;

impl ProgramSeedImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Program>, SeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse seed rows into validated programs, in first-appearance order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Program>, SeedImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut programs: Vec<ProgramBuilder> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        let headers = csv_reader.headers()?.clone();
        for record in csv_reader.records() {
            let record = record?;
            // Physical line where the record starts; blank lines and quoted newlines count.
            let line = record
                .position()
                .map(|position| position.line() as usize)
                .unwrap_or_default();
            let row: SeedRow = record.deserialize(Some(&headers))?;

            let position = *positions.entry(row.program_id.clone()).or_insert_with(|| {
                programs.push(ProgramBuilder::new(&row.program_id));
                programs.len() - 1
            });
            programs[position].apply(row, line)?;
        }

        let programs = programs
            .into_iter()
            .map(ProgramBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        info!(programs = programs.len(), "imported program seed data");
        Ok(programs)
    }
}

struct ProgramBuilder {
    id: ProgramId,
    name: Option<String>,
    min_ib_points: Option<u8>,
    requirements: Vec<RequirementRecord>,
}

impl ProgramBuilder {
    fn new(program_id: &str) -> Self {
        Self {
            id: ProgramId(program_id.to_string()),
            name: None,
            min_ib_points: None,
            requirements: Vec::new(),
        }
    }

    fn apply(&mut self, row: SeedRow, line: usize) -> Result<(), SeedImportError> {
        if self.name.is_none() {
            self.name = row.program_name.clone();
        }

        if let Some(raw) = row.min_ib_points.as_deref() {
            let points = parse_u8(raw, "min_ib_points", line)?;
            match self.min_ib_points {
                Some(existing) if existing != points => {
                    return Err(invalid(
                        line,
                        format!(
                            "min_ib_points {points} conflicts with earlier value {existing} for {}",
                            self.id
                        ),
                    ));
                }
                _ => self.min_ib_points = Some(points),
            }
        }

        let Some(subject) = row.subject else {
            return Ok(());
        };

        let level = row
            .level
            .as_deref()
            .ok_or_else(|| invalid(line, "level is required when subject is set".to_string()))
            .and_then(|raw| {
                SubjectLevel::parse(raw).map_err(|err| invalid(line, err.to_string()))
            })?;
        let grade = row
            .min_grade
            .as_deref()
            .ok_or_else(|| invalid(line, "min_grade is required when subject is set".to_string()))
            .and_then(|raw| parse_u8(raw, "min_grade", line))
            .and_then(|value| Grade::new(value).map_err(|err| invalid(line, err.to_string())))?;
        let is_critical = match row.critical.as_deref() {
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                invalid(line, format!("critical must be true or false (found '{raw}')"))
            })?,
            None => false,
        };

        self.requirements.push(RequirementRecord {
            id: RequirementId(format!("{}-{}", self.id, self.requirements.len() + 1)),
            subject_id: SubjectId(subject),
            required_level: level,
            min_grade: grade,
            is_critical,
            or_group_id: row.or_group.map(OrGroupId),
        });
        Ok(())
    }

    fn build(self) -> Result<Program, SeedImportError> {
        let requirements = ProgramRequirementSet {
            min_ib_points: self.min_ib_points.unwrap_or(DEFAULT_MIN_IB_POINTS),
            requirements: self.requirements,
        };
        validate_requirement_set(&requirements).map_err(|source| SeedImportError::Validation {
            program: self.id.clone(),
            source,
        })?;

        Ok(Program {
            name: self.name.unwrap_or_else(|| self.id.0.clone()),
            id: self.id,
            requirements,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    program_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    program_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_ib_points: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    subject: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_grade: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    critical: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    or_group: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_u8(raw: &str, field: &str, line: usize) -> Result<u8, SeedImportError> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| invalid(line, format!("{field} must be a whole number (found '{raw}')")))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(line: usize, reason: String) -> SeedImportError {
    SeedImportError::InvalidRow { line, reason }
}
