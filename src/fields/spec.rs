// src/fields/spec.rs

//! The target vocabulary: which canonical fields exist, which header texts
//! name them and what their values look like. Built once at startup and
//! shared read-only with every pipeline stage.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};
use tracing::debug;

use super::pattern::{Matcher, ValuePattern};
use super::Field;

/// One entry of the vocabulary as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub field: Field,
    pub aliases: Vec<String>,
    #[serde(default)]
    pub pattern: Option<ValuePattern>,
}

impl FieldDef {
    pub fn new(field: Field, aliases: &[&str], pattern: Option<ValuePattern>) -> Self {
        Self {
            field,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            pattern,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FieldSpecFile {
    fields: Vec<FieldDef>,
}

#[derive(Debug, Clone)]
struct CompiledField {
    field: Field,
    matcher: Option<Matcher>,
}

/// Validated, compiled vocabulary.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    fields: Vec<CompiledField>,
    /// normalized alias -> field
    aliases: HashMap<String, Field>,
}

impl FieldSpec {
    /// Validate and compile `defs`. Any problem here is a fatal configuration error.
    pub fn new(defs: Vec<FieldDef>) -> Result<Self> {
        if defs.is_empty() {
            bail!("field spec is empty");
        }

        let mut seen = HashSet::new();
        let mut aliases = HashMap::new();
        let mut fields = Vec::with_capacity(defs.len());

        for def in defs {
            if !seen.insert(def.field) {
                bail!("field {} is defined more than once", def.field);
            }
            if def.aliases.is_empty() {
                bail!("field {} has no header aliases", def.field);
            }
            for alias in &def.aliases {
                let key = normalize_header(alias);
                if key.is_empty() {
                    bail!("field {} has a blank alias", def.field);
                }
                if let Some(other) = aliases.insert(key.clone(), def.field) {
                    if other != def.field {
                        bail!("alias `{}` is claimed by both {} and {}", key, other, def.field);
                    }
                }
            }
            let matcher = def
                .pattern
                .as_ref()
                .map(ValuePattern::compile)
                .transpose()
                .with_context(|| format!("compiling value pattern for {}", def.field))?;
            fields.push(CompiledField {
                field: def.field,
                matcher,
            });
        }

        debug!(fields = fields.len(), aliases = aliases.len(), "field spec ready");
        Ok(Self { fields, aliases })
    }

    /// Built-in results vocabulary: PLACE, NAME, TEAM, TIME, EVENT_DATE and,
    /// when `with_year` is set, YEAR.
    pub fn standard(with_year: bool) -> Result<Self> {
        let mut defs = standard_defs();
        if with_year {
            defs.insert(2, year_def());
        }
        Self::new(defs)
    }

    /// Load a vocabulary from a JSON file of the form
    /// `{"fields": [{"field": "PLACE", "aliases": ["PL"], "pattern": "place"}]}`.
    pub fn from_json_file(path: impl AsRef<Path>, with_year: bool) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading field spec {:?}", path))?;
        let file: FieldSpecFile =
            serde_json::from_str(&text).with_context(|| format!("parsing field spec {:?}", path))?;
        let mut defs = file.fields;
        if with_year && !defs.iter().any(|d| d.field == Field::Year) {
            defs.push(year_def());
        }
        Self::new(defs).with_context(|| format!("invalid field spec {:?}", path))
    }

    /// Fields in vocabulary order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// Field whose alias set contains this header text, if any.
    pub fn field_for_header(&self, header: &str) -> Option<Field> {
        self.aliases.get(&normalize_header(header)).copied()
    }

    /// Fields that carry a value pattern, in vocabulary order.
    pub fn patterned(&self) -> impl Iterator<Item = (Field, &Matcher)> + '_ {
        self.fields
            .iter()
            .filter_map(|f| f.matcher.as_ref().map(|m| (f.field, m)))
    }
}

/// Uppercase, collapse whitespace, drop trailing `.`/`:`.
pub fn normalize_header(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c| c == '.' || c == ':')
        .trim()
        .to_uppercase()
}

fn standard_defs() -> Vec<FieldDef> {
    vec![
        FieldDef::new(
            Field::Place,
            &["PL", "PLACE", "POS", "POSITION", "RANK", "RANKING"],
            Some(ValuePattern::Place),
        ),
        FieldDef::new(
            Field::Name,
            &["NAME", "ATHLETE", "ATHLETE NAME", "RUNNER", "COMPETITOR"],
            None,
        ),
        FieldDef::new(
            Field::Team,
            &["TEAM", "SCHOOL", "CLUB", "UNIVERSITY", "COLLEGE", "AFFILIATION"],
            None,
        ),
        FieldDef::new(
            Field::Time,
            &["TIME", "RESULT", "FINISH", "MARK", "PERFORMANCE", "FINAL TIME"],
            Some(ValuePattern::Time),
        ),
        FieldDef::new(
            Field::EventDate,
            &["DATE", "EVENT DATE", "MEET DATE", "COMPETITION DATE"],
            Some(ValuePattern::Date),
        ),
    ]
}

fn year_def() -> FieldDef {
    FieldDef::new(
        Field::Year,
        &["YEAR", "YR", "CLASS", "GRADE"],
        Some(ValuePattern::ClassYear),
    )
}
