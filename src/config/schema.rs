use crate::filter::FilterSpec;
use crate::sections::ObjectHeaders;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Contents of a `raws-query.toml` file.
///
/// ```toml
/// [meta]
/// name = "my mod"
///
/// [[sections]]
/// header = "ITEM"
/// objects = ["ITEM_AMMO", "ITEM_WEAPON"]
///
/// [queries.dog]
/// pretty = "CREATURE:DOG"
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct QueryConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
    #[serde(default)]
    pub queries: BTreeMap<String, FilterSpec>,
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for section in &self.sections {
            if section.header.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    context: None,
                    field: "sections.header",
                });
                continue;
            }
            if section.objects.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    context: Some(section.header.clone()),
                    field: "sections.objects",
                });
            }
            for object in &section.objects {
                if object.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        context: Some(section.header.clone()),
                        field: "sections.objects[]",
                    });
                    continue;
                }
                if let Some(previous) = owners.insert(object, &section.header) {
                    if previous != section.header {
                        issues.push(ValidationIssue::DuplicateObject {
                            object: object.clone(),
                            first: previous.to_string(),
                            second: section.header.clone(),
                        });
                    }
                }
            }
        }

        for (name, spec) in &self.queries {
            if spec.is_empty() {
                issues.push(ValidationIssue::EmptyQuery { name: name.clone() });
                continue;
            }
            if let Err(err) = spec.build() {
                issues.push(ValidationIssue::InvalidQuery {
                    name: name.clone(),
                    message: err.to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// The section table: built-in object types (unless
    /// `meta.replace_builtin_sections`) with `[[sections]]` applied on top.
    pub fn classifier(&self) -> ObjectHeaders {
        let mut table = if self.meta.replace_builtin_sections {
            ObjectHeaders::empty()
        } else {
            ObjectHeaders::default()
        };
        for section in &self.sections {
            table.insert(section.header.as_str(), section.objects.iter().map(String::as_str));
        }
        table
    }

    pub fn query(&self, name: &str) -> Option<&FilterSpec> {
        self.queries.get(name)
    }

    /// Closest configured query name, for "did you mean" hints.
    pub fn suggest_query(&self, name: &str) -> Option<&str> {
        self.queries
            .keys()
            .map(|candidate| {
                let score = strsim::normalized_damerau_levenshtein(name, candidate);
                (candidate, score)
            })
            .filter(|(_, score)| *score >= 0.6)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate.as_str())
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Start the section table empty instead of from the built-in object
    /// types.
    #[serde(default)]
    pub replace_builtin_sections: bool,
}

/// Object types that share a header.
#[derive(Debug, Deserialize, Clone)]
pub struct SectionDefinition {
    pub header: String,
    #[serde(default)]
    pub objects: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField {
        context: Option<String>,
        field: &'static str,
    },
    DuplicateObject {
        object: String,
        first: String,
        second: String,
    },
    EmptyQuery {
        name: String,
    },
    InvalidQuery {
        name: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { context, field } => match context {
                Some(header) => write!(f, "section '{header}' missing required field '{field}'"),
                None => write!(f, "section missing required field '{field}'"),
            },
            ValidationIssue::DuplicateObject {
                object,
                first,
                second,
            } => write!(
                f,
                "object type '{object}' declared under both '{first}' and '{second}'"
            ),
            ValidationIssue::EmptyQuery { name } => {
                write!(f, "query '{name}' has no criteria")
            }
            ValidationIssue::InvalidQuery { name, message } => {
                write!(f, "query '{name}' is invalid: {message}")
            }
        }
    }
}
