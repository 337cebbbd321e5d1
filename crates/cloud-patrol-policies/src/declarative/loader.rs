//! DTO → validated entry conversion.

use cloud_patrol_core::{ResourceKind, Severity};

use super::config_dto::{AllowedValuesDto, DeclarativeConfigDto};

/// Errors during DTO → entry conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A required string field is empty.
    #[error("{context}: `{field}` must not be empty")]
    EmptyField {
        /// Where the error occurred (e.g., "allowed-values[0]").
        context: String,
        /// The empty field.
        field: &'static str,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Two entries share a name.
    #[error("duplicate allowed-values policy `{name}`")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },
}

/// A validated `[[allowed-values]]` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedValuesSpec {
    /// Policy name.
    pub name: String,
    /// Kind the policy applies to.
    pub kind: ResourceKind,
    /// Dotted attribute path.
    pub attribute: String,
    /// Accepted values, non-empty.
    pub values: Vec<String>,
    /// Severity of reported violations.
    pub severity: Severity,
    /// Documentation link; empty when not given.
    pub link: String,
    /// Description; empty when not given.
    pub description: String,
    /// Custom message replacing the generated one.
    pub message: Option<String>,
}

/// Converts a `DeclarativeConfigDto` to validated entries.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<Vec<AllowedValuesSpec>, LoadError> {
    let specs = dto
        .allowed_values
        .into_iter()
        .enumerate()
        .map(|(i, d)| convert_allowed_values(d, i))
        .collect::<Result<Vec<_>, _>>()?;

    for (i, spec) in specs.iter().enumerate() {
        if specs[..i].iter().any(|other| other.name == spec.name) {
            return Err(LoadError::DuplicateName {
                name: spec.name.clone(),
            });
        }
    }
    Ok(specs)
}

fn convert_allowed_values(
    dto: AllowedValuesDto,
    index: usize,
) -> Result<AllowedValuesSpec, LoadError> {
    let ctx = format!("allowed-values[{index}]");
    for (field, value) in [
        ("name", &dto.name),
        ("kind", &dto.kind),
        ("attribute", &dto.attribute),
    ] {
        if value.trim().is_empty() {
            return Err(LoadError::EmptyField {
                context: ctx,
                field,
            });
        }
    }
    if dto.values.is_empty() {
        return Err(LoadError::EmptyField {
            context: ctx,
            field: "values",
        });
    }
    let severity = parse_severity(&dto.severity, &ctx)?;

    Ok(AllowedValuesSpec {
        name: dto.name,
        kind: ResourceKind::new(dto.kind),
        attribute: dto.attribute,
        values: dto.values,
        severity,
        link: dto.link.unwrap_or_default(),
        description: dto.description.unwrap_or_default(),
        message: dto.message,
    })
}

fn parse_severity(value: &str, context: &str) -> Result<Severity, LoadError> {
    match value {
        "error" => Ok(Severity::Error),
        "warning" => Ok(Severity::Warning),
        "info" => Ok(Severity::Info),
        _ => Err(LoadError::UnknownSeverity {
            context: context.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str) -> AllowedValuesDto {
        AllowedValuesDto {
            name: name.to_string(),
            kind: "AWS::S3::Bucket".to_string(),
            attribute: "region".to_string(),
            values: vec!["eu-west-1".to_string()],
            severity: "warning".to_string(),
            link: None,
            description: None,
            message: None,
        }
    }

    fn load_one(entry: AllowedValuesDto) -> Result<Vec<AllowedValuesSpec>, LoadError> {
        load(DeclarativeConfigDto {
            allowed_values: vec![entry],
        })
    }

    #[test]
    fn test_converts_valid_entry() {
        let specs = load_one(dto("Regions")).unwrap();
        assert_eq!(specs[0].severity, Severity::Warning);
        assert_eq!(specs[0].kind, ResourceKind::from_static("AWS::S3::Bucket"));
        assert!(specs[0].link.is_empty());
    }

    #[test]
    fn test_rejects_unknown_severity() {
        let mut entry = dto("Regions");
        entry.severity = "fatal".to_string();
        let err = load_one(entry).unwrap_err();
        assert!(
            matches!(err, LoadError::UnknownSeverity { ref value, .. } if value == "fatal")
        );
    }

    #[test]
    fn test_rejects_empty_values() {
        let mut entry = dto("Regions");
        entry.values.clear();
        let err = load_one(entry).unwrap_err();
        assert!(matches!(err, LoadError::EmptyField { field: "values", .. }));
    }

    #[test]
    fn test_rejects_blank_attribute() {
        let mut entry = dto("Regions");
        entry.attribute = "  ".to_string();
        let err = load_one(entry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "allowed-values[0]: `attribute` must not be empty"
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = load(DeclarativeConfigDto {
            allowed_values: vec![dto("Regions"), dto("Regions")],
        })
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateName { .. }));
    }
}
