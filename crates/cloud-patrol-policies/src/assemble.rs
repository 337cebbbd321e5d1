//! Pack assembly from configuration.

use crate::declarative::{self, LoadPoliciesError};
use crate::{instance_type, required_tags, Ec2InstanceType, Preset, RequiredTags};
use cloud_patrol_core::{Config, PolicyError, PolicyPack};
use tracing::debug;

/// Errors raised while turning configuration into a pack.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// The configured preset does not exist.
    #[error("unknown preset `{name}`, expected one of: {}", known_presets())]
    UnknownPreset {
        /// The configured name.
        name: String,
    },

    /// A configurable policy rejected its settings.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The `[[allowed-values]]` sections are invalid.
    #[error("invalid declarative policies: {0}")]
    Declarative(#[from] LoadPoliciesError),
}

fn known_presets() -> String {
    Preset::ALL
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the policy pack described by a configuration.
///
/// Order: preset policies, then configurable built-ins whose
/// `[policies.<name>]` section is present, then declarative policies from
/// `raw_toml` (the text `config` was parsed from; pass `""` for none).
/// Any policy whose section sets `enabled = false` is left out.
///
/// # Errors
///
/// Returns an error for an unknown preset, a misconfigured policy, or
/// invalid declarative entries.
pub fn build_pack(config: &Config, raw_toml: &str) -> Result<PolicyPack, AssemblyError> {
    let preset = match config.preset.as_deref() {
        Some(name) => Preset::from_name(name).ok_or_else(|| AssemblyError::UnknownPreset {
            name: name.to_string(),
        })?,
        None => Preset::default(),
    };

    let mut pack = PolicyPack::new();
    pack.extend(
        preset
            .policies()
            .into_iter()
            .filter(|p| config.is_policy_enabled(p.name())),
    );

    if let Some(section) = config.policy(instance_type::NAME) {
        if config.is_policy_enabled(instance_type::NAME) {
            pack.add(Ec2InstanceType::from_policy_config(section)?);
        }
    }
    if let Some(section) = config.policy(required_tags::NAME) {
        if config.is_policy_enabled(required_tags::NAME) {
            pack.add(RequiredTags::from_policy_config(section)?);
        }
    }

    let declared = declarative::load_policies_from_toml(raw_toml)?;
    pack.extend(
        declared
            .into_iter()
            .filter(|p| config.is_policy_enabled(p.name())),
    );

    debug!("Assembled pack from preset {preset}: {:?}", pack.names());
    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(toml: &str) -> Result<PolicyPack, AssemblyError> {
        let config = Config::parse(toml).unwrap();
        build_pack(&config, toml)
    }

    #[test]
    fn test_defaults_to_aws_preset() {
        let pack = assemble("").unwrap();
        assert_eq!(pack.names(), vec!["Bucket Versioning", "Bucket Encryption"]);
    }

    #[test]
    fn test_full_configuration() {
        let toml = r#"
preset = "minimal"

[policies.Ec2InstanceType]
instance_classes = ["t3"]

[policies."Required Tags"]
tags = ["owner"]

[[allowed-values]]
name = "Approved Regions"
kind = "AWS::S3::Bucket"
attribute = "region"
values = ["eu-west-1"]
"#;
        let pack = assemble(toml).unwrap();
        assert_eq!(
            pack.names(),
            vec![
                "Bucket Encryption",
                "Ec2InstanceType",
                "Required Tags",
                "Approved Regions"
            ]
        );
    }

    #[test]
    fn test_disabled_policies_are_left_out() {
        let toml = r#"
[policies."Bucket Versioning"]
enabled = false

[policies.Ec2InstanceType]
enabled = false

[policies."Approved Regions"]
enabled = false

[[allowed-values]]
name = "Approved Regions"
kind = "AWS::S3::Bucket"
attribute = "region"
values = ["eu-west-1"]
"#;
        let pack = assemble(toml).unwrap();
        assert_eq!(pack.names(), vec!["Bucket Encryption"]);
    }

    #[test]
    fn test_unknown_preset() {
        let err = assemble("preset = \"aws-strict\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown preset `aws-strict`, expected one of: aws-defaults, minimal, none"
        );
    }

    #[test]
    fn test_misconfigured_policy() {
        let err = assemble("[policies.Ec2InstanceType]\ninstance_classes = []\n").unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::Policy(PolicyError::Misconfigured { .. })
        ));
    }
}
