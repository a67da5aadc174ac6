use std::path::PathBuf;

use inquire::validator::Validation;
use inquire::{Confirm, Text};

use crate::error::LabspecError;
use crate::profile;

// ── starter state ────────────────────────────────────────

struct StarterProfile {
    node_name: String,
    disk_image: String,
}

// ── public entry point ───────────────────────────────────

pub fn run(defaults: bool) -> Result<(), LabspecError> {
    let output_path = PathBuf::from("labspec.toml");

    if output_path.exists() {
        if defaults {
            return Err(LabspecError::Validation {
                message: "labspec.toml already exists (use interactive mode to overwrite)".into(),
            });
        }
        let overwrite = Confirm::new("labspec.toml already exists. Overwrite?")
            .with_default(false)
            .prompt()
            .map_err(map_inquire_err)?;
        if !overwrite {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let starter = if defaults {
        default_starter()
    } else {
        run_prompts()?
    };

    let toml = generate_toml(&starter);
    std::fs::write(&output_path, &toml).map_err(|e| LabspecError::ConfigWrite {
        path: output_path.display().to_string(),
        source: e,
    })?;

    println!("Created labspec.toml");
    println!("Run `labspec generate --config labspec.toml` to emit the specification.");
    Ok(())
}

// ── defaults ─────────────────────────────────────────────

fn default_starter() -> StarterProfile {
    StarterProfile {
        node_name: profile::DEFAULT_NODE_NAME.into(),
        disk_image: profile::DEFAULT_DISK_IMAGE.into(),
    }
}

// ── prompts ──────────────────────────────────────────────

fn run_prompts() -> Result<StarterProfile, LabspecError> {
    let node_name = Text::new("Node name:")
        .with_default(profile::DEFAULT_NODE_NAME)
        .with_validator(|input: &str| {
            if input.is_empty() {
                Ok(Validation::Invalid("Name cannot be empty".into()))
            } else if !input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
            {
                Ok(Validation::Invalid(
                    "Use only alphanumeric, dot, dash, or underscore".into(),
                ))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .map_err(map_inquire_err)?;

    let disk_image = Text::new("Disk image identifier:")
        .with_default(profile::DEFAULT_DISK_IMAGE)
        .with_help_message("Opaque identifier understood by the provisioning system")
        .with_validator(|input: &str| {
            if input.is_empty() {
                Ok(Validation::Invalid("Disk image cannot be empty".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .map_err(map_inquire_err)?;

    Ok(StarterProfile {
        node_name,
        disk_image,
    })
}

// ── TOML generation ──────────────────────────────────────

fn generate_toml(starter: &StarterProfile) -> String {
    let mut out = String::new();

    out.push_str("[[nodes]]\n");
    out.push_str(&format!("name = \"{}\"\n", starter.node_name));
    out.push_str(&format!("disk_image = \"{}\"\n", starter.disk_image));
    out.push('\n');

    // commented-out hints
    out.push_str("# kind = \"xen-vm\"\n");
    out.push_str("# hardware_type = \"d430\"\n");
    out.push_str("# routable_ip = true\n");
    out.push_str("#\n");
    out.push_str("# [[nodes.execute]]\n");
    out.push_str("# command = \"/local/setup.sh\"\n");
    out.push_str("#\n");
    out.push_str("# [tour]\n");
    out.push_str("# description = \"What this profile provides.\"\n");
    out.push_str("# instructions = \"How to log in and use it.\"\n");

    out
}

// ── error mapping ────────────────────────────────────────

fn map_inquire_err(e: inquire::InquireError) -> LabspecError {
    match e {
        inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted => {
            LabspecError::InitCancelled
        }
        other => LabspecError::Validation {
            message: format!("prompt error: {other}"),
        },
    }
}

// ── tests ────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_toml_default_round_trips() {
        let starter = default_starter();
        let toml = generate_toml(&starter);

        // Must parse back as a valid profile description
        let parsed: crate::config::ProfileConfig = facet_toml::from_str(&toml).unwrap();
        crate::config::validate_config(&parsed).unwrap();
        assert_eq!(parsed.nodes.len(), 1);
        assert_eq!(parsed.nodes[0].name, profile::DEFAULT_NODE_NAME);
        assert_eq!(parsed.nodes[0].disk_image, profile::DEFAULT_DISK_IMAGE);
    }

    #[test]
    fn generate_toml_uses_custom_values() {
        let starter = StarterProfile {
            node_name: "worker".into(),
            disk_image: "urn:example:image".into(),
        };
        let toml = generate_toml(&starter);
        assert!(toml.contains("name = \"worker\""));
        assert!(toml.contains("disk_image = \"urn:example:image\""));
    }

    #[test]
    fn generate_toml_keeps_hints_commented() {
        let toml = generate_toml(&default_starter());
        let parsed: crate::config::ProfileConfig = facet_toml::from_str(&toml).unwrap();
        assert!(parsed.tour.is_none());
        assert!(parsed.nodes[0].execute.is_empty());
    }
}
