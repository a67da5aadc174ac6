use std::collections::HashSet;
use std::path::Path;

use facet::Facet;

use crate::error::LabspecError;

/// Parsed profile description: the nodes to request, plus optional tour text.
#[derive(Debug, Clone, Facet)]
pub struct ProfileConfig {
    pub nodes: Vec<NodeConfig>,
    #[facet(default)]
    pub tour: Option<TourConfig>,
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct NodeConfig {
    pub name: String,
    /// "raw-pc" for an exclusive bare-metal node, "xen-vm" for a shared VM.
    #[facet(default = "raw-pc")]
    pub kind: String,
    pub disk_image: String,
    pub hardware_type: Option<String>,
    #[facet(default)]
    pub routable_ip: bool,
    #[facet(default)]
    pub execute: Vec<ExecuteConfig>,
    #[facet(default)]
    pub install: Vec<InstallConfig>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: "raw-pc".into(),
            disk_image: String::new(),
            hardware_type: None,
            routable_ip: false,
            execute: Vec::new(),
            install: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct ExecuteConfig {
    #[facet(default = "sh")]
    pub shell: String,
    pub command: String,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            shell: "sh".into(),
            command: String::new(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct InstallConfig {
    pub url: String,
    #[facet(default = "/")]
    pub path: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            path: "/".into(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
pub struct TourConfig {
    pub description: String,
    #[facet(default)]
    pub instructions: String,
}

// ── validation ────────────────────────────────────────────

pub fn validate_config(config: &ProfileConfig) -> Result<(), LabspecError> {
    if config.nodes.is_empty() {
        return Err(LabspecError::Validation {
            message: "profile must declare at least one node".into(),
        });
    }

    let mut seen = HashSet::new();
    for (idx, node) in config.nodes.iter().enumerate() {
        let label = format!("nodes[{idx}]");

        if node.name.is_empty() {
            return Err(LabspecError::Validation {
                message: format!("{label}: name is required"),
            });
        }
        if !seen.insert(node.name.as_str()) {
            return Err(LabspecError::Validation {
                message: format!("duplicate node name '{}'", node.name),
            });
        }

        match node.kind.as_str() {
            "raw-pc" | "xen-vm" => {}
            other => {
                return Err(LabspecError::Validation {
                    message: format!(
                        "{label}: unknown node kind '{other}' (use raw-pc or xen-vm)"
                    ),
                });
            }
        }

        if node.disk_image.is_empty() {
            return Err(LabspecError::Validation {
                message: format!("{label}: disk_image is required"),
            });
        }

        for (i, exec) in node.execute.iter().enumerate() {
            if exec.command.is_empty() {
                return Err(LabspecError::Validation {
                    message: format!("{label}.execute[{i}]: command is required"),
                });
            }
        }
        for (i, install) in node.install.iter().enumerate() {
            if install.url.is_empty() {
                return Err(LabspecError::Validation {
                    message: format!("{label}.install[{i}]: url is required"),
                });
            }
            if !install.path.starts_with('/') {
                return Err(LabspecError::Validation {
                    message: format!(
                        "{label}.install[{i}]: path must be absolute (got '{}')",
                        install.path
                    ),
                });
            }
        }
    }

    if let Some(ref tour) = config.tour
        && tour.description.is_empty()
    {
        return Err(LabspecError::Validation {
            message: "tour description cannot be empty".into(),
        });
    }

    Ok(())
}

// ── public API ────────────────────────────────────────────

pub fn load_config(path: &Path) -> Result<ProfileConfig, LabspecError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LabspecError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })?;

    let config: ProfileConfig =
        facet_toml::from_str(&contents).map_err(|e| LabspecError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    validate_config(&config)?;

    tracing::debug!(path = %path.display(), nodes = config.nodes.len(), "profile description loaded");

    Ok(config)
}
