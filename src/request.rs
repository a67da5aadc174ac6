use std::collections::HashSet;

use crate::error::LabspecError;

/// Sliver type of a declared node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliverType {
    /// Exclusive bare-metal machine.
    RawPc,
    /// Shared Xen virtual machine.
    XenVm,
}

impl SliverType {
    /// Wire name used in the emitted specification.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RawPc => "raw-pc",
            Self::XenVm => "emulab-xen",
        }
    }

    /// Raw PCs are allocated exclusively; Xen VMs share their host.
    pub fn exclusive(&self) -> bool {
        matches!(self, Self::RawPc)
    }
}

/// Command run on the node once it boots.
#[derive(Debug, Clone)]
pub struct ExecuteService {
    pub shell: String,
    pub command: String,
}

/// Archive fetched and unpacked onto the node before startup commands run.
#[derive(Debug, Clone)]
pub struct InstallService {
    pub url: String,
    pub path: String,
}

/// A single compute-node declaration within a request.
#[derive(Debug, Clone)]
pub struct Node {
    pub client_id: String,
    pub sliver: SliverType,
    /// Opaque image identifier, interpreted by the provisioning system.
    pub disk_image: Option<String>,
    pub hardware_type: Option<String>,
    pub routable_ip: bool,
    pub execute: Vec<ExecuteService>,
    pub install: Vec<InstallService>,
}

impl Node {
    fn new(client_id: &str, sliver: SliverType) -> Self {
        Self {
            client_id: client_id.to_string(),
            sliver,
            disk_image: None,
            hardware_type: None,
            routable_ip: false,
            execute: Vec::new(),
            install: Vec::new(),
        }
    }
}

/// Ordered container of node declarations for one resource request.
///
/// Nodes serialize in declaration order, so building the same request
/// twice yields the same document.
#[derive(Debug, Clone, Default)]
pub struct Request {
    nodes: Vec<Node>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an exclusive bare-metal node.
    pub fn raw_pc(&mut self, client_id: &str) -> Result<&mut Node, LabspecError> {
        self.add_node(client_id, SliverType::RawPc)
    }

    /// Declare a shared Xen VM node.
    pub fn xen_vm(&mut self, client_id: &str) -> Result<&mut Node, LabspecError> {
        self.add_node(client_id, SliverType::XenVm)
    }

    fn add_node(
        &mut self,
        client_id: &str,
        sliver: SliverType,
    ) -> Result<&mut Node, LabspecError> {
        validate_client_id(client_id)?;
        if self.nodes.iter().any(|n| n.client_id == client_id) {
            return Err(LabspecError::DuplicateNode {
                name: client_id.to_string(),
            });
        }
        self.nodes.push(Node::new(client_id, sliver));
        Ok(self.nodes.last_mut().expect("node was just pushed"))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-check request invariants before serialization.
    ///
    /// Node names must be unique and well-formed; a set disk image must be
    /// non-empty. Whether the identifier names a real image is up to the
    /// provisioning system.
    pub fn validate(&self) -> Result<(), LabspecError> {
        if self.nodes.is_empty() {
            return Err(LabspecError::Validation {
                message: "request declares no nodes".into(),
            });
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            validate_client_id(&node.client_id)?;
            if !seen.insert(node.client_id.as_str()) {
                return Err(LabspecError::DuplicateNode {
                    name: node.client_id.clone(),
                });
            }

            if let Some(ref image) = node.disk_image
                && image.is_empty()
            {
                return Err(LabspecError::Validation {
                    message: format!(
                        "node '{}' has an empty disk image identifier",
                        node.client_id
                    ),
                });
            }

            for svc in &node.execute {
                if svc.command.is_empty() {
                    return Err(LabspecError::Validation {
                        message: format!(
                            "node '{}' has an execute service with no command",
                            node.client_id
                        ),
                    });
                }
            }
            for svc in &node.install {
                if svc.url.is_empty() {
                    return Err(LabspecError::Validation {
                        message: format!(
                            "node '{}' has an install service with no url",
                            node.client_id
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Node names end up as XML attribute values, so keep them to a safe charset.
fn validate_client_id(name: &str) -> Result<(), LabspecError> {
    let valid = !name.is_empty()
        && name.chars().next().unwrap().is_ascii_alphanumeric()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
    if !valid {
        return Err(LabspecError::Validation {
            message: format!("node name must match [a-zA-Z0-9][a-zA-Z0-9._-]* (got '{name}')"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_pc_is_exclusive() {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        assert_eq!(node.sliver.name(), "raw-pc");
        assert!(node.sliver.exclusive());
    }

    #[test]
    fn xen_vm_is_shared() {
        let mut request = Request::new();
        let node = request.xen_vm("vm1").unwrap();
        assert_eq!(node.sliver.name(), "emulab-xen");
        assert!(!node.sliver.exclusive());
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut request = Request::new();
        request.raw_pc("node1").unwrap();
        let err = request.raw_pc("node1").unwrap_err();
        assert!(matches!(err, LabspecError::DuplicateNode { name } if name == "node1"));
    }

    #[test]
    fn duplicate_across_sliver_types_rejected() {
        let mut request = Request::new();
        request.raw_pc("node1").unwrap();
        assert!(request.xen_vm("node1").is_err());
    }

    #[test]
    fn node_fields_are_settable_through_builder_ref() {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        node.disk_image = Some("urn:example".into());
        node.hardware_type = Some("d430".into());
        assert_eq!(request.nodes()[0].disk_image.as_deref(), Some("urn:example"));
        assert_eq!(request.nodes()[0].hardware_type.as_deref(), Some("d430"));
    }

    #[test]
    fn valid_names() {
        for name in ["node1", "worker-2", "n.a", "N_01", "a"] {
            validate_client_id(name).unwrap();
        }
    }

    #[test]
    fn invalid_names() {
        for name in ["", "-bad", ".bad", "_bad", "a b", "n<x>", "n&m", "a/b"] {
            assert!(
                validate_client_id(name).is_err(),
                "expected name '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn empty_request_fails_validation() {
        let request = Request::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_disk_image_fails_validation() {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        node.disk_image = Some(String::new());
        assert!(request.validate().is_err());
    }

    #[test]
    fn unset_disk_image_passes_validation() {
        let mut request = Request::new();
        request.raw_pc("node1").unwrap();
        request.validate().unwrap();
    }

    #[test]
    fn empty_execute_command_fails_validation() {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        node.execute.push(ExecuteService {
            shell: "sh".into(),
            command: String::new(),
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn nodes_keep_declaration_order() {
        let mut request = Request::new();
        request.raw_pc("a").unwrap();
        request.xen_vm("b").unwrap();
        request.raw_pc("c").unwrap();
        let names: Vec<&str> = request.nodes().iter().map(|n| n.client_id.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
