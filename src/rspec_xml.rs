use crate::error::LabspecError;
use crate::request::{Node, Request};
use crate::tour_xml::{self, Tour};

const RSPEC_XMLNS: &str = "http://www.geni.net/resources/rspec/3";
const XSI_XMLNS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://www.geni.net/resources/rspec/3 http://www.geni.net/resources/rspec/3/request.xsd";

/// Generate a v3 request specification document from a request.
///
/// Output is deterministic: nodes serialize in declaration order and the
/// envelope carries no timestamps.
pub fn generate_rspec_xml(
    request: &Request,
    tour: Option<&Tour>,
) -> Result<String, LabspecError> {
    let mut body = String::new();

    if let Some(tour) = tour {
        let fragment = tour_xml::generate_tour_xml(tour)?;
        body.push_str(&indent(strip_declaration(&fragment), 2));
        body.push('\n');
    }

    for node in request.nodes() {
        body.push_str(&node_xml(node));
    }

    Ok(format!(
        r#"<rspec xmlns="{RSPEC_XMLNS}" xmlns:xsi="{XSI_XMLNS}" xsi:schemaLocation="{SCHEMA_LOCATION}" type="request">
{body}</rspec>
"#
    ))
}

fn node_xml(node: &Node) -> String {
    let client_id = &node.client_id;
    let sliver = node.sliver.name();
    let exclusive = node.sliver.exclusive();

    let mut inner = String::new();

    match node.disk_image {
        Some(ref image) => {
            let image = escape_attr(image);
            inner.push_str(&format!(
                "    <sliver_type name=\"{sliver}\">\n      <disk_image name=\"{image}\"/>\n    </sliver_type>\n"
            ));
        }
        None => {
            inner.push_str(&format!("    <sliver_type name=\"{sliver}\"/>\n"));
        }
    }

    if let Some(ref hw) = node.hardware_type {
        let hw = escape_attr(hw);
        inner.push_str(&format!("    <hardware_type name=\"{hw}\"/>\n"));
    }

    if node.routable_ip {
        inner.push_str("    <routable_control_ip/>\n");
    }

    if !node.execute.is_empty() || !node.install.is_empty() {
        inner.push_str("    <services>\n");
        for svc in &node.install {
            inner.push_str(&format!(
                "      <install url=\"{}\" install_path=\"{}\"/>\n",
                escape_attr(&svc.url),
                escape_attr(&svc.path)
            ));
        }
        for svc in &node.execute {
            inner.push_str(&format!(
                "      <execute shell=\"{}\" command=\"{}\"/>\n",
                escape_attr(&svc.shell),
                escape_attr(&svc.command)
            ));
        }
        inner.push_str("    </services>\n");
    }

    format!("  <node client_id=\"{client_id}\" exclusive=\"{exclusive}\">\n{inner}  </node>\n")
}

/// Escape a string for use as an XML attribute value. Service commands and
/// image identifiers are caller-supplied and may contain markup characters.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

// The tour fragment is embedded mid-document; facet-xml may prepend an
// XML declaration, which is only legal at the top of a document.
fn strip_declaration(xml: &str) -> &str {
    let trimmed = xml.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<?xml")
        && let Some(end) = rest.find("?>")
    {
        return rest[end + 2..].trim_start();
    }
    trimmed
}

fn indent(fragment: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    fragment
        .trim_end()
        .lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ExecuteService;

    fn one_node_request() -> Request {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        node.disk_image = Some("urn:publicid:IDN+emulab.net+image+UBUNTU20-64-STD".into());
        request
    }

    #[test]
    fn xml_contains_envelope() {
        let xml = generate_rspec_xml(&one_node_request(), None).unwrap();
        assert!(xml.starts_with("<rspec "));
        assert!(xml.contains(r#"type="request""#));
        assert!(xml.contains(RSPEC_XMLNS));
        assert!(xml.trim_end().ends_with("</rspec>"));
    }

    #[test]
    fn xml_contains_node_declaration() {
        let xml = generate_rspec_xml(&one_node_request(), None).unwrap();
        assert!(xml.contains(r#"<node client_id="node1" exclusive="true">"#));
        assert!(xml.contains(r#"<sliver_type name="raw-pc">"#));
        assert!(xml.contains(
            r#"<disk_image name="urn:publicid:IDN+emulab.net+image+UBUNTU20-64-STD"/>"#
        ));
    }

    #[test]
    fn xml_has_exactly_one_node() {
        let xml = generate_rspec_xml(&one_node_request(), None).unwrap();
        assert_eq!(xml.matches("<node ").count(), 1);
    }

    #[test]
    fn xen_vm_is_not_exclusive() {
        let mut request = Request::new();
        request.xen_vm("vm1").unwrap();
        let xml = generate_rspec_xml(&request, None).unwrap();
        assert!(xml.contains(r#"<node client_id="vm1" exclusive="false">"#));
        assert!(xml.contains(r#"<sliver_type name="emulab-xen"/>"#));
    }

    #[test]
    fn hardware_type_and_routable_ip_serialize() {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        node.hardware_type = Some("d430".into());
        node.routable_ip = true;
        let xml = generate_rspec_xml(&request, None).unwrap();
        assert!(xml.contains(r#"<hardware_type name="d430"/>"#));
        assert!(xml.contains("<routable_control_ip/>"));
    }

    #[test]
    fn services_serialize_with_escaping() {
        let mut request = Request::new();
        let node = request.raw_pc("node1").unwrap();
        node.execute.push(ExecuteService {
            shell: "sh".into(),
            command: "echo \"a < b\" && touch /done".into(),
        });
        let xml = generate_rspec_xml(&request, None).unwrap();
        assert!(xml.contains("<services>"));
        assert!(xml.contains(
            r#"<execute shell="sh" command="echo &quot;a &lt; b&quot; &amp;&amp; touch /done"/>"#
        ));
    }

    #[test]
    fn nodes_serialize_in_declaration_order() {
        let mut request = Request::new();
        request.raw_pc("a").unwrap();
        request.raw_pc("b").unwrap();
        let xml = generate_rspec_xml(&request, None).unwrap();
        let a = xml.find(r#"client_id="a""#).unwrap();
        let b = xml.find(r#"client_id="b""#).unwrap();
        assert!(a < b);
    }

    #[test]
    fn output_is_byte_identical_across_calls() {
        let first = generate_rspec_xml(&one_node_request(), None).unwrap();
        let second = generate_rspec_xml(&one_node_request(), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tour_is_embedded_inside_envelope() {
        let tour = Tour {
            description: "One node.".into(),
            instructions: "ssh in.".into(),
        };
        let xml = generate_rspec_xml(&one_node_request(), Some(&tour)).unwrap();
        let tour_pos = xml.find("rspec_tour").unwrap();
        let node_pos = xml.find("<node ").unwrap();
        assert!(tour_pos < node_pos);
        assert!(!xml.contains("<?xml"));
    }

    #[test]
    fn escape_attr_passes_plain_urns_through() {
        let urn = "urn:publicid:IDN+emulab.net+image+UBUNTU20-64-STD";
        assert_eq!(escape_attr(urn), urn);
    }
}
