//! Profile tour XML generation using facet-xml struct serialization.

use facet::Facet;
use facet_xml as xml;

use crate::error::LabspecError;

/// Tour text shown alongside a profile: what it provides and how to use it.
#[derive(Debug, Clone)]
pub struct Tour {
    pub description: String,
    pub instructions: String,
}

// ── XML model structs ──────────────────────────────────────

#[derive(Debug, Facet)]
#[facet(rename = "rspec_tour")]
struct TourDef {
    #[facet(xml::attribute)]
    xmlns: String,
    description: String,
    instructions: String,
}

const TOUR_XMLNS: &str = "http://www.protogeni.net/resources/rspec/ext/apt-tour/1";

// ── public API ─────────────────────────────────────────────

/// Generate the tour sub-document embedded in a request specification.
pub fn generate_tour_xml(tour: &Tour) -> Result<String, LabspecError> {
    let def = TourDef {
        xmlns: TOUR_XMLNS.into(),
        description: tour.description.clone(),
        instructions: tour.instructions.clone(),
    };

    facet_xml::to_string(&def).map_err(|e| LabspecError::Serialize {
        message: e.to_string(),
    })
}
