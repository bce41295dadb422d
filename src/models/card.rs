use serde::{Deserialize, Serialize};

/// Digital ID card as scraped from the portal.
///
/// JSON keys keep the portal's own vocabulary. Fields the page did not
/// provide are empty strings; a missing photo is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "fotoUrl")]
    pub photo_url: Option<String>,
    #[serde(rename = "curso")]
    pub course: String,
    #[serde(rename = "vinculo")]
    pub affiliation_type: String,
    #[serde(rename = "matricula")]
    pub registration_id: String,
    #[serde(rename = "validade")]
    pub valid_until: String,
}
