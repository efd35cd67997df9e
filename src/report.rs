use serde::Serialize;
use std::collections::BTreeMap;

/// Whether a sub-test executed without a device-side error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Fail,
}

/// Traffic-light state a sub-test settled on. `Gray` is informational only
/// (neighbor discovery has no inherent pass/fail); `Pending` means the
/// device counted the sub-test but it has not produced a meaningful state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    Pending,
    Green,
    Yellow,
    Gray,
    Red,
}

/// The six fixed diagnostic sections, in display order.
///
/// `Ord` follows declaration order, so a `BTreeMap<Section, _>` iterates in
/// display order with no separate ordering table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Power,
    Link,
    Neighbor,
    IpConfig,
    Gateway,
    Internet,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Power,
        Section::Link,
        Section::Neighbor,
        Section::IpConfig,
        Section::Gateway,
        Section::Internet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Power => "Power (PoE)",
            Section::Link => "Link",
            Section::Neighbor => "Nearest switch",
            Section::IpConfig => "IP configuration",
            Section::Gateway => "Gateway",
            Section::Internet => "Internet",
        }
    }
}

/// A section field value. Alias lists (e.g. the neighbor port's short and
/// long interface names) keep every alias; picking one is a display concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// The last entry of a list (the most-specific alias), or the text itself.
    pub fn last(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(items) => items.last().map(String::as_str),
        }
    }
}

/// One sub-test's decoded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionResult {
    pub outcome: Outcome,
    pub state: SectionState,
    pub fields: BTreeMap<&'static str, FieldValue>,
}

impl SectionResult {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Static metadata the tester reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    pub mac: String,
    pub model: String,
    pub firmware: String,
    pub build: String,
    pub ip_address: String,
}

/// The complete, immutable diagnostic result for one test session.
/// Constructed exactly once, from the terminal complete envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub device: DeviceInfo,
    pub sections: BTreeMap<Section, SectionResult>,
}

impl Report {
    pub fn section(&self, section: Section) -> &SectionResult {
        // decode() always populates all six keys
        &self.sections[&section]
    }
}
