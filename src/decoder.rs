use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::report::{
    DeviceInfo, FieldValue, Outcome, Report, Section, SectionResult, SectionState,
};

/// Decode a complete diagnostic payload into an immutable [`Report`].
///
/// Only called once the poller has observed completion, so any missing
/// block or unrecognized code here is a protocol contract violation — the
/// decode aborts with a `SchemaError` naming the offending path, never a
/// partial report.
pub fn decode(payload: &Value) -> Result<Report, SchemaError> {
    let dev = object(payload, "Dev")?;
    let device = DeviceInfo {
        serial: text(dev, "Dev", "sn")?,
        mac: text(dev, "Dev", "mac")?,
        model: text(dev, "Dev", "mode")?,
        firmware: text(dev, "Dev", "swVer")?,
        build: text(dev, "Dev", "build")?,
        ip_address: text(dev, "Dev", "ipaddr")?,
    };

    let res = object(payload, "Res")?;

    let mut sections = BTreeMap::new();
    sections.insert(Section::Power, decode_power(object(res, "Res.PoE")?)?);
    sections.insert(Section::Link, decode_link(object(res, "Res.Link")?)?);
    sections.insert(
        Section::Neighbor,
        decode_neighbor(object(res, "Res.Switch")?)?,
    );
    sections.insert(
        Section::IpConfig,
        decode_ip_config(object(res, "Res.IpConfig")?)?,
    );
    sections.insert(
        Section::Gateway,
        decode_gateway(object(res, "Res.Router")?)?,
    );
    sections.insert(Section::Internet, decode_internet(object(res, "Res.WWW")?)?);

    Ok(Report { device, sections })
}

fn decode_power(poe: &Value) -> Result<SectionResult, SchemaError> {
    let mut fields = BTreeMap::new();
    fields.insert("voltage", FieldValue::Text(text(poe, "Res.PoE", "voltage")?));
    section_result(poe, "PoE", fields)
}

fn decode_link(link: &Value) -> Result<SectionResult, SchemaError> {
    let mut fields = BTreeMap::new();
    for (name, key) in [
        ("rx_pair", "rxPair"),
        ("advertised_speed", "advSpeed"),
        ("advertised_duplex", "advDuplex"),
        ("actual_speed", "actSpeed"),
        ("actual_duplex", "actDuplex"),
        ("polarity", "polarity"),
    ] {
        fields.insert(name, FieldValue::Text(text(link, "Res.Link", key)?));
    }
    section_result(link, "Link", fields)
}

fn decode_neighbor(switch: &Value) -> Result<SectionResult, SchemaError> {
    let mut fields = BTreeMap::new();
    for (name, key) in [
        ("type", "type"),
        ("name", "name"),
        ("vlan", "vlan"),
        ("voice_vlan", "vvlan"),
        ("model", "model"),
        ("address", "addr"),
    ] {
        fields.insert(name, FieldValue::Text(text(switch, "Res.Switch", key)?));
    }
    // The port arrives as a comma-separated alias list, short form first
    // (e.g. "Gi0/3,GigabitEthernet0/3"). All aliases are kept; picking the
    // most-specific one is the display layer's call.
    let port = text(switch, "Res.Switch", "port")?;
    fields.insert(
        "port",
        FieldValue::List(port.split(',').map(|s| s.trim().to_string()).collect()),
    );
    section_result(switch, "Switch", fields)
}

fn decode_ip_config(ip: &Value) -> Result<SectionResult, SchemaError> {
    let mut fields = BTreeMap::new();
    fields.insert("type", FieldValue::Text(text(ip, "Res.IpConfig", "type")?));
    fields.insert(
        "address",
        FieldValue::Text(text(ip, "Res.IpConfig", "addr")?),
    );
    fields.insert("subnet", FieldValue::Text(text(ip, "Res.IpConfig", "sub")?));
    fields.insert(
        "server",
        FieldValue::Text(text(ip, "Res.IpConfig", "server")?),
    );
    fields.insert(
        "dns",
        FieldValue::List(text_list(ip, "Res.IpConfig", "dns")?),
    );
    section_result(ip, "IpConfig", fields)
}

fn decode_gateway(router: &Value) -> Result<SectionResult, SchemaError> {
    let mut fields = BTreeMap::new();
    fields.insert(
        "address",
        FieldValue::Text(text(router, "Res.Router", "addr")?),
    );
    fields.insert(
        "probes",
        FieldValue::List(text_list(router, "Res.Router", "connect")?),
    );
    section_result(router, "Router", fields)
}

fn decode_internet(www: &Value) -> Result<SectionResult, SchemaError> {
    let mut fields = BTreeMap::new();
    for (name, key) in [
        ("url", "url"),
        ("address", "addr"),
        ("port", "port"),
        ("type", "type"),
    ] {
        fields.insert(name, FieldValue::Text(text(www, "Res.WWW", key)?));
    }
    fields.insert(
        "probes",
        FieldValue::List(text_list(www, "Res.WWW", "connect")?),
    );
    section_result(www, "WWW", fields)
}

fn section_result(
    section: &Value,
    name: &'static str,
    fields: BTreeMap<&'static str, FieldValue>,
) -> Result<SectionResult, SchemaError> {
    let outcome = match raw_str(section, name, "res")? {
        "ok" => Outcome::Ok,
        "err" => Outcome::Fail,
        other => {
            return Err(SchemaError::UnknownOutcome {
                section: name,
                value: other.to_string(),
            })
        }
    };

    let state = match raw_str(section, name, "status")? {
        "pending" => SectionState::Pending,
        "green" => SectionState::Green,
        "yellow" => SectionState::Yellow,
        "gray" => SectionState::Gray,
        "red" => SectionState::Red,
        other => {
            return Err(SchemaError::UnknownState {
                section: name,
                value: other.to_string(),
            })
        }
    };

    Ok(SectionResult {
        outcome,
        state,
        fields,
    })
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Value, SchemaError> {
    let key = path.rsplit('.').next().unwrap_or(path);
    let inner = value
        .get(key)
        .ok_or_else(|| SchemaError::missing(path))?;
    if !inner.is_object() {
        return Err(SchemaError::NotAnObject {
            path: path.to_string(),
        });
    }
    Ok(inner)
}

fn raw_str<'a>(section: &'a Value, name: &str, key: &str) -> Result<&'a str, SchemaError> {
    section
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SchemaError::missing(format!("Res.{}.{}", name, key)))
}

/// A trimmed, normalized text field.
fn text(block: &Value, path: &str, key: &str) -> Result<String, SchemaError> {
    let raw = block
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SchemaError::missing(format!("{}.{}", path, key)))?;
    Ok(normalize(raw))
}

fn text_list(block: &Value, path: &str, key: &str) -> Result<Vec<String>, SchemaError> {
    let raw = block
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| SchemaError::missing(format!("{}.{}", path, key)))?;
    Ok(raw
        .iter()
        .map(|v| normalize(v.as_str().unwrap_or_default()))
        .collect())
}

/// Trim incidental padding (the device pads some text fields with trailing
/// spaces) and strip leading zeros from zero-padded dotted-quad addresses.
fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if looks_like_ipv4(trimmed) {
        normalize_ipv4(trimmed)
    } else {
        trimmed.to_string()
    }
}

fn looks_like_ipv4(s: &str) -> bool {
    let octets: Vec<&str> = s.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.bytes().all(|b| b.is_ascii_digit()))
}

/// `"172.031.016.052"` → `"172.31.16.52"`. Each octet keeps at least one
/// digit, so `"0.0.0.0"` is unchanged.
fn normalize_ipv4(s: &str) -> String {
    s.split('.')
        .map(|octet| octet.trim_start_matches('0'))
        .map(|octet| if octet.is_empty() { "0" } else { octet })
        .collect::<Vec<_>>()
        .join(".")
}
