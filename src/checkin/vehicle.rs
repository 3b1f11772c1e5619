//! Vehicle and customer records returned by a plate lookup

use serde::{Deserialize, Deserializer, Serialize};

/// Customer that owns a vehicle (read-only projection of backend data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
}

/// Vehicle found by plate, with its customer when the relation is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleData {
    pub id: String,
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "marca", default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(rename = "modelo", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "cor", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "cliente_id")]
    pub customer_id: String,
    #[serde(rename = "cliente", default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerData>,
}

impl VehicleData {
    /// One-line description such as "Fiat Uno 2012 (Prata)"
    pub fn description(&self) -> String {
        let mut parts: Vec<String> = [&self.brand, &self.model]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect();
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        let mut description = parts.join(" ");
        if let Some(color) = self.color.as_deref().filter(|c| !c.trim().is_empty()) {
            if description.is_empty() {
                description = color.to_string();
            } else {
                description.push_str(&format!(" ({})", color));
            }
        }
        description
    }
}

/// Accept identifiers serialized either as JSON strings or numbers.
///
/// Backend tables may use text/uuid or bigint primary keys.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Unsigned(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Unsigned(n) => n.to_string(),
    })
}
