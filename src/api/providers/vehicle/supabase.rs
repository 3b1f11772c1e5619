//! PostgREST-backed vehicle lookup

use async_trait::async_trait;
use serde::Deserialize;

use super::VehicleProvider;
use crate::api::error::ApiError;
use crate::api::providers::supabase::{
    error_from_response, ErrorBody, SupabaseClient, PGRST_NO_ROWS, PROVIDER_NAME,
};
use crate::checkin::plate::Plate;
use crate::checkin::vehicle::{string_or_number, CustomerData, VehicleData};

/// Ask PostgREST for a single object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Looks up `vehicles_table` rows by `placa`, embedding the customer relation
pub struct SupabaseVehicleProvider {
    client: SupabaseClient,
    vehicles_table: String,
    customers_table: String,
}

#[derive(Debug, Deserialize)]
struct VehicleRow {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    placa: String,
    #[serde(default)]
    marca: Option<String>,
    #[serde(default)]
    modelo: Option<String>,
    #[serde(default)]
    ano: Option<i32>,
    #[serde(default)]
    cor: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    cliente_id: String,
    /// Embedded relation, keyed by the customers table name
    #[serde(flatten)]
    relations: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    nome: String,
    #[serde(default)]
    telefone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    endereco: Option<String>,
}

impl From<CustomerRow> for CustomerData {
    fn from(row: CustomerRow) -> Self {
        CustomerData {
            id: row.id,
            name: row.nome,
            phone: row.telefone.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            address: row.endereco.unwrap_or_default(),
        }
    }
}

impl SupabaseVehicleProvider {
    pub fn new(
        client: SupabaseClient,
        vehicles_table: impl Into<String>,
        customers_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            vehicles_table: vehicles_table.into(),
            customers_table: customers_table.into(),
        }
    }

    /// `select` parameter embedding the customer columns the wizard shows
    fn select_clause(&self) -> String {
        format!(
            "*,{}(id,nome,telefone,email,endereco)",
            self.customers_table
        )
    }

    /// Turn a PostgREST response into a vehicle or a classified error
    fn map_response(
        &self,
        status: u16,
        body: &str,
        plate: &Plate,
    ) -> Result<VehicleData, ApiError> {
        match status {
            200..=299 => {
                let row: VehicleRow = serde_json::from_str(body).map_err(|e| {
                    ApiError::network(PROVIDER_NAME, format!("Invalid vehicle response: {}", e))
                })?;
                Ok(self.vehicle_from_row(row))
            }
            406 => {
                if ErrorBody::parse(body).code_str() == Some(PGRST_NO_ROWS) {
                    Err(ApiError::not_found(PROVIDER_NAME, plate.as_str()))
                } else {
                    Err(error_from_response(status, body))
                }
            }
            _ => Err(error_from_response(status, body)),
        }
    }

    fn vehicle_from_row(&self, mut row: VehicleRow) -> VehicleData {
        let customer = row
            .relations
            .remove(&self.customers_table)
            .filter(|v| !v.is_null())
            .and_then(|v| match serde_json::from_value::<CustomerRow>(v) {
                Ok(c) => Some(CustomerData::from(c)),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed customer relation");
                    None
                }
            });

        VehicleData {
            id: row.id,
            plate: row.placa,
            brand: row.marca,
            model: row.modelo,
            year: row.ano,
            color: row.cor,
            customer_id: row.cliente_id,
            customer,
        }
    }
}

#[async_trait]
impl VehicleProvider for SupabaseVehicleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn find_by_plate(&self, plate: &Plate) -> Result<VehicleData, ApiError> {
        let url = self.client.rest_url(&self.vehicles_table);
        let placa_filter = format!("eq.{}", plate.as_str());

        tracing::debug!(plate = %plate, table = %self.vehicles_table, "Looking up vehicle");

        let response = self
            .client
            .get(&url, None)
            .header("Accept", SINGLE_OBJECT)
            .query(&[
                ("select", self.select_clause().as_str()),
                ("placa", placa_filter.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        self.map_response(status, &body, plate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn provider() -> SupabaseVehicleProvider {
        let client =
            SupabaseClient::new("http://localhost:54321", "anon", Duration::from_secs(1)).unwrap();
        SupabaseVehicleProvider::new(client, "veiculos", "clientes")
    }

    fn plate() -> Plate {
        Plate::parse("ABC1234").unwrap()
    }

    #[test]
    fn test_select_clause() {
        assert_eq!(
            provider().select_clause(),
            "*,clientes(id,nome,telefone,email,endereco)"
        );
    }

    #[test]
    fn test_maps_row_with_customer() {
        let body = r#"{
            "id": 7,
            "placa": "ABC1234",
            "marca": "Fiat",
            "modelo": "Uno",
            "ano": 2012,
            "cor": null,
            "cliente_id": 3,
            "created_at": "2024-01-01T00:00:00Z",
            "clientes": {
                "id": 3,
                "nome": "Maria Souza",
                "telefone": "11999990000",
                "email": null,
                "endereco": null
            }
        }"#;

        let vehicle = provider().map_response(200, body, &plate()).unwrap();

        assert_eq!(vehicle.id, "7");
        assert_eq!(vehicle.customer_id, "3");
        assert_eq!(vehicle.year, Some(2012));
        assert_eq!(vehicle.color, None);
        let customer = vehicle.customer.unwrap();
        assert_eq!(customer.name, "Maria Souza");
        assert_eq!(customer.phone, "11999990000");
        assert_eq!(customer.email, "");
        assert_eq!(customer.address, "");
    }

    #[test]
    fn test_missing_relation_leaves_customer_empty() {
        let body = r#"{"id":"v1","placa":"ABC1234","cliente_id":"c1","clientes":null}"#;
        let vehicle = provider().map_response(200, body, &plate()).unwrap();
        assert!(vehicle.customer.is_none());
    }

    #[test]
    fn test_no_rows_is_not_found() {
        let body = r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        let err = provider().map_response(406, body, &plate()).unwrap_err();
        assert_eq!(err, ApiError::not_found(PROVIDER_NAME, "ABC1234"));
    }

    #[test]
    fn test_other_errors_keep_backend_message() {
        let body = r#"{"code":"42P01","message":"relation \"public.veiculos\" does not exist"}"#;
        let err = provider().map_response(404, body, &plate()).unwrap_err();
        assert!(!err.is_not_found());

        let err = provider().map_response(500, body, &plate()).unwrap_err();
        assert_eq!(err.message(), "relation \"public.veiculos\" does not exist");

        let err = provider().map_response(401, r#"{"message":"Invalid API key"}"#, &plate()).unwrap_err();
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_malformed_body_is_network_error() {
        let err = provider().map_response(200, "[]", &plate()).unwrap_err();
        assert!(matches!(err, ApiError::NetworkError { .. }));
    }
}
