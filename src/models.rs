//! Wire types shared between the API layer and the UI.

use serde::Deserialize;

/// One upload destination returned by `GET /stores`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub id: i64,
    pub name: String,
}

/// Success envelope returned by the ASN upload endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadResult {
    pub order: Order,
}

/// Server-side order record created from a validated ASN file.
///
/// Everything here is display-only; the client never recomputes totals or
/// interprets the server's own status strings.
// Full wire shape is kept even though the detail screen renders a subset.
#[allow(dead_code)]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub asn_id: String,
    #[serde(default)]
    pub name: String,
    /// Server-side lifecycle status string (distinct from task status).
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub scanned: i64,
    #[serde(default)]
    pub store_id: i64,
    /// Monetary values arrive as strings and are passed through untouched.
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub paid: String,
    #[serde(default)]
    pub cases: i64,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub order_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default, rename = "DispensaryId")]
    pub dispensary_id: i64,
}

/// One product entry within an order. Opaque pass-through data.
// GTIN/uom/scanned columns are modeled but not rendered.
#[allow(dead_code)]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub sub_total: f64,
    #[serde(default)]
    pub batch_lot: String,
    #[serde(default, rename = "caseGTIN")]
    pub case_gtin: String,
    #[serde(default, rename = "eachGTIN")]
    pub each_gtin: String,
    #[serde(default, rename = "barcodeGTIN")]
    pub barcode_gtin: String,
    #[serde(default)]
    pub cases_scanned: i64,
    #[serde(default)]
    pub units_scanned: i64,
    #[serde(default)]
    pub uom_conversion: f64,
    #[serde(default)]
    pub uom_conversion_quantity: f64,
    #[serde(default)]
    pub packaged_on_date: String,
}

/// Rejection payload attached to a failed upload.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    #[serde(default)]
    pub details: Vec<ValidationDetail>,
}

/// One field-level diagnostic inside a validation error.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ValidationDetail {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub description: String,
}

impl ValidationError {
    /// Wrap a bare message (transport failures, unstructured bodies).
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: vec![],
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.details.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} ({} detail(s))", self.message, self.details.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_parses_server_field_names() {
        let body = serde_json::json!({
            "id": 12,
            "asnId": "ASN-0012",
            "name": "weekly shipment",
            "status": "pending",
            "quantity": 40,
            "scanned": 0,
            "storeId": 3,
            "cost": "149.50",
            "paid": "0.00",
            "cases": 4,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z",
            "DispensaryId": 7,
            "items": [{
                "sku": "SKU-1",
                "name": "Widget",
                "brand": "Acme",
                "price": 2.5,
                "quantity": 10,
                "subTotal": 25.0,
                "batchLot": "B-77",
                "caseGTIN": "00012345",
                "eachGTIN": "00012346",
                "barcodeGTIN": "00012347",
                "casesScanned": 0,
                "unitsScanned": 0,
                "uomConversion": 1.0,
                "uomConversionQuantity": 1.0,
                "packagedOnDate": "2024-04-28"
            }]
        });
        let order: Order = serde_json::from_value(body).unwrap();
        assert_eq!(order.asn_id, "ASN-0012");
        assert_eq!(order.store_id, 3);
        assert_eq!(order.dispensary_id, 7);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].batch_lot, "B-77");
        assert_eq!(order.items[0].sub_total, 25.0);
    }

    #[test]
    fn validation_error_parses_with_and_without_details() {
        let with: ValidationError = serde_json::from_value(serde_json::json!({
            "message": "invalid file",
            "details": [{"field": "sku", "description": "row 3: unknown SKU"}]
        }))
        .unwrap();
        assert_eq!(with.details.len(), 1);
        assert_eq!(with.details[0].field, "sku");

        let without: ValidationError =
            serde_json::from_value(serde_json::json!({"message": "invalid file"})).unwrap();
        assert!(without.details.is_empty());
        assert_eq!(without.to_string(), "invalid file");
    }
}
