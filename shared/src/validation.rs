//! Validation utilities for the Warehouse Management Platform
//!
//! Field-level rules for document headers and items. Helpers return the
//! offending field name so callers can surface field-level errors.

use uuid::Uuid;

use crate::models::{DocumentItemInput, SpgInput, SpgItemInput};

/// Header fields required when the SPG type is IMPORT. Returns the names
/// of the missing fields, empty when the header is complete.
pub fn missing_import_header_fields(input: &SpgInput) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if is_blank(&input.container_number) {
        missing.push("container_number");
    }
    if is_blank(&input.vehicle_number) {
        missing.push("vehicle_number");
    }
    if is_blank(&input.start_unload) {
        missing.push("start_unload");
    }
    if is_blank(&input.finish_load) {
        missing.push("finish_load");
    }
    missing
}

/// Item fields required when the SPG type is IMPORT.
pub fn missing_import_item_fields(item: &SpgItemInput) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if is_blank(&item.inn) {
        missing.push("inn");
    }
    if is_blank(&item.out) {
        missing.push("out");
    }
    if is_blank(&item.pjg) {
        missing.push("pjg");
    }
    if is_blank(&item.warehouse_size) {
        missing.push("warehouse_size");
    }
    if is_blank(&item.packaging_weight) {
        missing.push("packaging_weight");
    }
    if is_blank(&item.warehouse_weight) {
        missing.push("warehouse_weight");
    }
    if is_blank(&item.production_code) {
        missing.push("production_code");
    }
    if is_blank(&item.packaging_size) {
        missing.push("packaging_size");
    }
    missing
}

/// A transfer must move stock between two distinct warehouses.
pub fn validate_transfer_warehouses(
    source_warehouse_id: Uuid,
    destination_warehouse_id: Uuid,
) -> Result<(), &'static str> {
    if source_warehouse_id == destination_warehouse_id {
        return Err("destination_warehouse_id");
    }
    Ok(())
}

/// An SJ addressed to a customer needs a customer reference; one addressed
/// to a non-customer needs the free-text recipient instead. Returns the
/// offending field on violation.
pub fn validate_sj_recipient(
    is_customer: bool,
    customer_id: Option<Uuid>,
    non_customer_name: Option<&str>,
) -> Result<(), &'static str> {
    let has_name = non_customer_name.map(|n| !n.trim().is_empty()).unwrap_or(false);
    if is_customer {
        if customer_id.is_none() {
            return Err("customer_id");
        }
        if has_name {
            return Err("non_customer_name");
        }
    } else {
        if !has_name {
            return Err("non_customer_name");
        }
        if customer_id.is_some() {
            return Err("customer_id");
        }
    }
    Ok(())
}

/// Every document needs at least one line item, and quantities may not
/// be negative.
pub fn validate_document_items(items: &[DocumentItemInput]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("items");
    }
    for item in items {
        if item.carton_quantity < 0 || item.pack_quantity < 0 {
            return Err("items");
        }
    }
    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spg_input(container: Option<&str>) -> SpgInput {
        SpgInput {
            document_type: crate::models::SpgType::Import,
            warehouse_id: Uuid::new_v4(),
            container_number: container.map(String::from),
            vehicle_number: Some("B 9021 KK".into()),
            sj_number: None,
            start_unload: Some("08:00".into()),
            finish_load: Some("10:30".into()),
            transaction_date: None,
            items: vec![],
        }
    }

    #[test]
    fn import_header_missing_fields_are_named() {
        let missing = missing_import_header_fields(&spg_input(None));
        assert_eq!(missing, vec!["container_number"]);

        let missing = missing_import_header_fields(&spg_input(Some("  ")));
        assert_eq!(missing, vec!["container_number"]);

        assert!(missing_import_header_fields(&spg_input(Some("TCLU-204"))).is_empty());
    }

    #[test]
    fn transfer_rejects_same_warehouse() {
        let w = Uuid::new_v4();
        assert!(validate_transfer_warehouses(w, w).is_err());
        assert!(validate_transfer_warehouses(w, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn sj_recipient_rules() {
        let customer = Uuid::new_v4();
        assert!(validate_sj_recipient(true, Some(customer), None).is_ok());
        assert_eq!(validate_sj_recipient(true, None, None), Err("customer_id"));
        assert_eq!(
            validate_sj_recipient(true, Some(customer), Some("Toko A")),
            Err("non_customer_name")
        );
        assert!(validate_sj_recipient(false, None, Some("Toko A")).is_ok());
        assert_eq!(
            validate_sj_recipient(false, None, None),
            Err("non_customer_name")
        );
        assert_eq!(
            validate_sj_recipient(false, Some(customer), Some("Toko A")),
            Err("customer_id")
        );
    }

    #[test]
    fn document_items_must_exist_and_be_non_negative() {
        assert!(validate_document_items(&[]).is_err());
        let good = DocumentItemInput {
            product_id: Uuid::new_v4(),
            carton_quantity: 1,
            pack_quantity: 0,
        };
        assert!(validate_document_items(&[good.clone()]).is_ok());
        let bad = DocumentItemInput {
            carton_quantity: -1,
            ..good
        };
        assert!(validate_document_items(&[bad]).is_err());
    }
}
