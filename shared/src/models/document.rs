//! Document type policy and document-number formats
//!
//! Every document family shares the same lifecycle (create, update,
//! soft delete, restore); what differs per family/type is the stock
//! direction, the conditionally-required fields, and the document-number
//! format. The direction tables and the number formats live here so the
//! backend services stay free of per-family special cases.
//!
//! Number formats are an external audit contract: separators, zero
//! padding, and sequence scoping must not change.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Effect a document has on stock balances
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentDirection {
    /// Increases stock at the document's warehouse
    Incoming,
    /// Decreases stock at the document's warehouse
    Outgoing,
    /// Decreases source, increases destination
    Transfer,
    /// No stock effect (SPK)
    None,
}

impl DocumentDirection {
    /// Whether available stock must be verified before the operation.
    /// Incoming documents are never quantity-checked.
    pub fn requires_stock_check(&self) -> bool {
        matches!(self, DocumentDirection::Outgoing | DocumentDirection::Transfer)
    }
}

/// SPG (goods receipt) document types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpgType {
    #[serde(rename = "IMPORT")]
    Import,
    #[serde(rename = "BAWANG")]
    Bawang,
    #[serde(rename = "KAWAT")]
    Kawat,
    #[serde(rename = "LAIN-LAIN")]
    LainLain,
}

impl SpgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpgType::Import => "IMPORT",
            SpgType::Bawang => "BAWANG",
            SpgType::Kawat => "KAWAT",
            SpgType::LainLain => "LAIN-LAIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IMPORT" => Some(SpgType::Import),
            "BAWANG" => Some(SpgType::Bawang),
            "KAWAT" => Some(SpgType::Kawat),
            "LAIN-LAIN" => Some(SpgType::LainLain),
            _ => None,
        }
    }

    /// All SPG types bring goods in.
    pub fn direction(&self) -> DocumentDirection {
        DocumentDirection::Incoming
    }

    /// IMPORT documents require container/unload details on the header
    /// and the extended measurement fields on every item.
    pub fn requires_import_fields(&self) -> bool {
        matches!(self, SpgType::Import)
    }
}

/// SuratLain (miscellaneous movement) document types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SuratLainType {
    #[serde(rename = "STB")]
    Stb,
    #[serde(rename = "SPB")]
    Spb,
    #[serde(rename = "RETUR_PEMBELIAN")]
    ReturPembelian,
    #[serde(rename = "RETUR_PENJUALAN")]
    ReturPenjualan,
}

impl SuratLainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuratLainType::Stb => "STB",
            SuratLainType::Spb => "SPB",
            SuratLainType::ReturPembelian => "RETUR_PEMBELIAN",
            SuratLainType::ReturPenjualan => "RETUR_PENJUALAN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "STB" => Some(SuratLainType::Stb),
            "SPB" => Some(SuratLainType::Spb),
            "RETUR_PEMBELIAN" => Some(SuratLainType::ReturPembelian),
            "RETUR_PENJUALAN" => Some(SuratLainType::ReturPenjualan),
            _ => None,
        }
    }

    /// STB and sales returns bring goods in; SPB and purchase returns
    /// send goods out.
    pub fn direction(&self) -> DocumentDirection {
        match self {
            SuratLainType::Stb | SuratLainType::ReturPenjualan => DocumentDirection::Incoming,
            SuratLainType::Spb | SuratLainType::ReturPembelian => DocumentDirection::Outgoing,
        }
    }

    /// Prefix segment used in the document number.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            SuratLainType::Stb => "STB",
            SuratLainType::Spb => "SPB",
            SuratLainType::ReturPembelian => "RPB",
            SuratLainType::ReturPenjualan => "RPJ",
        }
    }
}

/// A document line item as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_code: String,
    pub carton_quantity: i32,
    pub pack_quantity: i32,
}

/// A document line item as submitted by a caller
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentItemInput {
    pub product_id: Uuid,
    pub carton_quantity: i32,
    pub pack_quantity: i32,
}

// ============================================================================
// Document-number formats
// ============================================================================

/// SPG number: IMPORT uses a year-scoped "YY-NNN/KA" series; the other
/// types use month-scoped "YYYY-MM/SPG[-X]/NNN" series.
pub fn format_spg_number(document_type: SpgType, date: DateTime<Utc>, sequence: i64) -> String {
    match document_type {
        SpgType::Import => format!("{:02}-{:03}/KA", date.year() % 100, sequence),
        SpgType::Bawang => format!("{}-{:02}/SPG-B/{:03}", date.year(), date.month(), sequence),
        SpgType::Kawat => format!("{}-{:02}/SPG-K/{:03}", date.year(), date.month(), sequence),
        SpgType::LainLain => format!("{}-{:02}/SPG/{:03}", date.year(), date.month(), sequence),
    }
}

/// Counter scope for SPG numbers: per year for IMPORT, per (type, month)
/// otherwise.
pub fn spg_sequence_scope(document_type: SpgType, date: DateTime<Utc>) -> String {
    match document_type {
        SpgType::Import => format!("SPG:IMPORT:{}", date.year()),
        other => format!(
            "SPG:{}:{}-{:02}",
            other.as_str(),
            date.year(),
            date.month()
        ),
    }
}

/// SPK number: "YYYY-MM/SPK/NNN", one series per month.
pub fn format_spk_number(date: DateTime<Utc>, sequence: i64) -> String {
    format!("{}-{:02}/SPK/{:03}", date.year(), date.month(), sequence)
}

pub fn spk_sequence_scope(date: DateTime<Utc>) -> String {
    format!("SPK:{}-{:02}", date.year(), date.month())
}

/// Single-letter warehouse code used in SJ numbers.
pub fn sj_warehouse_code(warehouse_name: &str) -> char {
    let upper = warehouse_name.to_uppercase();
    if upper.contains("ROYAL") {
        'R'
    } else if upper.contains("SALEM") {
        'S'
    } else {
        'O'
    }
}

/// SJ number: "YYYY/KA-X/NNN" for customers, "YYYY/KA-SJ-X/NNN"
/// otherwise. One sequence per calendar year across all SJ documents
/// regardless of warehouse or customer flag.
pub fn format_sj_number(
    warehouse_name: &str,
    is_customer: bool,
    date: DateTime<Utc>,
    sequence: i64,
) -> String {
    let code = sj_warehouse_code(warehouse_name);
    if is_customer {
        format!("{}/KA-{}/{:03}", date.year(), code, sequence)
    } else {
        format!("{}/KA-SJ-{}/{:03}", date.year(), code, sequence)
    }
}

pub fn sj_sequence_scope(date: DateTime<Utc>) -> String {
    format!("SJ:{}", date.year())
}

/// Transfer number: "YYYY/TRS/NNN". The visible format carries only the
/// year but the sequence resets monthly, as in the original series.
pub fn format_transfer_number(date: DateTime<Utc>, sequence: i64) -> String {
    format!("{}/TRS/{:03}", date.year(), sequence)
}

pub fn transfer_sequence_scope(date: DateTime<Utc>) -> String {
    format!("TRS:{}-{:02}", date.year(), date.month())
}

/// SuratLain number: "YYYY-MM/{STB|SPB|RPB|RPJ}/NNN", one series per
/// (type, month).
pub fn format_surat_lain_number(
    document_type: SuratLainType,
    date: DateTime<Utc>,
    sequence: i64,
) -> String {
    format!(
        "{}-{:02}/{}/{:03}",
        date.year(),
        date.month(),
        document_type.number_prefix(),
        sequence
    )
}

pub fn surat_lain_sequence_scope(document_type: SuratLainType, date: DateTime<Utc>) -> String {
    format!(
        "SL:{}:{}-{:02}",
        document_type.as_str(),
        date.year(),
        date.month()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn spg_import_number_format() {
        assert_eq!(
            format_spg_number(SpgType::Import, date(2026, 8, 15), 7),
            "26-007/KA"
        );
    }

    #[test]
    fn spg_monthly_number_formats() {
        let d = date(2026, 3, 2);
        assert_eq!(format_spg_number(SpgType::Bawang, d, 1), "2026-03/SPG-B/001");
        assert_eq!(format_spg_number(SpgType::Kawat, d, 12), "2026-03/SPG-K/012");
        assert_eq!(format_spg_number(SpgType::LainLain, d, 120), "2026-03/SPG/120");
    }

    #[test]
    fn spk_number_format() {
        assert_eq!(format_spk_number(date(2025, 11, 30), 45), "2025-11/SPK/045");
    }

    #[test]
    fn sj_warehouse_codes() {
        assert_eq!(sj_warehouse_code("GUDANG ROYAL"), 'R');
        assert_eq!(sj_warehouse_code("Salem Barat"), 'S');
        assert_eq!(sj_warehouse_code("GLB"), 'O');
    }

    #[test]
    fn sj_number_formats() {
        let d = date(2026, 1, 5);
        assert_eq!(format_sj_number("ROYAL 2", true, d, 3), "2026/KA-R/003");
        assert_eq!(format_sj_number("GLB", false, d, 3), "2026/KA-SJ-O/003");
    }

    #[test]
    fn transfer_number_format() {
        assert_eq!(format_transfer_number(date(2026, 6, 1), 9), "2026/TRS/009");
    }

    #[test]
    fn surat_lain_number_formats() {
        let d = date(2026, 8, 20);
        assert_eq!(
            format_surat_lain_number(SuratLainType::Stb, d, 1),
            "2026-08/STB/001"
        );
        assert_eq!(
            format_surat_lain_number(SuratLainType::ReturPembelian, d, 2),
            "2026-08/RPB/002"
        );
        assert_eq!(
            format_surat_lain_number(SuratLainType::ReturPenjualan, d, 30),
            "2026-08/RPJ/030"
        );
        assert_eq!(
            format_surat_lain_number(SuratLainType::Spb, d, 999),
            "2026-08/SPB/999"
        );
    }

    #[test]
    fn sequence_scopes_are_distinct_per_type_and_period() {
        let d = date(2026, 8, 20);
        assert_eq!(spg_sequence_scope(SpgType::Import, d), "SPG:IMPORT:2026");
        assert_eq!(spg_sequence_scope(SpgType::Bawang, d), "SPG:BAWANG:2026-08");
        assert_ne!(
            spg_sequence_scope(SpgType::Bawang, d),
            spg_sequence_scope(SpgType::Kawat, d)
        );
        assert_eq!(sj_sequence_scope(d), "SJ:2026");
        assert_eq!(transfer_sequence_scope(d), "TRS:2026-08");
        assert_ne!(
            surat_lain_sequence_scope(SuratLainType::Stb, d),
            surat_lain_sequence_scope(SuratLainType::ReturPenjualan, d)
        );
    }

    #[test]
    fn surat_lain_directions() {
        assert_eq!(SuratLainType::Stb.direction(), DocumentDirection::Incoming);
        assert_eq!(
            SuratLainType::ReturPenjualan.direction(),
            DocumentDirection::Incoming
        );
        assert_eq!(SuratLainType::Spb.direction(), DocumentDirection::Outgoing);
        assert_eq!(
            SuratLainType::ReturPembelian.direction(),
            DocumentDirection::Outgoing
        );
    }

    #[test]
    fn only_outgoing_and_transfer_require_stock_checks() {
        assert!(!DocumentDirection::Incoming.requires_stock_check());
        assert!(DocumentDirection::Outgoing.requires_stock_check());
        assert!(DocumentDirection::Transfer.requires_stock_check());
        assert!(!DocumentDirection::None.requires_stock_check());
    }
}
