//! Atomic document number allocation
//!
//! Every document family draws from `document_sequences`, a counter
//! table keyed by a scope string (family, type, period). The upsert
//! below increments and returns in one statement, so concurrent
//! creations in the same scope can never observe the same value.
//! The formatted number strings themselves are produced by the pure
//! helpers in `shared::models::document`.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use crate::error::AppResult;
use shared::models::{
    format_sj_number, format_spg_number, format_spk_number, format_surat_lain_number,
    format_transfer_number, sj_sequence_scope, spg_sequence_scope, spk_sequence_scope,
    surat_lain_sequence_scope, transfer_sequence_scope, SpgType, SuratLainType,
};

/// Increment the counter for a scope and return its new value.
pub async fn next_sequence(
    tx: &mut Transaction<'_, Postgres>,
    scope: &str,
) -> AppResult<i64> {
    let value = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO document_sequences (scope, last_value)
        VALUES ($1, 1)
        ON CONFLICT (scope)
        DO UPDATE SET last_value = document_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(scope)
    .fetch_one(&mut **tx)
    .await?;
    Ok(value)
}

pub async fn next_spg_number(
    tx: &mut Transaction<'_, Postgres>,
    document_type: SpgType,
    date: DateTime<Utc>,
) -> AppResult<String> {
    let scope = spg_sequence_scope(document_type, date);
    let seq = next_sequence(tx, &scope).await?;
    Ok(format_spg_number(document_type, date, seq))
}

pub async fn next_spk_number(
    tx: &mut Transaction<'_, Postgres>,
    date: DateTime<Utc>,
) -> AppResult<String> {
    let seq = next_sequence(tx, &spk_sequence_scope(date)).await?;
    Ok(format_spk_number(date, seq))
}

/// SJ numbers share one yearly counter across customer and non-customer
/// variants; the warehouse name decides the R/S/O code in the string.
pub async fn next_sj_number(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_name: &str,
    is_customer: bool,
    date: DateTime<Utc>,
) -> AppResult<String> {
    let seq = next_sequence(tx, &sj_sequence_scope(date)).await?;
    Ok(format_sj_number(warehouse_name, is_customer, date, seq))
}

/// Transfer numbers show only the year but count per month.
pub async fn next_transfer_number(
    tx: &mut Transaction<'_, Postgres>,
    date: DateTime<Utc>,
) -> AppResult<String> {
    let seq = next_sequence(tx, &transfer_sequence_scope(date)).await?;
    Ok(format_transfer_number(date, seq))
}

pub async fn next_surat_lain_number(
    tx: &mut Transaction<'_, Postgres>,
    document_type: SuratLainType,
    date: DateTime<Utc>,
) -> AppResult<String> {
    let scope = surat_lain_sequence_scope(document_type, date);
    let seq = next_sequence(tx, &scope).await?;
    Ok(format_surat_lain_number(document_type, date, seq))
}
