//! DTOs for the administration backend's JSON payloads.
//!
//! Responses decode into these transport DTOs first and are mapped into
//! domain records in one pass. Field names follow the backend's Portuguese
//! schema; the owner and allocation collections travel as JSON text blobs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::ports::{Envelope, MutationAck, TransferListing};
use crate::domain::{
    Alias, AliasId, AliasSubmission, ExtrasStatistics, Owner, OwnerId, Transfer, TransferId,
    TransferSubmission, WireAmount, decode_allocations, decode_owner_ids, encode_allocations,
    encode_owner_ids, total_amount,
};

const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub(super) struct EnvelopeDto<T> {
    #[serde(default)]
    pub(super) success: bool,
    pub(super) data: Option<T>,
}

impl<T> EnvelopeDto<T> {
    pub(super) fn into_envelope<U>(self, map: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(map),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AliasDto {
    id: i64,
    alias: String,
    #[serde(default)]
    id_proprietarios: Option<Value>,
    #[serde(default = "active_by_default", deserialize_with = "flag")]
    ativo: bool,
}

impl AliasDto {
    pub(super) fn into_domain(self) -> Alias {
        Alias {
            id: AliasId::new(self.id),
            label: self.alias,
            owners: decode_owner_ids(blob_text(self.id_proprietarios).as_deref()),
            active: self.ativo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerDto {
    id: i64,
    nome: String,
    #[serde(default)]
    sobrenome: Option<String>,
}

impl OwnerDto {
    pub(super) fn into_domain(self) -> Owner {
        Owner {
            id: OwnerId::new(self.id),
            name: self.nome,
            surname: self.sobrenome.filter(|surname| !surname.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TransferDto {
    id: i64,
    alias_id: i64,
    #[serde(default)]
    alias: Option<String>,
    nome_transferencia: String,
    #[serde(default)]
    valor_total: Option<WireAmount>,
    #[serde(default)]
    id_proprietarios: Option<Value>,
    #[serde(default)]
    data_criacao: Option<String>,
    #[serde(default)]
    data_fim: Option<String>,
    #[serde(default = "active_by_default", deserialize_with = "flag")]
    ativo: bool,
}

impl TransferDto {
    pub(super) fn into_domain(self) -> Transfer {
        let allocations = decode_allocations(blob_text(self.id_proprietarios).as_deref());
        let total = self
            .valor_total
            .map_or_else(|| total_amount(allocations.as_slice()), |WireAmount(total)| total);
        Transfer {
            id: TransferId::new(self.id),
            alias_id: AliasId::new(self.alias_id),
            alias_label: self.alias,
            name: self.nome_transferencia,
            created_date: self.data_criacao.as_deref().and_then(parse_wire_date),
            end_date: self.data_fim.as_deref().and_then(parse_wire_date),
            allocations,
            total_amount: total,
            active: self.ativo,
        }
    }
}

/// Transfer listings arrive either bare or enveloped. Records stay raw
/// until [`TransferListingDto::into_domain`] so one malformed record cannot
/// hide the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum TransferListingDto {
    Bare(Vec<Value>),
    Enveloped(EnvelopeDto<Vec<Value>>),
    Other(Value),
}

impl TransferListingDto {
    pub(super) fn into_domain(self) -> TransferListing {
        match self {
            Self::Bare(records) => TransferListing::Bare(decode_transfers(records)),
            Self::Enveloped(envelope) => {
                TransferListing::Enveloped(envelope.into_envelope(decode_transfers))
            }
            Self::Other(value) => {
                tracing::warn!(shape = %value_kind(&value), "unexpected transfer listing shape");
                TransferListing::Unrecognised
            }
        }
    }
}

fn decode_transfers(records: Vec<Value>) -> Vec<Transfer> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("id").cloned();
            match serde_json::from_value::<TransferDto>(record) {
                Ok(dto) => Some(dto.into_domain()),
                Err(error) => {
                    tracing::warn!(?id, %error, "skipping undecodable transfer record");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(super) struct AckDto {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl AckDto {
    pub(super) fn into_domain(self) -> MutationAck {
        MutationAck {
            success: self.success,
            id: self.id,
            message: self.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StatisticsDto {
    #[serde(default)]
    total_extras: u64,
    #[serde(default)]
    extras_ativos: u64,
    #[serde(default)]
    extras_inativos: u64,
    #[serde(default)]
    valor_total_transferencias: Option<WireAmount>,
}

impl StatisticsDto {
    pub(super) fn into_domain(self) -> ExtrasStatistics {
        ExtrasStatistics {
            total_aliases: self.total_extras,
            active_aliases: self.extras_ativos,
            inactive_aliases: self.extras_inativos,
            total_transferred: self
                .valor_total_transferencias
                .map_or(Decimal::ZERO, |WireAmount(total)| total),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AliasWriteDto<'a> {
    alias: &'a str,
    ativo: bool,
    id_proprietarios: Option<String>,
}

impl<'a> From<&'a AliasSubmission> for AliasWriteDto<'a> {
    fn from(submission: &'a AliasSubmission) -> Self {
        Self {
            alias: &submission.label,
            ativo: submission.active,
            id_proprietarios: encode_owner_ids(&submission.owner_ids),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct TransferWriteDto<'a> {
    alias_id: i64,
    nome_transferencia: &'a str,
    valor_total: WireAmount,
    id_proprietarios: String,
    data_criacao: String,
    data_fim: Option<String>,
    ativo: bool,
}

impl<'a> From<&'a TransferSubmission> for TransferWriteDto<'a> {
    fn from(submission: &'a TransferSubmission) -> Self {
        Self {
            alias_id: submission.alias_id.get(),
            nome_transferencia: &submission.name,
            valor_total: WireAmount(submission.total_amount),
            id_proprietarios: encode_allocations(&submission.allocations),
            data_criacao: submission.created_date.format(WIRE_DATE_FORMAT).to_string(),
            data_fim: submission
                .end_date
                .map(|date| date.format(WIRE_DATE_FORMAT).to_string()),
            ativo: true,
        }
    }
}

const fn active_by_default() -> bool {
    true
}

/// Accept `true`/`false`, `1`/`0` and their string forms; `null` means
/// active.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(true),
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => Ok(number.as_f64().is_some_and(|number| number != 0.0)),
        Value::String(text) => match text.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "unrecognised flag {other:?}"
            ))),
        },
        Value::Array(_) | Value::Object(_) => Err(serde::de::Error::custom(format!(
            "expected a flag, found {}",
            value_kind(&value)
        ))),
    }
}

/// Blob columns normally hold JSON text, but an already-structured array is
/// accepted by re-serialising it.
fn blob_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

/// Read the leading `YYYY-MM-DD` of a date or datetime string.
fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let parsed = raw
        .trim()
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, WIRE_DATE_FORMAT).ok());
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::warn!(raw, "unparseable date ignored");
    }
    parsed
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
