//! Text-blob persistence formats for alias owners and transfer allocations.
//!
//! The backend stores both collections as JSON text inside a string column
//! (`id_proprietarios`), not as structured fields:
//!
//! - alias owners: `[10,20]`
//! - transfer allocations: `[{"id":10,"valor":50},{"id":20,"valor":12.5}]`
//!
//! Writers must produce exactly these shapes. Readers tolerate garbage by
//! returning [`Decoded::Unreadable`] with the raw text preserved.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::owner::OwnerId;
use super::transfer::Allocation;

/// Result of decoding a persisted text blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// The blob decoded into the expected shape.
    Valid(T),
    /// The blob could not be decoded; the raw text is kept for diagnostics.
    Unreadable {
        /// Text exactly as received.
        raw: String,
    },
}

impl<T> Decoded<Vec<T>> {
    /// Decoded entries, or an empty slice when the blob was unreadable.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Valid(entries) => entries,
            Self::Unreadable { .. } => &[],
        }
    }
}

impl<T> Decoded<T> {
    /// Whether decoding failed.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable { .. })
    }
}

impl<T: Default> Default for Decoded<T> {
    fn default() -> Self {
        Self::Valid(T::default())
    }
}

/// Decode an alias owner blob. A missing or blank blob means no owners.
///
/// # Examples
/// ```
/// use extras_console::domain::{Decoded, OwnerId, decode_owner_ids};
///
/// assert_eq!(
///     decode_owner_ids(Some("[10,20]")),
///     Decoded::Valid(vec![OwnerId::new(10), OwnerId::new(20)])
/// );
/// assert!(decode_owner_ids(Some("not json")).is_unreadable());
/// ```
pub fn decode_owner_ids(raw: Option<&str>) -> Decoded<Vec<OwnerId>> {
    decode_blob(raw, |text| serde_json::from_str::<Vec<OwnerId>>(text))
}

/// Encode alias owners. An empty set is persisted as `null`.
pub fn encode_owner_ids(ids: &[OwnerId]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let joined = ids
        .iter()
        .map(|id| id.get().to_string())
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("[{joined}]"))
}

#[derive(Serialize)]
struct AllocationEntry {
    id: OwnerId,
    valor: WireAmount,
}

#[derive(Deserialize)]
struct RawAllocationEntry {
    id: OwnerId,
    #[serde(default)]
    valor: Option<serde_json::Value>,
}

impl RawAllocationEntry {
    fn into_allocation(self) -> Option<Allocation> {
        let valor = self.valor.filter(|valor| !valor.is_null())?;
        match WireAmount::deserialize(&valor) {
            Ok(WireAmount(amount)) => Some(Allocation {
                owner_id: self.id,
                amount,
            }),
            Err(error) => {
                tracing::warn!(owner_id = %self.id, %error, "allocation amount skipped");
                None
            }
        }
    }
}

/// Decode a transfer allocation blob. Entries without a usable `valor` are
/// skipped.
pub fn decode_allocations(raw: Option<&str>) -> Decoded<Vec<Allocation>> {
    decode_blob(raw, |text| {
        serde_json::from_str::<Vec<RawAllocationEntry>>(text).map(|entries| {
            entries
                .into_iter()
                .filter_map(RawAllocationEntry::into_allocation)
                .collect()
        })
    })
}

/// Encode transfer allocations as `[{"id":..,"valor":..}]`.
pub fn encode_allocations(allocations: &[Allocation]) -> String {
    let entries = allocations
        .iter()
        .map(|allocation| AllocationEntry {
            id: allocation.owner_id,
            valor: WireAmount(allocation.amount),
        })
        .collect::<Vec<_>>();
    // A Vec of plain structs with integer and number fields always serialises.
    serde_json::to_string(&entries).unwrap_or_else(|_| String::from("[]"))
}

fn decode_blob<T>(
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<Vec<T>, serde_json::Error>,
) -> Decoded<Vec<T>> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty() && *text != "null") else {
        return Decoded::Valid(Vec::new());
    };
    match parse(text) {
        Ok(entries) => Decoded::Valid(entries),
        Err(error) => {
            tracing::warn!(%error, raw = text, "persisted blob could not be decoded");
            Decoded::Unreadable {
                raw: text.to_owned(),
            }
        }
    }
}

/// Parse a user-entered amount. Blank or malformed input yields `None`.
///
/// Both `.` and `,` are accepted as the decimal separator.
///
/// # Examples
/// ```
/// use extras_console::domain::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("12,50"), Some(Decimal::new(1250, 2)));
/// assert_eq!(parse_amount("  "), None);
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(&trimmed.replace(',', ".")).ok()
}

/// Render an amount for an editable field without losing precision.
///
/// Amounts with fewer than two fractional digits are padded to two.
///
/// # Examples
/// ```
/// use extras_console::domain::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(50, 0)), "50.00");
/// assert_eq!(format_amount(Decimal::new(12345, 3)), "12.345");
/// ```
pub fn format_amount(amount: Decimal) -> String {
    let mut padded = amount;
    if padded.scale() < 2 {
        padded.rescale(2);
    }
    padded.to_string()
}

/// Decimal amount in its JSON wire form.
///
/// Integral values are written as JSON integers and fractional values as JSON
/// numbers, so the output matches what the browser console persisted.
/// Reading accepts integers, floats and numeric strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireAmount(pub Decimal);

impl Serialize for WireAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let amount = self.0;
        let whole = amount
            .fract()
            .is_zero()
            .then(|| amount.trunc().to_i64())
            .flatten();
        if let Some(whole) = whole {
            return serializer.serialize_i64(whole);
        }
        match amount.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&amount.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for WireAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WireAmountVisitor)
    }
}

struct WireAmountVisitor;

impl Visitor<'_> for WireAmountVisitor {
    type Value = WireAmount;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(WireAmount(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(WireAmount(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        // Display yields the shortest representation that round-trips, so
        // 50.1 stays 50.1 rather than its binary expansion.
        Decimal::from_str(&value.to_string())
            .map(WireAmount)
            .map_err(|_| E::custom(format!("amount {value} is out of range")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        parse_amount(value)
            .map(WireAmount)
            .ok_or_else(|| E::custom(format!("amount {value:?} is not numeric")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn allocation(owner: i64, amount: Decimal) -> Allocation {
        Allocation {
            owner_id: OwnerId::new(owner),
            amount,
        }
    }

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some("  "))]
    #[case::null(Some("null"))]
    #[case::empty_array(Some("[]"))]
    fn absent_owner_blobs_decode_to_no_owners(#[case] raw: Option<&str>) {
        assert_eq!(decode_owner_ids(raw), Decoded::Valid(Vec::new()));
    }

    #[test]
    fn malformed_owner_blob_keeps_raw_text() {
        assert_eq!(
            decode_owner_ids(Some("[10,")),
            Decoded::Unreadable {
                raw: "[10,".to_owned()
            }
        );
    }

    #[test]
    fn owner_ids_encode_as_compact_integer_array() {
        let ids = [OwnerId::new(10), OwnerId::new(20)];
        assert_eq!(encode_owner_ids(&ids).as_deref(), Some("[10,20]"));
        assert_eq!(encode_owner_ids(&[]), None);
    }

    #[test]
    fn allocations_encode_integral_amounts_as_integers() {
        let encoded = encode_allocations(&[
            allocation(10, Decimal::new(5000, 2)),
            allocation(20, Decimal::new(125, 1)),
        ]);

        assert_eq!(encoded, r#"[{"id":10,"valor":50},{"id":20,"valor":12.5}]"#);
    }

    #[test]
    fn allocations_decode_numbers_and_numeric_strings() {
        let decoded = decode_allocations(Some(
            r#"[{"id":10,"valor":50.1},{"id":20,"valor":"7,25"},{"id":30}]"#,
        ));

        assert_eq!(
            decoded,
            Decoded::Valid(vec![
                allocation(10, Decimal::new(501, 1)),
                allocation(20, Decimal::new(725, 2)),
            ])
        );
    }

    #[test]
    fn unusable_amount_skips_only_its_entry() {
        let decoded = decode_allocations(Some(
            r#"[{"id":10,"valor":1e300},{"id":20,"valor":"n/a"},{"id":30,"valor":null},{"id":40,"valor":5}]"#,
        ));

        assert_eq!(
            decoded,
            Decoded::Valid(vec![allocation(40, Decimal::new(5, 0))])
        );
    }

    #[test]
    fn malformed_allocation_blob_is_unreadable_and_empty() {
        let decoded = decode_allocations(Some(r#"{"id":10}"#));

        assert!(decoded.is_unreadable());
        assert!(decoded.as_slice().is_empty());
    }

    #[rstest]
    #[case("50", Some(Decimal::new(50, 0)))]
    #[case(" 0.10 ", Some(Decimal::new(10, 2)))]
    #[case("-3,5", Some(Decimal::new(-35, 1)))]
    #[case("", None)]
    #[case("12a", None)]
    fn parse_amount_cases(#[case] input: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_amount(input), expected);
    }

    #[test]
    fn format_amount_never_drops_digits() {
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
        assert_eq!(format_amount(Decimal::new(100_001, 3)), "100.001");
    }
}
