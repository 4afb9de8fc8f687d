//! Upstream status record, matching the NTS wire format.

use serde::{Deserialize, Serialize};

/// One fact record the upstream API reports for a registration number.
///
/// Field names follow the upstream JSON contract and must not be renamed.
/// Every field is a string; the API omits fields it has no value for, so
/// all of them default to empty on deserialization. Immutable once
/// received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Business registration number (digits only).
    #[serde(default)]
    pub b_no: String,
    /// Business status text, e.g. "계속사업자".
    #[serde(default)]
    pub b_stt: String,
    /// Business status code, e.g. "01".
    #[serde(default)]
    pub b_stt_cd: String,
    /// Tax type text, e.g. "부가가치세 일반과세자".
    #[serde(default)]
    pub tax_type: String,
    /// Tax type code, e.g. "01".
    #[serde(default)]
    pub tax_type_cd: String,
    /// Closure date, when the business has ended.
    #[serde(default)]
    pub end_dt: String,
    /// Unit taxable flag.
    #[serde(default)]
    pub utcc_yn: String,
    /// Date of the most recent tax-type change.
    #[serde(default)]
    pub tax_type_change_dt: String,
    /// Invoice application date.
    #[serde(default)]
    pub invoice_apply_dt: String,
    /// Tax type before the most recent change.
    #[serde(default)]
    pub rbf_tax_type: String,
    /// Tax type code before the most recent change.
    #[serde(default)]
    pub rbf_tax_type_cd: String,
}
