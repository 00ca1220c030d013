//! # Airdrop Form Model
//!
//! Validates and normalizes an operator-entered airdrop definition before
//! it is allowed anywhere near the network.
//!
//! ## Core Responsibilities
//!
//! 1.  **Participant parsing:** The participant list is entered as one
//!     comma-separated text blob. It is split, trimmed, and deduplicated
//!     by exact string match (hex case is *not* normalized) on every
//!     change, preserving first-occurrence order.
//!
//! 2.  **Field-scoped validation:** Every schema violation is reported
//!     against the exact field it belongs to (event name, a specific
//!     prize's quantity/amount/symbol, the participant list as a whole,
//!     or a single participant by position), so a presentation layer can
//!     attach messages to exact inputs.
//!
//! 3.  **Prize-list floor:** The remove operation refuses to drop the
//!     last remaining prize, independent of schema validation, so the
//!     list can never become empty through that action.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref ETHEREUM_ADDRESS_RE: Regex =
        Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("address pattern is valid");
}

/// Returns true iff `candidate` is a `0x`-prefixed 40-hex-digit address.
/// Case is accepted either way and preserved as received.
pub fn is_valid_address(candidate: &str) -> bool {
    ETHEREUM_ADDRESS_RE.is_match(candidate)
}

/// Splits a raw participant blob on commas, trims each token, and removes
/// exact-string duplicates, keeping first-occurrence order. Empty tokens
/// survive parsing (collapsed to at most one) and are rejected later by
/// validation, so the operator is told about stray commas.
pub fn parse_participants(raw: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for token in raw.split(',').map(str::trim) {
        if !seen.iter().any(|existing| existing.as_str() == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

/// A prize row as entered by the operator. Signed so that out-of-range
/// input reaches validation instead of failing to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PrizeInput {
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub symbol: String,
}

/// A validated prize: `quantity` winner slots each receiving `amount`
/// units of the token `symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prize {
    pub quantity: u64,
    pub amount: u64,
    pub symbol: String,
}

/// A validated, normalized airdrop definition ready for submission.
/// No further local mutation happens after acceptance; the server owns
/// the created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropDefinition {
    pub event_name: String,
    pub prizes: Vec<Prize>,
    pub participants: Vec<String>,
}

/// The field a validation issue is scoped to. Indexes refer to positions
/// in the prize list / deduplicated participant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    EventName,
    Prizes,
    PrizeQuantity(usize),
    PrizeAmount(usize),
    PrizeSymbol(usize),
    Participants,
    Participant(usize),
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: Field,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Field::EventName => write!(f, "eventName: {}", self.message),
            Field::Prizes => write!(f, "prizes: {}", self.message),
            Field::PrizeQuantity(i) => write!(f, "prizes[{}].quantity: {}", i, self.message),
            Field::PrizeAmount(i) => write!(f, "prizes[{}].amount: {}", i, self.message),
            Field::PrizeSymbol(i) => write!(f, "prizes[{}].symbol: {}", i, self.message),
            Field::Participants => write!(f, "participants: {}", self.message),
            Field::Participant(i) => write!(f, "participants[{}]: {}", i, self.message),
        }
    }
}

/// On-disk shape of a definition file (TOML), the console's stand-in for
/// the original entry form.
#[derive(Debug, Clone, Default, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    event_name: String,
    #[serde(default)]
    prizes: Vec<PrizeInput>,
    /// Raw comma-separated participant addresses.
    #[serde(default)]
    participants: String,
}

/// Mutable staging area for an airdrop definition.
#[derive(Debug, Clone, Default)]
pub struct AirdropForm {
    pub event_name: String,
    prizes: Vec<PrizeInput>,
    participants_raw: String,
    participants: Vec<String>,
}

impl AirdropForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a definition file and stages it in the form, re-parsing the
    /// participant blob on the way in.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read definition file at '{}'", path.display()))?;
        let file: DefinitionFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse definition file at '{}'", path.display()))?;

        let mut form = Self::new();
        form.event_name = file.event_name;
        for prize in file.prizes {
            form.add_prize(prize);
        }
        form.set_participants_raw(&file.participants);
        Ok(form)
    }

    pub fn prizes(&self) -> &[PrizeInput] {
        &self.prizes
    }

    pub fn add_prize(&mut self, prize: PrizeInput) {
        self.prizes.push(prize);
    }

    /// Removes the prize at `index`. Refused (returns false) when exactly
    /// one prize remains or the index is out of range.
    pub fn remove_prize(&mut self, index: usize) -> bool {
        if self.prizes.len() <= 1 || index >= self.prizes.len() {
            return false;
        }
        self.prizes.remove(index);
        true
    }

    /// Replaces the raw participant text and re-derives the deduplicated
    /// participant list.
    pub fn set_participants_raw(&mut self, raw: &str) {
        self.participants_raw = raw.to_string();
        self.participants = parse_participants(raw);
    }

    /// The deduplicated participant list as last parsed.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Validates the staged definition. On success returns the normalized
    /// payload; on failure returns every field-scoped issue found.
    /// Nothing invalid ever reaches the network.
    pub fn validate(&self) -> Result<AirdropDefinition, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        if self.event_name.trim().is_empty() {
            issues.push(ValidationIssue::new(
                Field::EventName,
                "Airdrop name is required",
            ));
        }

        if self.prizes.is_empty() {
            issues.push(ValidationIssue::new(
                Field::Prizes,
                "At least one prize is required",
            ));
        }
        for (i, prize) in self.prizes.iter().enumerate() {
            if prize.quantity < 1 {
                issues.push(ValidationIssue::new(
                    Field::PrizeQuantity(i),
                    "Quantity must be positive",
                ));
            }
            if prize.amount < 1 {
                issues.push(ValidationIssue::new(
                    Field::PrizeAmount(i),
                    "Amount must be positive",
                ));
            }
            if prize.symbol.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    Field::PrizeSymbol(i),
                    "Token symbol is required",
                ));
            }
        }

        let real_participants: Vec<&String> = self
            .participants
            .iter()
            .filter(|p| !p.is_empty())
            .collect();
        if real_participants.is_empty() {
            issues.push(ValidationIssue::new(
                Field::Participants,
                "You must have at least one participant",
            ));
        }
        for (i, participant) in self.participants.iter().enumerate() {
            if participant.is_empty() {
                issues.push(ValidationIssue::new(
                    Field::Participant(i),
                    "Participant address is required",
                ));
            } else if !is_valid_address(participant) {
                issues.push(ValidationIssue::new(
                    Field::Participant(i),
                    format!("{}: Invalid Ethereum address", participant),
                ));
            }
        }

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(AirdropDefinition {
            event_name: self.event_name.trim().to_string(),
            prizes: self
                .prizes
                .iter()
                .map(|p| Prize {
                    quantity: p.quantity as u64,
                    amount: p.amount as u64,
                    symbol: p.symbol.trim().to_string(),
                })
                .collect(),
            participants: self.participants.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> AirdropForm {
        let mut form = AirdropForm::new();
        form.event_name = "Genesis Drop".to_string();
        form.add_prize(PrizeInput {
            quantity: 2,
            amount: 50,
            symbol: "AVAX".to_string(),
        });
        form.set_participants_raw(
            "0x1111111111111111111111111111111111111111,\
             0x2222222222222222222222222222222222222222",
        );
        form
    }

    #[test]
    fn address_pattern_accepts_only_canonical_hex() {
        assert!(is_valid_address("0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(is_valid_address("0xde709f2102306220921060314715629080e2fb77"));

        // Wrong length, wrong prefix, non-hex digits.
        assert!(!is_valid_address("0x52908400098527886E0F7030069857D2E4169EE"));
        assert!(!is_valid_address("0x52908400098527886E0F7030069857D2E4169EE70"));
        assert!(!is_valid_address("52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid_address("0xZZ908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn participants_parse_trims_and_dedupes_preserving_order() {
        assert_eq!(
            parse_participants("0xabc, 0xabc,0xdef"),
            vec!["0xabc".to_string(), "0xdef".to_string()]
        );
    }

    #[test]
    fn participants_dedup_is_case_sensitive() {
        assert_eq!(
            parse_participants("0xABC,0xabc"),
            vec!["0xABC".to_string(), "0xabc".to_string()]
        );
    }

    #[test]
    fn removing_last_prize_is_refused() {
        let mut form = valid_form();
        assert_eq!(form.prizes().len(), 1);
        assert!(!form.remove_prize(0));
        assert_eq!(form.prizes().len(), 1);

        form.add_prize(PrizeInput {
            quantity: 1,
            amount: 1,
            symbol: "JOE".to_string(),
        });
        assert!(form.remove_prize(1));
        assert_eq!(form.prizes().len(), 1);
        assert!(!form.remove_prize(0));
    }

    #[test]
    fn out_of_range_prize_removal_is_refused() {
        let mut form = valid_form();
        form.add_prize(PrizeInput::default());
        assert!(!form.remove_prize(5));
        assert_eq!(form.prizes().len(), 2);
    }

    #[test]
    fn nonpositive_prize_values_are_rejected_locally() {
        let mut form = valid_form();
        form.add_prize(PrizeInput {
            quantity: 0,
            amount: -1,
            symbol: "AVAX".to_string(),
        });

        let issues = form.validate().expect_err("must be rejected");
        assert!(issues
            .iter()
            .any(|i| i.field == Field::PrizeQuantity(1) && i.message == "Quantity must be positive"));
        assert!(issues
            .iter()
            .any(|i| i.field == Field::PrizeAmount(1) && i.message == "Amount must be positive"));
    }

    #[test]
    fn invalid_participant_is_reported_by_position() {
        let mut form = valid_form();
        form.set_participants_raw("0x1111111111111111111111111111111111111111, 0xnothex");

        let issues = form.validate().expect_err("must be rejected");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, Field::Participant(1));
        assert!(issues[0].message.starts_with("0xnothex:"));
    }

    #[test]
    fn empty_participants_blob_is_rejected() {
        let mut form = valid_form();
        form.set_participants_raw("");

        let issues = form.validate().expect_err("must be rejected");
        assert!(issues.iter().any(|i| i.field == Field::Participants));
    }

    #[test]
    fn valid_form_normalizes_into_definition() {
        let definition = valid_form().validate().expect("form is valid");
        assert_eq!(definition.event_name, "Genesis Drop");
        assert_eq!(definition.prizes.len(), 1);
        assert_eq!(definition.prizes[0].quantity, 2);
        assert_eq!(definition.participants.len(), 2);
    }

    #[test]
    fn definition_serializes_with_wire_field_names() {
        let definition = valid_form().validate().expect("form is valid");
        let json = serde_json::to_value(&definition).expect("serializable");
        assert!(json.get("eventName").is_some());
        assert_eq!(json["prizes"][0]["quantity"], 2);
        assert!(json["participants"].is_array());
    }

    #[test]
    fn empty_form_reports_every_top_level_field() {
        let issues = AirdropForm::new().validate().expect_err("must be rejected");
        assert!(issues.iter().any(|i| i.field == Field::EventName));
        assert!(issues.iter().any(|i| i.field == Field::Prizes));
        assert!(issues.iter().any(|i| i.field == Field::Participants));
    }
}
