//! # Heuristic Payload Matching
//!
//! Approximate correlation by partial-payload comparison, used only when no
//! topic id disambiguates multi-hop paths sharing a destination.
//!
//! Two byte windows are stable across the two supported wire-format
//! revisions even though the surrounding encoding differs: the asset-amount
//! field at bytes 10..28 and the beneficiary address in the last 65 bytes.
//! When the 2-byte version tags agree the windows are compared positionally;
//! when they differ the stored partial's windows must appear somewhere in
//! the observed payload, since re-encoding shifts offsets.
//!
//! Both windows must agree: false negatives are acceptable (the entry
//! expires and surfaces as a timeout), false positives are not.
//!
//! TODO: re-derive the window offsets when a third format revision ships;
//! they are tied to the current pair of encodings.

/// Length of the leading version tag.
pub const VERSION_TAG_LEN: usize = 2;

/// Byte window of the asset-amount field.
pub const AMOUNT_WINDOW_START: usize = 10;
/// Exclusive end of the asset-amount window.
pub const AMOUNT_WINDOW_END: usize = 28;

/// Length of the trailing beneficiary-address window.
pub const BENEFICIARY_WINDOW_LEN: usize = 65;

/// The two stable windows of a payload, when it is long enough to have
/// them.
fn windows(payload: &[u8]) -> Option<(&[u8], &[u8])> {
    let amount = payload.get(AMOUNT_WINDOW_START..AMOUNT_WINDOW_END)?;
    if payload.len() < BENEFICIARY_WINDOW_LEN {
        return None;
    }
    let beneficiary = &payload[payload.len() - BENEFICIARY_WINDOW_LEN..];
    Some((amount, beneficiary))
}

/// Whether `needle` occurs anywhere inside `haystack`.
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Judge whether a stored partial payload and an observed full payload
/// plausibly describe the same message.
#[must_use]
pub fn fuzzy_payload_match(partial: &[u8], observed: &[u8]) -> bool {
    let Some((partial_amount, partial_beneficiary)) = windows(partial) else {
        return false;
    };
    if partial.len() >= VERSION_TAG_LEN
        && observed.len() >= VERSION_TAG_LEN
        && partial[..VERSION_TAG_LEN] == observed[..VERSION_TAG_LEN]
    {
        // Same format revision: the windows sit at the same offsets.
        match windows(observed) {
            Some((observed_amount, observed_beneficiary)) => {
                partial_amount == observed_amount && partial_beneficiary == observed_beneficiary
            }
            None => false,
        }
    } else {
        // Different revisions re-encode around the fields; fall back to
        // containment of both windows.
        contains(observed, partial_amount) && contains(observed, partial_beneficiary)
    }
}
