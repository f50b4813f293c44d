//! Parse the reasoning model's winner selection

use crate::error::WorkflowError;
use serde::Deserialize;

/// A parsed, validated vendor choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorChoice {
    /// Vendor name as spelled in the candidate list
    pub vendor: String,
    /// Model rationale
    pub reason: String,
}

/// Rationale used when the model names a vendor without saying why
pub const MISSING_REASON: &str = "Selected by the model; no reason was given.";

#[derive(Debug, Deserialize)]
struct RawChoice {
    #[serde(rename = "bestVendor", alias = "selectedVendor", alias = "vendor")]
    best_vendor: Option<String>,
    #[serde(alias = "rationale")]
    reason: Option<String>,
}

/// Parse a model response into a vendor choice
///
/// The first balanced `{...}` span is parsed; surrounding prose and code
/// fences are ignored. The chosen vendor must match one of `vendor_names`
/// ignoring case.
pub fn parse_vendor_choice(
    response: &str,
    vendor_names: &[String],
) -> Result<VendorChoice, WorkflowError> {
    let span = first_json_object(response)
        .ok_or_else(|| WorkflowError::ParseFailure("no JSON object in response".to_string()))?;

    let raw: RawChoice = serde_json::from_str(span)?;

    let named = raw
        .best_vendor
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WorkflowError::ParseFailure("missing 'bestVendor'".to_string()))?;

    let lowered = named.to_lowercase();
    let vendor = vendor_names
        .iter()
        .find(|candidate| candidate.trim().to_lowercase() == lowered)
        .ok_or_else(|| WorkflowError::ParseFailure(format!("'{}' is not a candidate vendor", named)))?;

    let reason = raw
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| MISSING_REASON.to_string());

    Ok(VendorChoice {
        vendor: vendor.clone(),
        reason,
    })
}

/// Locate the first balanced `{...}` span
///
/// Braces inside JSON strings, including escaped quotes, do not count.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
