//! Prompt construction and response parsing for AI job extraction.
//!
//! The completion service is untrusted free text. Parsing matches labels
//! rather than line positions and fails closed: a missing or empty field
//! rejects the whole response instead of producing a half-filled job.

/// Job fields extracted from an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedJob {
    pub title: String,
    pub description: String,
    pub address: String,
}

const TITLE_LABEL: &str = "Job Title";
const DESCRIPTION_LABEL: &str = "Job Description";
const ADDRESS_LABEL: &str = "Job Address";

/// Build the extraction prompt for one email.
pub fn build_prompt(subject: &str, content: &str) -> String {
    format!(
        "Extract job details from the following email:\n\
         Subject: {subject}\n\
         Content: {content}\n\
         \n\
         Provide the following details:\n\
         1. {TITLE_LABEL}\n\
         2. {DESCRIPTION_LABEL}\n\
         3. {ADDRESS_LABEL} (if available)"
    )
}

/// Parse a completion into the three requested fields.
///
/// Each field must appear on its own line carrying the requested label,
/// optionally preceded by list numbering ("1." / "2)") and followed by a
/// colon. Lines may come in any order; the first non-empty value per label
/// wins.
pub fn parse_response(response: &str) -> Result<ExtractedJob, String> {
    let title = field_for_label(response, TITLE_LABEL)
        .ok_or_else(|| missing(TITLE_LABEL))?;
    let description = field_for_label(response, DESCRIPTION_LABEL)
        .ok_or_else(|| missing(DESCRIPTION_LABEL))?;
    let address = field_for_label(response, ADDRESS_LABEL)
        .ok_or_else(|| missing(ADDRESS_LABEL))?;

    Ok(ExtractedJob {
        title,
        description,
        address,
    })
}

fn missing(label: &str) -> String {
    format!("Response carries no usable '{}' line", label)
}

fn field_for_label(response: &str, label: &str) -> Option<String> {
    for line in response.lines() {
        let unnumbered = line
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
            .trim_start();

        let Some(head) = unnumbered.get(..label.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(label) {
            let value = unnumbered[label.len()..].trim_start_matches(':').trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
