//! RFP document text
//!
//! Generated text always carries the caller's description verbatim; when the
//! generator is unavailable a fixed eleven-section template is used instead.

use serde::Serialize;

/// Where the document text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    /// Written by the generation model
    Model,
    /// Built from the local template
    Template,
}

/// Document text plus its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    /// Full document text
    pub text: String,
    /// Origin of the text
    pub source: DocumentSource,
}

impl GeneratedDocument {
    /// Wrap model output, prepending the description if the model dropped it
    pub fn from_model(content: &str, description: &str) -> Self {
        let text = if content.contains(description) {
            content.to_string()
        } else {
            format!("Project Description:\n{}\n\n{}", description, content)
        };
        Self {
            text,
            source: DocumentSource::Model,
        }
    }

    /// Build the local template around the description
    pub fn template(description: &str) -> Self {
        let mut text = String::from("Request For Proposal (Generated Locally - Fallback)\n\n");
        text.push_str("Project Description:\n");
        text.push_str(description);
        text.push_str("\n\n");

        for (idx, (heading, guidance)) in SECTIONS.iter().enumerate() {
            text.push_str(&format!("{}. {}\n{}\n\n", idx + 1, heading, guidance));
        }

        Self {
            text: text.trim_end().to_string() + "\n",
            source: DocumentSource::Template,
        }
    }
}

const SECTIONS: [(&str, &str); 11] = [
    (
        "Introduction / Overview",
        "Provide a concise overview of the project based on the description above.",
    ),
    ("Project Background", "Summarize the context and background."),
    (
        "Scope of Work / Objectives",
        "- Primary objective: based on description.",
    ),
    (
        "Technical Requirements",
        "- Define expected technologies, integrations, and constraints.",
    ),
    (
        "Deliverables",
        "- List expected deliverables (reports, software, documentation).",
    ),
    (
        "Timeline & Milestones",
        "- Provide suggested milestones and timeline estimates.",
    ),
    (
        "Budget & Payment Terms",
        "- Indicate budget considerations and payment terms.",
    ),
    (
        "Vendor Qualifications / Eligibility",
        "- Qualifications vendors should have.",
    ),
    (
        "Proposal Submission Guidelines",
        "- Explain how vendors should submit proposals.",
    ),
    (
        "Evaluation Criteria",
        "- Provide criteria by which proposals will be evaluated.",
    ),
    (
        "Terms & Conditions",
        "- Include standard terms and conditions.",
    ),
];
