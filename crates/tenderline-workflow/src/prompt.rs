//! Prompts for document generation and winner selection

use tenderline_domain::{AttributedReply, ChatRequest, CorrelationToken};

/// Chat request that turns a description into an RFP document
pub fn rfp_request(description: &str) -> ChatRequest {
    ChatRequest::new(
        RFP_INSTRUCTIONS,
        format!("Convert the following description into an RFP:\n{}", description),
    )
}

/// Builds the winner-selection prompt
pub struct DecisionPromptBuilder<'a> {
    token: &'a CorrelationToken,
    vendor_names: &'a [String],
    replies: &'a [AttributedReply],
    excerpt_chars: usize,
}

impl<'a> DecisionPromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(
        token: &'a CorrelationToken,
        vendor_names: &'a [String],
        replies: &'a [AttributedReply],
    ) -> Self {
        Self {
            token,
            vendor_names,
            replies,
            excerpt_chars: 800,
        }
    }

    /// Limit each reply body to `chars` characters
    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    /// Build the complete chat request
    pub fn build(&self) -> ChatRequest {
        ChatRequest::new(DECISION_INSTRUCTIONS, self.user_prompt())
    }

    fn user_prompt(&self) -> String {
        let mut prompt = format!(
            "Evaluate the replies for sendId: {}\n\nVendors and replies:\n",
            self.token
        );

        for vendor in self.vendor_names {
            prompt.push_str(&format!("\nVendor: {}\n", vendor));

            let from_vendor: Vec<_> = self.replies.iter().filter(|r| r.is_from(vendor)).collect();
            if from_vendor.is_empty() {
                prompt.push_str("  No replies received.\n");
                continue;
            }

            for (idx, attributed) in from_vendor.iter().enumerate() {
                let reply = &attributed.reply;
                prompt.push_str(&format!(
                    "  Reply {} from {} on {}:\n    {}\n",
                    idx + 1,
                    reply.sender_address,
                    reply.received_at.to_rfc3339(),
                    excerpt(&reply.body_text, self.excerpt_chars)
                ));
            }
        }

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

/// Flatten line breaks to spaces and keep at most `max_chars` characters
pub fn excerpt(body: &str, max_chars: usize) -> String {
    body.replace("\r\n", " ")
        .replace('\n', " ")
        .chars()
        .take(max_chars)
        .collect()
}

const RFP_INSTRUCTIONS: &str = r#"You are an expert procurement specialist and proposal writer.
Your task is to convert any informal project description provided by the user into a professionally written RFP (Request For Proposal) document.

Follow this exact RFP structure:
1. Introduction / Overview
2. Project Background
3. Scope of Work / Objectives
4. Technical Requirements
5. Deliverables
6. Timeline & Milestones
7. Budget & Payment Terms
8. Vendor Qualifications / Eligibility
9. Proposal Submission Guidelines
10. Evaluation Criteria
11. Terms & Conditions

Formatting Requirements:
- Write professionally, clearly, and concisely.
- Expand details logically even if user input is short.
- If any information is missing, make reasonable assumptions and include them.
- Use bullet points and headings where suitable.
- Do not include placeholders like "TBD".
- Produce final response as a structured formatted document."#;

const DECISION_INSTRUCTIONS: &str = r#"You are an expert procurement evaluator. Given vendor replies to an RFP, choose the single best vendor and provide a short rationale. Output must be JSON with keys: { "bestVendor": "<vendor name>", "reason": "<short explanation>" }."#;

const OUTPUT_FORMAT_REMINDER: &str = "\nPlease pick the best vendor (from the provided vendor list) and give a concise reason (2-4 sentences). Return only valid JSON.";
