//! Prompt text sent to the narrative provider.

use std::fmt::Write as _;

use serde_json::{json, Map, Value};

use super::{ChatRole, ChatTurn, ServiceError};
use crate::scoring::{ApplicantRecord, Factor, ScoringResult};

/// Instructions asking for a customer-facing explanation of one decision.
pub fn explanation_prompt(record: &ApplicantRecord, result: &ScoringResult) -> String {
    let mut prompt = String::from(
        "You are an expert and empathetic loan officer AI assistant. Explain a credit decision \
to the customer in a clear, helpful, and human-readable way.\n\n\
Instructions:\n\
1. Keep a professional, reassuring, and educational tone.\n\
2. Use ONLY the data provided below. Do not invent or assume any information.\n\
3. Open by clearly stating the decision (Approved or Denied).\n\
4. Identify the 2-3 factors that most influenced the decision, judged by the size of their impact.\n\
5. Explain in simple terms how each of those factors moved the score.\n\
6. If the decision is Denied, give constructive, actionable advice for improving a future \
application, based directly on the negative factors.\n\
7. Stay concise and understandable for someone with no financial background.\n\
8. Write in clear paragraphs. Do not use markdown lists.\n\n",
    );

    push_applicant_block(&mut prompt, record);
    prompt.push('\n');
    push_result_block(
        &mut prompt,
        result,
        "Key Factor Impacts (a positive number improved the score, a negative number lowered it):",
    );
    prompt.push_str("\nBegin the explanation now.\n");
    prompt
}

/// System instruction confining chat answers to the supplied application data.
pub fn chat_system_instruction(record: &ApplicantRecord, result: &ScoringResult) -> String {
    let mut instruction = String::from(
        "You are an expert financial analyst AI assisting a loan manager. Answer questions about \
this loan application based only on the data provided. Be concise, data-driven, and \
professional. Do not offer opinions or information beyond the data provided.\n\n",
    );

    push_applicant_block(&mut instruction, record);
    instruction.push('\n');
    push_result_block(&mut instruction, result, "Key Factor Impacts (points):");
    instruction
}

/// Instructions for pulling the six numeric fields out of an uploaded document.
pub fn extraction_prompt() -> &'static str {
    "You are an intelligent document parsing AI. Read the attached loan application document \
(a text file or a PDF) and extract the financial details below.\n\
- If a value is not found, omit its key from the output.\n\
- Extract only numerical values. For example, for \"₹ 45,00,000\" extract 4500000.\n\
- creditUtilization: the credit utilization percentage.\n\
- paymentHistoryMonths: the length of payment history in months.\n\
- debtToIncomeRatio: the debt-to-income percentage.\n\
- recentInquiries: the number of recent credit inquiries.\n\
- annualIncome: the total annual income in INR.\n\
- loanAmount: the requested loan amount in INR.\n\n\
Analyze the provided document and respond with the extracted data."
}

/// Response schema restricting extraction output to the six numeric fields.
pub fn extraction_schema() -> Value {
    let properties: Map<String, Value> = Factor::ALL
        .into_iter()
        .map(|factor| (factor.key().to_string(), json!({ "type": "NUMBER" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
    })
}

/// Validate a conversation and drop leading model turns such as the greeting.
///
/// The provider requires a conversation to open with a user turn and the last
/// turn must be the question being asked.
pub fn conversation(history: &[ChatTurn]) -> Result<&[ChatTurn], ServiceError> {
    match history.last() {
        None => {
            return Err(ServiceError::InvalidHistory(
                "conversation is empty".to_string(),
            ))
        }
        Some(turn) if turn.role != ChatRole::User => {
            return Err(ServiceError::InvalidHistory(
                "last turn must come from the user".to_string(),
            ))
        }
        Some(turn) if turn.text.trim().is_empty() => {
            return Err(ServiceError::InvalidHistory(
                "question must not be blank".to_string(),
            ))
        }
        Some(_) => {}
    }

    let first_user = history
        .iter()
        .position(|turn| turn.role == ChatRole::User)
        .unwrap_or(0);
    Ok(&history[first_user..])
}

/// Format an amount with Indian digit grouping (`45,00,000`), keeping up to three decimals.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let thousandths = (amount.abs() * 1000.0).round();
    let whole = (thousandths / 1000.0).trunc();
    let fraction = (thousandths - whole * 1000.0) as u32;

    let mut formatted = group_indian(&format!("{whole:.0}"));
    if fraction > 0 {
        let digits = format!("{fraction:03}");
        formatted.push('.');
        formatted.push_str(digits.trim_end_matches('0'));
    }

    if amount < 0.0 && (whole > 0.0 || fraction > 0) {
        formatted.insert(0, '-');
    }
    formatted
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

fn points(impact: f64) -> String {
    let rounded = impact.round();
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded:.0}")
    }
}

fn push_applicant_block(buffer: &mut String, record: &ApplicantRecord) {
    buffer.push_str("Applicant Data:\n");
    let _ = writeln!(
        buffer,
        "- Credit Utilization Ratio: {}%",
        record.credit_utilization
    );
    let _ = writeln!(
        buffer,
        "- Payment History Length: {} months",
        record.payment_history_months
    );
    let _ = writeln!(
        buffer,
        "- Debt-to-Income (DTI) Ratio: {}%",
        record.debt_to_income_ratio
    );
    let _ = writeln!(
        buffer,
        "- Recent Credit Inquiries: {}",
        record.recent_inquiries
    );
    let _ = writeln!(
        buffer,
        "- Annual Income: ₹{}",
        format_inr(record.annual_income)
    );
    let _ = writeln!(
        buffer,
        "- Loan Amount Required: ₹{}",
        format_inr(record.loan_amount)
    );
}

fn push_result_block(buffer: &mut String, result: &ScoringResult, impacts_heading: &str) {
    buffer.push_str("ML Model Output:\n");
    let _ = writeln!(buffer, "- Final Decision: {}", result.decision);
    let _ = writeln!(buffer, "- Calculated Credit Score: {}", result.score);
    let _ = writeln!(buffer, "- Model Used: {}", result.model_type.label());
    let _ = writeln!(buffer, "- {impacts_heading}");
    for (factor, entry) in result.feature_importance.iter() {
        let _ = writeln!(
            buffer,
            "  - {} Impact: {} points",
            factor.label(),
            points(entry.impact)
        );
    }
}
