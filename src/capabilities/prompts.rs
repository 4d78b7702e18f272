//! `review-code` and `team-greeting` prompt templates.
use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::registry::{
    filter_prefix, CapabilityMeta, Completer, CompletionContext, PromptDescriptor, PromptMessage,
    PromptResponse,
};

pub const REVIEW_CODE: &str = "review-code";
pub const TEAM_GREETING: &str = "team-greeting";

/// Departments accepted by `team-greeting`. Only those with a roster in
/// [`team_members`] are offered as completions, so `support` is valid input
/// but never suggested.
pub const DEPARTMENTS: [&str; 4] = ["engineering", "sales", "marketing", "support"];
const FALLBACK_MEMBER: &str = "Guest";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReviewCodeArgs {
    /// The code to review.
    pub code: String,
}

pub fn review_code() -> PromptDescriptor {
    PromptDescriptor::new(
        CapabilityMeta::new(REVIEW_CODE)
            .title("Code Review")
            .description("Review code for best practices and potential issues"),
    )
}

pub async fn render_review_code(args: ReviewCodeArgs) -> anyhow::Result<PromptResponse> {
    Ok(PromptResponse::new(vec![PromptMessage::user(format!(
        "Please review this code:\n\n{}",
        args.code
    ))]))
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TeamGreetingArgs {
    /// Department the member belongs to.
    pub department: String,
    /// Name of the team member.
    pub name: String,
}

/// Members on record for a department. Departments without a roster greet
/// whoever asks as a guest.
pub fn team_members(department: &str) -> Option<&'static [&'static str]> {
    match department {
        "engineering" => Some(&["Alice", "Bob", "Charlie"]),
        "sales" => Some(&["David", "Eve", "Frank"]),
        "marketing" => Some(&["Grace", "Henry", "Iris"]),
        _ => None,
    }
}

/// Suggests staffed departments only.
fn department_completer() -> Completer {
    Arc::new(|value: &str, _context: &CompletionContext| {
        let staffed: Vec<&str> = DEPARTMENTS
            .into_iter()
            .filter(|department| team_members(department).is_some())
            .collect();
        filter_prefix(&staffed, value)
    })
}

/// Suggests members of the department already chosen in the same request.
fn member_completer() -> Completer {
    Arc::new(|value: &str, context: &CompletionContext| {
        let members = context
            .get("department")
            .and_then(team_members)
            .unwrap_or(&[FALLBACK_MEMBER]);
        filter_prefix(members, value)
    })
}

pub fn team_greeting() -> PromptDescriptor {
    PromptDescriptor::new(
        CapabilityMeta::new(TEAM_GREETING)
            .title("Team Greeting")
            .description("Generate a greeting for team members"),
    )
    .with_completion("department", department_completer())
    .with_completion("name", member_completer())
}

pub async fn render_team_greeting(args: TeamGreetingArgs) -> anyhow::Result<PromptResponse> {
    Ok(PromptResponse::new(vec![PromptMessage::user(format!(
        "Hello {}, welcome to the {} team!",
        args.name, args.department
    ))]))
}
