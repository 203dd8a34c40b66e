//! Prompts sent to the chat-completion model.
//!
//! Every piece of model-facing text lives here so a prompt regression shows
//! up in one diff, and unit tests can inspect the templates without a
//! provider. Callers can override the system instruction via
//! [`crate::config::ConsultConfig::system_prompt`]; the two request
//! templates are always used.

use crate::classify::RequestKind;

/// System instruction for every consult.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful medical assistant that analyzes symptoms and gives possible causes, advice, or diet plans depending on user request.";

/// Sentence the diagnosis template requires at the end of every answer.
pub const DOCTOR_NOTICE: &str = "Consult a licensed doctor before acting.";

/// Disclaimer the diet-plan template requires.
pub const DIET_DISCLAIMER: &str =
    "This is not medical advice. Please consult a healthcare professional.";

/// Meals every day of the plan must cover, in table order.
pub const MEALS: [&str; 5] = [
    "Breakfast",
    "Mid-morning snack",
    "Lunch",
    "Evening snack",
    "Dinner",
];

/// Diagnosis request: possible conditions plus basic prevention.
pub fn diagnosis_prompt(symptoms: &str) -> String {
    format!(
        "You are a medical assistant.\n\
         The patient describes: {symptoms}\n\
         Identify possible conditions, suggest basic prevention measures,\n\
         and always add: \"{DOCTOR_NOTICE}\"\n"
    )
}

/// Seven-day diet plan request, formatted as markdown tables.
///
/// The `Day N` lines and the `Breakfast` row are what the day-table
/// renderer and the export check look for, so the template asks for both
/// explicitly.
pub fn diet_plan_prompt(symptoms: &str) -> String {
    let meals: String = MEALS.iter().map(|m| format!("- {m}\n")).collect();
    format!(
        "You are a medical nutrition assistant.\n\
         The patient has the following symptoms: {symptoms}.\n\n\
         Generate a personalized 7-day diet plan that includes:\n\
         {meals}\n\
         Also include:\n\
         - Foods to avoid\n\
         - Nutritional notes per day\n\
         - Water intake advice\n\n\
         Start each day with a line of the form \"Day 1\", \"Day 2\", and so on.\n\
         Format strictly as a markdown table.\n\
         Add: \"{DIET_DISCLAIMER}\"\n"
    )
}

/// Pick the template for `kind`.
pub fn user_prompt(kind: RequestKind, message: &str) -> String {
    match kind {
        RequestKind::Diagnosis => diagnosis_prompt(message),
        RequestKind::DietPlan => diet_plan_prompt(message),
    }
}
