//! Fixed prompt texts sent to the completion endpoint.

/// System prompt: terse bullet answers, slots in chronobiologically good windows.
pub const SYSTEM_PROMPT: &str = "You are an ultra\u{2011}concise personal planning assistant. \
Always reply with 1\u{2011}3 short bullet points in plain text. \
When suggesting time slots, use biologically optimal periods: \
morning (08:00\u{2011}12:00) for cognitively demanding tasks, \
midday (13:00\u{2011}15:00) for routine work, \
late afternoon (16:00\u{2011}19:00) for creative or reflective tasks. \
Offer the best specific windows (DD.MM HH:MM–HH:MM). \
Do not output explanations unless the user explicitly asks. \
If the answer needs no scheduling, still keep it under 40 words.";

/// Header of the goal-summary request built from the life-plan answers.
pub const GOAL_SUMMARY_PREFIX: &str =
    "Сформулируй 3-5 конкретных жизненных цели и смысловых ориентира на основании:\n";

/// Header of the goal-extraction request sent after the user confirms the summary.
pub const GOAL_EXTRACTION_PREFIX: &str = "Выдели списком 3-5 ключевых жизненных целей на основании:\n";

/// Intro line of the secretary context block.
pub const CONTEXT_INTRO: &str =
    "You are a personal planning assistant. Help schedule tasks and give suggestions.\n";

#[must_use]
pub fn goal_summary_prompt(answers: &[String]) -> String {
    format!("{GOAL_SUMMARY_PREFIX}{}", answers.join("\n"))
}

#[must_use]
pub fn goal_extraction_prompt(answers: &[String]) -> String {
    format!("{GOAL_EXTRACTION_PREFIX}{}", answers.join("\n"))
}
