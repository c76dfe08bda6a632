//! Canned prompts offered to assistants.

pub const ANALYZE_FEEDBACK: &str = "\
Please analyze the feedback in the log file and provide insights on:
1. Common themes or patterns
2. Sentiment analysis (positive, negative, neutral)
3. Actionable suggestions based on the feedback
4. Any urgent issues that need immediate attention

Format your response in a clear, structured way with sections for each of the above points.
";

pub const REVIEW_WORKFLOW: &str = "\
1. Read `feedback://log` (or `feedback://meta` for source URLs and context).
2. Pick the entries that map to code you can change.
3. Make the change.
4. Call `mark_feedback_addressed` with the entry's id (or timestamp) and a short resolution.
";

/// `(name, description, body)` for every prompt.
pub const ALL: &[(&str, &str, &str)] = &[
    (
        "analyze_feedback",
        "Summarise themes, sentiment and urgent issues in the feedback log",
        ANALYZE_FEEDBACK,
    ),
    (
        "review_workflow",
        "Steps for working through open feedback entries",
        REVIEW_WORKFLOW,
    ),
];

pub fn get(name: &str) -> Option<&'static str> {
    ALL.iter().find(|(n, _, _)| *n == name).map(|(_, _, body)| *body)
}
