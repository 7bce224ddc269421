//! Summary styles and the reduce-stage dispatch table.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SHORT_PROMPT: &str = "
Write a concise executive-style summary.

RULES:
- One short paragraph
- Simple language
- No headings
- No definitions
- Focus on overall meaning
- 120–150 tokens
";

const TOPIC_WISE_PROMPT: &str = "
Create a TOPIC-WISE summary.

RULES:
- Use clear topic headings
- 2–3 short sentences per topic
- Simple student-friendly language
- No formulas or definitions
- Do not repeat topics

FORMAT:
## Topic Name
Explanation
";

const BULLET_POINT_PROMPT: &str = "
Create a BULLET-POINT summary.

RULES:
- 8–12 bullet points
- Each bullet = one clear idea
- No explanations
- No definitions
- Easy to scan and act on
";

/// Final summary style selected once per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SummaryMode {
    /// One short paragraph.
    #[default]
    Short,
    /// Markdown headings, a few sentences per topic.
    TopicWise,
    /// Flat list of 8 to 12 bullets.
    BulletPoint,
}

/// Raised when a mode label or slug is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown summary mode '{0}'")]
pub struct ParseSummaryModeError(pub String);

impl SummaryMode {
    /// Every mode, in the order they are offered to users.
    pub const ALL: [SummaryMode; 3] = [Self::Short, Self::TopicWise, Self::BulletPoint];

    /// Human-facing label offered by the mode selector.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Short => "Short Summary (Recommended)",
            Self::TopicWise => "Topic-wise Summary",
            Self::BulletPoint => "Bullet-point Summary",
        }
    }

    /// Machine-friendly name used by the CLI and HTTP surfaces.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::TopicWise => "topic-wise",
            Self::BulletPoint => "bullet-point",
        }
    }

    /// System prompt for the reduce request.
    pub const fn system_prompt(self) -> &'static str {
        match self {
            Self::Short => SHORT_PROMPT,
            Self::TopicWise => TOPIC_WISE_PROMPT,
            Self::BulletPoint => BULLET_POINT_PROMPT,
        }
    }

    /// Output budget (tokens) for the reduce request.
    pub const fn max_tokens(self) -> u32 {
        match self {
            Self::Short => 170,
            Self::TopicWise => 600,
            Self::BulletPoint => 300,
        }
    }

    /// Whether the rendered result carries markdown headings.
    pub const fn is_markdown(self) -> bool {
        matches!(self, Self::TopicWise)
    }

    /// Resolve one of the exact selector labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == label)
    }
}

impl FromStr for SummaryMode {
    type Err = ParseSummaryModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(mode) = Self::from_label(trimmed) {
            return Ok(mode);
        }
        let normalized = trimmed.to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "short" => Ok(Self::Short),
            "topic-wise" | "topicwise" | "topic" => Ok(Self::TopicWise),
            "bullet-point" | "bullets" | "bullet" => Ok(Self::BulletPoint),
            _ => Err(ParseSummaryModeError(trimmed.to_string())),
        }
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_select_budget_and_prompt() {
        let short = SummaryMode::from_label("Short Summary (Recommended)").expect("short");
        assert_eq!(short.max_tokens(), 170);
        assert!(short.system_prompt().contains("One short paragraph"));

        let topic = SummaryMode::from_label("Topic-wise Summary").expect("topic");
        assert_eq!(topic.max_tokens(), 600);
        assert!(topic.system_prompt().contains("## Topic Name"));

        let bullets = SummaryMode::from_label("Bullet-point Summary").expect("bullets");
        assert_eq!(bullets.max_tokens(), 300);
        assert!(bullets.system_prompt().contains("8–12 bullet points"));
    }

    #[test]
    fn prompts_are_distinct_per_mode() {
        assert_ne!(
            SummaryMode::Short.system_prompt(),
            SummaryMode::TopicWise.system_prompt()
        );
        assert_ne!(
            SummaryMode::TopicWise.system_prompt(),
            SummaryMode::BulletPoint.system_prompt()
        );
    }

    #[test]
    fn parses_slugs_and_labels() {
        assert_eq!("short".parse::<SummaryMode>(), Ok(SummaryMode::Short));
        assert_eq!("Topic_Wise".parse::<SummaryMode>(), Ok(SummaryMode::TopicWise));
        assert_eq!(
            "bullet-point".parse::<SummaryMode>(),
            Ok(SummaryMode::BulletPoint)
        );
        assert_eq!(
            "Bullet-point Summary".parse::<SummaryMode>(),
            Ok(SummaryMode::BulletPoint)
        );
        assert!("haiku".parse::<SummaryMode>().is_err());
    }

    #[test]
    fn only_topic_wise_renders_markdown() {
        let markdown: Vec<_> = SummaryMode::ALL
            .into_iter()
            .filter(|mode| mode.is_markdown())
            .collect();
        assert_eq!(markdown, vec![SummaryMode::TopicWise]);
    }
}
