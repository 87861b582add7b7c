//! Canned refinement chat.
//!
//! Replies come from fixed tables. A message is first checked for vague
//! input, then matched against an ordered list of keyword rules; the first
//! rule that matches picks the reply. Anything else gets a random generic
//! reply.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use storyforge_history::StoryContent;

/// Which part of the story a suggestion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionContext {
    Story,
    Testing,
    DevNotes,
    Criteria,
}

impl SuggestionContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionContext::Story => "story",
            SuggestionContext::Testing => "testing",
            SuggestionContext::DevNotes => "dev-notes",
            SuggestionContext::Criteria => "criteria",
        }
    }
}

/// A change the user can apply to the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub context: SuggestionContext,
    pub text: String,
}

/// The assistant's answer to one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply: String,
    pub suggestion: Suggestion,
    /// False when the suggestion only touches test data
    pub user_facing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyCategory {
    EdgeCases,
    StoryPoints,
    Criteria,
    Technical,
}

#[derive(Clone, Copy)]
struct CannedReply {
    reply: &'static str,
    suggestion: &'static str,
    user_facing: bool,
}

/// First match wins.
const CATEGORY_RULES: &[(&[&str], ReplyCategory)] = &[
    (&["edge case", "error"], ReplyCategory::EdgeCases),
    (&["points", "estimate"], ReplyCategory::StoryPoints),
    (&["criteria", "acceptance"], ReplyCategory::Criteria),
    (&["dev", "technical", "implementation"], ReplyCategory::Technical),
];

const CONTEXT_RULES: &[(&[&str], SuggestionContext)] = &[
    (&["test", "edge"], SuggestionContext::Testing),
    (&["code", "technical"], SuggestionContext::DevNotes),
    (&["criteria", "acceptance"], SuggestionContext::Criteria),
];

fn category_reply(category: ReplyCategory) -> CannedReply {
    match category {
        ReplyCategory::EdgeCases => CannedReply {
            reply: "I've identified a new edge case and added it to your test data. For the email validation, we should also consider users entering special characters like '+' or international characters. Would you like me to add acceptance criteria for internationalization?",
            suggestion: "User submits email with special characters like + or international domains",
            user_facing: false,
        },
        ReplyCategory::StoryPoints => CannedReply {
            reply: "Based on the complexity of email verification and the need for robust validation, I'd recommend keeping this at 5 story points. This accounts for frontend validation, backend API integration, and email service setup. Should we break this into smaller stories?",
            suggestion: "Adjust story points to 8 considering email service integration complexity",
            user_facing: true,
        },
        ReplyCategory::Criteria => CannedReply {
            reply: "I can strengthen the acceptance criteria. Would you like me to add specific validation rules for password complexity, or focus on the email verification flow? I can also add criteria for accessibility and error handling.",
            suggestion: "System displays real-time password strength indicator with specific requirements",
            user_facing: true,
        },
        ReplyCategory::Technical => CannedReply {
            reply: "I can provide technical implementation guidance. Based on your current story, I recommend considering OAuth integration for social login options and implementing rate limiting for failed attempts. Should I add these technical considerations to your developer notes?",
            suggestion: "Add rate limiting (5 attempts per minute) and OAuth integration for Google/GitHub login",
            user_facing: true,
        },
    }
}

static GENERIC_REPLIES: [CannedReply; 5] = [
    CannedReply {
        reply: "I notice you might want to strengthen the acceptance criteria. Let me suggest adding specific validation requirements that will make this story more testable and clear for developers. Would you like me to explore additional edge cases for email validation next?",
        suggestion: "System validates email format using RFC 5322 standard and displays specific error messages for invalid formats",
        user_facing: true,
    },
    CannedReply {
        reply: "Based on the current story complexity, I'm analyzing the technical requirements. This registration flow needs robust error handling and user feedback mechanisms. Should I add technical specifications for password hashing and session management?",
        suggestion: "Implement bcrypt password hashing with salt rounds of 12 and JWT session tokens with 24-hour expiration",
        user_facing: true,
    },
    CannedReply {
        reply: "Let me help refine the story points estimation. Considering email verification, validation logic, and error handling, this story involves more complexity than initially apparent. Would you like me to suggest breaking this into smaller, more manageable stories?",
        suggestion: "Increase story points to 8 due to email service integration and comprehensive validation requirements",
        user_facing: true,
    },
    CannedReply {
        reply: "I'm identifying potential edge cases for this registration flow. Users often encounter issues with email providers that have strict filtering or international domain names. Should I add test cases for accessibility and internationalization support?",
        suggestion: "User attempts registration with disposable email addresses or international domain extensions",
        user_facing: false,
    },
    CannedReply {
        reply: "Looking at your current acceptance criteria, I can see opportunities to make them more specific and measurable. Clear success metrics will help both QA and development teams. Would you like me to explore security considerations for user data handling next?",
        suggestion: "User receives confirmation email within 30 seconds and verification link expires after 24 hours",
        user_facing: true,
    },
];

/// Canned chat assistant for refining a story.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefinementAssistant;

impl RefinementAssistant {
    /// Reply to a message, picking generic replies at random.
    pub fn reply(&self, message: &str) -> AssistantReply {
        self.reply_with(message, |n| rand::thread_rng().gen_range(0..n))
    }

    /// Reply to a message; `pick(n)` chooses among `n` generic replies.
    pub fn reply_with(&self, message: &str, pick: impl FnOnce(usize) -> usize) -> AssistantReply {
        let lower = message.trim().to_lowercase();

        let category = if is_vague(&lower) {
            None
        } else {
            CATEGORY_RULES
                .iter()
                .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
                .map(|(_, category)| *category)
        };
        debug!(?category, "Matched refinement category");

        let canned = match category {
            Some(category) => category_reply(category),
            None => {
                let index = pick(GENERIC_REPLIES.len()).min(GENERIC_REPLIES.len() - 1);
                GENERIC_REPLIES[index]
            }
        };

        AssistantReply {
            reply: canned.reply.to_string(),
            suggestion: Suggestion {
                context: detect_context(message),
                text: canned.suggestion.to_string(),
            },
            user_facing: canned.user_facing,
        }
    }
}

/// Which part of the story a message is about.
pub fn detect_context(message: &str) -> SuggestionContext {
    let lower = message.to_lowercase();
    CONTEXT_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(SuggestionContext::Story, |(_, context)| *context)
}

/// Too short, keyboard mash, or a lone filler word. Expects trimmed lowercase input.
pub fn is_vague(lower: &str) -> bool {
    let len = lower.chars().count();
    len < 3
        || only_chars(lower, "dfg")
        || only_chars(lower, "hjk")
        || only_chars(lower, "abc")
        || stretched(lower, "tes", 't')
        || stretched(lower, "hel", 'p')
        || stretched(lower, "fi", 'x')
        || stretched(lower, "mor", 'e')
        || matches!(lower, "ac" | "more details" | "help help help")
        || (len >= 4 && lower.chars().all(|c| Some(c) == lower.chars().next()))
        || only_chars(lower, "!@#$%^&*()")
}

fn only_chars(s: &str, allowed: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| allowed.contains(c))
}

/// `stem` followed by one or more `tail` characters, like "helppp".
fn stretched(s: &str, stem: &str, tail: char) -> bool {
    s.strip_prefix(stem)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c == tail))
}

/// Apply a suggestion to the draft.
///
/// Testing suggestions become edge cases, dev-note suggestions become code
/// snippets, and everything else becomes an acceptance criterion, except
/// story suggestions that name "story points to N", which set the points.
pub fn apply_suggestion(draft: &mut StoryContent, suggestion: &Suggestion) {
    match suggestion.context {
        SuggestionContext::Testing => {
            draft
                .test_data_mut()
                .edge_cases
                .push(suggestion.text.clone());
        }
        SuggestionContext::DevNotes => {
            draft
                .test_data_mut()
                .code_snippets
                .push(suggestion.text.clone());
        }
        SuggestionContext::Criteria => draft.acceptance_criteria.push(suggestion.text.clone()),
        SuggestionContext::Story => match suggested_points(&suggestion.text) {
            Some(points) => draft.story_points = points,
            None => draft.acceptance_criteria.push(suggestion.text.clone()),
        },
    }
}

fn suggested_points(text: &str) -> Option<u32> {
    const MARKER: &str = "story points to ";
    let lower = text.to_lowercase();
    let start = lower.find(MARKER)? + MARKER.len();
    let digits: String = lower[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_rules_in_order() {
        let assistant = RefinementAssistant;

        let reply = assistant.reply_with("What edge cases should we consider?", |_| 0);
        assert!(!reply.user_facing);
        assert!(reply.suggestion.text.contains("special characters"));

        let reply = assistant.reply_with("Is 5 story points appropriate?", |_| 0);
        assert_eq!(
            reply.suggestion.text,
            "Adjust story points to 8 considering email service integration complexity"
        );
        assert_eq!(reply.suggestion.context, SuggestionContext::Story);

        // "error" outranks "acceptance"
        let reply = assistant.reply_with("acceptance criteria for error states", |_| 0);
        assert!(!reply.user_facing);
        assert_eq!(reply.suggestion.context, SuggestionContext::Criteria);
    }

    #[test]
    fn test_technical_reply_targets_dev_notes() {
        let reply = RefinementAssistant
            .reply_with("What technical considerations should developers know?", |_| 0);
        assert!(reply.suggestion.text.starts_with("Add rate limiting"));
        assert_eq!(reply.suggestion.context, SuggestionContext::DevNotes);
    }

    #[test]
    fn test_vague_input_uses_generic_table() {
        let reply = RefinementAssistant.reply_with("helppp", |n| {
            assert_eq!(n, 5);
            2
        });
        assert!(reply.suggestion.text.starts_with("Increase story points to 8"));

        // Out-of-range picks are clamped
        let reply = RefinementAssistant.reply_with("??", |_| 99);
        assert!(reply.suggestion.text.starts_with("User receives confirmation email"));
    }

    #[test]
    fn test_unmatched_input_uses_generic_table() {
        let reply = RefinementAssistant.reply_with("make it better please", |_| 0);
        assert!(reply.suggestion.text.contains("RFC 5322"));
        assert_eq!(reply.suggestion.context, SuggestionContext::Story);
    }

    #[test]
    fn test_is_vague() {
        for vague in [
            "ok", "dfgdfg", "hjk", "abcab", "testtt", "help", "fixxx", "moree", "ac",
            "more details", "help help help", "zzzz", "!!@@",
        ] {
            assert!(is_vague(vague), "expected vague: {}", vague);
        }
        for specific in ["tests", "helpful", "zzz", "fix the login bug", "more detail please"] {
            assert!(!is_vague(specific), "expected specific: {}", specific);
        }
    }

    #[test]
    fn test_detect_context() {
        assert_eq!(detect_context("Any EDGE cases?"), SuggestionContext::Testing);
        assert_eq!(detect_context("show me code"), SuggestionContext::DevNotes);
        assert_eq!(detect_context("tighten acceptance"), SuggestionContext::Criteria);
        assert_eq!(detect_context("sounds good"), SuggestionContext::Story);
    }

    #[test]
    fn test_apply_suggestion_by_context() {
        let mut draft = StoryContent::default();

        apply_suggestion(
            &mut draft,
            &Suggestion {
                context: SuggestionContext::Testing,
                text: "Disposable email".into(),
            },
        );
        apply_suggestion(
            &mut draft,
            &Suggestion {
                context: SuggestionContext::DevNotes,
                text: "Rate limit".into(),
            },
        );
        apply_suggestion(
            &mut draft,
            &Suggestion {
                context: SuggestionContext::Criteria,
                text: "Strength meter".into(),
            },
        );
        apply_suggestion(
            &mut draft,
            &Suggestion {
                context: SuggestionContext::Story,
                text: "Increase story points to 13 due to scope".into(),
            },
        );

        let test_data = draft.test_data.as_ref().unwrap();
        assert_eq!(test_data.edge_cases, vec!["Disposable email".to_string()]);
        assert_eq!(test_data.code_snippets, vec!["Rate limit".to_string()]);
        assert_eq!(draft.acceptance_criteria, vec!["Strength meter".to_string()]);
        assert_eq!(draft.story_points, 13);
    }

    #[test]
    fn test_story_suggestion_without_points_becomes_criterion() {
        let mut draft = StoryContent::default();
        apply_suggestion(
            &mut draft,
            &Suggestion {
                context: SuggestionContext::Story,
                text: "Verification link expires after 24 hours".into(),
            },
        );
        assert_eq!(draft.acceptance_criteria.len(), 1);
        assert_eq!(draft.story_points, 0);
    }
}
