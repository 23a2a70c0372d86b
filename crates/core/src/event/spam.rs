//! Submission screening: honeypot and link-count checks.
//!
//! Neither check is a validation rule. A tripped check blocks the save and
//! sends the form back with every submitted value intact.

use std::sync::LazyLock;

use regex::Regex;

/// Descriptions with more links than this are treated as spam.
pub const MAX_DESCRIPTION_LINKS: usize = 3;

pub const TOO_MANY_LINKS_MESSAGE: &str =
    "We allow a maximum of 3 links in a description. You have too many links.";

pub const EVIL_ROBOT_MESSAGE: &str = "Evil Robot: We didn't save this event because we think \
     you're an evil robot. If you're really not an evil robot, look at the form instructions \
     more carefully. If this doesn't work please file a bug report and let us know.";

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("Invalid regex"));

/// Counts `http://` and `https://` occurrences, ignoring case.
pub fn count_links(text: &str) -> usize {
    LINK_PATTERN.find_iter(text).count()
}

/// Returns true if `text` carries more than [`MAX_DESCRIPTION_LINKS`] links.
pub fn is_spammy(text: &str) -> bool {
    !text.is_empty() && count_links(text) > MAX_DESCRIPTION_LINKS
}

/// Why a submission was held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionBlock {
    /// The hidden honeypot field was filled in.
    EvilRobot,
    TooManyLinks,
}

impl SubmissionBlock {
    pub fn message(&self) -> &'static str {
        match self {
            SubmissionBlock::EvilRobot => EVIL_ROBOT_MESSAGE,
            SubmissionBlock::TooManyLinks => TOO_MANY_LINKS_MESSAGE,
        }
    }
}

/// Runs both checks and returns every block that applies.
pub fn screen_submission(trap_field: Option<&str>, description: &str) -> Vec<SubmissionBlock> {
    let mut blocks = Vec::new();
    if trap_field.is_some_and(|t| !t.trim().is_empty()) {
        blocks.push(SubmissionBlock::EvilRobot);
    }
    if is_spammy(description) {
        blocks.push(SubmissionBlock::TooManyLinks);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(n: usize) -> String {
        (0..n)
            .map(|i| format!("see http://example.com/{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_count_links_is_case_insensitive() {
        assert_eq!(count_links("HTTP://a.com https://b.com HtTpS://c.com"), 3);
        assert_eq!(count_links("ftp://a.com www.b.com"), 0);
    }

    #[test]
    fn test_link_threshold() {
        assert!(!is_spammy(""));
        assert!(!is_spammy(&links(0)));
        assert!(!is_spammy(&links(3)));
        assert!(is_spammy(&links(4)));
        assert!(is_spammy(&links(5)));
    }

    #[test]
    fn test_screen_clean_submission() {
        assert!(screen_submission(None, &links(2)).is_empty());
        assert!(screen_submission(Some(""), "no links").is_empty());
        assert!(screen_submission(Some("   "), "no links").is_empty());
    }

    #[test]
    fn test_screen_honeypot() {
        assert_eq!(
            screen_submission(Some("gotcha"), ""),
            vec![SubmissionBlock::EvilRobot]
        );
    }

    #[test]
    fn test_screen_both() {
        assert_eq!(
            screen_submission(Some("gotcha"), &links(5)),
            vec![SubmissionBlock::EvilRobot, SubmissionBlock::TooManyLinks]
        );
        assert_eq!(
            SubmissionBlock::TooManyLinks.message(),
            "We allow a maximum of 3 links in a description. You have too many links."
        );
    }
}
