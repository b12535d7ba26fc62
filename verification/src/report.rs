//! Report renderer.
//!
//! Deterministic text formatter, a pure function of the verification record.
//! The exact layout is load-bearing: the output is posted verbatim into a
//! moderator-facing conversation thread and must round-trip through
//! copy/paste, so every label column and indent here is fixed.

use crate::engine::Verification;
use crate::COMMUNITIES_SHOWN;

/// Render the full results block for a passing verification.
pub(crate) fn results(verification: &Verification) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("{:>20}: {}", "User", verification.handle()));
    let created = verification
        .account_created()
        .expect("passing verdict resolved the account");
    lines.push(format!("{:>20}: {created}", "Created"));

    let activity = verification.community_activity();
    lines.push(format!("{:>20}: {}", "Commented subreddits", activity.len()));

    let mut ordered: Vec<_> = activity.iter().collect();
    // Stable sort: communities with equal counts stay in discovery order.
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    if ordered.len() > COMMUNITIES_SHOWN {
        lines.push(format!(
            "{:>20}:",
            format!("Top {COMMUNITIES_SHOWN} subreddits")
        ));
        ordered.truncate(COMMUNITIES_SHOWN);
    }
    for (community, count) in ordered {
        lines.push(format!("{:22}- {community} ({count} comments)", ""));
    }

    lines.push(format!(
        "{:>20}: {}",
        "Total comments found",
        verification.found_comments()
    ));
    lines.push(String::new());
    lines.push(format!("r/{} specific", verification.community()));
    lines.push(format!(
        "{:>20}: {}",
        "Comments",
        verification.comments().len()
    ));

    if !verification.comments().is_empty() {
        let karma = verification
            .karma()
            .expect("karma is computed once in-community comments exist");
        let average = verification
            .karma_average()
            .expect("karma average is computed once in-community comments exist");
        let newest = verification.comments().last().expect("non-empty").created;
        let oldest = verification.comments().first().expect("non-empty").created;
        lines.push(format!("{:>20}: {karma}", "Comment karma"));
        lines.push(format!("{:>20}: {average:.2}", "Average karma"));
        lines.push(format!("{:>20}: {newest}", "Newest comment"));
        lines.push(format!("{:>20}: {oldest}", "Oldest comment"));
    }

    for (kind, count) in verification.note_kinds() {
        lines.push(format!("{kind:>14} count: {count}"));
    }

    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
