//! Reconciliation of snippet-tagged database entries against webhook
//! snippets, keyed by owner email.

use serde::Serialize;

use crate::entries::TaggedEntry;
use crate::snippets::Snippet;

/// No snippet-tagged entry was found for the user.
pub const CHECK_MISSING: u8 = 0;
/// Rendered entry content equals the snippet content byte-for-byte.
pub const CHECK_MATCH: u8 = 1;
/// An entry and snippet pair exists but their content differs.
pub const CHECK_MISMATCH: u8 = 2;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SnippetCheck {
    pub user_email: String,
    pub check: u8,
}

/// Joins tagged entries (with rendered content) against snippets by the
/// entry's first owner email and classifies each pairing; every user in
/// the static table without a classified pairing is appended with
/// [`CHECK_MISSING`].
///
/// The result is ordered: matched classifications in entry-then-snippet
/// iteration order, then unmatched table users in definition order.
/// Entries sharing an owner email each produce their own result; no
/// dedup is performed. Entries with more than one owner are compared on
/// the first owner only.
pub fn reconcile(
    entries: &[TaggedEntry],
    snippets: &[Snippet],
    user_table: &[(&str, &str)],
) -> Vec<SnippetCheck> {
    let mut result = Vec::new();

    for entry in entries {
        let Some(email) = entry.who_email.first() else {
            continue;
        };
        let rendered = entry.content.as_deref().unwrap_or(&[]).join("\n");

        for snippet in snippets {
            if &snippet.user_email == email {
                let check = if rendered == snippet.content {
                    CHECK_MATCH
                } else {
                    CHECK_MISMATCH
                };
                result.push(SnippetCheck {
                    user_email: email.clone(),
                    check,
                });
            }
        }
    }

    for (_, email) in user_table {
        if !result.iter().any(|r| r.user_email == *email) {
            result.push(SnippetCheck {
                user_email: (*email).to_string(),
                check: CHECK_MISSING,
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(&str, &str)] = &[("alice", "x@y.com"), ("bob", "b@y.com")];

    fn entry(email: &str, lines: &[&str]) -> TaggedEntry {
        TaggedEntry {
            id: "page-1".to_string(),
            name: vec!["page".to_string()],
            relations: vec![],
            who: vec!["alice".to_string()],
            who_email: vec![email.to_string()],
            content: Some(lines.iter().map(|l| l.to_string()).collect()),
        }
    }

    fn snippet(email: &str, content: &str) -> Snippet {
        Snippet {
            user_email: email.to_string(),
            snippet_date: "2025-09-22".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn identical_content_classifies_as_match() {
        let result = reconcile(
            &[entry("x@y.com", &["line1\n"])],
            &[snippet("x@y.com", "line1\n")],
            TABLE,
        );
        assert_eq!(
            result[0],
            SnippetCheck {
                user_email: "x@y.com".to_string(),
                check: CHECK_MATCH,
            }
        );
    }

    #[test]
    fn differing_content_classifies_as_mismatch() {
        let result = reconcile(
            &[entry("x@y.com", &["line1\n"])],
            &[snippet("x@y.com", "line2\n")],
            TABLE,
        );
        assert_eq!(result[0].check, CHECK_MISMATCH);
    }

    #[test]
    fn users_without_entries_fall_back_to_missing() {
        let result = reconcile(&[], &[], TABLE);
        assert_eq!(
            result,
            vec![
                SnippetCheck {
                    user_email: "x@y.com".to_string(),
                    check: CHECK_MISSING,
                },
                SnippetCheck {
                    user_email: "b@y.com".to_string(),
                    check: CHECK_MISSING,
                },
            ]
        );
    }

    #[test]
    fn snippet_without_entry_still_resolves_to_missing() {
        // Reconciliation is entry-driven: a stray snippet alone never
        // produces a match or mismatch.
        let result = reconcile(&[], &[snippet("x@y.com", "orphan\n")], TABLE);
        assert_eq!(result[0].check, CHECK_MISSING);
        assert_eq!(result.len(), TABLE.len());
    }

    #[test]
    fn multi_line_content_joins_with_newline_before_compare() {
        let result = reconcile(
            &[entry("x@y.com", &["a\n", "b\n"])],
            &[snippet("x@y.com", "a\n\nb\n")],
            TABLE,
        );
        assert_eq!(result[0].check, CHECK_MATCH);
    }

    #[test]
    fn duplicate_owner_entries_each_append_a_result() {
        let result = reconcile(
            &[entry("x@y.com", &["one\n"]), entry("x@y.com", &["two\n"])],
            &[snippet("x@y.com", "one\n")],
            TABLE,
        );
        let for_x: Vec<u8> = result
            .iter()
            .filter(|r| r.user_email == "x@y.com")
            .map(|r| r.check)
            .collect();
        assert_eq!(for_x, vec![CHECK_MATCH, CHECK_MISMATCH]);
    }

    #[test]
    fn only_first_owner_email_is_compared() {
        let mut multi_owner = entry("x@y.com", &["shared\n"]);
        multi_owner.who_email.push("b@y.com".to_string());

        let result = reconcile(
            &[multi_owner],
            &[snippet("b@y.com", "shared\n")],
            TABLE,
        );
        // The second owner's snippet is never consulted, so both users
        // end up in the fallback pass.
        assert!(result.iter().all(|r| r.check == CHECK_MISSING));
    }

    #[test]
    fn entry_without_owner_email_is_skipped() {
        let mut ownerless = entry("x@y.com", &["text\n"]);
        ownerless.who_email.clear();

        let result = reconcile(&[ownerless], &[snippet("x@y.com", "text\n")], TABLE);
        assert_eq!(result[0].check, CHECK_MISSING);
    }
}
