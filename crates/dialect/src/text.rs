// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Text matching helpers
//!
//! Fuzzy scoring and mask matching shared by keyword assist, child
//! enumeration and catalog searches. All matching here is
//! case-insensitive; case sensitivity is decided by the callers that own
//! quoting information.

/// Score how well `candidate` matches the typed `pattern`.
///
/// Every pattern character must appear in the candidate in order;
/// otherwise the score is 0 (no match). Each matched character scores one
/// point and consecutive matches score an extra point, so `users` ranks
/// above `user_sessions` for the pattern `use`.
///
/// # Examples
///
/// ```
/// use sql_completion_dialect::text::fuzzy_score;
///
/// assert!(fuzzy_score("users", "use") > 0);
/// assert!(fuzzy_score("users", "use") > fuzzy_score("user_sets", "uss"));
/// assert_eq!(fuzzy_score("orders", "use"), 0);
/// ```
pub fn fuzzy_score(candidate: &str, pattern: &str) -> i32 {
    if pattern.is_empty() {
        return 1;
    }
    let candidate: Vec<char> = candidate.chars().flat_map(|c| c.to_lowercase()).collect();
    let mut score = 0;
    let mut pos = 0usize;
    let mut prev_match: Option<usize> = None;
    for pc in pattern.chars().flat_map(|c| c.to_lowercase()) {
        let mut found = None;
        for (i, cc) in candidate.iter().enumerate().skip(pos) {
            if *cc == pc {
                found = Some(i);
                break;
            }
        }
        match found {
            Some(i) => {
                score += 1;
                if prev_match == Some(i.wrapping_sub(1)) {
                    score += 1;
                }
                prev_match = Some(i);
                pos = i + 1;
            }
            None => return 0,
        }
    }
    score
}

/// Case-insensitive prefix test.
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Match a SQL object-name mask (`%` any run, `_` any character) against
/// a name, case-insensitively.
pub fn mask_matches(mask: &str, name: &str) -> bool {
    let mask: Vec<char> = mask.chars().flat_map(|c| c.to_lowercase()).collect();
    let name: Vec<char> = name.chars().flat_map(|c| c.to_lowercase()).collect();
    wildcard_match(&mask, &name, '%', '_')
}

/// Case-sensitive variant of [`mask_matches`], used for quoted input.
pub fn mask_matches_exact_case(mask: &str, name: &str) -> bool {
    let mask: Vec<char> = mask.chars().collect();
    let name: Vec<char> = name.chars().collect();
    wildcard_match(&mask, &name, '%', '_')
}

/// Match a navigator filter glob (`*` any run, `?` any character) against
/// a name, case-insensitively.
pub fn glob_matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().flat_map(|c| c.to_lowercase()).collect();
    let name: Vec<char> = name.chars().flat_map(|c| c.to_lowercase()).collect();
    wildcard_match(&pattern, &name, '*', '?')
}

fn wildcard_match(pattern: &[char], name: &[char], any_run: char, any_one: char) -> bool {
    // Iterative backtracking over the single any-run wildcard.
    let (mut p, mut n) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        if p < pattern.len() && (pattern[p] == any_one || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == any_run {
            star = Some((p, n));
            p += 1;
        } else if let Some((sp, sn)) = star {
            p = sp + 1;
            n = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == any_run {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_score_ordering() {
        assert_eq!(fuzzy_score("users", ""), 1);
        assert_eq!(fuzzy_score("orders", "xyz"), 0);
        let tight = fuzzy_score("status", "stat");
        let loose = fuzzy_score("site_total_sum", "stat");
        assert!(tight > 0 && loose > 0);
        assert!(tight > loose);
    }

    #[test]
    fn test_fuzzy_score_case_insensitive() {
        assert_eq!(fuzzy_score("USERS", "use"), fuzzy_score("users", "USE"));
    }

    #[test]
    fn test_mask_matches() {
        assert!(mask_matches("%", "anything"));
        assert!(mask_matches("use%", "USERS"));
        assert!(mask_matches("%der%", "orders"));
        assert!(mask_matches("u_ers", "users"));
        assert!(!mask_matches("use%", "orders"));
    }

    #[test]
    fn test_glob_matches() {
        assert!(glob_matches("users*", "users_archive"));
        assert!(glob_matches("*_tmp", "users_tmp"));
        assert!(glob_matches("u?ers", "users"));
        assert!(!glob_matches("users", "orders"));
    }
}
