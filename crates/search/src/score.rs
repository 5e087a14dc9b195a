//! Token-set similarity scoring.
//!
//! `token_set_ratio` compares the deduplicated token sets of two strings,
//! building three comparison strings from the shared and unique tokens and
//! taking the best pairwise block-matching ratio. Scores land in [0, 100];
//! identical token sets score 100 regardless of token order.

use std::collections::BTreeSet;

/// Similarity between two strings in [0, 100], higher = more alike.
///
/// Symmetric: `token_set_ratio(a, b) == token_set_ratio(b, a)`.
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a: BTreeSet<String> = a.split_whitespace().map(|t| t.to_lowercase()).collect();
    let tokens_b: BTreeSet<String> = b.split_whitespace().map(|t| t.to_lowercase()).collect();

    let common: Vec<&str> = tokens_a.intersection(&tokens_b).map(|s| s.as_str()).collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).map(|s| s.as_str()).collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).map(|s| s.as_str()).collect();

    let s0 = common.join(" ");
    let s1 = join_groups(&common, &only_a);
    let s2 = join_groups(&common, &only_b);

    ratio(&s0, &s1).max(ratio(&s0, &s2)).max(ratio(&s1, &s2))
}

/// Join the shared tokens followed by one side's unique tokens.
fn join_groups(common: &[&str], unique: &[&str]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(common.len() + unique.len());
    parts.extend_from_slice(common);
    parts.extend_from_slice(unique);
    parts.join(" ")
}

/// Block-matching ratio: `round(200 * M / (|x| + |y|))` where `M` is the
/// total matched characters under longest-common-block recursion.
///
/// Two empty strings are identical, hence 100. Argument order is
/// canonicalized first so the ratio is symmetric even when several
/// equally-long common blocks exist.
fn ratio(x: &str, y: &str) -> u32 {
    let x_chars: Vec<char> = x.chars().collect();
    let y_chars: Vec<char> = y.chars().collect();
    let total = x_chars.len() + y_chars.len();
    if total == 0 {
        return 100;
    }

    let m = if x <= y {
        matching_chars(&x_chars, &y_chars)
    } else {
        matching_chars(&y_chars, &x_chars)
    };

    ((200.0 * m as f64) / total as f64).round() as u32
}

/// Total matching characters: find the longest common contiguous block,
/// recurse on the remainders to its left and right, and sum the lengths.
fn matching_chars(x: &[char], y: &[char]) -> usize {
    let (size, xi, yi) = longest_common_block(x, y);
    if size == 0 {
        return 0;
    }
    size
        + matching_chars(&x[..xi], &y[..yi])
        + matching_chars(&x[xi + size..], &y[yi + size..])
}

/// Longest common contiguous block of `x` and `y` as `(length, x_start,
/// y_start)`. Ties resolve to the earliest block in `x`, then in `y`.
fn longest_common_block(x: &[char], y: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; y.len() + 1];
    let mut curr = vec![0usize; y.len() + 1];

    for i in 0..x.len() {
        for j in 0..y.len() {
            curr[j + 1] = if x[i] == y[j] { prev[j] + 1 } else { 0 };
            let len = curr[j + 1];
            if len > best.0 {
                best = (len, i + 1 - len, j + 1 - len);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.iter_mut().for_each(|v| *v = 0);
    }

    best
}
