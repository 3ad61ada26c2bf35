//! Approximate key lookup.

use crate::config::FuzzyConfig;

/// Optimal string alignment distance between two strings.
///
/// Levenshtein edits plus transposition of two adjacent characters, so
/// `"nmae"` is one edit away from `"name"`.
pub fn edit_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    let m = a.len();
    let n = b.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let mut best = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(dp[i - 2][j - 2] + 1);
            }
            dp[i][j] = best;
        }
    }

    dp[m][n]
}

/// Keys within `config.distance` of `name`, closest first, ties in lexical
/// order, at most `config.limit` of them.
pub fn candidates<'k, I>(name: &str, keys: I, config: &FuzzyConfig) -> Vec<&'k str>
where
    I: IntoIterator<Item = &'k String>,
{
    let fold = |s: &str| {
        if config.ignore_case {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    };
    let wanted = fold(name);

    let mut scored: Vec<(usize, &'k str)> = keys
        .into_iter()
        .map(|key| (edit_distance(&wanted, &fold(key)), key.as_str()))
        .filter(|(distance, _)| *distance <= config.distance)
        .collect();
    scored.sort();
    scored.truncate(config.limit);
    scored.into_iter().map(|(_, key)| key).collect()
}
