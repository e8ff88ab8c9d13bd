//! Text similarity for duplicate suppression and merge matching
//!
//! Implements the Ratcliff/Obershelp "gestalt pattern matching" ratio: find
//! the longest common block, recurse on the unmatched text to its left and
//! right, and score `2 * matched / total_len`. Thresholds used by the merger
//! (0.85 match, 0.8 evidence drift) are calibrated against this ratio, not
//! against edit distance.
//!
//! [`similarity`] compares case-insensitively and also scores a
//! token-sorted form of both strings, keeping the higher ratio, so that
//! "VMware vSphere 6.7 cluster" and "vSphere 6.7 cluster (VMware)" are
//! recognized as the same item.

use std::collections::HashMap;

/// Sequences at least this long get popular-element pruning
const AUTOJUNK_MIN_LEN: usize = 200;

/// Case-insensitive similarity in `[0.0, 1.0]`
///
/// # Examples
///
/// ```
/// use dossier_domain::similarity;
///
/// assert_eq!(similarity("Dell PowerEdge", "dell poweredge"), 1.0);
/// assert!(similarity("VMware vSphere 6.7", "Oracle Database 19c") < 0.5);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let direct = sequence_ratio(&normalize(a), &normalize(b));
    if direct >= 1.0 {
        return direct;
    }
    let sorted = sequence_ratio(&token_sorted(a), &token_sorted(b));
    direct.max(sorted)
}

/// Raw Ratcliff/Obershelp ratio over characters, case-sensitive
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = SequenceMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Lowercase and collapse runs of whitespace
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, strip punctuation, sort tokens
fn token_sorted(s: &str) -> String {
    let cleaned: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = cleaned
        .split_whitespace()
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Longest-matching-block search over two char sequences
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each element of `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        // Elements making up more than 1% of a long `b` are treated as noise
        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = if j > 0 { j2len.get(&(j - 1)).copied().unwrap_or(0) } else { 0 } + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow the block over elements pruned as popular
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total length of all matching blocks
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }
}
