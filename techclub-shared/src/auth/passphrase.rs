//! Shared review passphrases.
//!
//! Changing an application's status requires one of the configured review
//! passphrases in addition to a board/admin login. Only SHA-256 digests are
//! kept in memory and comparisons are constant-time.

use sha2::{Digest, Sha256};

type Fingerprint = [u8; 32];

/// Set of accepted review passphrases
#[derive(Clone, Default)]
pub struct ReviewPassphrases {
    digests: Vec<Fingerprint>,
}

impl std::fmt::Debug for ReviewPassphrases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewPassphrases")
            .field("count", &self.digests.len())
            .finish()
    }
}

fn fingerprint(value: &str) -> Fingerprint {
    Sha256::digest(value.as_bytes()).into()
}

fn constant_time_eq(a: &Fingerprint, b: &Fingerprint) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl ReviewPassphrases {
    /// Builds the set from individual passphrases; blank entries are ignored
    pub fn new<I, S>(passphrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let digests = passphrases
            .into_iter()
            .filter_map(|p| {
                let p = p.as_ref().trim();
                (!p.is_empty()).then(|| fingerprint(p))
            })
            .collect();

        Self { digests }
    }

    /// Parses a comma-separated list, as found in `REVIEW_PASSPHRASES`
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// True if `candidate` equals one of the passphrases
    ///
    /// Every configured digest is compared, whatever the outcome.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate = fingerprint(candidate.trim());
        self.digests
            .iter()
            .fold(false, |found, digest| constant_time_eq(digest, &candidate) | found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matches_any_configured() {
        let passphrases = ReviewPassphrases::from_csv("first-phrase, الرمز الثاني ,");
        assert_eq!(passphrases.len(), 2);

        assert!(passphrases.verify("first-phrase"));
        assert!(passphrases.verify("الرمز الثاني"));
        assert!(!passphrases.verify("first"));
        assert!(!passphrases.verify(""));
    }

    #[test]
    fn test_blank_list_is_empty() {
        let passphrases = ReviewPassphrases::from_csv(" , ,");
        assert!(passphrases.is_empty());
        assert!(!passphrases.verify(""));
    }

    #[test]
    fn test_debug_hides_values() {
        let passphrases = ReviewPassphrases::new(["top-secret"]);
        let debug = format!("{:?}", passphrases);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("count: 1"));
    }
}
