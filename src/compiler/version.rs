use std::{fmt, str::FromStr};
use thiserror::Error;

/// Long (detailed) solc version, e.g. `0.8.17+commit.8df45f5f`
/// or `0.8.15-nightly.2022.5.27+commit.095cc647`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(semver::Version);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid semver: {0}")]
    Semver(String),
    #[error("commit hash is missing in version `{0}`")]
    NoCommit(String),
}

impl Version {
    pub fn is_release(&self) -> bool {
        self.0.pre.is_empty()
    }

    /// `major.minor.patch` part, the form users usually type.
    pub fn short(&self) -> String {
        format!("{}.{}.{}", self.0.major, self.0.minor, self.0.patch)
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        let version = semver::Version::parse(trimmed)
            .map_err(|err| ParseError::Semver(format!("{s}: {err}")))?;
        if !version.build.as_str().starts_with("commit.") {
            return Err(ParseError::NoCommit(s.to_string()));
        }
        Ok(Self(version))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, seq::SliceRandom, thread_rng, Rng, SeedableRng};

    fn ver(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    #[test]
    fn parse_release() {
        let version = ver("v0.8.17+commit.8df45f5f");
        assert_eq!(version.short(), "0.8.17");
        assert!(version.is_release());
        assert_eq!(version.to_string(), "0.8.17+commit.8df45f5f");
    }

    #[test]
    fn parse_nightly() {
        let version = ver("0.8.15-nightly.2022.5.27+commit.095cc647");
        assert_eq!(version.short(), "0.8.15");
        assert_eq!(
            version.to_string(),
            "0.8.15-nightly.2022.5.27+commit.095cc647"
        );
        assert!(!version.is_release());
    }

    #[test]
    fn reject_invalid() {
        for invalid in ["0.8.17", "", "latest", "0.8+commit.8df45f5f"] {
            Version::from_str(invalid).expect_err(invalid);
        }
    }

    #[test]
    fn sort_versions() {
        let sorted = vec![
            "0.4.13+commit.0fb4cb1a",
            "0.8.15-nightly.2022.5.27+commit.095cc647",
            "0.8.15+commit.e14f2714",
            "0.8.17+commit.8df45f5f",
            "10.8.9+commit.e5eed63a",
        ];
        let seed = thread_rng().gen();
        let mut r = StdRng::seed_from_u64(seed);
        let mut versions: Vec<Version> = sorted.iter().map(|s| ver(s)).collect();
        for i in 0..50 {
            versions.shuffle(&mut r);
            versions.sort();
            let shuffled: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
            assert_eq!(shuffled, sorted, "seed={}, i={}", seed, i);
        }
    }
}
