//! Run inputs: the target address and the candidate wordlist.

use formprobe_common::ProbeError;
use url::Url;

/// Normalized absolute address of the page the session opens.
///
/// Built once from operator input and immutable for the run. Addresses
/// without a scheme default to `https` the way a browser's address bar
/// would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target(Url);

impl Target {
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProbeError::Config("empty target address".into()));
        }

        let schemed = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&schemed)
            .map_err(|e| ProbeError::Config(format!("invalid target address '{trimmed}': {e}")))?;
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered, non-empty sequence of candidate strings.
///
/// Read once before the candidate stage starts; blank lines in the source
/// are skipped, surrounding whitespace is trimmed, order is preserved.
#[derive(Debug, Clone)]
pub struct CandidateList(Vec<String>);

impl CandidateList {
    /// Parse a newline-delimited source. Fails when no non-blank line
    /// remains, so the sequencer never starts with nothing to try.
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        let entries: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if entries.is_empty() {
            return Err(ProbeError::Wordlist("candidate list is empty".into()));
        }
        Ok(Self(entries))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        // Parsing guarantees non-empty, kept for API completeness.
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
