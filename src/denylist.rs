use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Hostnames matching these patterns are known-defunct and never probed.
///
/// The list is data, not logic: the built-in default below can be replaced
/// wholesale by a file supplied at startup, so new dead hosts can be added
/// without touching the selection algorithm.
///
/// File format, one pattern per line:
/// - a plain entry matches as a hostname suffix: `talker.com` drops
///   `foo.talker.com` and `talker.com` itself
/// - a `contains:` prefix matches anywhere in the hostname:
///   `contains:no-ip.org` drops `thing.no-ip.org.uk`
/// - everything after `#` is a comment; blank lines are ignored
#[derive(Debug, Clone, Default)]
pub struct DenyList {
    patterns: Vec<DenyPattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DenyPattern {
    Suffix(String),
    Contains(String),
}

/// Academic domains and dead hosting providers / talker-host services that no
/// longer resolve to live talkers. Curated from years of failed probe runs.
const DEFAULT_PATTERNS: &str = "\
# Academic domains that stopped hosting public talkers long ago.
.ac.uk
.edu
.edu.au

# Dead hosting providers and talker-host services.
amber.org.uk
atlantis.org
custard.org
ewtoo.org
contains:homeip.net
ilserv.com
infomagic.com
contains:mopemansions.org
mytalker.org
contains:no-ip.org
offswn.net
spod.org
talker.com
talkernet.net
talkerhost.com
talkers.org
talkers.ws
contains:temple2k.org
themanor.org
tirsek.com
yuss.org
";

impl DenyList {
    /// Parse a deny-list from its text form. Errors carry the line number.
    pub fn parse(s: &str) -> Result<Self> {
        let mut patterns = Vec::new();
        for (idx, raw_line) in s.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("contains:") {
                let rest = rest.trim();
                if rest.is_empty() {
                    bail!("line {line_no}: empty pattern after `contains:`");
                }
                patterns.push(DenyPattern::Contains(rest.to_string()));
            } else {
                patterns.push(DenyPattern::Suffix(line.to_string()));
            }
        }
        Ok(Self { patterns })
    }

    /// Load a deny-list from a file path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read deny-list file: {}", path.as_ref().display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse deny-list file: {}", path.as_ref().display()))
    }

    /// The built-in default list.
    pub fn builtin() -> Self {
        Self::parse(DEFAULT_PATTERNS).expect("built-in deny-list parses")
    }

    /// True when `hostname` matches any pattern.
    pub fn matches(&self, hostname: &str) -> bool {
        self.patterns.iter().any(|p| match p {
            DenyPattern::Suffix(s) => hostname.ends_with(s.as_str()),
            DenyPattern::Contains(s) => hostname.contains(s.as_str()),
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
