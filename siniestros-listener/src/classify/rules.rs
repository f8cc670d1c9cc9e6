use std::path::Path;

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Path fragments probed by vulnerability scanners.
pub const DEFAULT_PATH_FRAGMENTS: &[&str] = &[
    "/wp-",
    "/.git",
    "/xmlrpc.php",
    "/backup",
    "/.env",
    "/config",
    "/server-status",
    "/docker-compose",
    "/.svn",
    "/.ssh",
    "/aws",
    "/db/",
    "/phpinfo",
    "/settings.py",
    "/web.config",
    "/.vscode",
    "/dump.sql",
    "/server.key",
    "/secrets.json",
];

/// User-Agent fragments of crawlers and scripted HTTP clients. Lowercase.
pub const DEFAULT_AGENT_FRAGMENTS: &[&str] = &[
    "bot",
    "spider",
    "crawler",
    "probe",
    "scan",
    "slurp",
    "curl",
    "wget",
    "python-requests",
    "go-http-client",
    "httpclient",
];

/// On-disk form of a rule file.
///
/// ```yaml
/// version: "2024-06"
/// paths: ["/wp-", "/.env"]
/// agents: ["curl", "bot"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    pub version: Option<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub agents: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("{kind} fragment #{index} is empty")]
    EmptyFragment { kind: &'static str, index: usize },

    #[error("build {kind} matcher")]
    Build {
        kind: &'static str,
        #[source]
        source: aho_corasick::BuildError,
    },
}

/// Containment matcher over a fixed list of literal fragments.
#[derive(Debug)]
pub struct FragmentMatcher {
    ac: AhoCorasick,
    fragments: Vec<String>,
}

impl FragmentMatcher {
    fn new(kind: &'static str, fragments: Vec<String>) -> Result<Self, RuleSetError> {
        if let Some(index) = fragments.iter().position(|f| f.is_empty()) {
            return Err(RuleSetError::EmptyFragment { kind, index });
        }
        let ac = AhoCorasick::new(&fragments).map_err(|source| RuleSetError::Build { kind, source })?;
        Ok(Self { ac, fragments })
    }

    #[inline]
    pub fn is_match(&self, hay: &str) -> bool {
        self.ac.is_match(hay)
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

/// Scanner signatures. Built once at startup and shared read-only.
#[derive(Debug)]
pub struct RuleSet {
    version: Option<String>,
    paths: FragmentMatcher,
    agents: FragmentMatcher,
}

impl RuleSet {
    /// Agent fragments are folded to lowercase here because they are matched
    /// against a lowercased User-Agent. Path fragments are kept as given.
    pub fn new<P, A>(paths: P, agents: A) -> Result<Self, RuleSetError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        let agents = agents
            .into_iter()
            .map(|a| a.into().to_lowercase())
            .collect();

        Ok(Self {
            version: None,
            paths: FragmentMatcher::new("path", paths)?,
            agents: FragmentMatcher::new("agent", agents)?,
        })
    }

    pub fn builtin() -> Result<Self, RuleSetError> {
        Self::new(
            DEFAULT_PATH_FRAGMENTS.iter().copied(),
            DEFAULT_AGENT_FRAGMENTS.iter().copied(),
        )
    }

    pub fn compile(yaml: &str) -> Result<Self> {
        let file: RulesFile = serde_yaml::from_str(yaml).context("parse rules yaml")?;
        let mut rs = Self::new(file.paths, file.agents).context("compile rules")?;
        rs.version = file.version;
        Ok(rs)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn path_fragments(&self) -> &[String] {
        self.paths.fragments()
    }

    pub fn agent_fragments(&self) -> &[String] {
        self.agents.fragments()
    }

    /// `path` is matched exactly as received, case-sensitive.
    #[inline]
    pub fn matches_path(&self, path: &str) -> bool {
        self.paths.is_match(path)
    }

    /// `folded_agent` must already be lowercased.
    #[inline]
    pub fn matches_agent(&self, folded_agent: &str) -> bool {
        self.agents.is_match(folded_agent)
    }
}

pub fn compile_from_file(path: &Path) -> Result<RuleSet> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("read rules file: {}", path.display()))?;
    RuleSet::compile(&yaml).with_context(|| format!("rules file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_carries_every_default_fragment() {
        let rs = RuleSet::builtin().unwrap();
        assert_eq!(rs.path_fragments().len(), DEFAULT_PATH_FRAGMENTS.len());
        assert_eq!(rs.agent_fragments().len(), DEFAULT_AGENT_FRAGMENTS.len());
        assert!(rs.version().is_none());
    }

    #[test]
    fn path_matching_is_case_sensitive() {
        let rs = RuleSet::builtin().unwrap();
        assert!(rs.matches_path("/.env"));
        assert!(rs.matches_path("/static/.git/HEAD"));
        assert!(!rs.matches_path("/.ENV"));
        assert!(!rs.matches_path("/listener"));
    }

    #[test]
    fn agent_fragments_are_folded_at_build_time() {
        let rs = RuleSet::new(["/x"], ["MyScanner"]).unwrap();
        assert_eq!(rs.agent_fragments(), ["myscanner"]);
        assert!(rs.matches_agent("mozilla/5.0 myscanner/1.2"));
    }

    #[test]
    fn empty_fragment_is_rejected() {
        let err = RuleSet::new(["/wp-", ""], ["bot"]).unwrap_err();
        assert!(matches!(err, RuleSetError::EmptyFragment { kind: "path", index: 1 }));

        let err = RuleSet::new(["/wp-"], [""]).unwrap_err();
        assert!(matches!(err, RuleSetError::EmptyFragment { kind: "agent", index: 0 }));
    }

    #[test]
    fn empty_lists_never_match() {
        let rs = RuleSet::new(Vec::<String>::new(), Vec::<String>::new()).unwrap();
        assert!(!rs.matches_path("/wp-admin"));
        assert!(!rs.matches_agent("curl/8.0"));
    }

    #[test]
    fn compile_reads_yaml() {
        let rs = RuleSet::compile(
            r#"
version: "2024-06"
paths: ["/admin"]
agents: ["Nikto"]
"#,
        )
        .unwrap();
        assert_eq!(rs.version(), Some("2024-06"));
        assert!(rs.matches_path("/admin/login"));
        assert!(!rs.matches_path("/wp-login.php"));
        assert!(rs.matches_agent("mozilla/5.00 (nikto/2.1.6)"));
    }

    #[test]
    fn example_rule_file_matches_builtin() {
        let rs = RuleSet::compile(include_str!("../../../rules.example.yaml")).unwrap();
        assert_eq!(rs.path_fragments(), DEFAULT_PATH_FRAGMENTS);
        assert_eq!(rs.agent_fragments(), DEFAULT_AGENT_FRAGMENTS);
    }

    #[test]
    fn compile_rejects_empty_fragment_in_yaml() {
        let err = RuleSet::compile("paths: [\"\"]\n").unwrap_err();
        assert!(format!("{err:#}").contains("empty"));
    }

    #[test]
    fn compile_from_file_reports_path() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "paths: [\"/secret\"]\nagents: []").unwrap();
        let rs = compile_from_file(f.path()).unwrap();
        assert!(rs.matches_path("/secret"));

        let missing = f.path().with_extension("missing");
        let err = compile_from_file(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("read rules file"));
    }
}
