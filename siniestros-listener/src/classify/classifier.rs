use std::sync::Arc;

use super::context::RequestContext;
use super::rules::RuleSet;
use super::verdict::Verdict;

/// Blocked when a path fragment occurs in `path` (case-sensitive) or an agent
/// fragment occurs in the lowercased `user_agent`. Pure; no rule has priority.
pub fn classify(path: &str, user_agent: &str, rules: &RuleSet) -> Verdict {
    if rules.matches_path(path) || rules.matches_agent(&user_agent.to_lowercase()) {
        Verdict::Blocked
    } else {
        Verdict::Allowed
    }
}

#[derive(Debug, Clone)]
pub struct RequestClassifier {
    rules: Arc<RuleSet>,
}

impl RequestClassifier {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn classify(&self, ctx: &RequestContext) -> Verdict {
        classify(&ctx.path, &ctx.user_agent, &self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::rules::{DEFAULT_AGENT_FRAGMENTS, DEFAULT_PATH_FRAGMENTS};
    use proptest::prelude::*;

    const BROWSER: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    #[test]
    fn scanner_paths_are_blocked() {
        let rs = rules();
        for path in ["/wp-login.php", "/.env", "/wp-admin", "/app/.git/config", "/db/dump", "/x/secrets.json"] {
            assert_eq!(classify(path, BROWSER, &rs), Verdict::Blocked, "{path}");
        }
    }

    #[test]
    fn scanner_agents_are_blocked_on_the_webhook_path() {
        let rs = rules();
        for ua in ["Mozilla/5.0 curl-agent", "curl/8.4.0", "Googlebot/2.1", "python-requests/2.31", "Go-http-client/1.1", "Wget/1.21", "Apache-HttpClient/4.5"] {
            assert_eq!(classify("/listener", ua, &rs), Verdict::Blocked, "{ua}");
        }
    }

    #[test]
    fn ordinary_traffic_is_allowed() {
        let rs = rules();
        assert_eq!(classify("/listener", BROWSER, &rs), Verdict::Allowed);
        assert_eq!(classify("/web/index.html", BROWSER, &rs), Verdict::Allowed);
        assert_eq!(classify("/listener", "", &rs), Verdict::Allowed);
        assert_eq!(classify("/", "PostmanRuntime/7.36.0", &rs), Verdict::Allowed);
    }

    #[test]
    fn path_comparison_keeps_case() {
        let rs = rules();
        assert_eq!(classify("/WP-login.php", BROWSER, &rs), Verdict::Allowed);
        assert_eq!(classify("/.Env", BROWSER, &rs), Verdict::Allowed);
    }

    #[test]
    fn substring_match_is_broad() {
        // "/config" also catches "/configuration"; "bot" catches "robot".
        let rs = rules();
        assert_eq!(classify("/configuration", BROWSER, &rs), Verdict::Blocked);
        assert_eq!(classify("/listener", "FriendlyRobot/1.0", &rs), Verdict::Blocked);
    }

    #[test]
    fn request_classifier_uses_context_fields() {
        let c = RequestClassifier::new(Arc::new(rules()));
        let (parts, ()) = http::Request::post("/listener")
            .header("user-agent", "CURL/7.0")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(c.classify(&RequestContext::from_parts(&parts)), Verdict::Blocked);
        assert_eq!(c.rules().path_fragments().len(), DEFAULT_PATH_FRAGMENTS.len());
    }

    fn case_scramble(s: &str, mask: u64) -> String {
        s.chars()
            .enumerate()
            .map(|(i, c)| {
                if mask >> (i % 64) & 1 == 1 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn any_path_containing_a_fragment_is_blocked(
            idx in 0..DEFAULT_PATH_FRAGMENTS.len(),
            prefix in "[a-zA-Z0-9/_.-]{0,16}",
            suffix in "[a-zA-Z0-9/_.-]{0,16}",
        ) {
            let path = format!("{prefix}{}{suffix}", DEFAULT_PATH_FRAGMENTS[idx]);
            prop_assert_eq!(classify(&path, BROWSER, &rules()), Verdict::Blocked);
        }

        #[test]
        fn agent_fragment_matches_in_any_case(
            idx in 0..DEFAULT_AGENT_FRAGMENTS.len(),
            mask in any::<u64>(),
            prefix in "[ -~]{0,16}",
        ) {
            let ua = format!("{prefix}{}", case_scramble(DEFAULT_AGENT_FRAGMENTS[idx], mask));
            prop_assert_eq!(classify("/listener", &ua, &rules()), Verdict::Blocked);
        }

        #[test]
        fn verdict_ignores_fragment_order(
            path in "/[a-z./_-]{0,24}",
            ua in "[ -~]{0,32}",
        ) {
            let forward = rules();
            let reversed = RuleSet::new(
                DEFAULT_PATH_FRAGMENTS.iter().rev().copied(),
                DEFAULT_AGENT_FRAGMENTS.iter().rev().copied(),
            ).unwrap();
            prop_assert_eq!(classify(&path, &ua, &forward), classify(&path, &ua, &reversed));
        }
    }
}
