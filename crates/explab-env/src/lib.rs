use futures::future::join_all;
use url::Url;

use explab_constants::{DEFAULT_ENVIRONMENT, ENVIRONMENTS};

/// A named remote-service configuration. Exactly one environment is active
/// at a time; switching environments rebuilds every dependent component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: &'static str,
    pub base_url: &'static str,
    pub auth_prefix: &'static str,
    pub origin_allowlist: &'static str,
    pub badge_color: &'static str,
}

impl Environment {
    pub fn hostname(&self) -> String {
        Url::parse(self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn allowed_origins(&self) -> String {
        format!("{}/*", self.base_url)
    }

    /// URL pattern used when searching navigation history for visits to
    /// this environment's pages.
    pub fn history_query(&self) -> String {
        format!("{}/*", self.base_url)
    }
}

lazy_static::lazy_static! {
    static ref KNOWN: Vec<Environment> = ENVIRONMENTS
        .iter()
        .map(|&(name, base_url, auth_prefix, origin_allowlist, badge_color)| Environment {
            name,
            base_url,
            auth_prefix,
            origin_allowlist,
            badge_color,
        })
        .collect();
}

pub fn known_environments() -> &'static [Environment] {
    &KNOWN
}

pub fn by_name(name: &str) -> Option<&'static Environment> {
    known_environments().iter().find(|env| env.name == name)
}

/// Select the environment, with production as a default.
pub fn resolve(configured: &str) -> &'static Environment {
    by_name(configured).unwrap_or_else(default_environment)
}

pub fn default_environment() -> &'static Environment {
    by_name(DEFAULT_ENVIRONMENT).expect("default environment missing from table")
}

/// One environment's most recent visit, or `None` if there was no visit.
#[derive(Debug, Clone)]
pub struct EnvVisit {
    pub name: String,
    pub last_visit: Option<u64>,
}

/// Decide which environment recent navigation history points at.
///
/// Entries without a visit are discarded, the rest are ordered by recency,
/// and the winner is returned only when it differs from `current`.
pub fn most_recent_visited(current: &str, visits: &[EnvVisit]) -> Option<&'static Environment> {
    let mut seen: Vec<(&str, u64)> = visits
        .iter()
        .filter_map(|visit| visit.last_visit.map(|time| (visit.name.as_str(), time)))
        .collect();
    seen.sort_by(|a, b| b.1.cmp(&a.1));

    let (winner, _) = seen.first()?;
    if *winner == current {
        return None;
    }
    by_name(winner)
}

/// Source of navigation-history lookups. The browsing-history subsystem
/// itself belongs to the host; tests substitute a canned source.
pub trait HistorySource {
    fn last_visit(&self, url_pattern: &str) -> impl Future<Output = Option<u64>> + Send;
}

/// History source for embeddings without a browsing-history subsystem:
/// reports no visits, so detection never switches environments.
pub struct NoHistory;

impl HistorySource for NoHistory {
    async fn last_visit(&self, _url_pattern: &str) -> Option<u64> {
        None
    }
}

/// Search recent history for visits to known server environments, one query
/// per environment, each constrained to the single most recent visit. The
/// queries run in parallel and are collated once all have completed.
pub async fn detect_from_history<S: HistorySource>(
    source: &S,
    current: &str,
) -> Option<&'static Environment> {
    let queries = known_environments().iter().map(|env| async move {
        EnvVisit {
            name: env.name.to_string(),
            last_visit: source.last_visit(&env.history_query()).await,
        }
    });
    let visits = join_all(queries).await;
    most_recent_visited(current, &visits)
}
