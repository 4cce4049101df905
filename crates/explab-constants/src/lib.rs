pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Lifecycle agent for optional experiment packages";
pub const BIN_NAME: &str = "explab";
pub const USER_AGENT: &str = "explab/0.1.0";

/// Addon id under which the agent itself is installed in the host
/// package manager.
pub const SELF_ADDON_ID: &str = "agent@explab.io";

/// How often the UI layer reloads the experiment catalog (12 hours).
pub const CATALOG_RELOAD_INTERVAL_SECS: u64 = 12 * 60 * 60;

pub const DEFAULT_ENVIRONMENT: &str = "production";

// Canned selectable server environment configs:
// (name, base_url, auth_prefix, origin_allowlist, badge_color)
pub const ENVIRONMENTS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "local",
        "http://explab.local:8000",
        "explab.agent.LOCAL.",
        "https://www.explab.io/*,about:home",
        "#AA00AA",
    ),
    (
        "dev",
        "http://dev.explab.io",
        "explab.agent.DEV.",
        "https://www.explab.io/*,about:home",
        "#AAAA00",
    ),
    (
        "stage",
        "https://stage.explab.io",
        "explab.agent.STAGE.",
        "https://www.explab.io/*,about:home",
        "#A0AAA0",
    ),
    (
        "production",
        "https://explab.io",
        "explab.agent.MAIN.",
        "https://www.explab.io/*,about:home",
        "#00AAAA",
    ),
];

/// Directory under the user's home dir holding agent state.
pub const STATE_DIR: &str = ".explab";
pub const STATE_FILE: &str = "state.json";
pub const COOKIE_FILE: &str = "cookies.json";

/// Name of the session cookie mirrored into the CSRF request header.
pub const CSRF_COOKIE: &str = "csrftoken";
