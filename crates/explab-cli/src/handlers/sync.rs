use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::Mutex;

use explab_constants::{COOKIE_FILE, STATE_DIR};
use explab_core::SyncManager;
use explab_remote::{CookieFile, RemoteClient};
use explab_store::StateStore;

pub struct SyncHandler;

impl SyncHandler {
    pub fn sync(env_override: Option<&str>, debug: bool) -> Result<()> {
        println!("{} {}", "explab".bright_cyan().bold(), "sync".bright_white());
        println!();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(Self::sync_async(env_override, debug))
    }

    async fn sync_async(env_override: Option<&str>, debug: bool) -> Result<()> {
        let mut store = StateStore::load(&StateStore::default_path())?;

        let env = match env_override {
            Some(name) => {
                let env = explab_env::resolve(name);
                store.set_environment(env.name)?;
                env
            }
            None => explab_env::resolve(store.environment().unwrap_or_default()),
        };
        explab_logger::debug(
            &format!("syncing against {} ({})", env.name, env.base_url),
            debug,
        );

        let cookies = Arc::new(CookieFile::load(&Self::cookie_path())?);
        let client = Arc::new(RemoteClient::new(env.hostname(), cookies));
        let sync = SyncManager::new(client, Arc::new(Mutex::new(store)));

        let receipts = sync.sync_all().await;
        for receipt in &receipts {
            explab_logger::debug(
                &format!(
                    "{} {} -> {}",
                    receipt.method, receipt.addon_id, receipt.status
                ),
                debug,
            );
        }
        explab_logger::finish(&format!("synchronized {} experiments", receipts.len()));

        Ok(())
    }

    fn cookie_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STATE_DIR)
            .join(COOKIE_FILE)
    }
}
