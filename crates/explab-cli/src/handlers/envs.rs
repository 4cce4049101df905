use anyhow::Result;
use owo_colors::OwoColorize;

use explab_store::StateStore;

pub struct EnvsHandler;

impl EnvsHandler {
    pub fn list() -> Result<()> {
        let store = StateStore::load(&StateStore::default_path())?;
        let active = explab_env::resolve(store.environment().unwrap_or_default());

        println!("{} {}", "explab".bright_cyan().bold(), "envs".bright_white());
        println!();

        for env in explab_env::known_environments() {
            let marker = if env.name == active.name {
                "●".bright_green().to_string()
            } else {
                "○".bright_black().to_string()
            };
            println!(
                "  {marker} {:<12} {}",
                env.name.bright_white(),
                env.base_url.bright_black()
            );
        }

        Ok(())
    }
}
