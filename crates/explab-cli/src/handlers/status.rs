use anyhow::Result;
use owo_colors::OwoColorize;

use explab_store::StateStore;

pub struct StatusHandler;

impl StatusHandler {
    pub fn show(debug: bool) -> Result<()> {
        let path = StateStore::default_path();
        explab_logger::debug(&format!("state file {}", path.display()), debug);

        let store = StateStore::load(&path)?;
        let env = explab_env::resolve(store.environment().unwrap_or_default());

        println!(
            "{} {}",
            "explab".bright_cyan().bold(),
            "status".bright_white()
        );
        println!();
        println!("  client id:    {}", store.client_id().bright_white());
        println!(
            "  environment:  {} {}",
            env.name.bright_white(),
            env.base_url.bright_black()
        );
        println!("  catalog:      {} experiments", store.catalog_ids().len());

        let installed = store.snapshot();
        if installed.is_empty() {
            println!("  installed:    none");
            return Ok(());
        }

        println!("  installed:");
        for (addon_id, record) in &installed {
            let state = if record.active {
                "active".bright_green().to_string()
            } else {
                "inactive".bright_black().to_string()
            };
            let title = record
                .experiment
                .as_ref()
                .map(|experiment| experiment.title.as_str())
                .unwrap_or("(not in catalog)");
            println!("    {} {} {}", addon_id.bright_white(), state, title.bright_black());
        }

        Ok(())
    }
}
