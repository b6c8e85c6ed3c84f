use clap::CommandFactory;
use clap_complete::generate;

use crate::app::AppContext;
use crate::cli::Cli;
use crate::config::{SecuritySection, StoreSection, UserpassConfig};

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "userpass", &mut std::io::stdout());
    Ok(())
}

/// Print the effective settings as TOML.
pub fn handle_config(ctx: &AppContext) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let effective = UserpassConfig {
        store: StoreSection {
            dir: Some(settings.dir.display().to_string()),
            host: Some(settings.host.clone()),
            extension: settings.extension.clone(),
        },
        security: SecuritySection {
            max_attempts: settings.max_attempts,
            use_agent: settings.use_agent,
        },
    };

    if !ctx.quiet() {
        println!("# {}", settings.config_path.display());
    }
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
