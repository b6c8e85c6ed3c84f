use userpass_core::source::source_host;

use crate::app::AppContext;

/// Print each source that a read would merge, marking this host's file.
pub fn handle_sources(ctx: &AppContext) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let sources = ctx.read_sources()?;
    let local = settings.local_source();

    if sources.is_empty() {
        if !ctx.quiet() {
            eprintln!("No source files in {}", settings.dir.display());
        }
        return Ok(());
    }

    for source in &sources {
        let host = source_host(source, &settings.extension).unwrap_or_else(|| "-".to_string());
        let marker = if *source == local { "*" } else { " " };
        if ctx.quiet() {
            println!("{}", source.display());
        } else {
            println!("{} {}\t{}", marker, host, source.display());
        }
    }
    Ok(())
}
