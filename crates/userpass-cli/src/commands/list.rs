use userpass_core::KeyPattern;

use crate::app::AppContext;
use crate::cli::ListArgs;

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let mut vault = ctx.vault()?;
    let store = ctx.load_merged(&mut vault)?;

    let keys: Vec<String> = match &args.pattern {
        Some(pattern) => {
            let pattern = KeyPattern::parse(pattern, args.exact)?;
            store.find_keys(&pattern).into_iter().collect()
        }
        None => store.keys().map(str::to_string).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&keys)?);
        return Ok(());
    }
    for key in &keys {
        println!("{}", key);
    }
    if keys.is_empty() && !ctx.quiet() {
        eprintln!("No keys.");
    }
    Ok(())
}
