use userpass_core::{KeyPattern, Resolution};

use crate::app::AppContext;
use crate::cli::ShowArgs;
use crate::output::{records_json, render_records};

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let pattern = KeyPattern::parse(&args.pattern, args.exact)?;
    let mut vault = ctx.vault()?;
    let store = ctx.load_merged(&mut vault)?;

    let mode = Resolution::from_all_flag(args.all);
    let records = store.search(&pattern, mode)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records_json(&records)?)?);
        return Ok(());
    }
    println!("{}", render_records(&records, args.all));
    Ok(())
}
