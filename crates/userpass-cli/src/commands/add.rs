use std::path::{Path, PathBuf};

use dialoguer::{Input, Password};
use zeroize::Zeroizing;

use userpass_core::generate::generate_password;
use userpass_core::record::validate_field;
use userpass_core::KeyPattern;

use crate::app::{AppContext, SessionVault};
use crate::cli::{AddArgs, PasswordArgs, UpdateArgs};
use crate::errors::CliError;
use crate::output::print_success;

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let key = args.key.trim();
    if key.is_empty() {
        return Err(CliError::invalid_input("Key must not be empty").into());
    }
    validate_field("Key", key)?;

    let username = match &args.username {
        Some(username) => username.clone(),
        None => prompt_username(ctx)?,
    };
    validate_field("Username", &username)?;
    let (password, generated) = read_password(ctx, &args.password, args.length)?;

    let mut vault = ctx.vault()?;
    let written = write_local(ctx, &mut vault, key, &username, &password, 0)?;

    if !ctx.quiet() {
        print_success(&format!("Added {} to {}", key, file_name(&written)));
    }
    if generated {
        println!("{}", password.as_str());
    }
    Ok(())
}

pub fn handle_update(ctx: &AppContext, args: &UpdateArgs) -> anyhow::Result<()> {
    let pattern = KeyPattern::parse(&args.pattern, args.exact)?;
    let mut vault = ctx.vault()?;

    let merged = ctx.load_merged(&mut vault)?;
    let key = merged.resolve_one(&pattern)?;
    let username = match &args.username {
        Some(username) => username.clone(),
        None => merged.current_username(&key).unwrap_or_default(),
    };
    validate_field("Username", &username)?;
    let (password, generated) = read_password(ctx, &args.password, args.length)?;

    let floor = merged.next_timestamp(&key);
    let written = write_local(ctx, &mut vault, &key, &username, &password, floor)?;

    if !ctx.quiet() {
        print_success(&format!("Updated {} in {}", key, file_name(&written)));
    }
    if generated {
        println!("{}", password.as_str());
    }
    Ok(())
}

/// Append to this host's file and save it.
///
/// The new record is stamped after `floor`, the newest timestamp the key
/// holds on any host.
fn write_local(
    ctx: &AppContext,
    vault: &mut SessionVault,
    key: &str,
    username: &str,
    password: &str,
    floor: i64,
) -> anyhow::Result<PathBuf> {
    let (mut local, target) = ctx.load_local(vault)?;
    let timestamp = local.next_timestamp(key).max(floor);
    local.add(key, timestamp, username, password)?;
    Ok(local.save(Some(target.as_path()), vault)?)
}

/// The new password and whether it was generated.
fn read_password(
    ctx: &AppContext,
    args: &PasswordArgs,
    length: usize,
) -> anyhow::Result<(Zeroizing<String>, bool)> {
    if args.generate {
        return Ok((generate_password(length)?, true));
    }
    let password = match &args.password {
        Some(password) => Zeroizing::new(password.clone()),
        None => {
            if !ctx.interactive() {
                return Err(CliError::invalid_input(
                    "No password provided. Use --password or --generate with --no-input.",
                )
                .into());
            }
            Zeroizing::new(
                Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?,
            )
        }
    };
    if password.is_empty() {
        return Err(CliError::invalid_input("Password must not be empty").into());
    }
    validate_field("Password", &password)?;
    Ok((password, false))
}

fn prompt_username(ctx: &AppContext) -> anyhow::Result<String> {
    if !ctx.interactive() {
        return Err(CliError::invalid_input("No username provided. Use --username.").into());
    }
    Ok(Input::<String>::new().with_prompt("Username").interact_text()?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
