//! `ghss clear` — remove every stored repository, behind a typed
//! confirmation unless `--force` is passed (§6).

use std::io::Write;

use anyhow::{bail, Result};

use ghss_domain::ports::Store;

use super::Context;

pub async fn run(ctx: &Context, force: bool) -> Result<()> {
    if !force {
        print!("This will remove all stored repositories. Type 'yes' to confirm: ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if input.trim() != "yes" {
            bail!("aborted: confirmation not given");
        }
    }

    ctx.store.clear().await?;
    println!("store cleared");
    Ok(())
}
