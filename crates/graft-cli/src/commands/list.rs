//! `graft list` — show registered template groups.

use crate::cli::{GlobalArgs, ListArgs};
use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::OutputManager;

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let engine = super::build_engine(&global, &config)?;

    output.header("Template groups")?;
    for group in engine.groups() {
        output.print(&format!("  {:<10} {}", group.name, group.description))?;
        if args.long {
            for def in &group.templates {
                output.print(&format!("    {:<24} {}", def.name, def.description))?;
            }
        }
    }
    Ok(())
}
