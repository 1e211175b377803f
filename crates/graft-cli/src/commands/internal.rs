//! `graft internal <subdomain> <entity>` — dto and service only.

use tracing::instrument;

use graft_core::domain::ArgMap;

use crate::cli::{GlobalArgs, InternalArgs};
use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::OutputManager;
use crate::sequences;

#[instrument(skip_all, fields(subdomain = %args.subdomain, entity = %args.entity))]
pub fn execute(
    args: InternalArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let mut engine = super::build_engine(&global, &config)?;

    engine.set_args(ArgMap::from_pairs([
        ("subdomain", args.subdomain.as_str()),
        ("entity", args.entity.as_str()),
    ]));

    let seq = sequences::internal_module();
    engine.build_seq(&seq)?;
    engine.apply()?;

    let _ = output.success(&format!(
        "Generated internal {} module in subdomain {}",
        args.entity, args.subdomain
    ));
    Ok(())
}
