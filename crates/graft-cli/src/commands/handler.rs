//! `graft handler <subdomain> <entity> --method ... --action ...` — one verb
//! handler plus its payload and service wiring.

use tracing::instrument;

use graft_core::domain::ArgMap;

use crate::cli::{GlobalArgs, HandlerArgs};
use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::OutputManager;
use crate::sequences;

#[instrument(skip_all, fields(entity = %args.entity, method = ?args.method, action = %args.action))]
pub fn execute(
    args: HandlerArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let mut engine = super::build_engine(&global, &config)?;

    engine.set_args(ArgMap::from_pairs([
        ("subdomain", args.subdomain.as_str()),
        ("entity", args.entity.as_str()),
        ("method", args.method.branch()),
        ("action", args.action.as_str()),
        ("route", args.route.as_str()),
    ]));

    let seq = sequences::api_handler();
    engine.build_seq(&seq)?;
    engine.apply()?;

    let _ = output.success(&format!(
        "Generated {} {} handler for {}",
        args.method.branch(),
        args.action,
        args.entity
    ));
    Ok(())
}
