use crate::error::PruneError;
use crate::hub::HubApi;
use crate::operation::Operation;
use crate::thing::{Inventory, Thing};
use std::io::Write;

/// What to do when the hub refuses a DELETE.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteFailurePolicy {
    /// Stop at the first failed delete; later matches are not attempted.
    #[default]
    Abort,
    /// Keep going, then report every failed id at the end.
    Continue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    pub on_delete_error: DeleteFailurePolicy,
    pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub examined: usize,
    pub matched: usize,
    pub deleted: usize,
}

/// Fetch the inventory from the hub, then run `operation` over it.
pub async fn fetch_and_prune<H, W>(
    hub: &H,
    operation: &Operation,
    options: &PruneOptions,
    out: &mut W,
) -> Result<PruneSummary, PruneError>
where
    H: HubApi + ?Sized,
    W: Write,
{
    let body = hub.fetch_inventory().await;
    let things = Inventory::decode(&body).map_err(PruneError::Decode)?;
    log::debug!("{} things in inventory; method {}", things.len(), operation.kind());
    prune(hub, operation, &things, options, out).await
}

/// Walk `things` in the order the hub returned them. `list` prints
/// every thing; every other method deletes each selected thing, one
/// request at a time, printing a line before each delete.
pub async fn prune<H, W>(
    hub: &H,
    operation: &Operation,
    things: &[Thing],
    options: &PruneOptions,
    out: &mut W,
) -> Result<PruneSummary, PruneError>
where
    H: HubApi + ?Sized,
    W: Write,
{
    let mut summary = PruneSummary::default();
    let mut failed = vec![];

    for thing in things {
        summary.examined += 1;

        if let Operation::List = operation {
            writeln!(out, "{}", thing.listing_line())?;
            continue;
        }

        if !operation.selects(thing) {
            log::trace!("{thing} does not match");
            continue;
        }
        summary.matched += 1;

        if options.dry_run {
            writeln!(out, "{}", thing.dry_run_line())?;
            continue;
        }

        writeln!(out, "{}", thing.deletion_line())?;
        out.flush()?;

        match hub.delete_thing(&thing.id).await {
            Ok(()) => summary.deleted += 1,
            Err(source) => match options.on_delete_error {
                DeleteFailurePolicy::Abort => {
                    return Err(PruneError::Delete {
                        id: thing.id.clone(),
                        completed: summary.deleted,
                        source,
                    });
                }
                DeleteFailurePolicy::Continue => {
                    log::error!("There was an error deleting {}: {source:#}", thing.id);
                    failed.push(thing.id.clone());
                }
            },
        }
    }

    if !failed.is_empty() {
        return Err(PruneError::DeletesFailed {
            failed,
            attempted: summary.matched,
        });
    }

    Ok(summary)
}
