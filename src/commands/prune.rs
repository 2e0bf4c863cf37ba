use crate::error::UsageError;
use crate::operation::{Operation, SUPPORTED_METHODS};
use crate::opt_env_var;
use crate::pruner::{fetch_and_prune, DeleteFailurePolicy, PruneOptions};
use clap::ValueEnum;
use std::io::Write;

#[derive(clap::Parser, Debug)]
pub struct PruneCommand {
    /// What to do when a delete request fails. `abort` stops at the
    /// first failure; `continue` attempts every match and reports the
    /// failures at the end.
    /// You may also set this via the SPHERE_ON_DELETE_ERROR environment variable.
    #[arg(long)]
    on_delete_error: Option<DeleteFailurePolicy>,

    /// Print the things that would be deleted without deleting them
    #[arg(long)]
    dry_run: bool,

    /// The method (type, name, promoted or list) followed by the value
    /// to match. Multiple value words are joined with spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

impl PruneCommand {
    pub fn operation(&self) -> Result<Operation, UsageError> {
        Operation::from_args(self.words.as_slice(), SUPPORTED_METHODS)
    }

    pub fn on_delete_error(&self) -> anyhow::Result<DeleteFailurePolicy> {
        if let Some(policy) = self.on_delete_error {
            return Ok(policy);
        }
        match opt_env_var::<String>("SPHERE_ON_DELETE_ERROR")? {
            Some(value) => DeleteFailurePolicy::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!("$SPHERE_ON_DELETE_ERROR is invalid: {err}")),
            None => Ok(DeleteFailurePolicy::default()),
        }
    }

    pub async fn run(&self, args: &crate::Args) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        self.run_with_output(args, &mut stdout).await
    }

    pub async fn run_with_output<W: Write>(
        &self,
        args: &crate::Args,
        out: &mut W,
    ) -> anyhow::Result<()> {
        // Nothing is fetched until the arguments are known to be good
        let operation = self.operation()?;
        let options = PruneOptions {
            on_delete_error: self.on_delete_error()?,
            dry_run: self.dry_run,
        };

        let client = args.hub_args.hub_client()?;
        let summary = fetch_and_prune(&client, &operation, &options, out).await?;
        log::debug!(
            "examined {} things: {} matched, {} deleted",
            summary.examined,
            summary.matched,
            summary.deleted
        );
        Ok(())
    }
}
