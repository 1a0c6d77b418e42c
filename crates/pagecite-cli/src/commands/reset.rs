//! Reset command implementation.

use crate::cli::ResetArgs;
use crate::error::Result;
use crate::output::Formatter;
use pagecite_session::ChatSession;
use std::io::{self, Write};

/// Execute the reset command.
pub async fn execute_reset(
    args: ResetArgs,
    session: &mut ChatSession,
    formatter: &Formatter,
) -> Result<()> {
    // Confirm unless --yes is specified
    if !args.yes {
        print!("Remove all uploaded documents and clear the conversation? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    session.reset().await?;
    println!("{}", formatter.success("Session reset"));

    Ok(())
}
