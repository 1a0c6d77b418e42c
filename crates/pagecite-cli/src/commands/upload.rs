//! Upload command implementation.

use crate::cli::UploadArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use pagecite_session::ChatSession;

/// Execute the upload command.
pub async fn execute_upload(
    args: UploadArgs,
    session: &ChatSession,
    formatter: &Formatter,
) -> Result<()> {
    validate_pdf_path(&args)?;

    let receipt = session.upload(&args.file).await?;
    println!(
        "{}",
        formatter.success(&format!(
            "Uploaded {} ({} bytes)",
            receipt.filename, receipt.bytes
        ))
    );

    Ok(())
}

fn validate_pdf_path(args: &UploadArgs) -> Result<()> {
    let is_pdf = args
        .file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(CliError::InvalidInput(format!(
            "Not a PDF file: {}",
            args.file.display()
        )));
    }
    Ok(())
}
