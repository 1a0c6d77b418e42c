//! Locate command implementation.

use crate::cli::LocateArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::layer::{TerminalLayer, TerminalViewport};
use crate::output::Formatter;
use pagecite_domain::{SnippetLocator, Viewport};

/// Execute the locate command against a single text-layer dump.
pub fn execute_locate(args: LocateArgs, zoom: u16, formatter: &Formatter) -> Result<()> {
    if args.page_height <= 0.0 {
        return Err(CliError::InvalidInput(
            "Page height must be positive".to_string(),
        ));
    }

    let scale = f64::from(zoom) / 100.0;
    let mut layer = TerminalLayer::load(&args.layer, scale)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let mut viewport = TerminalViewport::new(args.page_height);
    let mut locator = SnippetLocator::new();

    match locator.reveal(&mut layer, &mut viewport, &args.snippet()) {
        Some((result, scroll_top)) => {
            println!("{}", formatter.match_summary(&result, scroll_top)?);
            if formatter.format() == OutputFormat::Table {
                let lines = layer.lines_in(viewport.scroll_top(), viewport.height());
                println!("{}", formatter.page_lines(&lines));
            }
        }
        None => match formatter.format() {
            OutputFormat::Json => println!("{}", serde_json::json!({ "found": false })),
            OutputFormat::Quiet => {}
            OutputFormat::Table => println!("{}", formatter.warning("Snippet not found on this page")),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::FragmentRecord;
    use std::path::PathBuf;

    fn dump(dir: &std::path::Path) -> PathBuf {
        let records = vec![FragmentRecord {
            text: "Notice period is thirty days.".to_string(),
            x: 0.0,
            y: 10.0,
            width: 100.0,
            height: 10.0,
        }];
        let path = dir.join("page-1.json");
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_locate_found_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let layer = dump(dir.path());
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let found = LocateArgs {
            layer: layer.clone(),
            page_height: 800.0,
            snippet: vec!["thirty".to_string(), "days".to_string()],
        };
        assert!(execute_locate(found, 100, &formatter).is_ok());

        let missing = LocateArgs {
            layer,
            page_height: 800.0,
            snippet: vec!["weekly".to_string()],
        };
        assert!(execute_locate(missing, 100, &formatter).is_ok());
    }

    #[test]
    fn test_locate_rejects_bad_input() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let no_file = LocateArgs {
            layer: PathBuf::from("/no/such/page.json"),
            page_height: 800.0,
            snippet: vec!["x".to_string()],
        };
        assert!(matches!(
            execute_locate(no_file, 100, &formatter),
            Err(CliError::InvalidInput(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let flat = LocateArgs {
            layer: dump(dir.path()),
            page_height: 0.0,
            snippet: vec!["x".to_string()],
        };
        assert!(execute_locate(flat, 100, &formatter).is_err());
    }
}
