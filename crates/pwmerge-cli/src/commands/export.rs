use std::path::Path;

use pwmerge_core::source::{EtcFiles, SnapshotSource};

use crate::error::CliError;

/// Dump the local account files as the JSON snapshot another host merges.
pub fn run_export(etc_dir: &Path, output_path: Option<&Path>) -> Result<(), CliError> {
    let snapshot = EtcFiles::new(etc_dir).load()?;
    let rendered = snapshot.to_json_string()?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
