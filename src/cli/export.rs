use std::fs::File;
use std::path::PathBuf;

use crate::backend::connect_backend;
use crate::cli::{event_bus, open_db};
use crate::error::{FinsenseError, Result};
use crate::portability::{export_ledger_csv, verify_export, UserDataExport};
use crate::settings::{get_data_dir, load_settings, shellexpand_path};

fn default_path(name: &str, ext: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir().join("exports").join(format!("{name}-{date}.{ext}"))
}

fn resolve_output(output: Option<String>, name: &str, ext: &str) -> Result<PathBuf> {
    let path = output
        .map(|o| PathBuf::from(shellexpand_path(&o)))
        .unwrap_or_else(|| default_path(name, ext));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path)
}

pub fn json(output: Option<String>) -> Result<()> {
    let settings = load_settings();
    let conn = open_db()?;
    let bus = event_bus();
    let backend = connect_backend(&settings, &conn, &bus);

    let export = backend.export_user_data()?;
    let path = resolve_output(output, "finsense", "json")?;
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(&path, format!("{json}\n"))?;

    println!(
        "Wrote {} documents to {} (sha256 {})",
        export.documents.len(),
        path.display(),
        &export.checksum[..12.min(export.checksum.len())]
    );
    Ok(())
}

pub fn csv(output: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let path = resolve_output(output, "ledger", "csv")?;
    let rows = export_ledger_csv(&conn, File::create(&path)?)?;
    println!("Wrote {rows} ledger entries to {}", path.display());
    Ok(())
}

pub fn verify(file: &str) -> Result<()> {
    let path = PathBuf::from(shellexpand_path(file));
    let export: UserDataExport = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    if !verify_export(&export) {
        return Err(FinsenseError::Other(format!(
            "{} does not match its checksum",
            path.display()
        )));
    }
    println!(
        "{} is intact: {} documents exported {}",
        path.display(),
        export.documents.len(),
        export.exported_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}
