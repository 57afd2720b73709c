use std::io::IsTerminal;
use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{
    load_settings, save_settings, settings_file_exists, shellexpand_path, DB_FILE,
};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_file_exists() && std::io::stdin().is_terminal() {
        // First run: offer to change the data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&resolved.join(DB_FILE))?;
    init_db(&conn)?;
    log::info!("Initialized database at {}", resolved.join(DB_FILE).display());

    println!("Initialized finsense at {}", resolved.display());
    Ok(())
}
