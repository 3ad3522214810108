//! `parley init`: First-time setup.

use parley_config::AppConfig;
use std::path::Path;

/// Write the default config to `path` unless a file is already there.
///
/// Returns whether a file was written.
pub fn write_default_config(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");

    println!("Parley — First-Time Setup");
    println!("=========================\n");

    if write_default_config(&config_path)? {
        println!("  Created config.toml at: {}", config_path.display());
        println!("\n  Next steps:");
        println!("   1. Add your API key to {} or set GROQ_API_KEY", config_path.display());
        println!("   2. Optionally point knowledge.corpus_path at your course notes");
        println!("   3. Run: parley chat\n");
    } else {
        println!("  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete it and re-run init.\n");
    }

    Ok(())
}
