//! `parley analyze`: One-shot feedback on a piece of text.

use super::{build_session, load_config};

pub async fn run(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    if text.trim().is_empty() {
        return Err("Nothing to analyze: the text is empty.".into());
    }

    let config = load_config()?;
    let session = build_session(&config).await?;

    eprint!("  Analyzing...");
    let analysis = session.analyze_text(text).await;
    eprint!("\r              \r");
    println!("{analysis}");
    Ok(())
}
