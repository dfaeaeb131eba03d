use anyhow::Result;
use std::path::Path;
use taptik_core::{FileSystem, TaptikError};
use taptik_sync::detect_platforms;

/// Handle the `detect` command.
pub(crate) fn handle_detect_command(fs: &dyn FileSystem, path: &Path, json: bool) -> Result<()> {
    let detected = detect_platforms(fs, path);
    if json {
        let names: Vec<&str> = detected.iter().map(|p| p.as_str()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "platforms": names,
            }))?
        );
    } else {
        for platform in &detected {
            println!("{:<12} {}", platform.as_str(), platform.display_name());
        }
    }
    if detected.is_empty() {
        return Err(TaptikError::NoPlatformDetected {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}
