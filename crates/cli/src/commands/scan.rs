use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use taptik_validate::{detect_prompt_injection, scan_json, scan_text, SecurityFinding};

/// Handle the `scan` command. Any finding fails the command.
pub(crate) fn handle_scan_command(path: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let location = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut findings: Vec<SecurityFinding> = match serde_json::from_str::<Value>(&content) {
        Ok(value) if value.is_object() || value.is_array() => scan_json(&value, &location),
        _ => scan_text(&content, &location),
    };
    let injection = detect_prompt_injection(&content, &location);
    findings.extend(injection.injection_attempts.iter().cloned());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "file": path.display().to_string(),
                "findings": findings,
                "injection_risk_score": injection.risk_score,
            }))?
        );
    } else if findings.is_empty() {
        println!("{}: no findings", path.display());
    } else {
        for finding in &findings {
            println!(
                "{} [{}] {}: {}",
                finding.location,
                finding.severity.as_str(),
                finding.pattern_name,
                finding.redacted_evidence
            );
            println!("  hint: {}", finding.mitigation);
        }
        if injection.risk_score > 0 {
            println!("prompt injection risk score: {}", injection.risk_score);
        }
    }

    if !findings.is_empty() {
        bail!("{} finding(s) in {}", findings.len(), path.display());
    }
    Ok(())
}
