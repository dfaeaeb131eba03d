//! Renders a context as one platform's files, screens them and writes them.

use crate::builders::checks::finding_error;
use crate::builders::render_for;
use crate::report::{DeployResult, SkipReason};
use crate::writer::{DeploymentFileWriter, FileContent, MergePolicy, PlannedFile};
use std::path::Path;
use taptik_core::{FileSystem, Platform, TaptikContext, TaptikError};
use taptik_validate::{
    detect_prompt_injection, scan_json, scan_json_injection, scan_text, SecurityFinding,
};
use tracing::{info, warn};

/// Security findings in the bytes a planned file would contain, prompt
/// injection included.
pub fn scan_planned(file: &PlannedFile) -> Vec<SecurityFinding> {
    let location = file.path.display().to_string();
    match &file.content {
        FileContent::Json(value) => {
            let mut findings = scan_json(value, &location);
            findings.extend(scan_json_injection(value, &location));
            findings
        }
        FileContent::Text(text) => {
            let mut findings = scan_text(text, &location);
            findings.extend(detect_prompt_injection(text, &location).injection_attempts);
            findings
        }
    }
}

/// Writes `platform`'s files for `context` under `root`.
///
/// Every rendered file is scanned first. Any finding aborts the deployment
/// before anything is written; the offending files are reported as skipped.
pub fn deploy_context(
    platform: Platform,
    context: &TaptikContext,
    root: &Path,
    policy: MergePolicy,
    fs: &dyn FileSystem,
) -> DeployResult {
    let rendered = match render_for(platform, fs, context) {
        Ok(rendered) => rendered,
        Err(err) => return DeployResult::failed(err),
    };
    for warning in &rendered.warnings {
        warn!(platform = %platform, "{warning}");
    }

    let mut blocked = Vec::new();
    let mut errors = Vec::new();
    for file in &rendered.data {
        let findings = scan_planned(file);
        if let Some(first) = findings.first() {
            blocked.push(SkipReason::SecurityFinding {
                path: file.path.clone(),
                pattern: first.pattern_name.clone(),
            });
        }
        errors.extend(findings.into_iter().map(finding_error));
    }
    if !blocked.is_empty() {
        warn!(platform = %platform, files = blocked.len(), "Deployment blocked by security findings");
        let mut result = DeployResult::failed(TaptikError::ValidationFailed { platform, errors });
        result.skipped_files = blocked;
        return result;
    }

    info!(platform = %platform, root = %root.display(), files = rendered.data.len(), policy = %policy, "Deploying");
    DeploymentFileWriter::new(fs, policy).write_all(root, &rendered.data)
}
