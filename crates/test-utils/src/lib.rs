//! Shared test utilities for taptik crates.
//!
//! Provides a temporary project root plus an isolated home directory, and
//! helpers that lay down Kiro, Claude Code and Cursor files in them.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use taptik_core::LocalFileSystem;

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// ```
/// let _guard = taptik_test_utils::set_env_var("TAPTIK_DOC_VAR", Some("value"));
/// assert_eq!(std::env::var("TAPTIK_DOC_VAR").unwrap(), "value");
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    match value {
        Some(val) => std::env::set_var(key, val),
        None => std::env::remove_var(key),
    }
    EnvVarGuard { key, previous }
}

/// A project directory and a fake home directory under one tempdir.
///
/// [`fs`](TestFixture::fs) resolves user-level configuration against the fake
/// home, so tests never read the real `~/.claude`, `~/.kiro` or `~/.cursor`.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    pub project: PathBuf,
    pub home: PathBuf,
}

impl TestFixture {
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let project = tempdir.path().join("project");
        let home = tempdir.path().join("home");
        std::fs::create_dir_all(&project)?;
        std::fs::create_dir_all(&home)?;
        Ok(Self {
            tempdir,
            project,
            home,
        })
    }

    /// Filesystem collaborator rooted at this fixture's home.
    pub fn fs(&self) -> LocalFileSystem {
        LocalFileSystem::with_home(&self.home)
    }

    /// A fresh, empty directory under the tempdir (for deployment targets).
    pub fn dir(&self, name: &str) -> std::io::Result<PathBuf> {
        let dir = self.tempdir.path().join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Writes `content` at `rel` under the project, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> std::io::Result<PathBuf> {
        write_file(&self.project, rel, content)
    }

    /// Writes `content` at `rel` under the fake home, creating parents.
    pub fn write_home(&self, rel: &str, content: &str) -> std::io::Result<PathBuf> {
        write_file(&self.home, rel, content)
    }

    /// Reads a project file to a string.
    pub fn read(&self, rel: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.project.join(rel))
    }

    /// `.kiro/steering/<name>.md` with optional frontmatter.
    pub fn kiro_steering(
        &self,
        name: &str,
        inclusion: Option<&str>,
        body: &str,
    ) -> std::io::Result<PathBuf> {
        let content = match inclusion {
            Some(inclusion) => format!("---\ninclusion: {inclusion}\n---\n{body}"),
            None => body.to_string(),
        };
        self.write(&format!(".kiro/steering/{name}.md"), &content)
    }

    /// `.kiro/specs/<name>/<doc>.md` for each `(doc, body)` pair.
    pub fn kiro_spec(&self, name: &str, documents: &[(&str, &str)]) -> std::io::Result<PathBuf> {
        let dir = self.project.join(".kiro/specs").join(name);
        std::fs::create_dir_all(&dir)?;
        for (doc, body) in documents {
            std::fs::write(dir.join(format!("{doc}.md")), body)?;
        }
        Ok(dir)
    }

    /// `.kiro/hooks/<file>.kiro.hook` holding `json`.
    pub fn kiro_hook(&self, file: &str, json: &str) -> std::io::Result<PathBuf> {
        self.write(&format!(".kiro/hooks/{file}.kiro.hook"), json)
    }

    /// `.claude/commands/<name>.md`
    pub fn claude_command(&self, name: &str, body: &str) -> std::io::Result<PathBuf> {
        self.write(&format!(".claude/commands/{name}.md"), body)
    }

    /// `.cursor/rules/<name>.mdc` with the given frontmatter lines.
    pub fn cursor_rule(&self, name: &str, frontmatter: &str, body: &str) -> std::io::Result<PathBuf> {
        self.write(
            &format!(".cursor/rules/{name}.mdc"),
            &format!("---\n{frontmatter}\n---\n{body}"),
        )
    }
}

fn write_file(base: &Path, rel: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = base.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taptik_core::FileSystem;

    #[test]
    fn test_set_env_var_sets_and_restores() {
        let _g = env_guard();
        const KEY: &str = "TAPTIK_TEST_UTILS_VAR";
        std::env::remove_var(KEY);
        {
            let _guard = set_env_var(KEY, Some("test_value"));
            assert_eq!(std::env::var(KEY).ok(), Some("test_value".to_string()));
        }
        assert!(std::env::var(KEY).is_err());
    }

    #[test]
    fn test_set_env_var_restores_previous_value() {
        let _g = env_guard();
        const KEY: &str = "TAPTIK_TEST_RESTORE_VAR";
        std::env::set_var(KEY, "original");
        {
            let _guard = set_env_var(KEY, None);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok(), Some("original".to_string()));
        std::env::remove_var(KEY);
    }

    #[test]
    fn test_fixture_separates_project_and_home() {
        let fixture = TestFixture::new().expect("fixture creation");
        assert!(fixture.project.is_dir());
        assert!(fixture.home.is_dir());
        assert_eq!(fixture.fs().user_home(), Some(fixture.home.clone()));
    }

    #[test]
    fn test_kiro_helpers_write_expected_layout() {
        let fixture = TestFixture::new().expect("fixture creation");
        fixture
            .kiro_steering("tech", Some("manual"), "Rust 2021")
            .expect("steering");
        fixture
            .kiro_spec("auth", &[("requirements", "# Auth")])
            .expect("spec");
        let hook = serde_json::json!({"name": "fmt", "version": "1"}).to_string();
        fixture.kiro_hook("fmt", &hook).expect("hook");

        let steering = fixture.read(".kiro/steering/tech.md").unwrap();
        assert!(steering.starts_with("---\ninclusion: manual\n---\n"));
        assert!(fixture.project.join(".kiro/specs/auth/requirements.md").exists());
        assert!(fixture.project.join(".kiro/hooks/fmt.kiro.hook").exists());
    }
}
