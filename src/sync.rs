// Run loop: resolves the project once, then walks the entry table in order,
// upserting each file and printing a progress line per file plus a final
// summary. Delegates all HTTP work to `api`.

use crate::api::{ApiResponse, FileStore, GitLabClient, ProjectInfo};
use crate::config::{self, Settings};
use crate::entries::{ConfigEntry, CONFIG_FILES};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Per-file outcome. `Failed` carries a human-readable reason (status code
/// plus response body for HTTP errors, the error chain otherwise).
#[derive(Debug)]
pub enum FileOutcome {
    Created,
    Updated,
    SkippedExists,
    Failed(String),
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Created => write!(f, "[created]"),
            FileOutcome::Updated => write!(f, "[updated]"),
            FileOutcome::SkippedExists => write!(f, "[skipped (exists)]"),
            FileOutcome::Failed(reason) => write!(f, "[FAILED: {reason}]"),
        }
    }
}

/// Run-level counters, aggregated over all entries.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Created | FileOutcome::Updated => self.succeeded += 1,
            FileOutcome::SkippedExists => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Results: {} created/updated, {} skipped, {} failed",
            self.succeeded, self.skipped, self.failed
        )
    }

    /// True when every entry ended up present (created, updated or already
    /// there), which is the condition for printing the verification hint.
    pub fn all_accounted(&self, total: usize) -> bool {
        self.succeeded + self.skipped == total
    }
}

/// Ensure one file's content is present: check existence, then skip, create
/// or update. Every failure is captured as this file's outcome so the caller
/// can carry on with the rest of the batch.
pub fn upsert_file<S: FileStore>(
    store: &S,
    path: &str,
    content: &str,
    overwrite: bool,
) -> FileOutcome {
    let exists = match store.exists(path) {
        Ok(exists) => exists,
        Err(e) => return FileOutcome::Failed(format!("{e:#}")),
    };

    if exists && !overwrite {
        return FileOutcome::SkippedExists;
    }

    let verb = if exists { "Update" } else { "Create" };
    let message = format!("{verb} {path}");
    let result = if exists {
        store.update(path, content, &message)
    } else {
        store.create(path, content, &message)
    };

    match result {
        Ok(ApiResponse::Success(_)) => {
            if exists {
                FileOutcome::Updated
            } else {
                FileOutcome::Created
            }
        }
        Ok(ApiResponse::NotFound) => FileOutcome::Failed("404: not found".into()),
        Ok(ApiResponse::HttpError { status, body }) => {
            FileOutcome::Failed(format!("{status}: {body}"))
        }
        Err(e) => FileOutcome::Failed(format!("{e:#}")),
    }
}

/// Push every entry through `upsert_file`, printing one line per file.
pub fn push_entries<S: FileStore>(
    store: &S,
    entries: &[ConfigEntry],
    overwrite: bool,
) -> RunReport {
    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(ProgressStyle::with_template("{bar:20} {pos}/{len} {msg}").unwrap());

    let mut report = RunReport::default();
    for entry in entries {
        pb.set_message(entry.path);
        let outcome = upsert_file(store, entry.path, entry.content, overwrite);
        report.record(&outcome);
        pb.println(format!("  {}... {}", entry.path, outcome));
        pb.inc(1);
    }
    pb.finish_and_clear();
    report
}

/// Resolve the numeric project id for the static project path, printing the
/// failure detail when the lookup does not succeed.
fn resolve_project_id(client: &GitLabClient) -> Result<u64> {
    match client.get_project(config::PROJECT_PATH) {
        Ok(ApiResponse::Success(body)) => {
            let info: ProjectInfo =
                serde_json::from_str(&body).context("Parsing project lookup json")?;
            Ok(info.id)
        }
        Ok(ApiResponse::NotFound) => {
            println!("Error getting project: 404 Not Found");
            bail!("project {} not found", config::PROJECT_PATH)
        }
        Ok(ApiResponse::HttpError { status, body }) => {
            let reason = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("");
            println!("Error getting project: {status} {reason}");
            println!("  Details: {body}");
            bail!("project lookup for {} failed", config::PROJECT_PATH)
        }
        Err(e) => {
            println!("Connection error: {e:#}");
            bail!("could not reach {}", config::GITLAB_URL)
        }
    }
}

/// Drive the whole run: banner, project lookup, file pushes, summary, hint.
pub fn run(client: &GitLabClient, settings: &Settings) -> Result<()> {
    println!("GitLab URL: {}", config::GITLAB_URL);
    println!("Project: {}", config::PROJECT_PATH);
    println!("Branch: {}", config::BRANCH);
    println!(
        "Overwrite: {}",
        if settings.overwrite {
            "Yes"
        } else {
            "No (skip existing)"
        }
    );
    println!();

    let project_id = resolve_project_id(client)
        .context("Failed to get project ID. Check your token and project path.")?;
    println!("Project ID: {project_id}");
    println!();

    let files = crate::api::ProjectFiles::new(client, project_id, config::BRANCH);
    let report = push_entries(&files, CONFIG_FILES, settings.overwrite);

    println!();
    println!("{}", report.summary_line());

    if report.all_accounted(CONFIG_FILES.len()) {
        println!();
        println!("Configuration files are ready in GitLab!");
        println!();
        println!("Test with Config Server:");
        println!(
            "  curl {}/project1-v1/test/{}",
            config::CONFIG_SERVER_URL,
            config::BRANCH
        );
        println!(
            "  curl {}/GlobalConfig/pro/{}",
            config::CONFIG_SERVER_URL,
            config::BRANCH
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// In-memory stand-in for the repository: a set of existing paths plus a
    /// log of every call, so tests can assert on which operations ran.
    #[derive(Default)]
    struct FakeStore {
        existing: RefCell<HashSet<String>>,
        calls: RefCell<Vec<String>>,
        broken_paths: HashSet<String>,
    }

    impl FakeStore {
        fn with_existing(paths: &[&str]) -> Self {
            let store = FakeStore::default();
            store
                .existing
                .borrow_mut()
                .extend(paths.iter().map(|p| p.to_string()));
            store
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl FileStore for FakeStore {
        fn exists(&self, path: &str) -> Result<bool> {
            self.calls.borrow_mut().push(format!("exists {path}"));
            if self.broken_paths.contains(path) {
                return Err(anyhow!("existence check for {path} returned 500: oops"));
            }
            Ok(self.existing.borrow().contains(path))
        }

        fn create(&self, path: &str, _content: &str, message: &str) -> Result<ApiResponse> {
            self.calls.borrow_mut().push(format!("create {path} ({message})"));
            self.existing.borrow_mut().insert(path.to_string());
            Ok(ApiResponse::Success("{}".into()))
        }

        fn update(&self, path: &str, _content: &str, message: &str) -> Result<ApiResponse> {
            self.calls.borrow_mut().push(format!("update {path} ({message})"));
            Ok(ApiResponse::Success("{}".into()))
        }
    }

    #[test]
    fn absent_file_is_created() {
        let store = FakeStore::default();
        let outcome = upsert_file(&store, "config/envtest/GlobalConfig.properties", "x", false);
        assert!(matches!(outcome, FileOutcome::Created));
        assert_eq!(
            store.calls(),
            [
                "exists config/envtest/GlobalConfig.properties",
                "create config/envtest/GlobalConfig.properties (Create config/envtest/GlobalConfig.properties)",
            ]
        );
    }

    #[test]
    fn existing_file_is_skipped_without_overwrite() {
        let store = FakeStore::with_existing(&["config/envtest/GlobalConfig.properties"]);
        let outcome = upsert_file(&store, "config/envtest/GlobalConfig.properties", "x", false);
        assert!(matches!(outcome, FileOutcome::SkippedExists));
        // no content-changing call after the existence check
        assert_eq!(
            store.calls(),
            ["exists config/envtest/GlobalConfig.properties"]
        );
    }

    #[test]
    fn existing_file_is_updated_with_overwrite() {
        let store = FakeStore::with_existing(&["config/envtest/GlobalConfig.properties"]);
        let outcome = upsert_file(&store, "config/envtest/GlobalConfig.properties", "x", true);
        assert!(matches!(outcome, FileOutcome::Updated));
        assert_eq!(
            store.calls(),
            [
                "exists config/envtest/GlobalConfig.properties",
                "update config/envtest/GlobalConfig.properties (Update config/envtest/GlobalConfig.properties)",
            ]
        );
    }

    #[test]
    fn upsert_http_error_becomes_failed_outcome() {
        struct RejectingStore;
        impl FileStore for RejectingStore {
            fn exists(&self, _path: &str) -> Result<bool> {
                Ok(false)
            }
            fn create(&self, _path: &str, _content: &str, _message: &str) -> Result<ApiResponse> {
                Ok(ApiResponse::HttpError {
                    status: 403,
                    body: "insufficient scope".into(),
                })
            }
            fn update(&self, _path: &str, _content: &str, _message: &str) -> Result<ApiResponse> {
                unreachable!("absent file must not be updated")
            }
        }
        let outcome = upsert_file(&RejectingStore, "config/envpro/GlobalConfig.properties", "x", false);
        match outcome {
            FileOutcome::Failed(reason) => assert_eq!(reason, "403: insufficient scope"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn all_absent_entries_report_six_creates() {
        let store = FakeStore::default();
        let report = push_entries(&store, CONFIG_FILES, false);
        assert_eq!(
            report,
            RunReport {
                succeeded: 6,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(
            report.summary_line(),
            "Results: 6 created/updated, 0 skipped, 0 failed"
        );
        assert!(report.all_accounted(CONFIG_FILES.len()));
    }

    #[test]
    fn all_existing_entries_report_six_skips() {
        let paths: Vec<&str> = CONFIG_FILES.iter().map(|e| e.path).collect();
        let store = FakeStore::with_existing(&paths);
        let report = push_entries(&store, CONFIG_FILES, false);
        assert_eq!(
            report,
            RunReport {
                succeeded: 0,
                skipped: 6,
                failed: 0
            }
        );
        assert_eq!(
            report.summary_line(),
            "Results: 0 created/updated, 6 skipped, 0 failed"
        );
        assert!(report.all_accounted(CONFIG_FILES.len()));
    }

    #[test]
    fn existence_check_error_fails_that_file_and_batch_continues() {
        let mut store = FakeStore::default();
        store
            .broken_paths
            .insert("config/envtest/GlobalConfig.properties".to_string());

        let report = push_entries(&store, CONFIG_FILES, false);
        assert_eq!(
            report,
            RunReport {
                succeeded: 5,
                skipped: 0,
                failed: 1
            }
        );
        assert!(!report.all_accounted(CONFIG_FILES.len()));
        // the remaining five entries were still processed after the failure
        let creates = store.calls().iter().filter(|c| c.starts_with("create ")).count();
        assert_eq!(creates, 5);
    }

    #[test]
    fn existence_check_error_is_not_treated_as_absent() {
        let mut store = FakeStore::default();
        store.broken_paths.insert("config/envbeta/project1-v1.properties".to_string());

        let outcome = upsert_file(&store, "config/envbeta/project1-v1.properties", "x", false);
        match outcome {
            FileOutcome::Failed(reason) => assert!(reason.contains("500"), "{reason}"),
            other => panic!("expected Failed, got {other:?}"),
        }
        // in particular, no create was attempted on the strength of the error
        assert_eq!(
            store.calls(),
            ["exists config/envbeta/project1-v1.properties"]
        );
    }

    #[test]
    fn outcome_labels_match_report_lines() {
        assert_eq!(FileOutcome::Created.to_string(), "[created]");
        assert_eq!(FileOutcome::Updated.to_string(), "[updated]");
        assert_eq!(FileOutcome::SkippedExists.to_string(), "[skipped (exists)]");
        assert_eq!(
            FileOutcome::Failed("400: bad branch".into()).to_string(),
            "[FAILED: 400: bad branch]"
        );
    }
}
