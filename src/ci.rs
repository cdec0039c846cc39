//! CI/CD environment detection.
//!
//! Builds a structured record of the CI run (provider, event, build, repo)
//! from a snapshot of environment variables. Detection is a pure function
//! of the snapshot: no filesystem access, no process spawning, so the same
//! snapshot always yields the same record.

use std::collections::HashMap;
use std::str::FromStr;

use log::debug;

/// Environment snapshot consumed by the detector.
pub type EnvMap = HashMap<String, String>;

/// Capture the current process environment as a detector snapshot.
pub fn env_snapshot() -> EnvMap {
    std::env::vars().collect()
}

/// Supported CI providers, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiProvider {
    GithubActions,
    BitbucketPipelines,
    AzureDevops,
    Generic,
}

impl CiProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            CiProvider::GithubActions => "github_actions",
            CiProvider::BitbucketPipelines => "bitbucket_pipelines",
            CiProvider::AzureDevops => "azure_devops",
            CiProvider::Generic => "generic_ci",
        }
    }
}

/// Event that triggered the CI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    PullRequest,
    Release,
    Push,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::PullRequest => "pull_request",
            EventType::Release => "release",
            EventType::Push => "push",
        }
    }
}

/// Pull request context, fields omitted when the provider does not expose them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: Option<String>,
    pub url: Option<String>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub author: Option<String>,
}

/// Build context for the CI run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub id: Option<String>,
    pub number: Option<String>,
    pub url: Option<String>,
    pub commit_sha: Option<String>,
}

/// Repository context for the CI run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub url: Option<String>,
}

/// Structured CI metadata record, built fresh per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiContext {
    pub provider: CiProvider,
    pub event_type: EventType,
    pub release_tag: Option<String>,
    pub pr: PullRequestInfo,
    pub build: BuildInfo,
    pub repo: RepositoryInfo,
}

/// Tri-state control over whether CI metadata is attached to uploads.
///
/// Read from `PYLYNK_INCLUDE_CI_METADATA`; defaults to `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CiMode {
    /// Attach only when a CI provider was detected
    #[default]
    Auto,
    /// Always attach, even with an empty or partial record
    Always,
    /// Never attach
    Never,
}

impl FromStr for CiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(CiMode::Auto),
            "true" => Ok(CiMode::Always),
            "false" => Ok(CiMode::Never),
            _ => Err(format!(
                "Invalid value for PYLYNK_INCLUDE_CI_METADATA: {}. Expected auto, true or false",
                s
            )),
        }
    }
}

// Generic-CI alias tables. First non-empty value wins; the order below is
// the documented precedence.
const PR_NUMBER_ALIASES: &[&str] = &["PULL_REQUEST_NUMBER", "PR_NUMBER", "CHANGE_ID"];
const SOURCE_BRANCH_ALIASES: &[&str] = &["CHANGE_BRANCH", "BRANCH_NAME", "GIT_BRANCH"];
const TARGET_BRANCH_ALIASES: &[&str] = &["CHANGE_TARGET", "TARGET_BRANCH"];
const PR_URL_ALIASES: &[&str] = &["CHANGE_URL", "PR_URL"];
const PR_AUTHOR_ALIASES: &[&str] = &["CHANGE_AUTHOR", "PR_AUTHOR"];
const BUILD_URL_ALIASES: &[&str] = &["BUILD_URL", "CI_BUILD_URL"];
const BUILD_ID_ALIASES: &[&str] = &["BUILD_ID", "CI_BUILD_ID"];
const COMMIT_SHA_ALIASES: &[&str] = &["GIT_COMMIT", "COMMIT_SHA", "SHA"];
const REPO_URL_ALIASES: &[&str] = &["REPO_URL", "GIT_URL"];
const RELEASE_TAG_ALIASES: &[&str] = &["GIT_TAG", "TAG_NAME"];

fn get(env: &EnvMap, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.is_empty()).cloned()
}

fn first_of(env: &EnvMap, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| get(env, key))
}

fn strip_ref(value: &str, prefix: &str) -> Option<String> {
    value.strip_prefix(prefix).map(str::to_string)
}

impl CiContext {
    /// Detect the CI environment from a snapshot.
    ///
    /// Detection order (first match wins): GitHub Actions, Bitbucket
    /// Pipelines, Azure DevOps, generic (`CI` set). Returns `None` when no
    /// marker is present.
    pub fn detect(env: &EnvMap) -> Option<CiContext> {
        let context = if get(env, "GITHUB_ACTIONS").as_deref() == Some("true") {
            Self::from_github(env)
        } else if get(env, "BITBUCKET_BUILD_NUMBER").is_some() {
            Self::from_bitbucket(env)
        } else if get(env, "TF_BUILD")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
        {
            Self::from_azure(env)
        } else if get(env, "CI").is_some() {
            Self::from_generic(env)
        } else {
            return None;
        };

        context.log_extracted();
        Some(context)
    }

    /// Build a record unconditionally, for the forced-attachment mode.
    ///
    /// Falls back to a best-effort generic scrape when no provider marker
    /// is present; the record may be empty apart from the event type.
    pub fn detect_or_default(env: &EnvMap) -> CiContext {
        Self::detect(env).unwrap_or_else(|| Self::from_generic(env))
    }

    fn from_github(env: &EnvMap) -> CiContext {
        let server = get(env, "GITHUB_SERVER_URL").unwrap_or_else(|| "https://github.com".into());
        let repository = get(env, "GITHUB_REPOSITORY");
        let event_name = get(env, "GITHUB_EVENT_NAME").unwrap_or_default();
        let git_ref = get(env, "GITHUB_REF").unwrap_or_default();

        let mut repo = RepositoryInfo::default();
        if let Some(full) = &repository {
            if let Some((owner, name)) = full.split_once('/') {
                repo.owner = Some(owner.to_string());
                repo.name = Some(name.to_string());
            }
            repo.url = Some(format!("{}/{}", server, full));
        }

        let build = BuildInfo {
            id: get(env, "GITHUB_RUN_ID"),
            number: get(env, "GITHUB_RUN_NUMBER"),
            commit_sha: get(env, "GITHUB_SHA"),
            url: match (&repository, get(env, "GITHUB_RUN_ID")) {
                (Some(full), Some(run_id)) => {
                    Some(format!("{}/{}/actions/runs/{}", server, full, run_id))
                }
                _ => None,
            },
        };

        // PR number is only exposed through the ref (refs/pull/<n>/merge)
        let pr_number = git_ref
            .strip_prefix("refs/pull/")
            .and_then(|rest| rest.split('/').next())
            .map(str::to_string);

        let mut context = CiContext {
            provider: CiProvider::GithubActions,
            event_type: EventType::Push,
            release_tag: None,
            pr: PullRequestInfo::default(),
            build,
            repo,
        };

        if event_name.starts_with("pull_request") || pr_number.is_some() {
            context.event_type = EventType::PullRequest;
            context.pr = PullRequestInfo {
                url: match (&repository, &pr_number) {
                    (Some(full), Some(n)) => Some(format!("{}/{}/pull/{}", server, full, n)),
                    _ => None,
                },
                number: pr_number,
                source_branch: get(env, "GITHUB_HEAD_REF"),
                target_branch: get(env, "GITHUB_BASE_REF"),
                author: get(env, "GITHUB_ACTOR"),
            };
        } else if let Some(tag) = strip_ref(&git_ref, "refs/tags/") {
            context.event_type = EventType::Release;
            context.release_tag = Some(tag);
            context.pr.author = get(env, "GITHUB_ACTOR");
        } else {
            context.pr.source_branch = strip_ref(&git_ref, "refs/heads/");
            context.pr.author = get(env, "GITHUB_ACTOR");
        }

        context
    }

    fn from_bitbucket(env: &EnvMap) -> CiContext {
        let workspace = get(env, "BITBUCKET_WORKSPACE");
        let slug = get(env, "BITBUCKET_REPO_SLUG");
        let base = match (&workspace, &slug) {
            (Some(ws), Some(sl)) => Some(format!("https://bitbucket.org/{}/{}", ws, sl)),
            _ => None,
        };

        let build_number = get(env, "BITBUCKET_BUILD_NUMBER");
        let build = BuildInfo {
            id: None,
            number: build_number.clone(),
            commit_sha: get(env, "BITBUCKET_COMMIT"),
            url: match (&base, &build_number) {
                (Some(b), Some(n)) => Some(format!("{}/pipelines/results/{}", b, n)),
                _ => None,
            },
        };

        let repo = RepositoryInfo {
            name: slug,
            owner: workspace,
            url: base.clone(),
        };

        let mut context = CiContext {
            provider: CiProvider::BitbucketPipelines,
            event_type: EventType::Push,
            release_tag: None,
            pr: PullRequestInfo::default(),
            build,
            repo,
        };

        if let Some(pr_id) = get(env, "BITBUCKET_PR_ID") {
            context.event_type = EventType::PullRequest;
            context.pr = PullRequestInfo {
                url: base.map(|b| format!("{}/pull-requests/{}", b, pr_id)),
                number: Some(pr_id),
                source_branch: get(env, "BITBUCKET_BRANCH"),
                target_branch: get(env, "BITBUCKET_PR_DESTINATION_BRANCH"),
                author: get(env, "BITBUCKET_STEP_TRIGGERER_UUID"),
            };
        } else if let Some(tag) = get(env, "BITBUCKET_TAG") {
            context.event_type = EventType::Release;
            context.release_tag = Some(tag);
            context.pr.author = get(env, "BITBUCKET_STEP_TRIGGERER_UUID");
        } else {
            context.pr.source_branch = get(env, "BITBUCKET_BRANCH");
            context.pr.author = get(env, "BITBUCKET_STEP_TRIGGERER_UUID");
        }

        context
    }

    fn from_azure(env: &EnvMap) -> CiContext {
        let build_id = get(env, "BUILD_BUILDID");
        let build = BuildInfo {
            id: build_id.clone(),
            number: get(env, "BUILD_BUILDNUMBER"),
            commit_sha: get(env, "BUILD_SOURCEVERSION"),
            url: match (
                get(env, "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI"),
                get(env, "SYSTEM_TEAMPROJECT"),
                &build_id,
            ) {
                (Some(collection), Some(project), Some(id)) => Some(format!(
                    "{}{}/_build/results?buildId={}",
                    collection, project, id
                )),
                _ => None,
            },
        };

        let repo = RepositoryInfo {
            name: get(env, "BUILD_REPOSITORY_NAME"),
            owner: None,
            url: get(env, "BUILD_REPOSITORY_URI"),
        };

        let source_branch = get(env, "BUILD_SOURCEBRANCH").unwrap_or_default();

        let mut context = CiContext {
            provider: CiProvider::AzureDevops,
            event_type: EventType::Push,
            release_tag: None,
            pr: PullRequestInfo::default(),
            build,
            repo,
        };

        if let Some(pr_id) = get(env, "SYSTEM_PULLREQUEST_PULLREQUESTID") {
            context.event_type = EventType::PullRequest;
            context.pr = PullRequestInfo {
                number: Some(pr_id),
                url: None,
                source_branch: get(env, "SYSTEM_PULLREQUEST_SOURCEBRANCH")
                    .map(|b| b.strip_prefix("refs/heads/").unwrap_or(&b).to_string()),
                target_branch: get(env, "SYSTEM_PULLREQUEST_TARGETBRANCH")
                    .map(|b| b.strip_prefix("refs/heads/").unwrap_or(&b).to_string()),
                author: get(env, "BUILD_REQUESTEDFOR"),
            };
        } else if let Some(tag) = strip_ref(&source_branch, "refs/tags/") {
            context.event_type = EventType::Release;
            context.release_tag = Some(tag);
            context.pr.author = get(env, "BUILD_REQUESTEDFOR");
        } else {
            context.pr.source_branch = strip_ref(&source_branch, "refs/heads/");
            context.pr.author = get(env, "BUILD_REQUESTEDFOR");
        }

        context
    }

    fn from_generic(env: &EnvMap) -> CiContext {
        let build = BuildInfo {
            id: first_of(env, BUILD_ID_ALIASES),
            number: None,
            url: first_of(env, BUILD_URL_ALIASES),
            commit_sha: first_of(env, COMMIT_SHA_ALIASES),
        };

        let repo = RepositoryInfo {
            name: None,
            owner: None,
            url: first_of(env, REPO_URL_ALIASES),
        };

        let mut context = CiContext {
            provider: CiProvider::Generic,
            event_type: EventType::Push,
            release_tag: None,
            pr: PullRequestInfo::default(),
            build,
            repo,
        };

        if let Some(number) = first_of(env, PR_NUMBER_ALIASES) {
            context.event_type = EventType::PullRequest;
            context.pr = PullRequestInfo {
                number: Some(number),
                url: first_of(env, PR_URL_ALIASES),
                source_branch: first_of(env, SOURCE_BRANCH_ALIASES),
                target_branch: first_of(env, TARGET_BRANCH_ALIASES),
                author: first_of(env, PR_AUTHOR_ALIASES),
            };
        } else if let Some(tag) = first_of(env, RELEASE_TAG_ALIASES) {
            context.event_type = EventType::Release;
            context.release_tag = Some(tag);
        } else {
            context.pr.source_branch = first_of(env, SOURCE_BRANCH_ALIASES);
        }

        context
    }

    /// Upload headers for this record, one per populated field.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("X-CI-Provider", self.provider.as_str().to_string()),
            ("X-Event-Type", self.event_type.as_str().to_string()),
        ];

        let optional: [(&'static str, &Option<String>); 9] = [
            ("X-Release-Tag", &self.release_tag),
            ("X-PR-Number", &self.pr.number),
            ("X-PR-URL", &self.pr.url),
            ("X-PR-Source-Branch", &self.pr.source_branch),
            ("X-PR-Target-Branch", &self.pr.target_branch),
            ("X-PR-Author", &self.pr.author),
            ("X-Build-URL", &self.build.url),
            ("X-Commit-SHA", &self.build.commit_sha),
            ("X-Repository-URL", &self.repo.url),
        ];

        for (name, value) in optional {
            if let Some(v) = value {
                headers.push((name, v.clone()));
            }
        }

        headers
    }

    /// Human-readable summary of the triggering event, for debug logs.
    pub fn event_summary(&self) -> String {
        let mut parts = vec![self.event_type.as_str().to_string()];
        if let Some(n) = &self.pr.number {
            parts.push(format!("PR #{}", n));
        }
        match (&self.pr.source_branch, &self.pr.target_branch) {
            (Some(src), Some(dst)) => parts.push(format!("{} -> {}", src, dst)),
            (Some(src), None) => parts.push(format!("branch: {}", src)),
            (None, Some(dst)) => parts.push(format!("-> {}", dst)),
            (None, None) => {}
        }
        if let Some(tag) = &self.release_tag {
            parts.push(format!("tag: {}", tag));
        }
        if let Some(author) = &self.pr.author {
            parts.push(format!("by {}", author));
        }
        parts.join(" ")
    }

    fn log_extracted(&self) {
        debug!("CI provider: {}", self.provider.as_str());
        debug!("CI event: {}", self.event_summary());
        if let Some(url) = &self.build.url {
            debug!("CI build URL: {}", url);
        }
        if let Some(sha) = &self.build.commit_sha {
            debug!("CI commit SHA: {}", sha);
        }
        if let Some(url) = &self.repo.url {
            debug!("CI repository: {}", url);
        }
    }
}

/// Whether a record should be attached to outgoing upload requests.
pub fn should_attach(mode: CiMode, detected: Option<&CiContext>) -> bool {
    match mode {
        CiMode::Auto => detected.is_some(),
        CiMode::Always => true,
        CiMode::Never => false,
    }
}
