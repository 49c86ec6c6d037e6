//! Profile insights
//!
//! Pure functions that turn fetched payloads into the shapes dashboard widgets
//! draw: language shares, repository rankings and profile totals.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Serialize;

use crate::client::InvalidOption;
use crate::models::{Languages, Repository, UserProfile};

/// Color used for languages without a registered one.
pub const FALLBACK_LANGUAGE_COLOR: &str = "#6b7280";

/// Number of repositories highlighted in a profile overview.
pub const TOP_REPOSITORIES: usize = 6;

const MAX_USERNAME_LENGTH: usize = 39;
const DEPLOY_KEYWORDS: [&str; 4] = ["demo", "live", "deployed", "preview"];

/// Display color for a language.
pub fn language_color(language: &str) -> &'static str {
    match language {
        "JavaScript" => "#f7df1e",
        "TypeScript" => "#007acc",
        "Python" => "#3776ab",
        "Java" => "#ed8b00",
        "C++" => "#00599c",
        "C#" => "#239120",
        "PHP" => "#777bb4",
        "Swift" => "#fa7343",
        "Kotlin" => "#7f52ff",
        "Go" => "#00add8",
        "Rust" => "#000000",
        "Ruby" => "#cc342d",
        "HTML" => "#e34c26",
        "CSS" => "#1572b6",
        "SCSS" => "#c6538c",
        "Vue" => "#4fc08d",
        "Dart" => "#0175c2",
        "Shell" => "#89e051",
        "PowerShell" => "#012456",
        "Dockerfile" => "#384d54",
        "YAML" => "#cb171e",
        "Markdown" => "#083fa1",
        _ => FALLBACK_LANGUAGE_COLOR,
    }
}

// == Language breakdown ==
/// One slice of a language chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub language: String,
    /// Repository count or byte count, depending on how the breakdown was built
    pub amount: u64,
    pub percentage: f64,
    pub color: &'static str,
}

fn shares(counts: impl IntoIterator<Item = (String, u64)>) -> Vec<LanguageShare> {
    let counts: Vec<(String, u64)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    let total: u64 = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = counts
        .into_iter()
        .map(|(language, amount)| LanguageShare {
            color: language_color(&language),
            percentage: amount as f64 * 100.0 / total as f64,
            language,
            amount,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.language.cmp(&b.language))
    });
    shares
}

/// Share of each primary language across repositories (by repository count).
///
/// Repositories without a detected language are left out.
pub fn language_breakdown(repos: &[Repository]) -> Vec<LanguageShare> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        *counts.entry(language.to_string()).or_default() += 1;
    }
    shares(counts)
}

/// Share of each language in a single repository (by bytes of code).
pub fn language_breakdown_by_bytes(languages: &Languages) -> Vec<LanguageShare> {
    shares(languages.iter().map(|(k, v)| (k.clone(), *v)))
}

// == Scoring ==
/// Heuristic popularity score used to pick showcase repositories.
///
/// Stars weigh 3, forks 2, watchers 1; a description, a wiki (0.5) and an
/// update within the last year add a little; each open issue costs 0.1.
pub fn repository_score(repo: &Repository, now: DateTime<Utc>) -> f64 {
    let has_description = repo
        .description
        .as_deref()
        .map_or(0.0, |d| if d.is_empty() { 0.0 } else { 1.0 });
    let has_wiki = if repo.has_wiki { 0.5 } else { 0.0 };
    let is_recent = match repo.updated_at {
        Some(updated) if now - updated < Duration::days(365) => 1.0,
        _ => 0.0,
    };

    repo.stargazers_count as f64 * 3.0
        + repo.forks_count as f64 * 2.0
        + repo.watchers_count as f64
        + has_description
        + has_wiki
        + is_recent
        - repo.open_issues_count as f64 * 0.1
}

// == Sorting & filtering ==
/// Local sort orders offered by the repository showcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoSortKey {
    Name,
    Stars,
    Forks,
    Size,
    Created,
    #[default]
    Updated,
}

impl FromStr for RepoSortKey {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(RepoSortKey::Name),
            "stars" => Ok(RepoSortKey::Stars),
            "forks" => Ok(RepoSortKey::Forks),
            "size" => Ok(RepoSortKey::Size),
            "created" => Ok(RepoSortKey::Created),
            "updated" => Ok(RepoSortKey::Updated),
            other => Err(InvalidOption {
                name: "sort_by",
                value: other.to_string(),
            }),
        }
    }
}

/// Sorts a copy of `repos`. Name is ascending (case-insensitive); every other key is descending.
pub fn sort_repositories(repos: &[Repository], key: RepoSortKey) -> Vec<Repository> {
    let mut sorted = repos.to_vec();
    sorted.sort_by(|a, b| compare(a, b, key));
    sorted
}

fn compare(a: &Repository, b: &Repository, key: RepoSortKey) -> Ordering {
    match key {
        RepoSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        RepoSortKey::Stars => b.stargazers_count.cmp(&a.stargazers_count),
        RepoSortKey::Forks => b.forks_count.cmp(&a.forks_count),
        RepoSortKey::Size => b.size.cmp(&a.size),
        RepoSortKey::Created => b.created_at.cmp(&a.created_at),
        RepoSortKey::Updated => b.updated_at.cmp(&a.updated_at),
    }
}

/// Visibility/origin filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    Public,
    Private,
    Forks,
    Original,
}

impl FromStr for RepoKind {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(RepoKind::Public),
            "private" => Ok(RepoKind::Private),
            "forks" => Ok(RepoKind::Forks),
            "original" => Ok(RepoKind::Original),
            other => Err(InvalidOption {
                name: "kind",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoFilter {
    /// Primary language, compared case-insensitively
    pub language: Option<String>,
    /// Substring of name, description or any topic
    pub search: Option<String>,
    pub kind: Option<RepoKind>,
}

impl RepoFilter {
    pub fn matches(&self, repo: &Repository) -> bool {
        if let Some(language) = &self.language {
            let same = repo
                .language
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(language));
            if !same {
                return false;
            }
        }

        if let Some(term) = self.search.as_deref().map(str::to_lowercase) {
            let hit = repo.name.to_lowercase().contains(&term)
                || repo
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
                || repo
                    .topics
                    .iter()
                    .any(|t| t.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        match self.kind {
            Some(RepoKind::Public) => !repo.private,
            Some(RepoKind::Private) => repo.private,
            Some(RepoKind::Forks) => repo.fork,
            Some(RepoKind::Original) => !repo.fork,
            None => true,
        }
    }
}

pub fn filter_repositories(repos: &[Repository], filter: &RepoFilter) -> Vec<Repository> {
    repos.iter().filter(|r| filter.matches(r)).cloned().collect()
}

// == Live demo detection ==
/// Best guess at a deployed demo for the repository.
///
/// Order: GitHub Pages, then a valid homepage URL, then the first URL in a
/// description that mentions a deployment.
pub fn detect_live_demo(repo: &Repository) -> Option<String> {
    if repo.has_pages {
        return Some(format!(
            "https://{}.github.io/{}",
            repo.owner.login, repo.name
        ));
    }

    if let Some(homepage) = repo.homepage.as_deref().map(str::trim) {
        if Url::parse(homepage).is_ok() {
            return Some(homepage.to_string());
        }
    }

    let description = repo.description.as_deref()?.to_lowercase();
    if !DEPLOY_KEYWORDS.iter().any(|k| description.contains(k)) {
        return None;
    }
    description
        .split_whitespace()
        .find(|word| word.starts_with("http://") || word.starts_with("https://"))
        .map(str::to_string)
}

// == Formatting & validation ==
/// Compact counter: `999`, `1.2K`, `3.4M`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// GitHub login rules: 1-39 ASCII alphanumerics or hyphens, no leading,
/// trailing or doubled hyphen.
pub fn is_valid_username(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_USERNAME_LENGTH {
        return false;
    }
    if name.starts_with('-') || name.ends_with('-') || name.contains("--") {
        return false;
    }
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// == Overview ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileTotals {
    pub repositories: usize,
    pub stars: u64,
    pub forks: u64,
    pub original_repositories: usize,
}

/// A showcase card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryCard {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub language_color: Option<&'static str>,
    pub stars: u64,
    /// Compact star count for display (`1.2K`)
    pub stars_label: String,
    pub forks: u64,
    pub topics: Vec<String>,
    pub live_demo: Option<String>,
    pub score: f64,
}

impl RepositoryCard {
    pub fn from_repository(repo: &Repository, now: DateTime<Utc>) -> Self {
        Self {
            name: repo.name.clone(),
            html_url: repo.html_url.clone(),
            description: repo.description.clone(),
            language: repo.language.clone(),
            language_color: repo.language.as_deref().map(language_color),
            stars: repo.stargazers_count,
            stars_label: format_count(repo.stargazers_count),
            forks: repo.forks_count,
            topics: repo.topics.clone(),
            live_demo: detect_live_demo(repo),
            score: repository_score(repo, now),
        }
    }
}

/// Everything the profile page needs besides the raw user object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileOverview {
    pub user: UserProfile,
    pub totals: ProfileTotals,
    pub languages: Vec<LanguageShare>,
    pub top_repositories: Vec<RepositoryCard>,
}

impl ProfileOverview {
    pub fn build(user: UserProfile, repos: &[Repository], now: DateTime<Utc>) -> Self {
        let totals = ProfileTotals {
            repositories: repos.len(),
            stars: repos.iter().map(|r| r.stargazers_count).sum(),
            forks: repos.iter().map(|r| r.forks_count).sum(),
            original_repositories: repos.iter().filter(|r| !r.fork).count(),
        };

        let mut cards: Vec<RepositoryCard> = repos
            .iter()
            .map(|r| RepositoryCard::from_repository(r, now))
            .collect();
        cards.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        cards.truncate(TOP_REPOSITORIES);

        Self {
            user,
            totals,
            languages: language_breakdown(repos),
            top_repositories: cards,
        }
    }
}
