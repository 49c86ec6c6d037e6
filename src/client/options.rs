//! Request options for paginated and search endpoints.
//!
//! Each options struct leaves every field optional; `to_params` applies the
//! documented defaults and produces the query parameters sent upstream.
//! Parameters are kept in a `BTreeMap`, so their order (and therefore the
//! cache key) never depends on how the options were built.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Query parameters, ordered by name.
pub type QueryParams = BTreeMap<String, String>;

pub const DEFAULT_PER_PAGE: u32 = 30;
pub const DEFAULT_SEARCH_PER_PAGE: u32 = 10;
pub const DEFAULT_PAGE: u32 = 1;

/// Error returned when an option value is not one GitHub accepts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value '{value}' for '{name}'")]
pub struct InvalidOption {
    pub name: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $param:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = InvalidOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(InvalidOption {
                        name: $param,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Sort field for repository listings.
    RepoSort, "sort" {
        Created => "created",
        Updated => "updated",
        Pushed => "pushed",
        FullName => "full_name",
    }
);

string_enum!(
    /// Sort direction, used as `direction` for listings and `order` for search.
    Direction, "direction" {
        Asc => "asc",
        Desc => "desc",
    }
);

string_enum!(
    /// Which repositories of a user to list.
    RepoType, "type" {
        All => "all",
        Owner => "owner",
        Member => "member",
    }
);

string_enum!(
    /// Sort field for user search.
    SearchSort, "sort" {
        BestMatch => "best-match",
        Followers => "followers",
        Repositories => "repositories",
        Joined => "joined",
    }
);

/// Zero behaves as "not set".
fn positive_or(value: Option<u32>, default: u32) -> u32 {
    value.filter(|n| *n > 0).unwrap_or(default)
}

// == Repository listing ==
/// Options for `GET /users/{username}/repos`.
///
/// Defaults: `sort=updated`, `direction=desc`, `per_page=30`, `page=1`, `type=owner`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoListOptions {
    pub sort: Option<RepoSort>,
    pub direction: Option<Direction>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub repo_type: Option<RepoType>,
    /// Unrecognized parameters, forwarded as-is
    pub extra: BTreeMap<String, String>,
}

impl RepoListOptions {
    pub fn sort(mut self, sort: RepoSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn repo_type(mut self, repo_type: RepoType) -> Self {
        self.repo_type = Some(repo_type);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn to_params(&self) -> QueryParams {
        // Pass-through parameters first; recognized fields win on a name clash.
        let mut params = self.extra.clone();
        params.insert(
            "sort".into(),
            self.sort.unwrap_or(RepoSort::Updated).to_string(),
        );
        params.insert(
            "direction".into(),
            self.direction.unwrap_or(Direction::Desc).to_string(),
        );
        params.insert(
            "per_page".into(),
            positive_or(self.per_page, DEFAULT_PER_PAGE).to_string(),
        );
        params.insert(
            "page".into(),
            positive_or(self.page, DEFAULT_PAGE).to_string(),
        );
        params.insert(
            "type".into(),
            self.repo_type.unwrap_or(RepoType::Owner).to_string(),
        );
        params
    }
}

// == Plain pagination ==
/// Options for followers, following and collaborators.
///
/// Defaults: `per_page=30`, `page=1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub extra: BTreeMap<String, String>,
}

impl PageOptions {
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn to_params(&self) -> QueryParams {
        // Pass-through parameters first; recognized fields win on a name clash.
        let mut params = self.extra.clone();
        params.insert(
            "per_page".into(),
            positive_or(self.per_page, DEFAULT_PER_PAGE).to_string(),
        );
        params.insert(
            "page".into(),
            positive_or(self.page, DEFAULT_PAGE).to_string(),
        );
        params
    }
}

// == User search ==
/// Options for `GET /search/users`.
///
/// Defaults: `sort=best-match`, `order=desc`, `per_page=10`, `page=1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub sort: Option<SearchSort>,
    pub order: Option<Direction>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub extra: BTreeMap<String, String>,
}

impl SearchOptions {
    pub fn sort(mut self, sort: SearchSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn order(mut self, order: Direction) -> Self {
        self.order = Some(order);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Query parameters including the search query `q`.
    pub fn to_params(&self, query: &str) -> QueryParams {
        // Pass-through parameters first; recognized fields win on a name clash.
        let mut params = self.extra.clone();
        params.insert("q".into(), query.to_string());
        params.insert(
            "sort".into(),
            self.sort.unwrap_or(SearchSort::BestMatch).to_string(),
        );
        params.insert(
            "order".into(),
            self.order.unwrap_or(Direction::Desc).to_string(),
        );
        params.insert(
            "per_page".into(),
            positive_or(self.per_page, DEFAULT_SEARCH_PER_PAGE).to_string(),
        );
        params.insert(
            "page".into(),
            positive_or(self.page, DEFAULT_PAGE).to_string(),
        );
        params
    }
}
