//! Query-string parsing for the HTTP API
//!
//! Handlers receive their query string as a name/value map; these functions
//! pick out the recognized options and forward everything else unchanged.

use std::str::FromStr;

use crate::client::{InvalidOption, PageOptions, QueryParams, RepoListOptions, SearchOptions};
use crate::insights::{RepoFilter, RepoSortKey};

fn take<T: FromStr>(
    params: &mut QueryParams,
    name: &'static str,
) -> Result<Option<T>, InvalidOption> {
    match params.remove(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| InvalidOption { name, value: raw }),
    }
}

/// `GET /users/:username/repos?sort&direction&per_page&page&type`
pub fn repo_list_options(mut params: QueryParams) -> Result<RepoListOptions, InvalidOption> {
    Ok(RepoListOptions {
        sort: take(&mut params, "sort")?,
        direction: take(&mut params, "direction")?,
        per_page: take(&mut params, "per_page")?,
        page: take(&mut params, "page")?,
        repo_type: take(&mut params, "type")?,
        extra: params,
    })
}

/// `?per_page&page` on followers, following and collaborators.
pub fn page_options(mut params: QueryParams) -> Result<PageOptions, InvalidOption> {
    Ok(PageOptions {
        per_page: take(&mut params, "per_page")?,
        page: take(&mut params, "page")?,
        extra: params,
    })
}

/// `GET /search/users?q&sort&order&per_page&page`
///
/// Returns the search query separately; `None` when `q` is absent or blank.
pub fn search_options(
    mut params: QueryParams,
) -> Result<(Option<String>, SearchOptions), InvalidOption> {
    let query = params
        .remove("q")
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());
    let options = SearchOptions {
        sort: take(&mut params, "sort")?,
        order: take(&mut params, "order")?,
        per_page: take(&mut params, "per_page")?,
        page: take(&mut params, "page")?,
        extra: params,
    };
    Ok((query, options))
}

/// `GET /users/:username/showcase?sort_by&language&search&kind`
pub fn showcase_options(
    mut params: QueryParams,
) -> Result<(RepoFilter, RepoSortKey), InvalidOption> {
    let sort_by: RepoSortKey = take(&mut params, "sort_by")?.unwrap_or_default();
    let filter = RepoFilter {
        language: params.remove("language").filter(|v| !v.is_empty()),
        search: params.remove("search").filter(|v| !v.is_empty()),
        kind: take(&mut params, "kind")?,
    };
    Ok((filter, sort_by))
}
