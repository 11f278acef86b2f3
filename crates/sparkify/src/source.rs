// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Input discovery and newline-delimited JSON scans.
//!
//! A pattern such as `song_data/*/*/*/*.json` is split into its literal
//! prefix (`song_data`) and the remaining glob. Only the prefix is
//! listed in the object store; each listed object is kept when its path
//! below the prefix matches the glob. `*` never crosses a `/`, so the
//! directory depth is part of the contract.

use crate::Result;
use crate::error::EtlError;
use crate::location::Location;
use arrow::datatypes::Schema;
use datafusion::datasource::listing::ListingTableUrl;
use datafusion::prelude::{DataFrame, NdJsonReadOptions, SessionContext};
use diagnostics::*;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use std::collections::{BTreeSet, HashSet};
use wax::{Glob, Pattern};

const JSON_EXTENSION: &str = ".json";

/// Objects under a pattern's literal prefix, and the ones the glob kept.
struct Listing {
    /// `scheme://bucket` without the trailing slash
    base: String,
    /// Listing prefix inside the store
    prefix: String,
    /// Every listed object, store-relative
    listed: Vec<String>,
    /// Matching objects, store-relative and sorted
    matched: Vec<String>,
}

impl Listing {
    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }
}

async fn list_matching(ctx: &SessionContext, root: &Location, pattern: &str) -> Result<Listing> {
    let (literal, glob) = Glob::new(pattern)
        .map_err(|e| EtlError::Pattern(format!("{pattern}: {e}")))?
        .partition();

    let table_url = ListingTableUrl::parse(root.as_str())?;
    let store_url = table_url.object_store();
    let store = ctx.runtime_env().object_store(&store_url)?;

    let literal = literal.to_string_lossy().replace('\\', "/");
    let list_prefix = join_prefix(table_url.prefix().as_ref(), &literal);
    debug!("Listing {prefix} in {store} for {glob}", prefix: list_prefix.as_str(), store: store_url.as_str(), glob: pattern);

    let listing_prefix = ObjectPath::from(list_prefix.as_str());
    let listed: Vec<String> = store
        .list(Some(&listing_prefix))
        .map_ok(|meta| meta.location.to_string())
        .try_collect()
        .await?;

    let mut matched: Vec<String> = listed
        .iter()
        .filter(|full| {
            let relative = if list_prefix.is_empty() {
                Some(full.as_str())
            } else {
                full.strip_prefix(list_prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
            };
            relative.is_some_and(|relative| glob.is_match(relative))
        })
        .cloned()
        .collect();
    matched.sort();

    if matched.is_empty() {
        return Err(EtlError::NoInputFiles {
            location: root.to_string(),
            pattern: pattern.to_string(),
        });
    }

    let count = matched.len();
    info!("Found {count} files matching {pattern} under {root}", count: count, pattern: pattern, root: root.as_str());

    let base = store_url.as_str();
    Ok(Listing {
        base: base.strip_suffix('/').unwrap_or(base).to_string(),
        prefix: list_prefix,
        listed,
        matched,
    })
}

/// List every object under `root` matching `pattern`, as absolute URLs.
///
/// The result is sorted so repeated runs scan files in the same order.
pub async fn discover(ctx: &SessionContext, root: &Location, pattern: &str) -> Result<Vec<String>> {
    let listing = list_matching(ctx, root, pattern).await?;
    Ok(listing.matched.iter().map(|path| listing.url(path)).collect())
}

/// URLs to hand to the scan for every file matching `pattern`.
///
/// A directory whose `.json` objects are all matched direct children is
/// scanned as a directory, costing one LIST instead of one HEAD per
/// file. Any other matched file is passed by its own URL.
pub async fn scan_urls(ctx: &SessionContext, root: &Location, pattern: &str) -> Result<Vec<String>> {
    let listing = list_matching(ctx, root, pattern).await?;
    let paths = scan_paths(&listing.prefix, &listing.listed, &listing.matched, JSON_EXTENSION);
    let dirs = paths.iter().filter(|p| p.ends_with('/')).count();
    let files = paths.len() - dirs;
    debug!("Scanning {dirs} directories and {files} single files", dirs: dirs, files: files);
    Ok(paths.iter().map(|path| listing.url(path)).collect())
}

/// Scan all files matching `pattern` under `root` as JSON lines decoded
/// with `schema`. Keys not present in the schema are ignored.
pub async fn read_ndjson(
    ctx: &SessionContext,
    root: &Location,
    pattern: &str,
    schema: &Schema,
) -> Result<DataFrame> {
    let urls = scan_urls(ctx, root, pattern).await?;
    let options = NdJsonReadOptions::default()
        .schema(schema)
        .file_extension(JSON_EXTENSION);
    Ok(ctx.read_json(urls, options).await?)
}

/// Collapse `matched` into directory paths (ending in `/`) where that
/// reads exactly the same objects, keeping the rest as file paths.
///
/// A directory qualifies when it lies strictly below `scope` and no
/// listed `extension` object below it, at any depth, is anything but a
/// matched direct child.
fn scan_paths(scope: &str, listed: &[String], matched: &[String], extension: &str) -> Vec<String> {
    let wanted: HashSet<&str> = matched.iter().map(String::as_str).collect();
    let mut dirty: HashSet<&str> = HashSet::new();
    for path in listed.iter().filter(|p| p.ends_with(extension)) {
        let dir = parent(path);
        let skip = usize::from(wanted.contains(path.as_str()));
        dirty.extend(ancestors(dir).skip(skip));
    }

    let mut paths = BTreeSet::new();
    for path in matched {
        let dir = parent(path);
        let in_scope = if scope.is_empty() {
            !dir.is_empty()
        } else {
            dir.strip_prefix(scope).is_some_and(|rest| rest.starts_with('/'))
        };
        if in_scope && path.ends_with(extension) && !dirty.contains(dir) {
            paths.insert(format!("{dir}/"));
        } else {
            paths.insert(path.clone());
        }
    }
    paths.into_iter().collect()
}

fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// `dir` and each directory above it, nearest first.
fn ancestors(dir: &str) -> impl Iterator<Item = &str> {
    std::iter::successors((!dir.is_empty()).then_some(dir), |&d| {
        d.rsplit_once('/').map(|(up, _)| up)
    })
}

fn join_prefix(root: &str, literal: &str) -> String {
    let root = root.trim_matches('/');
    let literal = literal.trim_matches('/');
    match (root.is_empty(), literal.is_empty()) {
        (true, _) => literal.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{literal}"),
    }
}
