use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use tracing::debug;

use crate::error::DataScoutError;

use super::{DatasetRef, Split};

/// Revision holding the hub's automatic parquet conversion of a dataset.
pub const PARQUET_CONVERSION_REVISION: &str = "refs/convert/parquet";

/// File access to one dataset repository at a given revision.
///
/// `None` stands for the repository's default revision.
pub trait RepoFiles {
    /// Every file path in the repository.
    fn list(&self, revision: Option<&str>) -> Result<Vec<String>, DataScoutError>;
    /// Download one file and return its local path.
    fn fetch(&self, revision: Option<&str>, path: &str) -> Result<PathBuf, DataScoutError>;
}

/// [`RepoFiles`] over the hub's sync API and download cache.
struct HubRepoFiles<'a> {
    api: &'a Api,
    repo_id: &'a str,
}

impl RepoFiles for HubRepoFiles<'_> {
    fn list(&self, revision: Option<&str>) -> Result<Vec<String>, DataScoutError> {
        let info = api_repo(self.api, self.repo_id, revision)
            .info()
            .map_err(|source| DataScoutError::HubApi {
                repo_id: self.repo_id.to_string(),
                message: source.to_string(),
            })?;

        Ok(info
            .siblings
            .into_iter()
            .map(|sibling| sibling.rfilename)
            .collect())
    }

    fn fetch(&self, revision: Option<&str>, path: &str) -> Result<PathBuf, DataScoutError> {
        api_repo(self.api, self.repo_id, revision)
            .get(path)
            .map_err(|source| DataScoutError::HubApi {
                repo_id: self.repo_id.to_string(),
                message: format!("failed downloading '{}': {}", path, source),
            })
    }
}

/// Download every parquet shard of `split` and return the local paths in
/// read order.
pub fn acquire_split_shards(
    api: &Api,
    repo_ref: &DatasetRef,
    split: Split,
) -> Result<Vec<PathBuf>, DataScoutError> {
    let files = HubRepoFiles {
        api,
        repo_id: &repo_ref.repo_id,
    };
    fetch_split_shards(&files, repo_ref, split)
}

/// Locate and download the shards of `split` through `files`.
///
/// Shards are looked up on the requested revision first. When none match
/// and no explicit revision was given, the hub's parquet conversion branch
/// is tried before giving up.
pub fn fetch_split_shards(
    files: &dyn RepoFiles,
    repo_ref: &DatasetRef,
    split: Split,
) -> Result<Vec<PathBuf>, DataScoutError> {
    let revision = repo_ref.revision.as_deref();
    let siblings = files.list(revision)?;

    if let Some(shards) = select_split_shards(&siblings, split) {
        return download_shards(files, revision, &repo_ref.repo_id, &shards);
    }
    let mut available = available_splits(&siblings);

    if revision.is_none() {
        debug!(
            repo_id = %repo_ref.repo_id,
            split = %split,
            "no parquet shards on the default revision, trying {PARQUET_CONVERSION_REVISION}"
        );
        let converted = Some(PARQUET_CONVERSION_REVISION);
        match files.list(converted) {
            Ok(converted_siblings) => {
                if let Some(shards) = select_split_shards(&converted_siblings, split) {
                    return download_shards(files, converted, &repo_ref.repo_id, &shards);
                }
                available.extend(available_splits(&converted_siblings));
            }
            Err(error) => debug!(repo_id = %repo_ref.repo_id, %error, "no parquet conversion"),
        }
    }

    Err(DataScoutError::SplitNotFound {
        repo_id: repo_ref.repo_id.clone(),
        split: split.to_string(),
        available: if available.is_empty() {
            "none".to_string()
        } else {
            available.into_iter().collect::<Vec<_>>().join(", ")
        },
    })
}

fn api_repo(api: &Api, repo_id: &str, revision: Option<&str>) -> ApiRepo {
    match revision {
        Some(revision) => api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Dataset,
            revision.to_string(),
        )),
        None => api.dataset(repo_id.to_string()),
    }
}

fn download_shards(
    files: &dyn RepoFiles,
    revision: Option<&str>,
    repo_id: &str,
    shards: &[String],
) -> Result<Vec<PathBuf>, DataScoutError> {
    shards
        .iter()
        .map(|remote_path| {
            debug!(
                repo_id,
                revision = revision.unwrap_or("default"),
                remote_path = %remote_path,
                "fetching shard"
            );
            files.fetch(revision, remote_path)
        })
        .collect()
}

/// Pick the parquet shards that make up `split`, sorted by path.
///
/// Shards are grouped by parent directory so that two configs of the same
/// dataset are never mixed; a `default` config wins, otherwise the first
/// directory in path order.
fn select_split_shards(paths: &[String], split: Split) -> Option<Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for path in paths.iter().filter(|path| is_parquet_shard(path)) {
        if infer_split_from_parquet_path(path).as_deref() != Some(split.as_str()) {
            continue;
        }
        let parent = Path::new(path)
            .parent()
            .map(|parent| parent.to_string_lossy().to_string())
            .unwrap_or_default();
        groups.entry(parent).or_default().push(path.clone());
    }

    let chosen = groups
        .keys()
        .find(|parent| parent.split('/').any(|component| component == "default"))
        .or_else(|| groups.keys().next())
        .cloned()?;
    if groups.len() > 1 {
        let skipped: Vec<&str> = groups
            .keys()
            .filter(|parent| **parent != chosen)
            .map(String::as_str)
            .collect();
        debug!(split = %split, chosen = %chosen, ?skipped, "several configs hold this split");
    }

    let mut shards = groups.remove(&chosen)?;
    shards.sort();
    Some(shards)
}

fn available_splits(paths: &[String]) -> BTreeSet<String> {
    paths
        .iter()
        .filter(|path| is_parquet_shard(path))
        .filter_map(|path| infer_split_from_parquet_path(path))
        .collect()
}

fn is_parquet_shard(path: &str) -> bool {
    path.ends_with(".parquet") && !path.ends_with("metadata.parquet")
}

fn infer_split_from_parquet_path(path: &str) -> Option<String> {
    let parsed = Path::new(path);
    let file_name = parsed
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_ascii_lowercase());

    if let Some(file_name) = file_name {
        if let Some((prefix, _)) = file_name.split_once('-') {
            if let Some(normalized) = normalize_split_name(prefix) {
                return Some(normalized.to_string());
            }
        }
        if let Some(stem) = file_name.strip_suffix(".parquet") {
            if let Some(normalized) = normalize_split_name(stem) {
                return Some(normalized.to_string());
            }
        }
    }

    for component in parsed.components().rev().skip(1) {
        let Some(name) = component.as_os_str().to_str() else {
            continue;
        };
        if let Some(normalized) = normalize_split_name(name) {
            return Some(normalized.to_string());
        }
    }

    None
}

fn normalize_split_name(name: &str) -> Option<&'static str> {
    let lowered = name.to_ascii_lowercase();
    // Large datasets are converted partially into `partial-<split>` dirs.
    let name = lowered.strip_prefix("partial-").unwrap_or(&lowered);
    match name {
        "train" => Some("train"),
        "test" => Some("test"),
        "validation" | "valid" | "val" => Some("validation"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    /// Repository whose file list is fixed per revision. Revisions that are
    /// not registered fail to list, like a missing branch on the hub.
    #[derive(Default)]
    struct FakeRepo {
        revisions: HashMap<String, Vec<String>>,
        listed: RefCell<Vec<String>>,
        fetched: RefCell<Vec<String>>,
    }

    impl FakeRepo {
        fn revision(mut self, revision: &str, files: &[&str]) -> Self {
            self.revisions.insert(revision.to_string(), paths(files));
            self
        }
    }

    impl RepoFiles for FakeRepo {
        fn list(&self, revision: Option<&str>) -> Result<Vec<String>, DataScoutError> {
            let revision = revision.unwrap_or("main");
            self.listed.borrow_mut().push(revision.to_string());
            self.revisions
                .get(revision)
                .cloned()
                .ok_or_else(|| DataScoutError::HubApi {
                    repo_id: "org/ds".to_string(),
                    message: format!("revision '{revision}' not found"),
                })
        }

        fn fetch(&self, revision: Option<&str>, path: &str) -> Result<PathBuf, DataScoutError> {
            let local = format!("{}/{}", revision.unwrap_or("main"), path);
            self.fetched.borrow_mut().push(local.clone());
            Ok(PathBuf::from("/cache").join(local))
        }
    }

    fn dataset(revision: Option<&str>) -> DatasetRef {
        DatasetRef {
            repo_id: "org/ds".to_string(),
            revision: revision.map(str::to_string),
        }
    }

    #[test]
    fn shards_on_main_revision_skip_the_conversion_branch() {
        let repo = FakeRepo::default()
            .revision("main", &["data/train-00000-of-00001.parquet"])
            .revision(PARQUET_CONVERSION_REVISION, &["default/train/0000.parquet"]);

        let shards = fetch_split_shards(&repo, &dataset(None), Split::Train).expect("shards");
        assert_eq!(
            shards,
            [PathBuf::from("/cache/main/data/train-00000-of-00001.parquet")]
        );
        assert_eq!(*repo.listed.borrow(), ["main"]);
    }

    #[test]
    fn conversion_branch_is_used_when_main_has_no_shards() {
        let repo = FakeRepo::default()
            .revision("main", &["README.md", "imdb.py"])
            .revision(
                PARQUET_CONVERSION_REVISION,
                &["plain_text/test/0001.parquet", "plain_text/test/0000.parquet"],
            );

        let shards = fetch_split_shards(&repo, &dataset(None), Split::Test).expect("shards");
        assert_eq!(shards.len(), 2);
        assert_eq!(
            *repo.fetched.borrow(),
            [
                "refs/convert/parquet/plain_text/test/0000.parquet",
                "refs/convert/parquet/plain_text/test/0001.parquet"
            ]
        );
    }

    #[test]
    fn missing_split_lists_splits_from_both_revisions() {
        let repo = FakeRepo::default()
            .revision("main", &["data/train-00000-of-00001.parquet"])
            .revision(PARQUET_CONVERSION_REVISION, &["default/test/0000.parquet"]);

        match fetch_split_shards(&repo, &dataset(None), Split::Validation) {
            Err(DataScoutError::SplitNotFound { split, available, .. }) => {
                assert_eq!(split, "validation");
                assert_eq!(available, "test, train");
            }
            other => panic!("expected SplitNotFound, got {other:?}"),
        }
        assert!(repo.fetched.borrow().is_empty());
    }

    #[test]
    fn missing_conversion_branch_still_reports_split_not_found() {
        let repo = FakeRepo::default().revision("main", &["README.md"]);

        match fetch_split_shards(&repo, &dataset(None), Split::Train) {
            Err(DataScoutError::SplitNotFound { available, .. }) => assert_eq!(available, "none"),
            other => panic!("expected SplitNotFound, got {other:?}"),
        }
        assert_eq!(*repo.listed.borrow(), ["main", PARQUET_CONVERSION_REVISION]);
    }

    #[test]
    fn explicit_revision_never_falls_back() {
        let repo = FakeRepo::default()
            .revision("v1.0", &["README.md"])
            .revision(PARQUET_CONVERSION_REVISION, &["default/train/0000.parquet"]);

        let err = fetch_split_shards(&repo, &dataset(Some("v1.0")), Split::Train)
            .expect_err("should fail");
        assert!(matches!(err, DataScoutError::SplitNotFound { .. }));
        assert_eq!(*repo.listed.borrow(), ["v1.0"]);
    }

    #[test]
    fn listing_failure_on_main_is_an_error() {
        let repo = FakeRepo::default();
        let err = fetch_split_shards(&repo, &dataset(None), Split::Train).expect_err("should fail");
        assert!(matches!(err, DataScoutError::HubApi { .. }));
    }

    #[test]
    fn infer_split_from_filename_prefix_and_dirs() {
        assert_eq!(
            infer_split_from_parquet_path("data/train-00000-of-00003.parquet").as_deref(),
            Some("train")
        );
        assert_eq!(
            infer_split_from_parquet_path("plain_text/test/0000.parquet").as_deref(),
            Some("test")
        );
        assert_eq!(
            infer_split_from_parquet_path("default/partial-validation/0000.parquet").as_deref(),
            Some("validation")
        );
        assert_eq!(infer_split_from_parquet_path("data/unsupervised.parquet"), None);
    }

    #[test]
    fn shard_selection_collects_all_shards_of_split() {
        let files = paths(&[
            "README.md",
            "data/train-00001-of-00002.parquet",
            "data/test-00000-of-00001.parquet",
            "data/train-00000-of-00002.parquet",
        ]);

        let shards = select_split_shards(&files, Split::Train).expect("selection");
        assert_eq!(
            shards,
            paths(&[
                "data/train-00000-of-00002.parquet",
                "data/train-00001-of-00002.parquet"
            ])
        );
    }

    #[test]
    fn shard_selection_prefers_default_config() {
        let files = paths(&[
            "alpha/test/0000.parquet",
            "default/test/0000.parquet",
            "default/test/0001.parquet",
        ]);

        let shards = select_split_shards(&files, Split::Test).expect("selection");
        assert_eq!(
            shards,
            paths(&["default/test/0000.parquet", "default/test/0001.parquet"])
        );
    }

    #[test]
    fn shard_selection_stays_in_first_config_dir() {
        let files = paths(&[
            "plain_text/train/0000.parquet",
            "zz_other/train/0000.parquet",
        ]);

        let shards = select_split_shards(&files, Split::Train).expect("selection");
        assert_eq!(shards, paths(&["plain_text/train/0000.parquet"]));
    }

    #[test]
    fn missing_split_yields_none_and_reports_available() {
        let files = paths(&[
            "data/train-00000-of-00001.parquet",
            "data/metadata.parquet",
            "data/valid-00000-of-00001.parquet",
        ]);

        assert!(select_split_shards(&files, Split::Test).is_none());
        assert_eq!(
            available_splits(&files),
            BTreeSet::from(["train".to_string(), "validation".to_string()])
        );
    }
}
