use percent_encoding::percent_decode_str;

use crate::error::DataScoutError;

use super::DatasetRef;

/// Parse a user-supplied dataset reference (repo ID or dataset URL).
///
/// Accepts `name`, `namespace/name`, and
/// `https://huggingface.co/datasets/<id>[/tree/<revision>]`.
pub fn parse_dataset_input(input: &str) -> Result<DatasetRef, DataScoutError> {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let (repo_id, revision) = parse_repo_id_from_url(trimmed)?;
        return Ok(DatasetRef { repo_id, revision });
    }

    Ok(DatasetRef {
        repo_id: validate_repo_id(input)?,
        revision: None,
    })
}

fn parse_repo_id_from_url(input: &str) -> Result<(String, Option<String>), DataScoutError> {
    let url = url::Url::parse(input).map_err(|source| DataScoutError::InvalidDatasetRef {
        input: input.to_string(),
        message: format!("invalid URL: {source}"),
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| DataScoutError::InvalidDatasetRef {
            input: input.to_string(),
            message: "URL is missing a host".to_string(),
        })?
        .to_ascii_lowercase();

    if host != "huggingface.co" {
        return Err(DataScoutError::InvalidDatasetRef {
            input: input.to_string(),
            message: format!("expected host 'huggingface.co', found '{}'", host),
        });
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|iter| iter.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if segments.len() < 2 || segments[0] != "datasets" {
        return Err(DataScoutError::InvalidDatasetRef {
            input: input.to_string(),
            message: "expected dataset URL like https://huggingface.co/datasets/<namespace>/<dataset>"
                .to_string(),
        });
    }

    // Legacy canonical datasets have no namespace: /datasets/<name>/tree/<rev>
    let (repo_id, rest) = if segments.len() == 2 || segments[2] == "tree" {
        (segments[1].to_string(), &segments[2..])
    } else {
        (format!("{}/{}", segments[1], segments[2]), &segments[3..])
    };
    let repo_id = validate_repo_id(&repo_id)?;

    let revision = if rest.first() == Some(&"tree") {
        parse_revision(&rest[1..])
    } else {
        None
    };

    Ok((repo_id, revision))
}

/// Revision from the segments after `/tree/`.
///
/// Branch and tag names are one (possibly `%2F`-encoded) segment and any
/// further segments are a folder inside the repo. `refs/<kind>/<name>`
/// revisions such as `refs/convert/parquet` or `refs/pr/1` span three.
fn parse_revision(segments: &[&str]) -> Option<String> {
    let decode = |segment: &str| percent_decode_str(segment).decode_utf8_lossy().into_owned();
    let first = decode(segments.first()?);

    if first == "refs" {
        Some(
            segments
                .iter()
                .take(3)
                .map(|segment| decode(segment))
                .collect::<Vec<_>>()
                .join("/"),
        )
    } else {
        Some(first)
    }
}

fn validate_repo_id(repo_id: &str) -> Result<String, DataScoutError> {
    let trimmed = repo_id.trim();
    let parts: Vec<&str> = trimmed.split('/').collect();

    let well_formed = !trimmed.is_empty()
        && parts.len() <= 2
        && parts
            .iter()
            .all(|part| !part.is_empty() && !part.chars().any(char::is_whitespace));

    if !well_formed {
        return Err(DataScoutError::InvalidDatasetRef {
            input: repo_id.to_string(),
            message: "expected dataset id in '<dataset>' or '<namespace>/<dataset>' form"
                .to_string(),
        });
    }

    Ok(trimmed.to_string())
}
