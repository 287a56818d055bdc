//! Paged listing of every dataset identifier on the hub.
//!
//! The hub's `/api/datasets` endpoint returns one page per request and
//! advertises the next page through an RFC 8288 `Link` header. Pages are
//! fetched only when the iterator runs dry, so a consumer that stops early
//! never pays for the rest of the listing.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::debug;

use crate::error::DataScoutError;

/// One page of the listing and the URL of the page after it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingPage {
    pub ids: Vec<String>,
    pub next: Option<String>,
}

/// Source of listing pages, keyed by page URL.
pub trait PageSource {
    fn fetch_page(&mut self, url: &str) -> Result<ListingPage, DataScoutError>;
}

/// Pages fetched from the hub over HTTP.
pub struct HttpPages {
    agent: ureq::Agent,
}

impl HttpPages {
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl PageSource for HttpPages {
    fn fetch_page(&mut self, url: &str) -> Result<ListingPage, DataScoutError> {
        let listing_error = |message: String| DataScoutError::HubListing {
            url: url.to_string(),
            message,
        };

        let mut response = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .call()
            .map_err(|source| listing_error(source.to_string()))?;

        let next = response
            .headers()
            .get("link")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_link);

        let body = response
            .body_mut()
            .read_json::<Value>()
            .map_err(|source| listing_error(source.to_string()))?;

        let ids = extract_dataset_ids(&body)
            .ok_or_else(|| listing_error("expected a JSON array of datasets".to_string()))?;

        Ok(ListingPage { ids, next })
    }
}

/// Iterator over dataset identifiers in registry order.
///
/// A failed page ends the listing after its error is yielded.
pub struct DatasetListing<P = HttpPages> {
    pages: P,
    next_url: Option<String>,
    page: VecDeque<String>,
}

impl<P: PageSource> DatasetListing<P> {
    pub fn new(pages: P, first_page_url: String) -> Self {
        Self {
            pages,
            next_url: Some(first_page_url),
            page: VecDeque::new(),
        }
    }
}

impl<P: PageSource> Iterator for DatasetListing<P> {
    type Item = Result<String, DataScoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.page.pop_front() {
                return Some(Ok(id));
            }

            let url = self.next_url.take()?;
            match self.pages.fetch_page(&url) {
                Ok(ListingPage { ids, next }) => {
                    debug!(url, count = ids.len(), has_next = next.is_some(), "fetched listing page");
                    self.page.extend(ids);
                    self.next_url = next;
                }
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

/// Extract the `rel="next"` target from a `Link` header value.
fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .map(str::to_string)
    })
}

fn extract_dataset_ids(body: &Value) -> Option<Vec<String>> {
    let items = body.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
    )
}
