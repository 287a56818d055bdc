use hf_hub::api::sync::{Api, ApiBuilder};
use tracing::info;

use crate::error::DataScoutError;
use crate::table::{parquet::read_parquet_shards, SplitTable};

use super::listing::{DatasetListing, HttpPages};
use super::{acquire, resolve, DatasetHub, DatasetIds, HubConfig, Split};

/// [`DatasetHub`] backed by the Hugging Face Hub HTTP API.
pub struct HubClient {
    api: Api,
    agent: ureq::Agent,
    listing_url: url::Url,
}

impl HubClient {
    pub fn new(config: &HubConfig) -> Result<Self, DataScoutError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let invalid_endpoint = |message: String| DataScoutError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            message,
        };

        let mut listing_url = url::Url::parse(&format!("{endpoint}/api/datasets"))
            .map_err(|source| invalid_endpoint(source.to_string()))?;
        listing_url
            .query_pairs_mut()
            .append_pair("limit", &config.page_size.to_string());

        let mut builder = ApiBuilder::new()
            .with_progress(false)
            .with_endpoint(endpoint);
        if let Some(cache_dir) = config.cache_dir.as_ref() {
            builder = builder.with_cache_dir(cache_dir.clone());
        }
        let api = builder
            .build()
            .map_err(|source| invalid_endpoint(source.to_string()))?;

        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build();
        let agent: ureq::Agent = agent_config.into();

        Ok(Self {
            api,
            agent,
            listing_url,
        })
    }
}

impl DatasetHub for HubClient {
    fn dataset_ids(&self) -> DatasetIds<'_> {
        Box::new(DatasetListing::new(
            HttpPages::new(self.agent.clone()),
            self.listing_url.to_string(),
        ))
    }

    fn load_split(&self, dataset: &str, split: Split) -> Result<SplitTable, DataScoutError> {
        let repo_ref = resolve::parse_dataset_input(dataset)?;
        let shards = acquire::acquire_split_shards(&self.api, &repo_ref, split)?;
        let table = read_parquet_shards(&shards)?;

        info!(
            repo_id = %repo_ref.repo_id,
            split = %split,
            shards = shards.len(),
            rows = table.num_rows(),
            columns = table.column_names().len(),
            "loaded split"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_carries_page_size() {
        let config = HubConfig {
            endpoint: "https://hub.example.org/".to_string(),
            page_size: 250,
            ..HubConfig::default()
        };

        let client = HubClient::new(&config).expect("client");
        assert_eq!(
            client.listing_url.as_str(),
            "https://hub.example.org/api/datasets?limit=250"
        );
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        let config = HubConfig {
            endpoint: "not a url".to_string(),
            ..HubConfig::default()
        };

        match HubClient::new(&config) {
            Err(DataScoutError::InvalidEndpoint { endpoint, .. }) => {
                assert_eq!(endpoint, "not a url");
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
