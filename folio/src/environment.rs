use std::time::Duration;

use folio_config::Config;
use folio_core_contact_impl::{ContactFeatureConfig, ContactFeatureServiceImpl};
use folio_extern_impl::{
    http::HttpClient,
    relay::{RelayApiServiceConfig, RelayApiServiceImpl},
};

pub type RelayApi = RelayApiServiceImpl;
pub type ContactFeature = ContactFeatureServiceImpl<RelayApi>;

/// Service configurations derived from the loaded [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    pub http_timeout: Option<Duration>,
    pub relay_api_service_config: RelayApiServiceConfig,
    pub contact_feature_config: ContactFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> Self {
        // Extern
        let http_timeout: Option<Duration> = config.relay.timeout.map(Into::into);

        let mut relay_api_service_config =
            RelayApiServiceConfig::new(Some(config.relay.endpoint.clone()));
        relay_api_service_config.inspect_response_body = config.relay.inspect_response_body;

        // Core
        let contact_feature_config = ContactFeatureConfig {
            reset_delay: config.contact.reset_delay.into(),
            subject_prefix: config.contact.subject_prefix.as_str().into(),
        };

        Self {
            http_timeout,
            relay_api_service_config,
            contact_feature_config,
        }
    }
}

/// Builds the services from a [`ConfigProvider`].
#[derive(Debug, Clone)]
pub struct Provider {
    config: ConfigProvider,
}

impl Provider {
    pub fn new(config: ConfigProvider) -> Self {
        Self { config }
    }

    pub fn relay_api(&self) -> anyhow::Result<RelayApi> {
        let http = HttpClient::new(self.config.http_timeout)?;
        Ok(RelayApiServiceImpl::new(
            self.config.relay_api_service_config.clone(),
            http,
        ))
    }

    pub fn contact_feature(&self) -> anyhow::Result<ContactFeature> {
        Ok(ContactFeatureServiceImpl::new(
            self.relay_api()?,
            self.config.contact_feature_config.clone(),
        ))
    }
}
