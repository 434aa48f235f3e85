//! Reqwest-backed adapter for the administration backend.
//!
//! This adapter owns transport details only: URL building, authentication,
//! timeout and HTTP error mapping, and JSON decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::dto::{
    AckDto, AliasDto, AliasWriteDto, EnvelopeDto, OwnerDto, StatisticsDto, TransferListingDto,
    TransferWriteDto,
};
use crate::domain::ports::{BackendError, Envelope, ExtrasBackend, MutationAck, TransferListing};
use crate::domain::{
    Alias, AliasId, AliasSubmission, ExtrasStatistics, Owner, TransferId, TransferSubmission,
};

const ALIASES_PATH: &str = "api/extras/";
const AVAILABLE_OWNERS_PATH: &str = "api/extras/proprietarios/disponiveis";
const STATISTICS_PATH: &str = "api/extras/estatisticas";
const TRANSFERS_PATH: &str = "api/transferencias/";

/// Backend adapter issuing JSON requests against one base URL.
#[derive(Debug, Clone)]
pub struct HttpExtrasBackend {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpExtrasBackend {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout. Endpoint paths are resolved relative to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            auth_token: None,
        })
    }

    /// Send `token` as a bearer credential on every request.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url.join(path).map_err(|error| {
            BackendError::invalid_request(format!("cannot resolve endpoint {path:?}: {error}"))
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, BackendError> {
        let body = self.execute(self.request(Method::GET, url)).await?;
        decode(&body, what)
    }

    async fn acknowledge(&self, request: RequestBuilder) -> Result<MutationAck, BackendError> {
        let body = self.execute(request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(BackendError::decode(
                "mutation acknowledgement body is empty",
            ));
        }
        decode::<AckDto>(&body, "mutation acknowledgement").map(AckDto::into_domain)
    }
}

#[async_trait]
impl ExtrasBackend for HttpExtrasBackend {
    async fn list_active_aliases(&self) -> Result<Envelope<Vec<Alias>>, BackendError> {
        let mut url = self.endpoint(ALIASES_PATH)?;
        url.set_query(Some("ativo=true"));
        let envelope: EnvelopeDto<Vec<AliasDto>> = self.get(url, "alias listing").await?;
        Ok(envelope.into_envelope(|aliases| {
            aliases.into_iter().map(AliasDto::into_domain).collect()
        }))
    }

    async fn list_available_owners(&self) -> Result<Envelope<Vec<Owner>>, BackendError> {
        let url = self.endpoint(AVAILABLE_OWNERS_PATH)?;
        let envelope: EnvelopeDto<Vec<OwnerDto>> = self.get(url, "owner listing").await?;
        Ok(envelope.into_envelope(|owners| {
            owners.into_iter().map(OwnerDto::into_domain).collect()
        }))
    }

    async fn create_alias(&self, alias: &AliasSubmission) -> Result<MutationAck, BackendError> {
        let url = self.endpoint(ALIASES_PATH)?;
        let request = self.request(Method::POST, url).json(&AliasWriteDto::from(alias));
        self.acknowledge(request).await
    }

    async fn update_alias(
        &self,
        id: AliasId,
        alias: &AliasSubmission,
    ) -> Result<MutationAck, BackendError> {
        let url = self.endpoint(&format!("{ALIASES_PATH}{id}"))?;
        let request = self.request(Method::PUT, url).json(&AliasWriteDto::from(alias));
        self.acknowledge(request).await
    }

    async fn delete_alias(&self, id: AliasId) -> Result<MutationAck, BackendError> {
        let url = self.endpoint(&format!("{ALIASES_PATH}{id}"))?;
        self.acknowledge(self.request(Method::DELETE, url)).await
    }

    async fn list_transfers(&self) -> Result<TransferListing, BackendError> {
        let url = self.endpoint(TRANSFERS_PATH)?;
        let listing: TransferListingDto = self.get(url, "transfer listing").await?;
        Ok(listing.into_domain())
    }

    async fn create_transfer(
        &self,
        transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError> {
        let url = self.endpoint(TRANSFERS_PATH)?;
        let request = self
            .request(Method::POST, url)
            .json(&TransferWriteDto::from(transfer));
        self.acknowledge(request).await
    }

    async fn update_transfer(
        &self,
        id: TransferId,
        transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError> {
        let url = self.endpoint(&format!("{TRANSFERS_PATH}{id}"))?;
        let request = self
            .request(Method::PUT, url)
            .json(&TransferWriteDto::from(transfer));
        self.acknowledge(request).await
    }

    async fn delete_transfer(&self, id: TransferId) -> Result<MutationAck, BackendError> {
        let url = self.endpoint(&format!("{TRANSFERS_PATH}{id}"))?;
        self.acknowledge(self.request(Method::DELETE, url)).await
    }

    async fn statistics(&self) -> Result<Envelope<ExtrasStatistics>, BackendError> {
        let url = self.endpoint(STATISTICS_PATH)?;
        let envelope: EnvelopeDto<StatisticsDto> = self.get(url, "statistics").await?;
        Ok(envelope.into_envelope(StatisticsDto::into_domain))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, BackendError> {
    serde_json::from_slice(body).map_err(|error| {
        BackendError::decode(format!(
            "invalid {what} payload: {error}; body: {}",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::timeout(error.to_string())
    } else {
        BackendError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        preview
    };
    BackendError::status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
#[path = "http_backend_tests.rs"]
mod tests;
