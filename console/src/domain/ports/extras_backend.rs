//! Driven port for the administration backend's alias and transfer API.
//!
//! The domain owns the request and response contracts; adapters own the
//! transport, JSON field names and blob encoding on the wire.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{
    Alias, AliasId, AliasSubmission, ExtrasStatistics, Owner, Transfer, TransferId,
    TransferSubmission,
};

/// `{success, data}` envelope returned by most endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    /// Backend-reported success flag.
    pub success: bool,
    /// Payload, when present.
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    /// Envelope reporting failure without data.
    pub fn failed() -> Self {
        Self {
            success: false,
            data: None,
        }
    }

    /// Payload of a successful envelope; `None` for any other shape.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}

/// Transfer listing in either of the shapes the backend has been observed to
/// return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferListing {
    /// A bare JSON array.
    Bare(Vec<Transfer>),
    /// An envelope, possibly reporting failure.
    Enveloped(Envelope<Vec<Transfer>>),
    /// Anything else.
    Unrecognised,
}

impl TransferListing {
    /// Transfers carried by a recognised, successful shape.
    pub fn into_transfers(self) -> Option<Vec<Transfer>> {
        match self {
            Self::Bare(transfers) => Some(transfers),
            Self::Enveloped(envelope) => envelope.into_data(),
            Self::Unrecognised => None,
        }
    }
}

/// Acknowledgement returned by mutating endpoints.
///
/// Each endpoint family signals success differently, hence one predicate per
/// family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationAck {
    /// `success` flag, when present.
    pub success: Option<bool>,
    /// Identifier of the written record, when present.
    pub id: Option<i64>,
    /// Human-readable confirmation, when present.
    pub message: Option<String>,
}

impl MutationAck {
    /// Alias endpoints: require an explicit `success: true`.
    pub fn confirms_success(&self) -> bool {
        self.success == Some(true)
    }

    /// Transfer create/update: an `id`, or any `success` other than `false`.
    pub fn confirms_saved_record(&self) -> bool {
        self.id.is_some() || self.success != Some(false)
    }

    /// Transfer delete: a `message`, or any `success` other than `false`.
    pub fn confirms_removal(&self) -> bool {
        self.message.is_some() || self.success != Some(false)
    }
}

define_port_error! {
    /// Errors surfaced while calling the administration backend.
    pub enum BackendError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "backend request timed out: {message}",
        /// The backend answered with a non-success HTTP status.
        Status { status: u16, message: String } =>
            "backend answered status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "backend response decode failed: {message}",
        /// The adapter could not build the request.
        InvalidRequest { message: String } =>
            "backend request invalid: {message}",
    }
}

/// Port for the alias, owner and transfer endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtrasBackend: Send + Sync {
    /// `GET /api/extras/?ativo=true`
    async fn list_active_aliases(&self) -> Result<Envelope<Vec<Alias>>, BackendError>;

    /// `GET /api/extras/proprietarios/disponiveis`
    async fn list_available_owners(&self) -> Result<Envelope<Vec<Owner>>, BackendError>;

    /// `POST /api/extras/`
    async fn create_alias(&self, alias: &AliasSubmission) -> Result<MutationAck, BackendError>;

    /// `PUT /api/extras/{id}`
    async fn update_alias(
        &self,
        id: AliasId,
        alias: &AliasSubmission,
    ) -> Result<MutationAck, BackendError>;

    /// `DELETE /api/extras/{id}`
    async fn delete_alias(&self, id: AliasId) -> Result<MutationAck, BackendError>;

    /// `GET /api/transferencias/`
    async fn list_transfers(&self) -> Result<TransferListing, BackendError>;

    /// `POST /api/transferencias/`
    async fn create_transfer(
        &self,
        transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError>;

    /// `PUT /api/transferencias/{id}`
    async fn update_transfer(
        &self,
        id: TransferId,
        transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError>;

    /// `DELETE /api/transferencias/{id}`
    async fn delete_transfer(&self, id: TransferId) -> Result<MutationAck, BackendError>;

    /// `GET /api/extras/estatisticas`
    async fn statistics(&self) -> Result<Envelope<ExtrasStatistics>, BackendError>;
}

/// Fixture backend: empty listings and successful acknowledgements.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureExtrasBackend;

#[async_trait]
impl ExtrasBackend for FixtureExtrasBackend {
    async fn list_active_aliases(&self) -> Result<Envelope<Vec<Alias>>, BackendError> {
        Ok(Envelope::ok(Vec::new()))
    }

    async fn list_available_owners(&self) -> Result<Envelope<Vec<Owner>>, BackendError> {
        Ok(Envelope::ok(Vec::new()))
    }

    async fn create_alias(&self, _alias: &AliasSubmission) -> Result<MutationAck, BackendError> {
        Ok(success_ack())
    }

    async fn update_alias(
        &self,
        _id: AliasId,
        _alias: &AliasSubmission,
    ) -> Result<MutationAck, BackendError> {
        Ok(success_ack())
    }

    async fn delete_alias(&self, _id: AliasId) -> Result<MutationAck, BackendError> {
        Ok(success_ack())
    }

    async fn list_transfers(&self) -> Result<TransferListing, BackendError> {
        Ok(TransferListing::Bare(Vec::new()))
    }

    async fn create_transfer(
        &self,
        _transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError> {
        Ok(success_ack())
    }

    async fn update_transfer(
        &self,
        _id: TransferId,
        _transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError> {
        Ok(success_ack())
    }

    async fn delete_transfer(&self, _id: TransferId) -> Result<MutationAck, BackendError> {
        Ok(success_ack())
    }

    async fn statistics(&self) -> Result<Envelope<ExtrasStatistics>, BackendError> {
        Ok(Envelope::ok(ExtrasStatistics::default()))
    }
}

fn success_ack() -> MutationAck {
    MutationAck {
        success: Some(true),
        ..MutationAck::default()
    }
}
