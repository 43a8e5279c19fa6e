//! Capability traits for the hosted backend.
//!
//! [`Gateway`] covers tables and blob storage, [`Auth`] covers sessions. Both
//! speak raw JSON rows at the required-method level; the provided methods
//! layer typed decoding and the fetch-all loop on top.

use async_trait::async_trait;
use motodir_core::{AuthUser, RecordId, Session};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::query::Query;

/// Safety cap on pages requested by a single fetch-all.
pub const MAX_PAGES: usize = 500;

pub(crate) fn decode<T: DeserializeOwned>(context: &str, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

pub(crate) fn encode<T: Serialize + ?Sized>(
    context: &str,
    value: &T,
) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Rows requested per page by [`Gateway::fetch_all`].
    fn page_size(&self) -> usize;

    async fn select_rows(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError>;

    /// Inserts one row and returns it as stored.
    async fn insert_row(&self, table: &str, row: Value) -> Result<Value, GatewayError>;

    /// Applies `patch` to every row matching `filter` and returns the updated rows.
    async fn update_rows(
        &self,
        table: &str,
        filter: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError>;

    async fn delete_rows(&self, table: &str, filter: &Query) -> Result<(), GatewayError>;

    /// Stores `bytes` at `path` inside `bucket` and returns its public address.
    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError>;

    /// Reads every row of `table` in pages of [`Gateway::page_size`].
    ///
    /// Stops at the first page shorter than the page size. All-or-nothing: a
    /// failing page discards the rows already read.
    ///
    /// # Errors
    ///
    /// Propagates any page error, returns [`GatewayError::PaginationLimit`]
    /// after [`MAX_PAGES`] pages and [`GatewayError::Deserialize`] when a row
    /// does not decode into `T`.
    async fn fetch_all<T>(&self, table: &str, query: &Query) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let page_size = self.page_size().max(1);
        let mut rows: Vec<Value> = Vec::new();
        let mut page = 0usize;

        loop {
            if page >= MAX_PAGES {
                return Err(GatewayError::PaginationLimit {
                    table: table.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }
            let offset = page * page_size;
            page += 1;

            let batch = self
                .select_rows(table, &query.clone().range(offset, page_size))
                .await?;
            let batch_len = batch.len();
            tracing::debug!(table, offset, batch_len, "fetched page");
            rows.extend(batch);

            if batch_len < page_size {
                break;
            }
        }

        rows.into_iter().map(|row| decode(table, row)).collect()
    }

    /// First row matching `query`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns any backend error or [`GatewayError::Deserialize`].
    async fn fetch_one<T>(&self, table: &str, query: &Query) -> Result<Option<T>, GatewayError>
    where
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let rows = self.select_rows(table, &query.clone().limit(1)).await?;
        rows.into_iter()
            .next()
            .map(|row| decode(table, row))
            .transpose()
    }

    /// All rows matching `query` in a single request.
    ///
    /// # Errors
    ///
    /// Returns any backend error or [`GatewayError::Deserialize`].
    async fn fetch_many<T>(&self, table: &str, query: &Query) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let rows = self.select_rows(table, query).await?;
        rows.into_iter().map(|row| decode(table, row)).collect()
    }

    /// # Errors
    ///
    /// Returns any backend error or [`GatewayError::Deserialize`].
    async fn insert<R, T>(&self, table: &str, record: &R) -> Result<T, GatewayError>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let row = encode(table, record)?;
        let stored = self.insert_row(table, row).await?;
        decode(table, stored)
    }

    /// Applies `patch` to every row matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns any backend error or [`GatewayError::Deserialize`].
    async fn update_where<P, T>(
        &self,
        table: &str,
        filter: &Query,
        patch: &P,
    ) -> Result<Vec<T>, GatewayError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let patch = encode(table, patch)?;
        let updated = self.update_rows(table, filter, patch).await?;
        updated.into_iter().map(|row| decode(table, row)).collect()
    }

    /// Updates the row with `id` and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when no row has that id, plus any
    /// backend or decoding error.
    async fn update<P, T>(&self, table: &str, id: &RecordId, patch: &P) -> Result<T, GatewayError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let filter = Query::new().eq("id", id);
        self.update_where(table, &filter, patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound {
                context: format!("{table} id={id}"),
            })
    }

    /// # Errors
    ///
    /// Returns any backend error.
    async fn delete(&self, table: &str, id: &RecordId) -> Result<(), GatewayError>
    where
        Self: Sized,
    {
        self.delete_rows(table, &Query::new().eq("id", id)).await
    }
}

/// Sign-up payload. `full_name` and `phone` are stored as user metadata.
#[derive(Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The backend opened a session straight away.
    SignedIn(Session),
    /// The account exists but the e-mail address must be confirmed first.
    ConfirmationRequired(AuthUser),
}

impl SignUpOutcome {
    #[must_use]
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpOutcome::SignedIn(session) => &session.user,
            SignUpOutcome::ConfirmationRequired(user) => user,
        }
    }
}

#[async_trait]
pub trait Auth: Send + Sync {
    /// # Errors
    ///
    /// [`GatewayError::InvalidCredentials`] or [`GatewayError::EmailNotConfirmed`]
    /// for rejected logins, plus transport errors.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    /// # Errors
    ///
    /// Returns any backend error.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, GatewayError>;

    /// Ends the session. The local session is cleared even if the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns any backend error.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    fn current_session(&self) -> Option<Session>;

    /// Receives every session change, starting with the current one.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    fn current_user(&self) -> Option<AuthUser> {
        self.current_session().map(|s| s.user)
    }
}
