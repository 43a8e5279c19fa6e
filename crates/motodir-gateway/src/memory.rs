//! In-process gateway holding tables as JSON rows.
//!
//! Used by tests of the layers above the gateway. It understands the same
//! [`Query`] shapes the services send: equality filters, ordering, ranges,
//! column projection and one level of `child(*)` embedding, where child rows
//! are linked through a `<parent-singular>_id` column.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use motodir_core::{AuthUser, Session, UserMetadata};
use serde_json::{Map, Value};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::gateway::{Auth, Gateway, SignUpOutcome, SignUpRequest};
use crate::query::Query;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
    confirmed: bool,
}

/// A stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
struct Store {
    tables: BTreeMap<String, Vec<Value>>,
    blobs: BTreeMap<(String, String), StoredBlob>,
    accounts: HashMap<String, Account>,
    next_id: u64,
    denied_tables: HashSet<String>,
    failing_paths: Vec<String>,
    select_calls: Vec<(String, Query)>,
}

pub struct MemoryGateway {
    store: Mutex<Store>,
    page_size: usize,
    require_confirmation: bool,
    session: watch::Sender<Option<Session>>,
    epoch: DateTime<Utc>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            store: Mutex::new(Store::default()),
            page_size: 1000,
            require_confirmation: false,
            session,
            epoch: DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// New accounts must be confirmed before they can sign in.
    #[must_use]
    pub fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Seeds `table` with rows as-is.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.lock().tables.entry(table.to_owned()).or_default().extend(rows);
    }

    /// Every operation on `table` fails with [`GatewayError::PermissionDenied`].
    pub fn deny_table(&self, table: &str) {
        self.lock().denied_tables.insert(table.to_owned());
    }

    /// Uploads whose path contains `fragment` fail.
    pub fn fail_uploads_containing(&self, fragment: &str) {
        self.lock().failing_paths.push(fragment.to_owned());
    }

    /// Marks the account as confirmed.
    pub fn confirm(&self, email: &str) {
        if let Some(account) = self.lock().accounts.get_mut(email) {
            account.confirmed = true;
        }
    }

    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn blob(&self, bucket: &str, path: &str) -> Option<StoredBlob> {
        self.lock()
            .blobs
            .get(&(bucket.to_owned(), path.to_owned()))
            .cloned()
    }

    #[must_use]
    pub fn blob_paths(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .blobs
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Every `select_rows` call so far, in order.
    #[must_use]
    pub fn select_calls(&self) -> Vec<(String, Query)> {
        self.lock().select_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_access(store: &Store, table: &str) -> Result<(), GatewayError> {
        if store.denied_tables.contains(table) {
            return Err(GatewayError::PermissionDenied {
                message: format!("row-level security policy denies access to {table}"),
            });
        }
        Ok(())
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .all(|(column, expected)| row.get(column).and_then(text_of).as_deref() == Some(expected))
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        (x, y) => x.and_then(text_of).cmp(&y.and_then(text_of)),
    }
}

/// Splits a projection such as `"*, bike_photos(*)"` into plain columns and
/// embedded child tables.
fn parse_selection(selection: &str) -> (Vec<String>, Vec<String>) {
    let mut columns = Vec::new();
    let mut embeds = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.strip_suffix("(*)") {
            Some(child) => embeds.push(child.to_owned()),
            None => columns.push(part.to_owned()),
        }
    }
    (columns, embeds)
}

fn foreign_key(parent_table: &str) -> String {
    format!("{}_id", parent_table.strip_suffix('s').unwrap_or(parent_table))
}

#[async_trait]
impl Gateway for MemoryGateway {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn select_rows(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        let mut store = self.lock();
        store.select_calls.push((table.to_owned(), query.clone()));
        Self::check_access(&store, table)?;

        let mut rows: Vec<Value> = store
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches(r, query.filters()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.ordering() {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        let offset = query.offset().unwrap_or(0);
        let limit = query.row_limit().unwrap_or(usize::MAX);
        let rows = rows.into_iter().skip(offset).take(limit);

        let (columns, embeds) = parse_selection(query.selection().unwrap_or("*"));
        let keep_all = columns.iter().any(|c| c == "*");
        let fk = foreign_key(table);

        Ok(rows
            .map(|row| {
                let Value::Object(fields) = row else {
                    return row;
                };
                let mut out: Map<String, Value> = if keep_all {
                    fields.clone()
                } else {
                    fields
                        .iter()
                        .filter(|(k, _)| columns.iter().any(|c| c == *k))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                };
                let id = fields.get("id").and_then(text_of);
                for child in &embeds {
                    let children = store
                        .tables
                        .get(child)
                        .map(|rows| {
                            rows.iter()
                                .filter(|r| r.get(&fk).and_then(text_of) == id)
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    out.insert(child.clone(), Value::Array(children));
                }
                Value::Object(out)
            })
            .collect())
    }

    async fn insert_row(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        let mut store = self.lock();
        Self::check_access(&store, table)?;
        let Value::Object(mut fields) = row else {
            return Err(GatewayError::Api {
                status: 400,
                code: None,
                message: "row must be an object".to_owned(),
            });
        };

        store.next_id += 1;
        let id = store.next_id;
        fields.entry("id").or_insert_with(|| Value::from(id));
        let created = self.epoch + Duration::seconds(i64::try_from(id).unwrap_or(i64::MAX));
        fields
            .entry("created_at")
            .or_insert_with(|| Value::String(created.to_rfc3339()));

        let stored = Value::Object(fields);
        store
            .tables
            .entry(table.to_owned())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_rows(
        &self,
        table: &str,
        filter: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut store = self.lock();
        Self::check_access(&store, table)?;
        let Value::Object(patch) = patch else {
            return Err(GatewayError::Api {
                status: 400,
                code: None,
                message: "patch must be an object".to_owned(),
            });
        };

        let mut updated = Vec::new();
        if let Some(rows) = store.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches(r, filter.filters())) {
                if let Value::Object(fields) = row {
                    for (k, v) in &patch {
                        fields.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete_rows(&self, table: &str, filter: &Query) -> Result<(), GatewayError> {
        let mut store = self.lock();
        Self::check_access(&store, table)?;
        if let Some(rows) = store.tables.get_mut(table) {
            rows.retain(|r| !matches(r, filter.filters()));
        }
        Ok(())
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let mut store = self.lock();
        if store.failing_paths.iter().any(|f| path.contains(f.as_str())) {
            return Err(GatewayError::Api {
                status: 500,
                code: None,
                message: format!("upload of {path} failed"),
            });
        }
        store.blobs.insert(
            (bucket.to_owned(), path.to_owned()),
            StoredBlob {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(format!("memory://{bucket}/{path}"))
    }
}

#[async_trait]
impl Auth for MemoryGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let account = self
            .lock()
            .accounts
            .get(email)
            .filter(|a| a.password == password)
            .cloned()
            .ok_or(GatewayError::InvalidCredentials)?;
        if !account.confirmed {
            return Err(GatewayError::EmailNotConfirmed);
        }
        let session = Session {
            access_token: format!("token-{}", account.user.id),
            refresh_token: None,
            expires_in: Some(3600),
            user: account.user,
        };
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, GatewayError> {
        let user = {
            let mut store = self.lock();
            if store.accounts.contains_key(&request.email) {
                return Err(GatewayError::Api {
                    status: 422,
                    code: Some("user_already_exists".to_owned()),
                    message: "User already registered".to_owned(),
                });
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: Some(request.email.clone()),
                user_metadata: UserMetadata {
                    full_name: Some(request.full_name.clone()),
                    phone: request.phone.clone(),
                },
            };
            store.accounts.insert(
                request.email.clone(),
                Account {
                    password: request.password.clone(),
                    user: user.clone(),
                    confirmed: !self.require_confirmation,
                },
            );
            user
        };

        if self.require_confirmation {
            return Ok(SignUpOutcome::ConfirmationRequired(user));
        }
        let session = self.sign_in(&request.email, &request.password).await?;
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.session.send_replace(None);
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
