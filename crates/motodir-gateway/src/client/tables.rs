//! Table access through the REST interface.

use serde_json::Value;

use super::SupabaseGateway;
use crate::error::GatewayError;
use crate::query::Query;

impl SupabaseGateway {
    fn table_url(&self, table: &str, query: &Query) -> reqwest::Url {
        let mut url = self.endpoint(["rest", "v1", table]);
        url.query_pairs_mut().extend_pairs(query.to_pairs());
        url
    }

    /// Filter-only query string for writes: no `select`, no ordering.
    fn filter_url(&self, table: &str, filter: &Query) -> reqwest::Url {
        let mut url = self.endpoint(["rest", "v1", table]);
        {
            let mut pairs = url.query_pairs_mut();
            for (column, value) in filter.filters() {
                pairs.append_pair(column, &format!("eq.{value}"));
            }
        }
        url
    }

    pub(super) async fn select_table(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError> {
        let url = self.table_url(table, query);
        let body = self
            .send_json(self.authorize(self.client.get(url)), table)
            .await?;
        rows(table, body)
    }

    pub(super) async fn insert_table(
        &self,
        table: &str,
        row: Value,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(["rest", "v1", table]);
        let request = self
            .authorize(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&row);
        let body = self.send_json(request, table).await?;
        rows(table, body)?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound {
                context: format!("{table}: insert returned no row"),
            })
    }

    pub(super) async fn update_table(
        &self,
        table: &str,
        filter: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        let url = self.filter_url(table, filter);
        let request = self
            .authorize(self.client.patch(url))
            .header("Prefer", "return=representation")
            .json(&patch);
        let body = self.send_json(request, table).await?;
        rows(table, body)
    }

    pub(super) async fn delete_table(
        &self,
        table: &str,
        filter: &Query,
    ) -> Result<(), GatewayError> {
        if filter.filters().is_empty() {
            return Err(GatewayError::Api {
                status: 400,
                code: None,
                message: format!("refusing unfiltered delete on {table}"),
            });
        }
        let url = self.filter_url(table, filter);
        self.send_json(self.authorize(self.client.delete(url)), table)
            .await?;
        Ok(())
    }
}

/// The REST interface answers with a JSON array; an empty body means no rows.
fn rows(table: &str, body: Value) -> Result<Vec<Value>, GatewayError> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row @ Value::Object(_) => Ok(vec![row]),
        _ => Err(GatewayError::Api {
            status: 200,
            code: None,
            message: format!("unexpected response shape from {table}"),
        }),
    }
}
