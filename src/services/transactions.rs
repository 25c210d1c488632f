// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed wrappers over the transaction endpoints.

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    PagedResponse, Transaction, TransactionRequest, TransactionSummary, TransactionType,
};

/// Filter and paging parameters for the transaction list endpoint. Unset
/// fields are omitted from the query string entirely.
#[derive(Debug, Default, Clone)]
pub struct TransactionQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub r#type: Option<TransactionType>,
    pub category_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TransactionQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        if let Some(t) = self.r#type {
            pairs.push(("type".to_string(), t.as_str().to_string()));
        }
        if let Some(cat) = &self.category_id {
            pairs.push(("categoryId".to_string(), cat.clone()));
        }
        if let Some(d) = self.start_date {
            pairs.push(("startDate".to_string(), d.to_string()));
        }
        if let Some(d) = self.end_date {
            pairs.push(("endDate".to_string(), d.to_string()));
        }
        pairs
    }
}

pub fn list(
    client: &ApiClient,
    query: &TransactionQuery,
) -> Result<PagedResponse<Transaction>, ApiError> {
    client.get_json("/transactions", query.to_query_pairs())
}

pub fn recent(client: &ApiClient) -> Result<Vec<Transaction>, ApiError> {
    client.get_json("/transactions/recent", Vec::new())
}

pub fn summary(
    client: &ApiClient,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<TransactionSummary, ApiError> {
    let mut pairs = Vec::new();
    if let Some(d) = start_date {
        pairs.push(("startDate".to_string(), d.to_string()));
    }
    if let Some(d) = end_date {
        pairs.push(("endDate".to_string(), d.to_string()));
    }
    client.get_json("/transactions/summary", pairs)
}

pub fn get(client: &ApiClient, id: &str) -> Result<Transaction, ApiError> {
    client.get_json(&format!("/transactions/{}", id), Vec::new())
}

pub fn create(client: &ApiClient, req: &TransactionRequest) -> Result<Transaction, ApiError> {
    client.post_json("/transactions", req)
}

pub fn update(
    client: &ApiClient,
    id: &str,
    req: &TransactionRequest,
) -> Result<Transaction, ApiError> {
    client.put_json(&format!("/transactions/{}", id), req)
}

pub fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/transactions/{}", id))
}
