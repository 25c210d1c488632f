// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed wrappers over the category endpoints.

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{Category, CategoryRequest};

pub fn list(client: &ApiClient) -> Result<Vec<Category>, ApiError> {
    client.get_json("/categories", Vec::new())
}

pub fn roots(client: &ApiClient) -> Result<Vec<Category>, ApiError> {
    client.get_json("/categories/root", Vec::new())
}

pub fn children(client: &ApiClient, parent_id: &str) -> Result<Vec<Category>, ApiError> {
    client.get_json(&format!("/categories/{}/children", parent_id), Vec::new())
}

pub fn get(client: &ApiClient, id: &str) -> Result<Category, ApiError> {
    client.get_json(&format!("/categories/{}", id), Vec::new())
}

pub fn create(client: &ApiClient, req: &CategoryRequest) -> Result<Category, ApiError> {
    client.post_json("/categories", req)
}

pub fn update(client: &ApiClient, id: &str, req: &CategoryRequest) -> Result<Category, ApiError> {
    client.put_json(&format!("/categories/{}", id), req)
}

pub fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/categories/{}", id))
}
