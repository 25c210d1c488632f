// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod http;
pub mod models;
pub mod services;
pub mod utils;
pub mod commands;
