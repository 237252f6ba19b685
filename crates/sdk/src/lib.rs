// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Xpyun SDK - Client library for the Xpyun cloud printer open API
//!
//! This crate provides a signed request dispatcher, typed payloads for every
//! remote operation, and domain services for printer management, printing,
//! queries and voice announcements.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No retries; every call issues exactly one request
//! - Configuration loading is opt-in ([`ClientConfig::from_env`])

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod format;
pub mod services;
pub mod signing;
pub mod transport;
pub mod types;

pub use client::{Client, SyncClient};
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use error::{Result, XpyunError};
pub use format::{LabelData, ReceiptData, ReceiptItem};
pub use services::{PrintService, PrinterManager, QueryService, VoiceService};
pub use signing::sign;
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::*;
