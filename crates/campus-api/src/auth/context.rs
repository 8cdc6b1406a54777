// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use campus_core::{Identity, Role, UserId};
use uuid::Uuid;

/// The authenticated principal of a request.
///
/// Inserted into request extensions by the auth middleware after the gate
/// has re-resolved the identity from the credential store.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The principal, as currently stored.
    pub identity: Identity,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates a context for `identity`.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the principal's user id.
    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    /// Returns the principal's role.
    pub fn role(&self) -> Role {
        self.identity.role
    }
}
