/*
 * Responsibility
 * - The request-scoped identity context handlers can see
 * - The access gate builds it and puts it in request extensions; handlers only receive this type
 *
 * Notes
 * - Token verification and the role check live in middleware/services
 * - One value per request; never shared across requests
 */

use crate::services::auth::Identity;

/// Identity bound to a single request.
///
/// - `Anonymous`: public route (any presented token was ignored)
/// - `Authenticated`: token verified by the access gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestIdentity {
    Anonymous,
    Authenticated(Identity),
}

impl RequestIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            RequestIdentity::Anonymous => None,
            RequestIdentity::Authenticated(identity) => Some(identity),
        }
    }
}
