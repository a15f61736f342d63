/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the request's identity context (RequestIdentity) to handlers
 * - axum plumbing lives in core, the type itself in types
 *
 * Public API:
 * - RequestIdentity
 * - CurrentUser
 */

mod core;
mod types;

pub use core::CurrentUser;
pub use types::RequestIdentity;
