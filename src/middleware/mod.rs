/*
 * Responsibility
 * - Router-level layers, outermost first:
 *   http → security_headers → cors → access gate → routes
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
