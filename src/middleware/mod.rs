/*
 * Responsibility
 * - Public surface of the middleware layer
 * - auth: the bearer-token gate; the rest are cross-cutting HTTP layers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
