/*
 * Responsibility
 * - Public interface of the middleware layers
 *   - auth: bearer token authentication + route authorization
 *   - http: request id, access trace, body limit, timeout
 *   - security_headers: default response headers
 */
pub mod auth;
pub mod http;
pub mod security_headers;
