/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: request-id / trace / limit / timeout
 * - session: session gate の適用
 */
pub mod http;
pub mod session;
