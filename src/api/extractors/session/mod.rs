/*!
 * Session extractors
 *
 * Responsibility:
 * - gate が request extensions に入れた RequestContext を handler に渡す
 * - 型 (RequestContext / User) は gate / services 側で定義し、ここは axum 依存だけ
 *
 * Public API:
 * - Session      : RequestContext そのもの (未認証でも取れる)
 * - CurrentUser  : 認証済み User (無ければ 401)
 */

mod core;

pub use core::{CurrentUser, Session};
