pub mod auth;
pub mod boards;
pub mod health;

use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthMiddleware, CredentialStore, SessionTokenAuthority};
use crate::store::Store;

/// Registers the API under whatever scope the caller mounts it on.
///
/// `/auth/*` is public; every other route sits behind `AuthMiddleware`.
pub fn config(
    cfg: &mut web::ServiceConfig,
    store: Arc<dyn Store>,
    authority: Arc<SessionTokenAuthority>,
) {
    cfg.app_data(web::Data::new(CredentialStore::new(store.clone())))
        .app_data(web::Data::from(store))
        .app_data(web::Data::from(authority.clone()))
        .service(
            web::scope("/auth")
                .service(auth::signup)
                .service(auth::signin),
        )
        .service(
            web::scope("")
                .wrap(AuthMiddleware::new(authority))
                .service(boards::list_boards)
                .service(boards::create_board)
                .service(boards::get_board)
                .service(boards::create_status)
                .service(boards::create_task)
                .service(boards::create_subtask)
                .service(boards::update_entity)
                .service(boards::delete_entity),
        );
}
