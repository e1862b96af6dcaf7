//! HTTP surface of the API.
use actix_web::{error, web, HttpRequest};

pub use crate::payloads::INVALID_BODY;
use crate::{error::ApiError, store::Stores};

mod groups;
mod transactions;

pub const INVALID_QUERY: &str = "Parâmetros de consulta inválidos";

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err: error::JsonPayloadError, _: &HttpRequest| {
            tracing::debug!("rejected request body: {err}");
            ApiError::Validation(INVALID_BODY).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _: &HttpRequest| {
        tracing::debug!("rejected query string: {err}");
        ApiError::Validation(INVALID_QUERY).into()
    })
}

/// Registers every route along with the stores they read from.
pub fn configure(stores: Stores) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::from(stores.transactions))
            .app_data(web::Data::from(stores.groups))
            .app_data(json_config())
            .app_data(query_config())
            .service(transactions::list_transactions)
            .service(transactions::create_transaction)
            .service(transactions::delete_transaction)
            .service(groups::create_group)
            .service(groups::list_groups)
            .service(groups::get_group)
            .service(groups::update_group);
    }
}
