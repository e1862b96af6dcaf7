use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    error::ApiError,
    payloads::{from_object, Object, TransactionListQuery, TransactionNew},
    store::TransactionStore,
};

#[get("/transacoes")]
pub async fn list_transactions(
    store: web::Data<dyn TransactionStore>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, ApiError> {
    let filter = TransactionListQuery::from_pairs(&query).into_filter();
    let transactions = store
        .list_transactions(&filter)
        .await
        .map_err(ApiError::store("Erro ao buscar transações"))?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[post("/transacoes")]
pub async fn create_transaction(
    store: web::Data<dyn TransactionStore>,
    json: web::Json<Object>,
) -> Result<HttpResponse, ApiError> {
    let new = from_object::<TransactionNew>(json.into_inner())?.validate()?;
    let transaction = store
        .create_transaction(new)
        .await
        .map_err(ApiError::store("Erro ao criar transação"))?;
    tracing::info!("created transaction {}", transaction.id);
    Ok(HttpResponse::Created().json(transaction))
}

#[delete("/transacoes/{id}")]
pub async fn delete_transaction(
    store: web::Data<dyn TransactionStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    if id.trim().is_empty() {
        return Err(ApiError::Validation("ID da transação é obrigatório"));
    }

    store
        .delete_transaction(&id)
        .await
        .map_err(ApiError::store("Erro ao excluir transação"))?;
    tracing::info!("deleted transaction {id}");
    Ok(HttpResponse::NoContent().finish())
}
