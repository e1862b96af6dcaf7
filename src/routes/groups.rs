use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    error::ApiError,
    payloads::{from_object, GroupEdit, GroupNew, Object},
    store::GroupStore,
};

const GROUP_NOT_FOUND: &str = "Grupo não encontrado";
const UPDATE_FAILED: &str = "Erro ao atualizar grupo";

#[post("/grupos")]
pub async fn create_group(
    store: web::Data<dyn GroupStore>,
    json: web::Json<Object>,
) -> Result<HttpResponse, ApiError> {
    let new = from_object::<GroupNew>(json.into_inner())?.validate()?;
    let group = store
        .create_group(new)
        .await
        .map_err(ApiError::store("Erro ao criar grupo"))?;
    tracing::info!("created group {}", group.id);
    Ok(HttpResponse::Created().json(group))
}

#[get("/grupos")]
pub async fn list_groups(store: web::Data<dyn GroupStore>) -> Result<HttpResponse, ApiError> {
    let groups = store
        .list_groups()
        .await
        .map_err(ApiError::store("Erro ao listar grupos"))?;
    Ok(HttpResponse::Ok().json(groups))
}

#[get("/grupos/{id}")]
pub async fn get_group(
    store: web::Data<dyn GroupStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    match store
        .get_group(&id)
        .await
        .map_err(ApiError::store("Erro ao buscar grupo"))?
    {
        Some(group) => Ok(HttpResponse::Ok().json(group)),
        None => Err(ApiError::NotFound(GROUP_NOT_FOUND)),
    }
}

#[put("/grupos/{id}")]
pub async fn update_group(
    store: web::Data<dyn GroupStore>,
    id: web::Path<String>,
    json: web::Json<Object>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let edit = from_object::<GroupEdit>(json.into_inner())?;

    let existing = store
        .get_group(&id)
        .await
        .map_err(ApiError::store(UPDATE_FAILED))?;
    if existing.is_none() {
        return Err(ApiError::NotFound(GROUP_NOT_FOUND));
    }

    let update = edit.into_update();
    if !update.is_empty() {
        let updated = store
            .update_group(&id, update)
            .await
            .map_err(ApiError::store(UPDATE_FAILED))?;
        if !updated {
            return Err(ApiError::NotFound(GROUP_NOT_FOUND));
        }
        tracing::info!("updated group {id}");
    }

    match store
        .get_group(&id)
        .await
        .map_err(ApiError::store(UPDATE_FAILED))?
    {
        Some(group) => Ok(HttpResponse::Ok().json(group)),
        None => Err(ApiError::NotFound(GROUP_NOT_FOUND)),
    }
}
