//! Defines the endpoints for listing, creating, updating and deleting categories.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error, SharedLedger,
    category::{Category, CategoryPatch, NewCategory},
    database_id::CategoryId,
};

/// A route handler for listing all categories.
pub async fn get_categories_endpoint(
    State(ledger): State<SharedLedger>,
) -> Result<Json<Vec<Category>>, Error> {
    ledger.lock()?.store().categories().map(Json)
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(ledger): State<SharedLedger>,
    Json(new_category): Json<NewCategory>,
) -> Result<Json<Category>, Error> {
    ledger
        .lock()?
        .create_category(&new_category)
        .map(Json)
        .inspect_err(|error| {
            tracing::warn!("Could not create category with {new_category:?}: {error}")
        })
}

/// A route handler for updating a category with the fields set in the body.
pub async fn edit_category_endpoint(
    State(ledger): State<SharedLedger>,
    Path(category_id): Path<CategoryId>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>, Error> {
    ledger
        .lock()?
        .update_category(category_id, &patch)
        .map(Json)
        .inspect_err(|error| tracing::warn!("Could not update category {category_id}: {error}"))
}

/// A route handler for deleting a category, responds with the deleted category.
///
/// Transactions in the category are not deleted.
pub async fn delete_category_endpoint(
    State(ledger): State<SharedLedger>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    ledger
        .lock()?
        .delete_category(category_id)
        .map(Json)
        .inspect_err(|error| tracing::warn!("Could not delete category {category_id}: {error}"))
}
