//! Product catalogue

use super::models::{NewProduct, Product};
use super::now;
use crate::{Error, Result};
use sqlx::SqlitePool;

const PRODUCT_COLUMNS: &str = "id, name, description, details, catalogue_info, created_at, updated_at";

pub async fn list_products(pool: &SqlitePool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products ORDER BY id",
        PRODUCT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn get_product(pool: &SqlitePool, id: i64) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products WHERE id = ?",
        PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Name and description are required; the free-text extras may be empty
pub async fn create_product(pool: &SqlitePool, new: &NewProduct) -> Result<Product> {
    let name = new.name.trim();
    let description = new.description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(Error::InvalidInput(
            "Name and description are required".to_string(),
        ));
    }

    let stamp = now();
    let result = sqlx::query(
        r#"
        INSERT INTO products (name, description, details, catalogue_info, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(&new.details)
    .bind(&new.catalogue_info)
    .bind(stamp)
    .bind(stamp)
    .execute(pool)
    .await?;

    Ok(Product {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        description: description.to_string(),
        details: Some(new.details.clone()),
        catalogue_info: Some(new.catalogue_info.clone()),
        created_at: stamp,
        updated_at: stamp,
    })
}

/// Remove a product, returning it when it existed
pub async fn delete_product(pool: &SqlitePool, id: i64) -> Result<Option<Product>> {
    let Some(product) = get_product(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(Some(product))
}

pub async fn count_products(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn test_create_list_delete_product() {
        let pool = init_memory_database().await.unwrap();
        let new = NewProduct {
            name: "  Widget ".into(),
            description: "A widget".into(),
            ..Default::default()
        };

        let product = create_product(&pool, &new).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(list_products(&pool).await.unwrap().len(), 1);

        let removed = delete_product(&pool, product.id).await.unwrap().unwrap();
        assert_eq!(removed.name, "Widget");
        assert!(delete_product(&pool, product.id).await.unwrap().is_none());
        assert_eq!(count_products(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_product_requires_name_and_description() {
        let pool = init_memory_database().await.unwrap();
        let new = NewProduct {
            name: "Widget".into(),
            description: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            create_product(&pool, &new).await,
            Err(Error::InvalidInput(_))
        ));
    }
}
