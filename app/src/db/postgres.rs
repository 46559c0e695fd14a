// storefront_app/src/db/postgres.rs

//! PostgreSQL `ProductStore`. Each product is one row whose `doc` column holds
//! the full JSON document, SKUs embedded in `doc.skuDetails`.
//!
//! Every operation is a single SQL statement, so concurrent writers to the same
//! product are serialized by the row lock instead of racing in the service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
use sqlx::types::Json;
use sqlx::QueryBuilder;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use storefront_catalog::query::{Condition, SortOrder, SortSpec};
use storefront_catalog::{
  CatalogError, CatalogResult, Criteria, ListOptions, ListedProduct, Product, ProductId, ProductStore, Sku, SkuId,
  WriteAck,
};

const SCHEMA: [&str; 3] = [
  "CREATE TABLE IF NOT EXISTS products (\
     id UUID PRIMARY KEY, \
     doc JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL, \
     updated_at TIMESTAMPTZ NOT NULL)",
  "CREATE INDEX IF NOT EXISTS products_category_idx ON products ((doc ->> 'category'))",
  "CREATE INDEX IF NOT EXISTS products_doc_idx ON products USING GIN (doc jsonb_path_ops)",
];

/// Listing projection: the stored document minus `imageDetails`,
/// `feedbackDetails.info` and every `skuDetails[].licenceKeys`, SKU order kept.
const LISTED_DOC: &str = "(doc - 'imageDetails') \
  || jsonb_build_object('feedbackDetails', COALESCE(doc -> 'feedbackDetails', '{}'::jsonb) - 'info') \
  || jsonb_build_object('skuDetails', COALESCE(\
       (SELECT jsonb_agg(sku - 'licenceKeys' ORDER BY ord) \
        FROM jsonb_array_elements(COALESCE(doc -> 'skuDetails', '[]'::jsonb)) WITH ORDINALITY AS skus(sku, ord)), \
       '[]'::jsonb))";

#[derive(Clone, Debug)]
pub struct PgProductStore {
  pool: PgPool,
}

impl PgProductStore {
  /// Opens a pool and makes sure the `products` table exists.
  #[instrument(name = "pg_store::connect", skip(database_url), err(Display))]
  pub async fn connect(database_url: &str, max_connections: u32) -> CatalogResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await
      .map_err(store_error)?;
    let store = Self::from_pool(pool);
    store.ensure_schema().await?;
    info!("Connected to PostgreSQL record store.");
    Ok(store)
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn ensure_schema(&self) -> CatalogResult<()> {
    for statement in SCHEMA {
      sqlx::query(statement).execute(&self.pool).await.map_err(store_error)?;
    }
    Ok(())
  }

  async fn execute_ack(&self, mut builder: QueryBuilder<'_, Postgres>) -> CatalogResult<WriteAck> {
    let (matched, modified) = builder
      .build_query_as::<(i64, i64)>()
      .fetch_one(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(WriteAck::new(matched.max(0) as u64, modified.max(0) as u64))
  }

  async fn fetch_page(
    &self,
    criteria: &Criteria,
    options: &ListOptions,
  ) -> Result<Vec<ListedProduct>, sqlx::Error> {
    let mut builder = page_query(criteria, options);
    let rows = builder
      .build_query_scalar::<Json<ListedProduct>>()
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(|Json(listed)| listed).collect())
  }

  async fn fetch_count(&self, criteria: &Criteria) -> Result<i64, sqlx::Error> {
    let mut builder = count_query(criteria);
    let total = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
    Ok(total)
  }
}

/// Search tokens are validated with the `regex` crate, but `~*` speaks POSIX
/// ARE. When the server rejects a pattern, the search is rerun as plain text.
fn literal_retry(criteria: &Criteria, err: &sqlx::Error) -> Option<Criteria> {
  if is_invalid_regex(err) && criteria.has_patterns() {
    warn!(error = %err, "Search pattern rejected by PostgreSQL; matching it literally.");
    return Some(criteria.with_literal_patterns());
  }
  None
}

/// SQLSTATE for a regular expression the server cannot compile.
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

/// Only connectivity failures count as the store being unavailable. Anything
/// the server rejected or returned in a bad shape is an internal error.
fn store_error(err: sqlx::Error) -> CatalogError {
  let unreachable = matches!(
    err,
    sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Protocol(_)
  );
  if unreachable {
    error!(error = %err, "PostgreSQL record store unreachable.");
    return CatalogError::store_unavailable(err);
  }
  if matches!(err, sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) {
    error!(error = %err, "Stored product document could not be decoded.");
    return CatalogError::Internal(format!("Stored product document is malformed: {}", err));
  }
  error!(error = %err, "PostgreSQL query failed.");
  CatalogError::Internal(format!("Record store query failed: {}", err))
}

fn is_invalid_regex(err: &sqlx::Error) -> bool {
  match err {
    sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(INVALID_REGULAR_EXPRESSION),
    _ => false,
  }
}

/// `skuDetails.price` -> `$."skuDetails"."price"` followed by `suffix`.
fn json_path(field: &str, suffix: &str) -> String {
  let mut path = String::from("$");
  for segment in field.split('.') {
    path.push_str(".\"");
    for ch in segment.chars() {
      if ch == '"' || ch == '\\' {
        path.push('\\');
      }
      path.push(ch);
    }
    path.push('"');
  }
  path.push_str(suffix);
  path
}

/// Fields backed by real columns sort on the column.
fn sort_column(field: &str) -> Option<&'static str> {
  match field {
    "id" => Some("id"),
    "createdAt" => Some("created_at"),
    "updatedAt" => Some("updated_at"),
    _ => None,
  }
}

fn push_criteria(builder: &mut QueryBuilder<'_, Postgres>, criteria: &Criteria) {
  let mut separated = " WHERE ";
  for (field, condition) in criteria.iter() {
    builder.push(separated);
    separated = " AND ";
    match condition {
      Condition::Equals(Value::Null) => {
        // A missing field counts as null.
        builder.push("(NOT jsonb_path_exists(doc, ");
        builder.push_bind(json_path(field, ""));
        builder.push("::jsonpath) OR jsonb_path_exists(doc, ");
        builder.push_bind(json_path(field, " ? (@ == null)"));
        builder.push("::jsonpath))");
      }
      Condition::Equals(value) => {
        // Lax mode unwraps arrays, so any element may match.
        builder.push("jsonb_path_exists(doc, ");
        builder.push_bind(json_path(field, " ? (@ == $v)"));
        builder.push("::jsonpath, jsonb_build_object('v', ");
        builder.push_bind(Json(value.clone()));
        builder.push("::jsonb))");
      }
      Condition::Matches(pattern) => {
        builder.push("EXISTS (SELECT 1 FROM jsonb_path_query(doc, ");
        builder.push_bind(json_path(field, "[*]"));
        builder.push(
          "::jsonpath) AS candidate(v) WHERE jsonb_typeof(candidate.v) = 'string' AND candidate.v #>> '{}' ~* ",
        );
        builder.push_bind(pattern.as_str().to_string());
        builder.push(")");
      }
    }
  }
}

fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, sort: &SortSpec) {
  builder.push(" ORDER BY ");
  for key in sort.keys() {
    match sort_column(&key.field) {
      Some(column) => {
        builder.push(column);
      }
      None => {
        // Lax mode walks into arrays; the first value found is the sort key.
        builder.push("jsonb_path_query_first(doc, ");
        builder.push_bind(json_path(&key.field, ""));
        builder.push("::jsonpath)");
      }
    }
    builder.push(match key.order {
      SortOrder::Ascending => " ASC NULLS FIRST, ",
      SortOrder::Descending => " DESC NULLS LAST, ",
    });
  }
  // Insertion order among ties.
  builder.push("id ASC");
}

fn page_query<'a>(criteria: &Criteria, options: &ListOptions) -> QueryBuilder<'a, Postgres> {
  let (skip, limit) = options.window();
  let mut builder = QueryBuilder::new("SELECT ");
  builder.push(LISTED_DOC);
  builder.push(" AS listed FROM products");
  push_criteria(&mut builder, criteria);
  push_order_by(&mut builder, &options.sort);
  builder.push(" OFFSET ");
  builder.push_bind(i64::try_from(skip).unwrap_or(i64::MAX));
  builder.push(" LIMIT ");
  builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
  builder
}

fn count_query<'a>(criteria: &Criteria) -> QueryBuilder<'a, Postgres> {
  let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
  push_criteria(&mut builder, criteria);
  builder
}

/// Rewrites one product document and reports matched/modified counts.
///
/// `new_doc` pushes an expression over `t.doc` (the locked current document).
/// When `sku_id` is given the product only matches if it embeds that SKU.
fn acknowledged_update<'a, F>(
  id: ProductId,
  sku_id: Option<SkuId>,
  now: DateTime<Utc>,
  new_doc: F,
) -> QueryBuilder<'a, Postgres>
where
  F: FnOnce(&mut QueryBuilder<'a, Postgres>),
{
  let mut builder = QueryBuilder::new("WITH target AS (SELECT id, doc FROM products WHERE id = ");
  builder.push_bind(Uuid::from(id));
  if let Some(sku_id) = sku_id {
    builder.push(
      " AND EXISTS (SELECT 1 FROM jsonb_array_elements(COALESCE(doc -> 'skuDetails', '[]'::jsonb)) AS sku \
       WHERE sku ->> 'id' = ",
    );
    builder.push_bind(sku_id.to_string());
    builder.push(")");
  }
  builder.push(" FOR UPDATE), changed AS (SELECT t.id, ");
  new_doc(&mut builder);
  builder.push(" AS doc FROM target t), updated AS (UPDATE products p SET doc = c.doc || jsonb_build_object('updatedAt', ");
  builder.push_bind(Json(now));
  builder.push("::jsonb), updated_at = ");
  builder.push_bind(now);
  builder.push(
    " FROM changed c JOIN target t ON t.id = c.id WHERE p.id = c.id AND c.doc IS DISTINCT FROM t.doc RETURNING p.id) \
     SELECT (SELECT COUNT(*) FROM target) AS matched, (SELECT COUNT(*) FROM updated) AS modified",
  );
  builder
}

fn set_fields_query<'a>(id: ProductId, fields: Map<String, Value>, now: DateTime<Utc>) -> QueryBuilder<'a, Postgres> {
  acknowledged_update(id, None, now, |b| {
    b.push("t.doc || ");
    b.push_bind(Json(Value::Object(fields)));
    b.push("::jsonb");
  })
}

fn set_sku_fields_query<'a>(
  id: ProductId,
  sku_id: SkuId,
  fields: Map<String, Value>,
  now: DateTime<Utc>,
) -> QueryBuilder<'a, Postgres> {
  acknowledged_update(id, Some(sku_id), now, move |b| {
    b.push("jsonb_set(t.doc, '{skuDetails}', (SELECT jsonb_agg(CASE WHEN sku ->> 'id' = ");
    b.push_bind(sku_id.to_string());
    b.push(" THEN sku || ");
    b.push_bind(Json(Value::Object(fields)));
    b.push(
      "::jsonb ELSE sku END ORDER BY ord) \
       FROM jsonb_array_elements(t.doc -> 'skuDetails') WITH ORDINALITY AS skus(sku, ord)))",
    );
  })
}

fn pull_skus_query<'a>(id: ProductId, sku_ids: &[SkuId], now: DateTime<Utc>) -> QueryBuilder<'a, Postgres> {
  let ids: Vec<String> = sku_ids.iter().map(ToString::to_string).collect();
  acknowledged_update(id, None, now, |b| {
    b.push(
      "jsonb_set(t.doc, '{skuDetails}', COALESCE((SELECT jsonb_agg(sku ORDER BY ord) \
       FROM jsonb_array_elements(COALESCE(t.doc -> 'skuDetails', '[]'::jsonb)) WITH ORDINALITY AS skus(sku, ord) \
       WHERE NOT (sku ->> 'id' = ANY(",
    );
    b.push_bind(ids);
    b.push("::text[]))), '[]'::jsonb))");
  })
}

fn clear_skus_query<'a>(id: ProductId, now: DateTime<Utc>) -> QueryBuilder<'a, Postgres> {
  acknowledged_update(id, None, now, |b| {
    b.push("jsonb_set(t.doc, '{skuDetails}', '[]'::jsonb)");
  })
}

fn push_skus_query<'a>(id: ProductId, skus: Vec<Sku>, now: DateTime<Utc>) -> QueryBuilder<'a, Postgres> {
  let mut builder = QueryBuilder::new(
    "UPDATE products SET doc = jsonb_set(doc, '{skuDetails}', COALESCE(doc -> 'skuDetails', '[]'::jsonb) || ",
  );
  builder.push_bind(Json(skus));
  builder.push("::jsonb) || jsonb_build_object('updatedAt', ");
  builder.push_bind(Json(now));
  builder.push("::jsonb), updated_at = ");
  builder.push_bind(now);
  builder.push(" WHERE id = ");
  builder.push_bind(Uuid::from(id));
  builder.push(" RETURNING doc");
  builder
}

#[async_trait]
impl ProductStore for PgProductStore {
  #[instrument(name = "pg_store::insert", skip_all, fields(product_id = %product.id), err(Display))]
  async fn insert(&self, product: Product) -> CatalogResult<Product> {
    sqlx::query("INSERT INTO products (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4)")
      .bind(Uuid::from(product.id))
      .bind(Json(&product))
      .bind(product.created_at)
      .bind(product.updated_at)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(product)
  }

  #[instrument(name = "pg_store::find_by_id", skip(self), err(Display))]
  async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>> {
    let row: Option<Json<Product>> = sqlx::query_scalar("SELECT doc FROM products WHERE id = $1")
      .bind(Uuid::from(id))
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(|Json(product)| product))
  }

  #[instrument(name = "pg_store::find_page", skip_all, fields(num_criteria = criteria.len()), err(Display))]
  async fn find_page(&self, criteria: &Criteria, options: &ListOptions) -> CatalogResult<Vec<ListedProduct>> {
    match self.fetch_page(criteria, options).await {
      Err(err) => match literal_retry(criteria, &err) {
        Some(literal) => self.fetch_page(&literal, options).await.map_err(store_error),
        None => Err(store_error(err)),
      },
      ok => ok.map_err(store_error),
    }
  }

  #[instrument(name = "pg_store::count", skip_all, err(Display))]
  async fn count(&self, criteria: &Criteria) -> CatalogResult<u64> {
    let total = match self.fetch_count(criteria).await {
      Err(err) => match literal_retry(criteria, &err) {
        Some(literal) => self.fetch_count(&literal).await.map_err(store_error)?,
        None => return Err(store_error(err)),
      },
      Ok(total) => total,
    };
    Ok(total.max(0) as u64)
  }

  #[instrument(name = "pg_store::set_fields", skip(self, fields), fields(num_fields = fields.len()), err(Display))]
  async fn set_fields(&self, id: ProductId, fields: Map<String, Value>) -> CatalogResult<WriteAck> {
    self.execute_ack(set_fields_query(id, fields, Utc::now())).await
  }

  #[instrument(name = "pg_store::remove", skip(self), err(Display))]
  async fn remove(&self, id: ProductId) -> CatalogResult<Option<Product>> {
    let row: Option<Json<Product>> = sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING doc")
      .bind(Uuid::from(id))
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(|Json(product)| product))
  }

  #[instrument(name = "pg_store::push_skus", skip(self, skus), fields(num_skus = skus.len()), err(Display))]
  async fn push_skus(&self, id: ProductId, skus: Vec<Sku>) -> CatalogResult<Option<Product>> {
    let mut builder = push_skus_query(id, skus, Utc::now());
    let row = builder
      .build_query_scalar::<Json<Product>>()
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(|Json(product)| product))
  }

  #[instrument(name = "pg_store::set_sku_fields", skip(self, fields), err(Display))]
  async fn set_sku_fields(
    &self,
    id: ProductId,
    sku_id: SkuId,
    fields: Map<String, Value>,
  ) -> CatalogResult<WriteAck> {
    self.execute_ack(set_sku_fields_query(id, sku_id, fields, Utc::now())).await
  }

  #[instrument(name = "pg_store::pull_skus", skip(self, sku_ids), fields(num_ids = sku_ids.len()), err(Display))]
  async fn pull_skus(&self, id: ProductId, sku_ids: &[SkuId]) -> CatalogResult<WriteAck> {
    self.execute_ack(pull_skus_query(id, sku_ids, Utc::now())).await
  }

  #[instrument(name = "pg_store::clear_skus", skip(self), err(Display))]
  async fn clear_skus(&self, id: ProductId) -> CatalogResult<WriteAck> {
    self.execute_ack(clear_skus_query(id, Utc::now())).await
  }

  async fn ping(&self) -> CatalogResult<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await.map_err(store_error)?;
    Ok(())
  }
}
