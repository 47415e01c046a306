//! Product management handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;
use url::Url;

use emporium_core::{Bucket, CategoryId, Price, ProductId, SlugTable};

use crate::db::{CategoryRepository, ProductFields, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Category, Product};
use crate::state::AppState;
use crate::uploads::{ImageChoice, MultipartForm, resolve_image};

use super::{AdminLayout, resolve_slug, save_message, upload_message};

const SECTION: &str = "/admin/products";

/// Product form values as typed, echoed back when the form is rejected.
#[derive(Debug, Clone, Default)]
pub struct ProductFormValues {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub discount_price: String,
    pub stock: String,
    pub category_id: String,
    pub external_url: String,
    pub image_url: String,
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            discount_price: product
                .discount_price
                .map(|d| d.to_string())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            category_id: product
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            external_url: product.external_url.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }
}

impl From<&MultipartForm> for ProductFormValues {
    fn from(form: &MultipartForm) -> Self {
        Self {
            title: form.text("title").to_owned(),
            slug: form.text("slug").to_owned(),
            description: form.text("description").to_owned(),
            price: form.text("price").to_owned(),
            discount_price: form.text("discount_price").to_owned(),
            stock: form.text("stock").to_owned(),
            category_id: form.text("category_id").to_owned(),
            external_url: form.text("external_url").to_owned(),
            image_url: form.text("image_url").to_owned(),
        }
    }
}

/// Validated product values, before slug and image are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub external_url: Option<String>,
}

impl ProductFormValues {
    /// Validate the typed values.
    ///
    /// # Errors
    ///
    /// Returns a message for the first invalid field.
    pub fn validate(&self) -> std::result::Result<ProductInput, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_owned());
        }

        let price =
            Price::parse_amount(&self.price).map_err(|e| format!("Price: {e}"))?;

        let discount_price = match self.discount_price.trim() {
            "" => None,
            raw => Some(Price::parse_amount(raw).map_err(|e| format!("Discount price: {e}"))?),
        };
        if discount_price.is_some_and(|discount| discount >= price) {
            return Err("Discount price must be lower than the price".to_owned());
        }

        let stock = match self.stock.trim() {
            "" => 0,
            raw => raw
                .parse::<i32>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| "Stock must be a whole number of zero or more".to_owned())?,
        };

        let category_id = match self.category_id.trim() {
            "" => None,
            raw => Some(
                raw.parse::<CategoryId>()
                    .map_err(|_| "Unknown category".to_owned())?,
            ),
        };

        let external_url = match self.external_url.trim() {
            "" => None,
            raw => {
                let url = Url::parse(raw).map_err(|_| "External URL is not valid".to_owned())?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err("External URL must start with http:// or https://".to_owned());
                }
                Some(url.to_string())
            }
        };

        Ok(ProductInput {
            title: title.to_owned(),
            description: self.description.trim().to_owned(),
            price,
            discount_price,
            stock,
            category_id,
            external_url,
        })
    }
}

/// Category choice in the product form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: i32,
    pub title: String,
    pub selected: bool,
}

fn category_options(categories: &[Category], selected: &str) -> Vec<CategoryOption> {
    categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id.as_i32(),
            title: c.title.clone(),
            selected: c.id.to_string() == selected.trim(),
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin: AdminLayout,
    pub products: Vec<Product>,
}

/// Product editor template, used for both new and edit.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub admin: AdminLayout,
    pub action: String,
    pub is_edit: bool,
    pub values: ProductFormValues,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

/// Render the editor with the categories loaded.
async fn render_form(
    state: &AppState,
    admin: AdminLayout,
    id: Option<ProductId>,
    values: ProductFormValues,
    error: Option<String>,
) -> Result<Response> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    let action = id.map_or_else(|| SECTION.to_owned(), |id| format!("{SECTION}/{id}"));

    Ok(ProductFormTemplate {
        admin,
        action,
        is_edit: id.is_some(),
        categories: category_options(&categories, &values.category_id),
        values,
        error,
    }
    .into_response())
}

/// Read, validate and resolve a submitted product form.
///
/// On rejection returns the values to echo and the message.
async fn read_fields(
    state: &AppState,
    multipart: Multipart,
    id: Option<ProductId>,
) -> std::result::Result<(ProductFields, ImageChoice), (ProductFormValues, String)> {
    let form = MultipartForm::read(multipart)
        .await
        .map_err(|e| (ProductFormValues::default(), upload_message(&e)))?;
    let values = ProductFormValues::from(&form);

    let input = match values.validate() {
        Ok(input) => input,
        Err(message) => return Err((values, message)),
    };

    let slug = match resolve_slug(state, SlugTable::Products, &form, id.map(|id| id.as_i32())).await
    {
        Ok(slug) => slug,
        Err(message) => return Err((values, message)),
    };

    let image = match resolve_image(state.supabase(), Bucket::ProductImages, &form).await {
        Ok(image) => image,
        Err(e) => return Err((values, upload_message(&e))),
    };

    let fields = ProductFields {
        title: input.title,
        slug: slug.into_inner(),
        description: input.description,
        image_url: image.url.clone(),
        external_url: input.external_url,
        category_id: input.category_id,
        price: input.price,
        discount_price: input.discount_price,
        stock: input.stock,
    };
    Ok((fields, image))
}

// =============================================================================
// Routes
// =============================================================================

/// List every product.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).search(None).await?;

    Ok(ProductsIndexTemplate {
        admin: AdminLayout::new(&user, SECTION),
        products,
    })
}

/// Display an empty product form.
#[instrument(skip(state, user))]
pub async fn new_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let values = ProductFormValues {
        stock: "0".to_owned(),
        ..ProductFormValues::default()
    };
    render_form(&state, AdminLayout::new(&user, SECTION), None, values, None).await
}

/// Create a product.
#[instrument(skip(state, user, multipart))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let admin = AdminLayout::new(&user, SECTION);

    let (fields, image) = match read_fields(&state, multipart, None).await {
        Ok(read) => read,
        Err((values, message)) => return render_form(&state, admin, None, values, Some(message)).await,
    };

    let saved = ProductRepository::new(state.pool()).create(&fields).await;
    if saved.is_err() {
        image.discard(state.supabase(), Bucket::ProductImages).await;
    }

    match saved {
        Ok(product) => {
            tracing::info!(product_id = %product.id, slug = %product.slug, admin = %user.email, "Product created");
            Ok(Redirect::to(SECTION).into_response())
        }
        Err(e) => {
            let message = save_message(&e);
            render_form(&state, admin, None, values_of(&fields), Some(message)).await
        }
    }
}

/// Display the form for an existing product.
#[instrument(skip(state, user))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    render_form(
        &state,
        AdminLayout::new(&user, SECTION),
        Some(id),
        ProductFormValues::from(&product),
        None,
    )
    .await
}

/// Update a product.
#[instrument(skip(state, user, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let admin = AdminLayout::new(&user, SECTION);

    let (fields, image) = match read_fields(&state, multipart, Some(id)).await {
        Ok(read) => read,
        Err((values, message)) => {
            return render_form(&state, admin, Some(id), values, Some(message)).await;
        }
    };

    let saved = ProductRepository::new(state.pool()).update(id, &fields).await;
    if saved.is_err() {
        image.discard(state.supabase(), Bucket::ProductImages).await;
    }

    match saved {
        Ok(product) => {
            tracing::info!(product_id = %product.id, admin = %user.email, "Product updated");
            Ok(Redirect::to(SECTION).into_response())
        }
        Err(crate::db::RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("product {id}")))
        }
        Err(e) => {
            let message = save_message(&e);
            render_form(&state, admin, Some(id), values_of(&fields), Some(message)).await
        }
    }
}

/// Delete a product.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, admin = %user.email, "Product deleted");
    Ok(Redirect::to(SECTION))
}

/// Form values for resolved fields, shown when the save itself fails.
fn values_of(fields: &ProductFields) -> ProductFormValues {
    ProductFormValues {
        title: fields.title.clone(),
        slug: fields.slug.clone(),
        description: fields.description.clone(),
        price: fields.price.to_string(),
        discount_price: fields
            .discount_price
            .map(|d| d.to_string())
            .unwrap_or_default(),
        stock: fields.stock.to_string(),
        category_id: fields
            .category_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        external_url: fields.external_url.clone().unwrap_or_default(),
        image_url: fields.image_url.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn values() -> ProductFormValues {
        ProductFormValues {
            title: "Oolong".into(),
            price: "$12.50".into(),
            stock: "3".into(),
            ..ProductFormValues::default()
        }
    }

    #[test]
    fn test_minimal_product_is_valid() {
        let input = values().validate().unwrap();
        assert_eq!(input.price, Decimal::new(1250, 2));
        assert_eq!(input.stock, 3);
        assert_eq!(input.discount_price, None);
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn test_discount_must_be_lower() {
        let form = ProductFormValues {
            discount_price: "12.50".into(),
            ..values()
        };
        assert!(form.validate().unwrap_err().contains("lower"));

        let form = ProductFormValues {
            discount_price: "9.99".into(),
            ..values()
        };
        assert_eq!(form.validate().unwrap().discount_price, Some(Decimal::new(999, 2)));
    }

    #[test]
    fn test_rejects_bad_numbers_and_urls() {
        let form = ProductFormValues {
            stock: "-1".into(),
            ..values()
        };
        assert!(form.validate().unwrap_err().starts_with("Stock"));

        let form = ProductFormValues {
            price: "free".into(),
            ..values()
        };
        assert!(form.validate().unwrap_err().starts_with("Price"));

        let form = ProductFormValues {
            external_url: "javascript:alert(1)".into(),
            ..values()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_round_trips_product_values() {
        let form = ProductFormValues {
            category_id: "4".into(),
            external_url: "https://example.com/tea".into(),
            ..values()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.category_id, Some(CategoryId::new(4)));
        assert_eq!(input.external_url.as_deref(), Some("https://example.com/tea"));
    }
}
