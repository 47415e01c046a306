//! Seed the database with demo content.
//!
//! Inserts a few categories, products and one published post. Slugs go
//! through the same uniqueness check as the back-office, so seeding twice
//! adds `-2` copies instead of failing.

use emporium_core::{SlugTable, UniqueSlugError, unique_slug};
use emporium_web::db::{
    BlogPostFields, BlogPostRepository, CategoryFields, CategoryRepository, ProductFields,
    ProductRepository, RepositoryError, SlugRepository,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{CommandError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Slug error: {0}")]
    Slug(#[from] UniqueSlugError<RepositoryError>),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Demo product: title, description, price in cents, discount in cents, stock.
struct DemoProduct {
    title: &'static str,
    description: &'static str,
    price_cents: i64,
    discount_cents: Option<i64>,
    stock: i32,
}

const TEA: [DemoProduct; 3] = [
    DemoProduct {
        title: "Sencha Green Tea",
        description: "Steamed Japanese green tea with a fresh, grassy cup.",
        price_cents: 1250,
        discount_cents: None,
        stock: 40,
    },
    DemoProduct {
        title: "Assam Breakfast",
        description: "Malty black tea that takes milk well.",
        price_cents: 990,
        discount_cents: Some(790),
        stock: 25,
    },
    DemoProduct {
        title: "Jasmine Pearls",
        description: "Hand-rolled green tea scented with jasmine blossoms.",
        price_cents: 1800,
        discount_cents: None,
        stock: 0,
    },
];

const TEAWARE: [DemoProduct; 2] = [
    DemoProduct {
        title: "Cast Iron Teapot",
        description: "0.8 litre teapot with an enamelled interior and infuser.",
        price_cents: 4500,
        discount_cents: None,
        stock: 8,
    },
    DemoProduct {
        title: "Glass Cup Set",
        description: "Four double-walled glass cups.",
        price_cents: 2400,
        discount_cents: Some(1900),
        stock: 15,
    },
];

const WELCOME_POST: &str = "\
We opened our doors this week with a small range of **loose-leaf tea** and teaware.

## What's in stock

- Japanese and Chinese green teas
- A breakfast blend for milk drinkers
- Teapots and cups

Orders are shipped within two working days.
";

async fn slug(pool: &PgPool, table: SlugTable, title: &str) -> Result<String, SeedError> {
    Ok(unique_slug(&SlugRepository::new(pool), table, title, None)
        .await?
        .into_inner())
}

async fn seed_category(
    pool: &PgPool,
    title: &str,
    description: &str,
    products: &[DemoProduct],
) -> Result<(), SeedError> {
    let category = CategoryRepository::new(pool)
        .create(&CategoryFields {
            title: title.to_owned(),
            slug: slug(pool, SlugTable::Categories, title).await?,
            description: Some(description.to_owned()),
            image_url: None,
        })
        .await?;
    tracing::info!(slug = %category.slug, "Category created");

    let repo = ProductRepository::new(pool);
    for product in products {
        let created = repo
            .create(&ProductFields {
                title: product.title.to_owned(),
                slug: slug(pool, SlugTable::Products, product.title).await?,
                description: product.description.to_owned(),
                image_url: None,
                external_url: None,
                category_id: Some(category.id),
                price: Decimal::new(product.price_cents, 2),
                discount_price: product.discount_cents.map(|c| Decimal::new(c, 2)),
                stock: product.stock,
            })
            .await?;
        tracing::info!(slug = %created.slug, "Product created");
    }
    Ok(())
}

/// Insert the demo content.
pub async fn run() -> Result<(), SeedError> {
    let pool = connect().await?;

    seed_category(&pool, "Tea", "Loose-leaf tea from small gardens.", &TEA).await?;
    seed_category(&pool, "Teaware", "Pots, cups and strainers.", &TEAWARE).await?;

    let title = "Welcome to the shop";
    let post = BlogPostRepository::new(&pool)
        .create(&BlogPostFields {
            title: title.to_owned(),
            slug: slug(&pool, SlugTable::BlogPosts, title).await?,
            content: WELCOME_POST.to_owned(),
            excerpt: Some("A small range of loose-leaf tea and teaware.".to_owned()),
            image_url: None,
            published: true,
        })
        .await?;
    tracing::info!(slug = %post.slug, "Post created");

    tracing::info!("Seeding complete!");
    Ok(())
}
