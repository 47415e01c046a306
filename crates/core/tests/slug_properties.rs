use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Mutex;

use emporium_core::{Slug, SlugStore, SlugTable, slugify, unique_slug};
use proptest::prelude::*;

/// A single table of slugs that grows as the test inserts into it.
#[derive(Default)]
struct GrowingTable {
    slugs: Mutex<HashSet<String>>,
}

impl SlugStore for GrowingTable {
    type Error = Infallible;

    async fn slug_exists(
        &self,
        _table: SlugTable,
        slug: &str,
        _exclude_id: Option<i32>,
    ) -> Result<bool, Infallible> {
        Ok(self.slugs.lock().unwrap().contains(slug))
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn assert_well_formed(slug: &Slug) {
    let s = slug.as_str();
    assert!(!s.is_empty());
    assert!(s.len() <= Slug::MAX_LENGTH);
    assert!(
        s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        "unexpected character in {s}"
    );
    assert!(!s.starts_with('-') && !s.ends_with('-'), "edge hyphen in {s}");
    assert!(!s.contains("--"), "double hyphen in {s}");
}

proptest! {
    #[test]
    fn prop_slug_is_url_safe(
        prefix in "[ -~À-ÿ]{0,60}",
        anchor in "[a-zA-Z0-9]",
        suffix in "[ -~À-ÿ]{0,60}",
    ) {
        let title = format!("{prefix}{anchor}{suffix}");
        let slug = slugify(&title).unwrap();
        assert_well_formed(&slug);
    }

    #[test]
    fn prop_slugify_is_idempotent(title in "[ -~À-ÿ]{0,80}") {
        if let Ok(slug) = slugify(&title) {
            let again = slugify(slug.as_str()).unwrap();
            prop_assert_eq!(again, slug);
        }
    }

    #[test]
    fn prop_no_alphanumerics_is_rejected(title in "[ !-/:-@\\[-`{-~]{0,40}") {
        prop_assert!(slugify(&title).is_err());
    }

    #[test]
    fn prop_growing_table_never_duplicates(
        titles in proptest::collection::vec("[ab]{1,2}( [ab])?", 1..40)
    ) {
        let table = GrowingTable::default();
        block_on(async {
            for title in &titles {
                let slug = unique_slug(&table, SlugTable::Products, title, None)
                    .await
                    .unwrap();
                assert_well_formed(&slug);
                let inserted = table.slugs.lock().unwrap().insert(slug.into_inner());
                assert!(inserted, "duplicate slug for {title}");
            }
        });
    }
}

#[test]
fn test_collisions_get_incrementing_suffixes() {
    let table = GrowingTable::default();
    let slugs: Vec<String> = block_on(async {
        let mut out = Vec::new();
        for _ in 0..4 {
            let slug = unique_slug(&table, SlugTable::BlogPosts, "Summer Sale", None)
                .await
                .unwrap();
            table.slugs.lock().unwrap().insert(slug.as_str().to_owned());
            out.push(slug.into_inner());
        }
        out
    });

    assert_eq!(
        slugs,
        ["summer-sale", "summer-sale-2", "summer-sale-3", "summer-sale-4"]
    );
}
