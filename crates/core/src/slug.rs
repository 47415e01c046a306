//! URL slugs and per-table slug uniqueness.
//!
//! A slug is derived from a title (or an explicit slug typed by an admin):
//! diacritics are stripped, the text is lower-cased and every run of
//! characters outside `[a-z0-9]` collapses into a single hyphen. The result
//! always matches `[a-z0-9]+(-[a-z0-9]+)*`.
//!
//! [`unique_slug`] then resolves collisions against a [`SlugStore`] by
//! appending `-2`, `-3`, ... until a free candidate is found. The store is
//! only read; the caller performs the insert or update. Two concurrent writers
//! can both see a candidate as free, so the unique index on each `slug` column
//! stays the real guarantee and a violation surfaces as a conflict on write.

use core::fmt;
use std::future::Future;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Upper bound on numeric suffixes tried before giving up.
pub const MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Errors from normalising input into a slug.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Nothing URL-safe was left after normalisation.
    #[error("slug cannot be empty")]
    Empty,
}

/// Errors from [`unique_slug`].
#[derive(thiserror::Error, Debug)]
pub enum UniqueSlugError<E> {
    /// The input normalised to an empty slug.
    #[error(transparent)]
    Invalid(#[from] SlugError),

    /// The backing store failed to answer.
    #[error("slug lookup failed: {0}")]
    Store(#[source] E),

    /// Every suffix up to [`MAX_SLUG_ATTEMPTS`] is taken.
    #[error("no free slug for '{base}' after {attempts} attempts")]
    Exhausted {
        /// The normalised slug the suffixes were appended to.
        base: String,
        /// Number of candidates checked.
        attempts: u32,
    },
}

/// A normalised, URL-safe slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug, suffix included.
    pub const MAX_LENGTH: usize = 96;

    /// The slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the slug and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// This slug with `-{n}` appended, shortening the base if the result would
    /// exceed [`Slug::MAX_LENGTH`].
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        let suffix = format!("-{n}");
        let room = Self::MAX_LENGTH.saturating_sub(suffix.len());
        let mut base = self.0.clone();
        truncate_slug(&mut base, room);
        base.push_str(&suffix);
        Self(base)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalise a title or proposed slug.
///
/// ```
/// use emporium_core::slugify;
///
/// assert_eq!(slugify("Crème Brûlée  Recipes!").unwrap().as_str(), "creme-brulee-recipes");
/// assert_eq!(slugify("  --Hello__World-- ").unwrap().as_str(), "hello-world");
/// assert!(slugify("?!").is_err());
/// ```
///
/// # Errors
///
/// Returns [`SlugError::Empty`] when nothing URL-safe remains.
pub fn slugify(input: &str) -> Result<Slug, SlugError> {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if !c.is_ascii_alphanumeric() {
            pending_separator = true;
            continue;
        }
        // Leading separators are never emitted
        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(c);
    }

    truncate_slug(&mut slug, Slug::MAX_LENGTH);

    if slug.is_empty() {
        return Err(SlugError::Empty);
    }
    Ok(Slug(slug))
}

/// Cut an ASCII slug to at most `max` bytes without leaving a trailing hyphen.
fn truncate_slug(slug: &mut String, max: usize) {
    if slug.len() > max {
        slug.truncate(max);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
}

/// Tables whose rows carry a unique slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugTable {
    Categories,
    Products,
    BlogPosts,
}

impl SlugTable {
    /// Name of the backing table.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
            Self::BlogPosts => "blog_posts",
        }
    }
}

/// Read access to existing slugs, implemented by the database layer.
pub trait SlugStore {
    /// Error raised by the lookup.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether `slug` is used by a row of `table` other than `exclude_id`.
    fn slug_exists(
        &self,
        table: SlugTable,
        slug: &str,
        exclude_id: Option<i32>,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

/// Return a slug for `input` that no other row of `table` uses.
///
/// `exclude_id` is the id of the row being edited, so saving a row without
/// changing its title keeps its slug.
///
/// # Errors
///
/// - [`UniqueSlugError::Invalid`] if `input` normalises to nothing
/// - [`UniqueSlugError::Store`] if a lookup fails (nothing is retried)
/// - [`UniqueSlugError::Exhausted`] if every suffix is taken
pub async fn unique_slug<S>(
    store: &S,
    table: SlugTable,
    input: &str,
    exclude_id: Option<i32>,
) -> Result<Slug, UniqueSlugError<S::Error>>
where
    S: SlugStore + Sync,
{
    let base = slugify(input)?;

    if !store
        .slug_exists(table, base.as_str(), exclude_id)
        .await
        .map_err(UniqueSlugError::Store)?
    {
        return Ok(base);
    }

    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = base.with_suffix(n);
        if !store
            .slug_exists(table, candidate.as_str(), exclude_id)
            .await
            .map_err(UniqueSlugError::Store)?
        {
            return Ok(candidate);
        }
    }

    Err(UniqueSlugError::Exhausted {
        base: base.into_inner(),
        attempts: MAX_SLUG_ATTEMPTS,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::sync::Mutex;

    use super::*;

    /// Rows per table as `(id, slug)` pairs.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<SlugTable, Vec<(i32, String)>>>,
    }

    impl MemoryStore {
        fn insert(&self, table: SlugTable, id: i32, slug: &str) {
            self.rows
                .lock()
                .unwrap()
                .entry(table)
                .or_default()
                .push((id, slug.to_owned()));
        }
    }

    impl SlugStore for MemoryStore {
        type Error = Infallible;

        async fn slug_exists(
            &self,
            table: SlugTable,
            slug: &str,
            exclude_id: Option<i32>,
        ) -> Result<bool, Infallible> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&table).is_some_and(|rows| {
                rows.iter()
                    .any(|(id, existing)| existing == slug && Some(*id) != exclude_id)
            }))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Unreachable;

    struct FailingStore;

    impl SlugStore for FailingStore {
        type Error = Unreachable;

        async fn slug_exists(
            &self,
            _table: SlugTable,
            _slug: &str,
            _exclude_id: Option<i32>,
        ) -> Result<bool, Unreachable> {
            Err(Unreachable)
        }
    }

    #[test]
    fn test_slugify_strips_diacritics_and_punctuation() {
        assert_eq!(slugify("Ça va? Très bien!").unwrap().as_str(), "ca-va-tres-bien");
        assert_eq!(slugify("Don't Stop").unwrap().as_str(), "don-t-stop");
        assert_eq!(slugify("Rock & Roll").unwrap().as_str(), "rock-roll");
        assert_eq!(slugify("Ｆｕｌｌｗｉｄｔｈ ①").unwrap().as_str(), "fullwidth-1");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a   b\t\nc").unwrap().as_str(), "a-b-c");
        assert_eq!(slugify("--a--b--").unwrap().as_str(), "a-b");
        assert_eq!(slugify("snake_case_title").unwrap().as_str(), "snake-case-title");
    }

    #[test]
    fn test_slugify_empty_is_error() {
        assert_eq!(slugify(""), Err(SlugError::Empty));
        assert_eq!(slugify(" - _ "), Err(SlugError::Empty));
        assert_eq!(slugify("日本語"), Err(SlugError::Empty));
        assert_eq!(SlugError::Empty.to_string(), "slug cannot be empty");
    }

    #[test]
    fn test_slugify_caps_length_without_trailing_hyphen() {
        let title = format!("{} tail", "x".repeat(Slug::MAX_LENGTH - 1));
        let slug = slugify(&title).unwrap();
        assert_eq!(slug.as_str().len(), Slug::MAX_LENGTH - 1);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_with_suffix_respects_max_length() {
        let slug = slugify(&"y".repeat(Slug::MAX_LENGTH)).unwrap();
        let suffixed = slug.with_suffix(12);
        assert_eq!(suffixed.as_str().len(), Slug::MAX_LENGTH);
        assert!(suffixed.as_str().ends_with("-12"));
    }

    #[tokio::test]
    async fn test_unique_slug_free_base() {
        let store = MemoryStore::default();
        let slug = unique_slug(&store, SlugTable::Products, "Blue Shirt", None)
            .await
            .unwrap();
        assert_eq!(slug.as_str(), "blue-shirt");
    }

    #[tokio::test]
    async fn test_unique_slug_appends_incrementing_suffix() {
        let store = MemoryStore::default();
        store.insert(SlugTable::Products, 1, "blue-shirt");
        store.insert(SlugTable::Products, 2, "blue-shirt-2");

        let slug = unique_slug(&store, SlugTable::Products, "Blue Shirt", None)
            .await
            .unwrap();
        assert_eq!(slug.as_str(), "blue-shirt-3");
    }

    #[tokio::test]
    async fn test_unique_slug_is_per_table() {
        let store = MemoryStore::default();
        store.insert(SlugTable::Categories, 1, "shirts");

        let slug = unique_slug(&store, SlugTable::Products, "Shirts", None)
            .await
            .unwrap();
        assert_eq!(slug.as_str(), "shirts");
    }

    #[tokio::test]
    async fn test_unique_slug_excludes_row_being_edited() {
        let store = MemoryStore::default();
        store.insert(SlugTable::BlogPosts, 5, "hello-world");

        let slug = unique_slug(&store, SlugTable::BlogPosts, "Hello, World", Some(5))
            .await
            .unwrap();
        assert_eq!(slug.as_str(), "hello-world");
    }

    #[tokio::test]
    async fn test_unique_slug_rejects_empty_title() {
        let store = MemoryStore::default();
        let err = unique_slug(&store, SlugTable::Products, "!!!", None)
            .await
            .unwrap_err();
        assert!(matches!(err, UniqueSlugError::Invalid(SlugError::Empty)));
    }

    #[tokio::test]
    async fn test_unique_slug_propagates_store_errors() {
        let err = unique_slug(&FailingStore, SlugTable::Categories, "Hats", None)
            .await
            .unwrap_err();
        assert!(matches!(err, UniqueSlugError::Store(Unreachable)));
    }
}
