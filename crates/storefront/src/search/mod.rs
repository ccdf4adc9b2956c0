//! Fuzzy menu search using Tantivy.
//!
//! Customers misspell dish names ("bryani" for "Biryani"), so the menu
//! search is an approximate match, not a substring scan. The index lives
//! entirely in RAM, built from the active catalog the backend returned,
//! and is rebuilt only when the catalog snapshot actually changes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value};
use tantivy::{Index, IndexReader, ReloadPolicy, Term};
use tracing::instrument;

use tiffinbox_core::ItemId;

use crate::backend::types::MenuItem;

/// Schema field handles for the menu index.
#[derive(Clone, Copy)]
struct MenuFields {
    /// Stored item id (returned in results).
    id: Field,
    /// Indexed name tokens.
    name_text: Field,
    /// Indexed description tokens.
    description_text: Field,
}

/// Inner index state (once built).
struct ReadyIndex {
    #[allow(dead_code)]
    index: Index,
    reader: IndexReader,
    fields: MenuFields,
    /// Catalog snapshot hash the index was built from.
    fingerprint: u64,
}

/// The menu search index.
///
/// Starts empty; `refresh` builds or rebuilds it from the current catalog
/// snapshot, `search` ranks item ids for a query.
pub struct MenuIndex {
    inner: RwLock<Option<ReadyIndex>>,
}

impl Default for MenuIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuIndex {
    /// Create a new empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Hash of the searchable catalog content.
    fn fingerprint(items: &[MenuItem]) -> u64 {
        let mut hasher = DefaultHasher::new();
        items.len().hash(&mut hasher);
        for item in items {
            item.id.as_i64().hash(&mut hasher);
            item.name.hash(&mut hasher);
            item.description.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn build_schema() -> (Schema, MenuFields) {
        use tantivy::schema::{NumericOptions, TEXT};

        let mut schema_builder = Schema::builder();
        let id = schema_builder.add_i64_field(
            "id",
            NumericOptions::default().set_stored().set_indexed(),
        );
        // TEXT uses the default tokenizer (simple + lowercase), which is
        // what the fuzzy terms are matched against.
        let name_text = schema_builder.add_text_field("name_text", TEXT);
        let description_text = schema_builder.add_text_field("description_text", TEXT);

        let schema = schema_builder.build();
        (
            schema,
            MenuFields {
                id,
                name_text,
                description_text,
            },
        )
    }

    /// Build or rebuild the index when the catalog snapshot changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be built; search then keeps
    /// serving from the previous snapshot.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn refresh(&self, items: &[MenuItem]) -> Result<(), SearchError> {
        let fingerprint = Self::fingerprint(items);

        if let Ok(guard) = self.inner.read()
            && guard.as_ref().is_some_and(|r| r.fingerprint == fingerprint)
        {
            return Ok(());
        }

        let (schema, fields) = Self::build_schema();
        let index = Index::create_in_ram(schema);
        let mut writer = index
            .writer(15_000_000)
            .map_err(|e| SearchError::Index(format!("Failed to create writer: {e}")))?;

        for item in items {
            let doc = tantivy::doc!(
                fields.id => item.id.as_i64(),
                fields.name_text => item.name.clone(),
                fields.description_text => item.description.clone()
            );
            writer
                .add_document(doc)
                .map_err(|e| SearchError::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| SearchError::Index(format!("Failed to commit index: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("Failed to create reader: {e}")))?;

        *self
            .inner
            .write()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))? = Some(ReadyIndex {
            index,
            reader,
            fields,
            fingerprint,
        });

        Ok(())
    }

    /// Rank item ids for a query.
    ///
    /// Per term: exact match, plus an edit-distance-1 fuzzy match for
    /// terms of three or more characters, plus prefix matching for the
    /// short terms a customer types first.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned or the query fails.
    // Allow: the read guard must outlive `ready`, which borrows from it
    // for the whole search.
    #[allow(clippy::significant_drop_tightening)]
    #[instrument(skip(self))]
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<ItemId>, SearchError> {
        let query_str = query_str.trim().to_lowercase();
        if query_str.is_empty() {
            return Ok(Vec::new());
        }

        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))?;

        let Some(ready) = guard.as_ref() else {
            // Not built yet; nothing matches.
            return Ok(Vec::new());
        };

        let searcher = ready.reader.searcher();

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in query_str.split_whitespace() {
            if term.len() < 3 {
                // Prefix match so "bi" already narrows to "Biryani".
                let prefix_pattern = format!("{}.*", escape_regex(term));
                if let Ok(regex_query) =
                    RegexQuery::from_pattern(&prefix_pattern, ready.fields.name_text)
                {
                    subqueries.push((Occur::Should, Box::new(regex_query)));
                }
            } else {
                let name_term = Term::from_field_text(ready.fields.name_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(name_term.clone(), IndexRecordOption::Basic)),
                ));
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(name_term, 1, true)),
                ));

                let desc_term = Term::from_field_text(ready.fields.description_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(desc_term, 1, true)),
                ));
            }
        }

        let query = BooleanQuery::new(subqueries);
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;

        let mut ids = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            if let Some(id) = doc.get_first(ready.fields.id).and_then(|v| v.as_i64()) {
                ids.push(ItemId::new(id));
            }
        }

        Ok(ids)
    }
}

/// Escape regex metacharacters in a raw search term.
fn escape_regex(term: &str) -> String {
    term.chars()
        .flat_map(|c| match c {
            '.' | '*' | '+' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                vec!['\\', c]
            }
            _ => vec![c],
        })
        .collect()
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
}
