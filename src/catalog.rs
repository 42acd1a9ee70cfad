use log::{debug, warn};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// A named value that formulas can refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub value: f64,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
        }
    }
}

/// Immutable snapshot of the known variables.
///
/// Names are unique: when several entries share a name the first one is
/// kept and the others are dropped.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Suggestion>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        let mut entries = Vec::with_capacity(suggestions.len());
        let mut index = HashMap::with_capacity(suggestions.len());

        for suggestion in suggestions {
            if index.contains_key(&suggestion.name) {
                warn!(
                    "Dropping suggestion '{}' (id {}): name already in catalog",
                    suggestion.name, suggestion.id
                );
                continue;
            }
            index.insert(suggestion.name.clone(), entries.len());
            entries.push(suggestion);
        }

        Self { entries, index }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive lookup of a name.
    pub fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).map(|suggestion| suggestion.value)
    }

    pub fn get(&self, name: &str) -> Option<&Suggestion> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Suggestion> for Catalog {
    fn from_iter<T: IntoIterator<Item = Suggestion>>(iter: T) -> Self {
        Catalog::new(iter.into_iter().collect())
    }
}

/// Holds the current catalog snapshot for a running application.
///
/// Refreshing swaps in a whole new `Arc<Catalog>`; evaluations that
/// already took a snapshot keep reading the old one.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
    loading: AtomicBool,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
            loading: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn publish(&self, catalog: Catalog) {
        debug!("Publishing catalog with {} entries", catalog.len());
        let catalog = Arc::new(catalog);
        match self.current.write() {
            Ok(mut guard) => *guard = catalog,
            Err(poisoned) => *poisoned.into_inner() = catalog,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Awaits `fetch` and publishes its entries. On failure the previous
    /// snapshot stays in place and the error is returned.
    pub async fn refresh<F, E>(&self, fetch: F) -> Result<Arc<Catalog>, E>
    where
        F: Future<Output = Result<Vec<Suggestion>, E>>,
    {
        self.loading.store(true, Ordering::Release);
        let fetched = fetch.await;
        self.loading.store(false, Ordering::Release);

        let suggestions = fetched?;
        self.publish(Catalog::new(suggestions));
        Ok(self.snapshot())
    }
}
