//! Entity loading for page routes.
//!
//! A route asks for a view model by slug or by filter. The loader fetches the
//! entity graphs the view model declares it needs, checks them and composes
//! the view models. A missing slug is a [`Lookup::NotFound`], never an error:
//! the route decides where to send the visitor instead.

use std::collections::{HashMap, HashSet};

use crate::store::{Graph, Store};

/// Outcome of an exact-slug lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Store(sqlx::Error),
    /// A relation the view model needs came back unresolved.
    Unresolved {
        entity: &'static str,
        relation: &'static str,
    },
    /// The store answered an exact-slug lookup with a different entity.
    SlugMismatch { expected: String, found: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Store(err) => write!(f, "Store error: {err}"),
            LoadError::Unresolved { entity, relation } => {
                write!(f, "Relation {entity}.{relation} was not resolved")
            }
            LoadError::SlugMismatch { expected, found } => {
                write!(f, "Lookup for slug '{expected}' returned '{found}'")
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<sqlx::Error> for LoadError {
    fn from(err: sqlx::Error) -> Self {
        LoadError::Store(err)
    }
}

/// A presentation shape built from one entity graph.
pub trait ViewModel: Sized + Send {
    type Graph: Graph;

    /// Relations this view needs resolved alongside the entity.
    fn include() -> <Self::Graph as Graph>::Include;

    fn compose(graph: Self::Graph) -> Result<Self, LoadError>;
}

pub struct EntityLoader<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ?Sized> EntityLoader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Look up one entity by its unique slug.
    pub async fn fetch_unique<V>(&self, slug: &str) -> Result<Lookup<V>, LoadError>
    where
        V: ViewModel,
        S: Store<V::Graph>,
    {
        let include = V::include();
        let Some(graph) = self.store.find_unique(slug, &include).await? else {
            tracing::debug!(
                entity = <V::Graph as Graph>::ENTITY,
                slug,
                "No entity for slug"
            );
            return Ok(Lookup::NotFound);
        };

        if graph.slug() != slug {
            return Err(LoadError::SlugMismatch {
                expected: slug.to_string(),
                found: graph.slug().to_string(),
            });
        }

        V::compose(graph).map(Lookup::Found)
    }

    /// Every entity matching `filter`, in store order, without duplicates.
    pub async fn fetch_many<V>(
        &self,
        filter: &<V::Graph as Graph>::Filter,
    ) -> Result<Vec<V>, LoadError>
    where
        V: ViewModel,
        S: Store<V::Graph>,
    {
        let include = V::include();
        let graphs = self.store.find_many(filter, &include).await?;

        let mut seen = HashSet::new();
        graphs
            .into_iter()
            .filter(|graph| seen.insert(graph.id()))
            .map(V::compose)
            .collect()
    }

    /// The entities whose slugs appear in `slugs`, ordered as in `slugs`.
    ///
    /// Slugs with no entity are skipped; repeated slugs yield one entity.
    pub async fn fetch_by_slugs<V, T>(&self, slugs: &[T]) -> Result<Vec<V>, LoadError>
    where
        V: ViewModel,
        S: Store<V::Graph>,
        T: AsRef<str>,
    {
        let mut rank: HashMap<&str, usize> = HashMap::new();
        let mut wanted = Vec::new();
        for slug in slugs {
            let slug = slug.as_ref();
            if !rank.contains_key(slug) {
                rank.insert(slug, wanted.len());
                wanted.push(slug.to_string());
            }
        }
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let include = V::include();
        let filter = <V::Graph as Graph>::slug_in(wanted);
        let graphs = self.store.find_many(&filter, &include).await?;

        // One entity per requested slug, whatever rows the store repeats.
        let mut seen = HashSet::new();
        let mut ranked: Vec<(usize, V::Graph)> = graphs
            .into_iter()
            .filter_map(|graph| {
                let position = *rank.get(graph.slug())?;
                seen.insert(position).then_some((position, graph))
            })
            .collect();
        ranked.sort_by_key(|(position, _)| *position);

        ranked
            .into_iter()
            .map(|(_, graph)| V::compose(graph))
            .collect()
    }
}
