use std::time::Duration;

use crate::error::TmdbError;
use crate::media::{genre_filters, Genre, GenreFilter, LoadingState, MovieSummary};
use crate::screen::{effect, Effect, Screen};
use crate::tmdb::CatalogClient;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum SearchMessage {
    FiltersLoaded(Vec<Genre>),
    QueryChanged(String),
    GenreSelected(Option<u64>),
    DebounceElapsed(u64),
    Submitted,
    ResultsLoaded {
        generation: u64,
        outcome: Result<Vec<MovieSummary>, TmdbError>,
    },
}

/// Search screen model. Query edits and filter changes arm a shared
/// debounce; an explicit submit searches immediately. Unlike the home
/// rows, search failures surface in `load_state` instead of degrading
/// to an empty list.
pub struct SearchPage {
    client: CatalogClient,
    pub query: String,
    pub results: Vec<MovieSummary>,
    pub filters: Vec<GenreFilter>,
    pub selected_genre: Option<u64>,
    pub load_state: LoadingState,
    debounce_revision: u64,
    search_generation: u64,
}

impl SearchPage {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            query: String::new(),
            results: Vec::new(),
            filters: Vec::new(),
            selected_genre: None,
            load_state: LoadingState::Idle,
            debounce_revision: 0,
            search_generation: 0,
        }
    }

    pub fn mount(&mut self) -> Vec<Effect<SearchMessage>> {
        let client = self.client.clone();
        vec![effect(async move {
            SearchMessage::FiltersLoaded(client.genres().await)
        })]
    }

    fn arm_debounce(&mut self) -> Vec<Effect<SearchMessage>> {
        self.debounce_revision += 1;
        let revision = self.debounce_revision;
        vec![effect(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            SearchMessage::DebounceElapsed(revision)
        })]
    }

    fn run_search(&mut self) -> Vec<Effect<SearchMessage>> {
        self.search_generation += 1;
        let generation = self.search_generation;

        if self.query.is_empty() {
            let Some(genre_id) = self.selected_genre else {
                self.results.clear();
                self.load_state = LoadingState::Idle;
                return Vec::new();
            };
            self.load_state = LoadingState::Loading;
            let client = self.client.clone();
            return vec![effect(async move {
                SearchMessage::ResultsLoaded {
                    generation,
                    outcome: client.search_by_genre(genre_id).await,
                }
            })];
        }

        self.load_state = LoadingState::Loading;
        let client = self.client.clone();
        let query = self.query.clone();
        let genre = self.selected_genre;
        vec![effect(async move {
            // Query results carry genre ids, so the genre filter is applied
            // here rather than with a second upstream call.
            let outcome = client.search(&query).await.map(|movies| match genre {
                Some(id) => movies
                    .into_iter()
                    .filter(|movie| movie.genre_ids.contains(&id))
                    .collect(),
                None => movies,
            });
            SearchMessage::ResultsLoaded { generation, outcome }
        })]
    }
}

impl Screen for SearchPage {
    type Message = SearchMessage;

    fn update(&mut self, message: SearchMessage) -> Vec<Effect<SearchMessage>> {
        match message {
            SearchMessage::FiltersLoaded(genres) => {
                self.filters = genre_filters(&genres);
                Vec::new()
            }
            SearchMessage::QueryChanged(query) => {
                self.query = query;
                self.arm_debounce()
            }
            SearchMessage::GenreSelected(genre_id) => {
                self.selected_genre = genre_id;
                self.arm_debounce()
            }
            SearchMessage::DebounceElapsed(revision) => {
                // A newer edit re-armed the timer; this one is stale.
                if revision != self.debounce_revision {
                    return Vec::new();
                }
                self.run_search()
            }
            SearchMessage::Submitted => {
                // Invalidate any pending timer; the search runs now.
                self.debounce_revision += 1;
                self.run_search()
            }
            SearchMessage::ResultsLoaded { generation, outcome } => {
                if generation != self.search_generation {
                    return Vec::new();
                }
                match outcome {
                    Ok(movies) => {
                        self.results = movies;
                        self.load_state = LoadingState::Idle;
                    }
                    Err(error) => {
                        self.load_state = LoadingState::Error(error.to_string());
                    }
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{poster_image_url, ExternalIds, MovieDetail, MovieId, MovieList};
    use crate::screen::ScreenRuntime;
    use crate::tmdb::CatalogSource;
    use async_trait::async_trait;
    use std::sync::Arc;

    fn movie(id: MovieId, title: &str, genre_ids: Vec<u64>) -> MovieSummary {
        MovieSummary {
            id,
            title: String::from(title),
            overview: String::new(),
            poster_path: None,
            image: poster_image_url(None),
            rating: 0.0,
            release_date: None,
            genre_ids,
        }
    }

    struct SearchSource;

    #[async_trait]
    impl CatalogSource for SearchSource {
        async fn movies(&self, _: MovieList, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(Vec::new())
        }

        async fn movies_by_genre(
            &self,
            genre_id: u64,
            _: u32,
        ) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(vec![movie(
                genre_id,
                &format!("discover-{}", genre_id),
                vec![genre_id],
            )])
        }

        async fn search(&self, _: &str, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(vec![
                movie(1, "Alpha", vec![28]),
                movie(2, "Beta", vec![35]),
            ])
        }

        async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
            Ok(vec![Genre {
                id: 28,
                name: String::from("Action"),
            }])
        }

        async fn movie_detail(&self, _: MovieId) -> Result<MovieDetail, TmdbError> {
            Err(TmdbError::Status(404))
        }

        async fn trailer_key(&self, _: MovieId) -> Result<Option<String>, TmdbError> {
            Ok(None)
        }

        async fn external_ids(&self, _: MovieId) -> Result<ExternalIds, TmdbError> {
            Ok(ExternalIds::default())
        }
    }

    struct FailingSearchSource;

    #[async_trait]
    impl CatalogSource for FailingSearchSource {
        async fn movies(&self, _: MovieList, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(Vec::new())
        }

        async fn movies_by_genre(&self, _: u64, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Err(TmdbError::RateLimit)
        }

        async fn search(&self, _: &str, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Err(TmdbError::RateLimit)
        }

        async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
            Ok(Vec::new())
        }

        async fn movie_detail(&self, _: MovieId) -> Result<MovieDetail, TmdbError> {
            Err(TmdbError::Status(404))
        }

        async fn trailer_key(&self, _: MovieId) -> Result<Option<String>, TmdbError> {
            Ok(None)
        }

        async fn external_ids(&self, _: MovieId) -> Result<ExternalIds, TmdbError> {
            Ok(ExternalIds::default())
        }
    }

    fn page() -> SearchPage {
        SearchPage::new(CatalogClient::new(Arc::new(SearchSource)))
    }

    #[tokio::test]
    async fn stale_debounce_timers_do_not_search() {
        let mut search = page();
        search.update(SearchMessage::QueryChanged(String::from("ma")));
        search.update(SearchMessage::QueryChanged(String::from("mat")));

        assert!(search.update(SearchMessage::DebounceElapsed(1)).is_empty());
        assert_eq!(search.update(SearchMessage::DebounceElapsed(2)).len(), 1);
    }

    #[tokio::test]
    async fn query_results_filter_on_selected_genre() {
        let mut search = page();
        let mut runtime = ScreenRuntime::new();
        search.update(SearchMessage::QueryChanged(String::from("alp")));
        search.update(SearchMessage::GenreSelected(Some(28)));
        runtime.spawn_all(search.update(SearchMessage::Submitted));
        runtime.run_until_idle(&mut search).await;

        assert_eq!(search.results.len(), 1);
        assert_eq!(search.results[0].title, "Alpha");
        assert_eq!(search.load_state, LoadingState::Idle);
    }

    #[tokio::test]
    async fn empty_query_with_genre_uses_discovery() {
        let mut search = page();
        let mut runtime = ScreenRuntime::new();
        search.update(SearchMessage::GenreSelected(Some(35)));
        runtime.spawn_all(search.update(SearchMessage::Submitted));
        runtime.run_until_idle(&mut search).await;

        assert_eq!(search.results[0].title, "discover-35");
    }

    #[tokio::test]
    async fn empty_query_and_no_genre_clears_without_a_call() {
        let mut search = page();
        search.results = vec![movie(9, "left-over", Vec::new())];
        let effects = search.update(SearchMessage::Submitted);
        assert!(effects.is_empty());
        assert!(search.results.is_empty());
    }

    #[tokio::test]
    async fn failures_surface_instead_of_emptying_results() {
        let mut search = SearchPage::new(CatalogClient::new(Arc::new(FailingSearchSource)));
        let mut runtime = ScreenRuntime::new();
        search.results = vec![movie(9, "previous", Vec::new())];
        search.update(SearchMessage::QueryChanged(String::from("matrix")));
        runtime.spawn_all(search.update(SearchMessage::Submitted));
        runtime.run_until_idle(&mut search).await;

        assert!(matches!(search.load_state, LoadingState::Error(_)));
        assert_eq!(search.results[0].title, "previous");
    }

    #[tokio::test]
    async fn stale_search_responses_are_discarded() {
        let mut search = page();
        search.update(SearchMessage::QueryChanged(String::from("a")));
        search.update(SearchMessage::Submitted);
        search.update(SearchMessage::Submitted);

        search.update(SearchMessage::ResultsLoaded {
            generation: 1,
            outcome: Ok(vec![movie(1, "stale", Vec::new())]),
        });
        assert!(search.results.is_empty());

        search.update(SearchMessage::ResultsLoaded {
            generation: 2,
            outcome: Ok(vec![movie(2, "current", Vec::new())]),
        });
        assert_eq!(search.results[0].title, "current");
    }

    #[tokio::test]
    async fn filters_keep_the_sentinel_first() {
        let mut search = page();
        let mut runtime = ScreenRuntime::new();
        runtime.spawn_all(search.mount());
        runtime.run_until_idle(&mut search).await;

        assert_eq!(search.filters[0], GenreFilter::all());
        assert_eq!(search.filters[1].id, Some(28));
    }
}
