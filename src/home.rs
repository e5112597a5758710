use crate::media::{Genre, MovieList, MovieSummary, HOME_CATEGORIES};
use crate::screen::{effect, Effect, Screen};
use crate::tmdb::{CatalogClient, DEFAULT_PAGE};

#[derive(Debug)]
pub enum HomeMessage {
    PopularLoaded(Vec<MovieSummary>),
    CategoryRowLoaded(usize, Vec<MovieSummary>),
    GenresLoaded(Vec<Genre>),
    GenreSelected(u64),
    GenreRowLoaded {
        generation: u64,
        movies: Vec<MovieSummary>,
    },
}

/// Home-screen aggregate. Every row is fetched independently through the
/// lenient catalog facade, so one failed row never blanks the others.
/// State lives and dies with the page; nothing here is shared or cached.
pub struct HomePage {
    client: CatalogClient,
    pub popular: Vec<MovieSummary>,
    pub by_category: Vec<Vec<MovieSummary>>,
    pub genres: Vec<Genre>,
    pub selected_genre: Option<u64>,
    pub by_genre: Vec<MovieSummary>,
    genre_generation: u64,
}

impl HomePage {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            popular: Vec::new(),
            by_category: vec![Vec::new(); HOME_CATEGORIES.len()],
            genres: Vec::new(),
            selected_genre: None,
            by_genre: Vec::new(),
            genre_generation: 0,
        }
    }

    /// Issues every initial fetch at once: popular, the genre list, and one
    /// call per fixed category. Nothing waits on anything else.
    pub fn mount(&mut self) -> Vec<Effect<HomeMessage>> {
        let mut effects = Vec::with_capacity(HOME_CATEGORIES.len() + 2);

        let client = self.client.clone();
        effects.push(effect(async move {
            HomeMessage::PopularLoaded(client.row(MovieList::Popular, DEFAULT_PAGE).await)
        }));

        let client = self.client.clone();
        effects.push(effect(async move {
            HomeMessage::GenresLoaded(client.genres().await)
        }));

        for (index, category) in HOME_CATEGORIES.iter().enumerate() {
            let client = self.client.clone();
            let list = category.list;
            effects.push(effect(async move {
                HomeMessage::CategoryRowLoaded(index, client.row(list, DEFAULT_PAGE).await)
            }));
        }

        effects
    }

    fn select_genre(&mut self, genre_id: u64) -> Vec<Effect<HomeMessage>> {
        self.selected_genre = Some(genre_id);
        self.genre_generation += 1;
        let generation = self.genre_generation;
        let client = self.client.clone();
        vec![effect(async move {
            HomeMessage::GenreRowLoaded {
                generation,
                movies: client.genre_row(genre_id, DEFAULT_PAGE).await,
            }
        })]
    }
}

impl Screen for HomePage {
    type Message = HomeMessage;

    fn update(&mut self, message: HomeMessage) -> Vec<Effect<HomeMessage>> {
        match message {
            HomeMessage::PopularLoaded(movies) => {
                self.popular = movies;
                Vec::new()
            }
            HomeMessage::CategoryRowLoaded(index, movies) => {
                // Results land by index, whatever order they resolve in.
                if let Some(slot) = self.by_category.get_mut(index) {
                    *slot = movies;
                }
                Vec::new()
            }
            HomeMessage::GenresLoaded(genres) => {
                self.genres = genres;
                let Some(first) = self.genres.first() else {
                    return Vec::new();
                };
                let default_genre = first.id;
                self.select_genre(default_genre)
            }
            HomeMessage::GenreSelected(genre_id) => self.select_genre(genre_id),
            HomeMessage::GenreRowLoaded { generation, movies } => {
                // A response from a superseded selection is dropped.
                if generation == self.genre_generation {
                    self.by_genre = movies;
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TmdbError;
    use crate::media::{poster_image_url, ExternalIds, MovieDetail, MovieId, MovieList};
    use crate::screen::ScreenRuntime;
    use crate::tmdb::CatalogSource;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn summary(id: MovieId, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: String::from(title),
            overview: String::new(),
            poster_path: None,
            image: poster_image_url(None),
            rating: 0.0,
            release_date: None,
            genre_ids: Vec::new(),
        }
    }

    /// Stub upstream with inverted latencies: earlier rows resolve later.
    struct StaggeredSource;

    #[async_trait]
    impl CatalogSource for StaggeredSource {
        async fn movies(&self, list: MovieList, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            let (delay, title) = match list {
                MovieList::Popular => (5, "popular-1"),
                MovieList::NowPlaying => (30, "now-playing-1"),
                MovieList::TopRated => (1, "top-rated-1"),
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![summary(1, title)])
        }

        async fn movies_by_genre(
            &self,
            genre_id: u64,
            _: u32,
        ) -> Result<Vec<MovieSummary>, TmdbError> {
            let delay = if genre_id == 28 { 50 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![summary(genre_id, &format!("genre-{}", genre_id))])
        }

        async fn search(&self, _: &str, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(Vec::new())
        }

        async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
            Ok(vec![
                Genre {
                    id: 28,
                    name: String::from("Action"),
                },
                Genre {
                    id: 35,
                    name: String::from("Comedy"),
                },
            ])
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

    fn staggered_page() -> HomePage {
        HomePage::new(CatalogClient::new(Arc::new(StaggeredSource)))
    }

    #[tokio::test]
    async fn rows_land_by_index_for_any_completion_order() {
        let mut page = staggered_page();
        let mut runtime = ScreenRuntime::new();
        runtime.spawn_all(page.mount());
        runtime.run_until_idle(&mut page).await;

        assert_eq!(page.popular[0].title, "popular-1");
        assert_eq!(page.by_category[0][0].title, "now-playing-1");
        assert_eq!(page.by_category[1][0].title, "top-rated-1");
        assert_eq!(page.selected_genre, Some(28));
        assert_eq!(page.by_genre[0].title, "genre-28");
    }

    #[tokio::test]
    async fn last_selected_genre_wins() {
        let mut page = staggered_page();
        let mut runtime = ScreenRuntime::new();
        // Genre 28 resolves slowly, 35 quickly; 35 is selected last.
        runtime.spawn_all(page.update(HomeMessage::GenreSelected(28)));
        runtime.spawn_all(page.update(HomeMessage::GenreSelected(35)));
        runtime.run_until_idle(&mut page).await;

        assert_eq!(page.selected_genre, Some(35));
        assert_eq!(page.by_genre.len(), 1);
        assert_eq!(page.by_genre[0].title, "genre-35");
    }

    #[tokio::test]
    async fn out_of_order_direct_updates_stay_aligned() {
        let mut page = staggered_page();
        page.update(HomeMessage::CategoryRowLoaded(1, vec![summary(2, "b")]));
        page.update(HomeMessage::CategoryRowLoaded(0, vec![summary(1, "a")]));
        assert_eq!(page.by_category[0][0].title, "a");
        assert_eq!(page.by_category[1][0].title, "b");

        // Unknown index is ignored rather than widening the row list.
        page.update(HomeMessage::CategoryRowLoaded(9, vec![summary(3, "c")]));
        assert_eq!(page.by_category.len(), HOME_CATEGORIES.len());
    }

    #[tokio::test]
    async fn empty_genre_list_selects_nothing() {
        let mut page = staggered_page();
        let effects = page.update(HomeMessage::GenresLoaded(Vec::new()));
        assert!(effects.is_empty());
        assert_eq!(page.selected_genre, None);
    }
}
