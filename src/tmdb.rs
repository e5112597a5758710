use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::TmdbError;
use crate::media::{
    first_youtube_trailer, ExternalIds, ExternalIdsResponse, Genre, GenreListResponse,
    MovieDetail, MovieDetailRecord, MovieId, MovieList, MovieListResponse, MovieSummary,
    VideosResponse,
};
use crate::settings::AppSettings;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

pub const DEFAULT_PAGE: u32 = 1;

/// Capability interface over the movie-metadata upstream. One
/// implementation talks to TMDB; tests substitute in-memory sources.
///
/// Every operation is strict: transport, status and parse failures come
/// back as `TmdbError`. Lenient row semantics live in [`CatalogClient`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn movies(&self, list: MovieList, page: u32) -> Result<Vec<MovieSummary>, TmdbError>;
    async fn movies_by_genre(
        &self,
        genre_id: u64,
        page: u32,
    ) -> Result<Vec<MovieSummary>, TmdbError>;
    async fn search(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>, TmdbError>;
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError>;
    async fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, TmdbError>;
    async fn trailer_key(&self, id: MovieId) -> Result<Option<String>, TmdbError>;
    async fn external_ids(&self, id: MovieId) -> Result<ExternalIds, TmdbError>;
}

/// TMDB REST client. Cheap to clone; all clones share one HTTP client.
#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    language: String,
    base_url: String,
    http_client: Arc<reqwest::Client>,
}

impl TmdbClient {
    pub fn new(api_key: String, language: String) -> Self {
        Self {
            api_key,
            language,
            base_url: String::from(TMDB_BASE_URL),
            http_client: Arc::new(reqwest::Client::new()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.tmdb_api_key.clone(), settings.language_or_default())
    }

    async fn fetch_json<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, TmdbError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| TmdbError::Network(e.to_string()))?;

        match response.status().as_u16() {
            401 => return Err(TmdbError::Unauthorized),
            429 => return Err(TmdbError::RateLimit),
            s if s >= 400 => return Err(TmdbError::Status(s)),
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }

    async fn fetch_movie_list(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<MovieSummary>, TmdbError> {
        let response: MovieListResponse = self.fetch_json(path, params).await?;
        Ok(response
            .results
            .into_iter()
            .map(MovieSummary::from)
            .collect())
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn movies(&self, list: MovieList, page: u32) -> Result<Vec<MovieSummary>, TmdbError> {
        tracing::debug!(list = list.path(), page, "fetching movie list");
        self.fetch_movie_list(list.path(), &[("page", page.to_string())])
            .await
    }

    async fn movies_by_genre(
        &self,
        genre_id: u64,
        page: u32,
    ) -> Result<Vec<MovieSummary>, TmdbError> {
        tracing::debug!(genre_id, page, "fetching discovery list");
        self.fetch_movie_list(
            "/discover/movie",
            &[
                ("with_genres", genre_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>, TmdbError> {
        tracing::debug!(query, page, "searching movies");
        self.fetch_movie_list(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
        let response: GenreListResponse = self.fetch_json("/genre/movie/list", &[]).await?;
        Ok(response.genres)
    }

    async fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, TmdbError> {
        tracing::debug!(movie_id = id, "fetching movie detail");
        let record: MovieDetailRecord = self.fetch_json(&format!("/movie/{}", id), &[]).await?;
        Ok(MovieDetail::from(record))
    }

    async fn trailer_key(&self, id: MovieId) -> Result<Option<String>, TmdbError> {
        let response: VideosResponse = self
            .fetch_json(&format!("/movie/{}/videos", id), &[])
            .await?;
        Ok(first_youtube_trailer(&response.results).map(|v| v.key.clone()))
    }

    async fn external_ids(&self, id: MovieId) -> Result<ExternalIds, TmdbError> {
        let response: ExternalIdsResponse = self
            .fetch_json(&format!("/movie/{}/external_ids", id), &[])
            .await?;
        Ok(ExternalIds {
            imdb_id: response.imdb_id.filter(|i| !i.is_empty()),
        })
    }
}

/// Client handed to the page models.
///
/// Row operations (`row`, `genre_row`, `genres`) are lenient: any upstream
/// failure degrades to an empty collection and is logged, never propagated.
/// Through them an empty result and a failed fetch are indistinguishable.
/// `search` and the per-movie operations stay strict so user-triggered
/// actions can surface failure.
#[derive(Clone)]
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
}

impl CatalogClient {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(Arc::new(TmdbClient::from_settings(settings)))
    }

    pub async fn row(&self, list: MovieList, page: u32) -> Vec<MovieSummary> {
        match self.source.movies(list, page).await {
            Ok(movies) => movies,
            Err(error) => {
                tracing::warn!(list = list.path(), %error, "movie list fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn genre_row(&self, genre_id: u64, page: u32) -> Vec<MovieSummary> {
        match self.source.movies_by_genre(genre_id, page).await {
            Ok(movies) => movies,
            Err(error) => {
                tracing::warn!(genre_id, %error, "genre discovery fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn genres(&self) -> Vec<Genre> {
        match self.source.genres().await {
            Ok(genres) => genres,
            Err(error) => {
                tracing::warn!(%error, "genre list fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, TmdbError> {
        self.source.search(query, DEFAULT_PAGE).await
    }

    pub async fn search_by_genre(&self, genre_id: u64) -> Result<Vec<MovieSummary>, TmdbError> {
        self.source.movies_by_genre(genre_id, DEFAULT_PAGE).await
    }

    pub async fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, TmdbError> {
        self.source.movie_detail(id).await
    }

    pub async fn trailer_key(&self, id: MovieId) -> Result<Option<String>, TmdbError> {
        self.source.trailer_key(id).await
    }

    pub async fn external_ids(&self, id: MovieId) -> Result<ExternalIds, TmdbError> {
        self.source.external_ids(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn movies(&self, _: MovieList, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Err(TmdbError::Network(String::from("connection refused")))
        }

        async fn movies_by_genre(&self, _: u64, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Err(TmdbError::Status(500))
        }

        async fn search(&self, _: &str, _: u32) -> Result<Vec<MovieSummary>, TmdbError> {
            Err(TmdbError::RateLimit)
        }

        async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
            Err(TmdbError::Parse(String::from("unexpected body")))
        }

        async fn movie_detail(&self, _: MovieId) -> Result<MovieDetail, TmdbError> {
            Err(TmdbError::Status(404))
        }

        async fn trailer_key(&self, _: MovieId) -> Result<Option<String>, TmdbError> {
            Err(TmdbError::Status(404))
        }

        async fn external_ids(&self, _: MovieId) -> Result<ExternalIds, TmdbError> {
            Err(TmdbError::Status(404))
        }
    }

    fn failing_client() -> CatalogClient {
        CatalogClient::new(Arc::new(FailingSource))
    }

    #[tokio::test]
    async fn row_operations_never_error() {
        let client = failing_client();
        assert!(client.row(MovieList::Popular, DEFAULT_PAGE).await.is_empty());
        assert!(client.row(MovieList::TopRated, 3).await.is_empty());
        assert!(client.genre_row(28, DEFAULT_PAGE).await.is_empty());
        assert!(client.genres().await.is_empty());
    }

    #[tokio::test]
    async fn search_and_detail_stay_strict() {
        let client = failing_client();
        assert!(matches!(
            client.search("matrix").await,
            Err(TmdbError::RateLimit)
        ));
        assert!(matches!(
            client.movie_detail(603).await,
            Err(TmdbError::Status(404))
        ));
        assert!(matches!(
            client.search_by_genre(28).await,
            Err(TmdbError::Status(500))
        ));
    }
}
