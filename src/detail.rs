use crate::embed;
use crate::error::TmdbError;
use crate::media::{ExternalIds, LoadingState, MovieDetail, MovieId};
use crate::screen::{effect, Effect, Screen};
use crate::session::SessionState;
use crate::tmdb::CatalogClient;

#[derive(Debug)]
pub enum DetailMessage {
    DetailLoaded(Result<MovieDetail, TmdbError>),
    TrailerLoaded(Result<Option<String>, TmdbError>),
    ExternalIdsLoaded(Result<ExternalIds, TmdbError>),
}

/// Detail screen model for one movie. The three upstream lookups are
/// independent; each failure leaves only its own field absent.
pub struct DetailPage {
    client: CatalogClient,
    movie_id: MovieId,
    pub detail: Option<MovieDetail>,
    pub trailer_key: Option<String>,
    pub external_ids: ExternalIds,
    pub load_state: LoadingState,
}

impl DetailPage {
    pub fn new(client: CatalogClient, movie_id: MovieId) -> Self {
        Self {
            client,
            movie_id,
            detail: None,
            trailer_key: None,
            external_ids: ExternalIds::default(),
            load_state: LoadingState::Idle,
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    /// Issues the detail, trailer and external-id lookups together.
    pub fn mount(&mut self) -> Vec<Effect<DetailMessage>> {
        self.load_state = LoadingState::Loading;
        let id = self.movie_id;

        let client = self.client.clone();
        let detail = effect(async move {
            DetailMessage::DetailLoaded(client.movie_detail(id).await)
        });

        let client = self.client.clone();
        let trailer = effect(async move {
            DetailMessage::TrailerLoaded(client.trailer_key(id).await)
        });

        let client = self.client.clone();
        let ids = effect(async move {
            DetailMessage::ExternalIdsLoaded(client.external_ids(id).await)
        });

        vec![detail, trailer, ids]
    }

    /// The embeddable player URL, only for an authenticated session. The
    /// IMDB id is preferred; the native id covers movies without one.
    pub fn watch_url(&self, session: &SessionState) -> Option<String> {
        if !session.is_authenticated() {
            return None;
        }
        Some(embed::watch_url(
            self.external_ids.imdb_id.as_deref(),
            self.movie_id,
        ))
    }

    pub fn trailer_url(&self) -> Option<String> {
        self.trailer_key.as_deref().map(embed::trailer_url)
    }
}

impl Screen for DetailPage {
    type Message = DetailMessage;

    fn update(&mut self, message: DetailMessage) -> Vec<Effect<DetailMessage>> {
        match message {
            DetailMessage::DetailLoaded(Ok(detail)) => {
                self.detail = Some(detail);
                self.load_state = LoadingState::Idle;
            }
            DetailMessage::DetailLoaded(Err(error)) => {
                tracing::warn!(movie_id = self.movie_id, %error, "movie detail fetch failed");
                self.load_state = LoadingState::Error(error.to_string());
            }
            DetailMessage::TrailerLoaded(Ok(key)) => {
                self.trailer_key = key;
            }
            DetailMessage::TrailerLoaded(Err(error)) => {
                tracing::warn!(movie_id = self.movie_id, %error, "trailer lookup failed");
            }
            DetailMessage::ExternalIdsLoaded(Ok(ids)) => {
                self.external_ids = ids;
            }
            DetailMessage::ExternalIdsLoaded(Err(error)) => {
                tracing::warn!(movie_id = self.movie_id, %error, "external-id lookup failed");
            }
        }
        Vec::new()
    }
}
