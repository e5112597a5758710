use crate::media::MovieId;

const WATCH_BASE_URL: &str = "https://vidsrc.me/embed/movie";
const TRAILER_BASE_URL: &str = "https://www.youtube.com/embed";

/// Builds the player embed URL for a movie. The IMDB id is preferred when
/// known; the native catalog id works as a fallback on the same endpoint.
pub fn watch_url(imdb_id: Option<&str>, movie_id: MovieId) -> String {
    match imdb_id.filter(|id| !id.is_empty()) {
        Some(imdb) => format!("{}?imdb={}", WATCH_BASE_URL, imdb),
        None => format!("{}?tmdb={}", WATCH_BASE_URL, movie_id),
    }
}

pub fn trailer_url(key: &str) -> String {
    format!("{}/{}?modestbranding=1&rel=0", TRAILER_BASE_URL, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_imdb_id() {
        assert_eq!(
            watch_url(Some("tt0133093"), 603),
            "https://vidsrc.me/embed/movie?imdb=tt0133093"
        );
    }

    #[test]
    fn falls_back_to_catalog_id() {
        assert_eq!(
            watch_url(None, 603),
            "https://vidsrc.me/embed/movie?tmdb=603"
        );
        assert_eq!(
            watch_url(Some(""), 603),
            "https://vidsrc.me/embed/movie?tmdb=603"
        );
    }

    #[test]
    fn trailer_embeds_by_key() {
        assert_eq!(
            trailer_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?modestbranding=1&rel=0"
        );
    }
}
