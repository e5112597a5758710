use serde::Deserialize;

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/200x300.png?text=No+Image";

pub type MovieId = u64;

/// Builds the render-ready poster URL for an upstream path fragment.
/// Absent fragments degrade to the placeholder, never to a broken link.
pub fn poster_image_url(path: Option<&str>) -> String {
    match path {
        Some(fragment) if !fragment.is_empty() => format!("{}{}", IMAGE_BASE_URL, fragment),
        _ => String::from(PLACEHOLDER_IMAGE_URL),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    Idle,
    Loading,
    Error(String),
}

/// The fixed list selectors the metadata upstream serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieList {
    Popular,
    NowPlaying,
    TopRated,
}

impl MovieList {
    pub fn path(self) -> &'static str {
        match self {
            MovieList::Popular => "/movie/popular",
            MovieList::NowPlaying => "/movie/now_playing",
            MovieList::TopRated => "/movie/top_rated",
        }
    }
}

/// A named home-page row backed by one list endpoint. Row order on the
/// page is the order of `HOME_CATEGORIES`; results for category `i` must
/// always land in row `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub list: MovieList,
}

pub const HOME_CATEGORIES: [Category; 2] = [
    Category {
        name: "Now Playing",
        list: MovieList::NowPlaying,
    },
    Category {
        name: "Top Rated",
        list: MovieList::TopRated,
    },
];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Search-only genre selector. `id: None` is the reserved "no filter"
/// sentinel, labelled "All" and always listed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreFilter {
    pub id: Option<u64>,
    pub name: String,
}

impl GenreFilter {
    pub fn all() -> Self {
        Self {
            id: None,
            name: String::from("All"),
        }
    }
}

/// Turns a fetched genre list into the search filter row, "All" first.
pub fn genre_filters(genres: &[Genre]) -> Vec<GenreFilter> {
    let mut filters = Vec::with_capacity(genres.len() + 1);
    filters.push(GenreFilter::all());
    filters.extend(genres.iter().map(|g| GenreFilter {
        id: Some(g.id),
        name: g.name.clone(),
    }));
    filters
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub image: String,
    pub rating: f32,
    pub release_date: Option<String>,
    pub genre_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub image: String,
    pub rating: f32,
    pub release_date: Option<String>,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIds {
    pub imdb_id: Option<String>,
}

// Upstream response shapes. One normalization rule maps these into the
// domain records above; every consumer goes through it.

#[derive(Debug, Clone, Deserialize)]
pub struct MovieRecord {
    pub id: u64,
    pub title: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    pub results: Vec<MovieRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreListResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailRecord {
    pub id: u64,
    pub title: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    pub release_date: Option<String>,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoEntry {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    pub results: Vec<VideoEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIdsResponse {
    pub imdb_id: Option<String>,
}

impl From<MovieRecord> for MovieSummary {
    fn from(record: MovieRecord) -> Self {
        let image = poster_image_url(record.poster_path.as_deref());
        Self {
            id: record.id,
            title: record.title.unwrap_or_default(),
            overview: record.overview,
            poster_path: record.poster_path,
            image,
            rating: record.vote_average,
            release_date: record.release_date.filter(|d| !d.is_empty()),
            genre_ids: record.genre_ids,
        }
    }
}

impl From<MovieDetailRecord> for MovieDetail {
    fn from(record: MovieDetailRecord) -> Self {
        let image = poster_image_url(record.poster_path.as_deref());
        Self {
            id: record.id,
            title: record.title.unwrap_or_default(),
            overview: record.overview,
            poster_path: record.poster_path,
            image,
            rating: record.vote_average,
            release_date: record.release_date.filter(|d| !d.is_empty()),
            tagline: record.tagline.filter(|t| !t.is_empty()),
            runtime: record.runtime,
            genres: record.genres,
        }
    }
}

/// First entry that is exactly a YouTube-hosted trailer, in upstream
/// order. No recency or quality ranking.
pub fn first_youtube_trailer(videos: &[VideoEntry]) -> Option<&VideoEntry> {
    videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
}
