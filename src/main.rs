use marquee::home::HomePage;
use marquee::media::HOME_CATEGORIES;
use marquee::screen::ScreenRuntime;
use marquee::settings::AppSettings;
use marquee::tmdb::CatalogClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Headless smoke driver: mounts the home aggregate, drives it until every
/// fetch settles, and logs what each row ended up holding.
#[tokio::main]
async fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(settings) = AppSettings::load() else {
        tracing::error!(
            "no configuration found; write your TMDB API key to {:?}",
            AppSettings::config_path()
        );
        std::process::exit(1);
    };
    if !settings.is_valid() {
        tracing::error!("configuration has no TMDB API key set");
        std::process::exit(1);
    }

    let client = CatalogClient::from_settings(&settings);
    let mut home = HomePage::new(client);
    let mut runtime = ScreenRuntime::new();
    runtime.spawn_all(home.mount());
    runtime.run_until_idle(&mut home).await;

    tracing::info!(movies = home.popular.len(), "popular row");
    for (category, row) in HOME_CATEGORIES.iter().zip(&home.by_category) {
        tracing::info!(category = category.name, movies = row.len(), "category row");
    }
    tracing::info!(genres = home.genres.len(), "genre list");
    if let Some(genre_id) = home.selected_genre {
        tracing::info!(genre_id, movies = home.by_genre.len(), "genre row");
    }
}
