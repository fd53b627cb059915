use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use utadex::modules::catalog::CatalogRepositoryImpl;
use utadex::modules::importer::ImportService;
use utadex::modules::library::domain::LibraryFilter;
use utadex::modules::library::{LibraryRepositoryImpl, LibraryService};
use utadex::modules::provider::{AmqClient, AniListClient, AniSongDbClient};
use utadex::modules::sync::{
    MasterListScrape, MasterListSync, ScrapeOptions, SeedDriver, SeedOptions,
};
use utadex::shared::utils::logger::init_logger;
use utadex::{Database, Settings};

#[derive(Parser)]
#[command(name = "utadex", about = "Anime song catalog importers and sync drivers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import one anime from AniList (idempotent) and its songs
    ImportAnime {
        anilist_id: i64,
        /// Skip the AniSongDB song import, only upsert the anime
        #[arg(long)]
        skip_songs: bool,
    },
    /// Import one AMQ song with every anime it appears in
    ImportAmqSong { amq_song_id: i64 },
    /// Deep-import a person from AniSongDB
    ImportPerson {
        anisongdb_id: i64,
        /// Skip importing the person's songs/links/credits
        #[arg(long)]
        skip_songs: bool,
    },
    /// Delta-sync the AMQ master list into the catalog
    SyncMasterList {
        #[arg(long, default_value = ".sync_state.json")]
        state: PathBuf,
        /// Import requests per second
        #[arg(long, default_value_t = 0.5)]
        target_rps: f64,
    },
    /// Scrape a saved master list file, resuming from a state file
    ScrapeMasterList {
        /// Path to a saved libraryMasterList.json
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value_t = 2)]
        concurrency: usize,
        /// Base delay between imports per worker, in seconds
        #[arg(long, default_value_t = 1.0)]
        sleep: f64,
        /// Fractional jitter around the delay (0.0..=1.0)
        #[arg(long, default_value_t = 0.4)]
        jitter: f64,
        #[arg(long, default_value = ".amq_scrape_state.json")]
        resume_state: PathBuf,
    },
    /// Seed the catalog from the AniList popularity ranking
    SeedTop {
        #[arg(long, default_value_t = 5000)]
        limit: usize,
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
        /// Also re-import each credited person's full song list
        #[arg(long)]
        deep_person_songs: bool,
    },
    /// List an anime's songs with their OP/ED/insert usages
    Songs {
        anime_id: Uuid,
        /// Import from AniSongDB first when the catalog has none
        #[arg(long)]
        import: bool,
    },
    /// Rate a song in a user's library
    Rate {
        user_id: Uuid,
        song_id: Uuid,
        /// Score from 0 to 100
        score: i16,
        #[arg(long)]
        favorite: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove a song rating from a user's library
    Unrate { user_id: Uuid, song_id: Uuid },
    /// List a user's library entries
    Library {
        user_id: Uuid,
        #[arg(long)]
        min_score: Option<i16>,
        #[arg(long)]
        favorites: bool,
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("loading configuration")?;
    let db = Arc::new(Database::new(&settings.database_url).context("connecting to database")?);

    let catalog: Arc<CatalogRepositoryImpl> = Arc::new(CatalogRepositoryImpl::new(db.clone()));
    let anilist = Arc::new(AniListClient::new(settings.anilist_rps));

    match cli.command {
        Command::ImportAnime {
            anilist_id,
            skip_songs,
        } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let anime = importer.import_anime_from_anilist(anilist_id).await?;
            println!(
                "Imported anime {} ({})",
                anime.id,
                anime
                    .title_romaji
                    .or(anime.title_en)
                    .unwrap_or_else(|| "untitled".to_string())
            );
            if !skip_songs {
                let songs = importer.import_songs_for_anime(anime.id).await?;
                println!("Linked {} songs", songs.len());
            }
        }
        Command::ImportAmqSong { amq_song_id } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let (song, animes) = importer.import_by_amq_song_id(amq_song_id).await?;
            println!("Imported song '{}' across {} anime", song.name, animes.len());
        }
        Command::ImportPerson {
            anisongdb_id,
            skip_songs,
        } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let person = importer.import_person_deep(anisongdb_id, !skip_songs).await?;
            println!("Imported {} ({})", person.primary_name, person.kind);
        }
        Command::SyncMasterList { state, target_rps } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let amq = AmqClient::new();
            let sync = MasterListSync::new(&amq, &importer, target_rps);
            let imported = sync.run(&state).await?;
            println!("Imported {} new songs", imported);
        }
        Command::ScrapeMasterList {
            file,
            concurrency,
            sleep,
            jitter,
            resume_state,
        } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let options = ScrapeOptions {
                concurrency,
                base_sleep: Duration::from_secs_f64(sleep.max(0.0)),
                jitter,
            };
            let scrape = MasterListScrape::new(&importer, options);

            let cancel = CancellationToken::new();
            let cancel_on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupt received; finishing in-flight imports");
                    cancel_on_signal.cancel();
                }
            });

            let imported = scrape.run(&file, &resume_state, cancel).await?;
            println!("Imported {} songs", imported);
        }
        Command::SeedTop {
            limit,
            concurrency,
            deep_person_songs,
        } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let options = SeedOptions {
                limit,
                concurrency,
                deep_person_songs,
            };
            let driver = SeedDriver::new(&anilist, &importer, catalog.clone(), options);
            let summary = driver.run().await?;
            println!(
                "Seeded {} anime ({} errors), {} people ({} errors)",
                summary.anime_imported,
                summary.anime_errors,
                summary.people_imported,
                summary.people_errors
            );
        }
        Command::Songs { anime_id, import } => {
            let importer = build_importer(&settings, catalog.clone(), anilist.clone())?;
            let songs = importer.songs_for_anime(anime_id, import).await?;
            let names: HashMap<Uuid, String> =
                songs.into_iter().map(|s| (s.id, s.name)).collect();

            let links = importer.song_links(anime_id).await?;
            for link in &links {
                let seq = link.sequence.map(|n| n.to_string()).unwrap_or_default();
                let name = names
                    .get(&link.song_id)
                    .map(String::as_str)
                    .unwrap_or("(unknown)");
                let dub = if link.is_dub { "  [dub]" } else { "" };
                println!("{}{:<3} {}{}", link.use_type, seq, name, dub);
            }
            println!("{} links", links.len());
        }
        Command::Rate {
            user_id,
            song_id,
            score,
            favorite,
            note,
        } => {
            let library = build_library(db.clone(), catalog.clone());
            let rating = library
                .upsert_rating(user_id, song_id, score, favorite, note)
                .await?;
            println!(
                "Rating {} -> score {} (favorite: {})",
                rating.id, rating.score, rating.is_favorite
            );
        }
        Command::Unrate { user_id, song_id } => {
            let library = build_library(db.clone(), catalog.clone());
            library.remove_rating(user_id, song_id).await?;
            println!("Removed rating for song {}", song_id);
        }
        Command::Library {
            user_id,
            min_score,
            favorites,
            limit,
        } => {
            let library = build_library(db.clone(), catalog.clone());
            let filter = LibraryFilter {
                min_score,
                is_favorite: favorites.then_some(true),
                offset: 0,
                limit,
            };
            let ratings = library.list_library(user_id, filter).await?;
            for r in &ratings {
                println!(
                    "{}  score:{:>3}  fav:{}  song:{}",
                    r.id, r.score, r.is_favorite, r.song_id
                );
            }
            println!("{} entries", ratings.len());
        }
    }

    Ok(())
}

fn build_importer(
    settings: &Settings,
    catalog: Arc<CatalogRepositoryImpl>,
    anilist: Arc<AniListClient>,
) -> anyhow::Result<ImportService> {
    let base = settings.require_anisongdb_base()?.to_string();
    let anisongdb = Arc::new(AniSongDbClient::new(base, settings.anisongdb_rps));
    Ok(ImportService::new(catalog, anilist, anisongdb))
}

fn build_library(db: Arc<Database>, catalog: Arc<CatalogRepositoryImpl>) -> LibraryService {
    LibraryService::new(Arc::new(LibraryRepositoryImpl::new(db)), catalog)
}
