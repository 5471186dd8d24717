use clap::{Parser, Subcommand};
use log::info;
use musicdb::clients::{LocalStorage, SpotifyClient, errors::Result, local_storage::DEFAULT_DB_PATH};
use musicdb::loader::{ConfigBuilder, Loader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "musicdb")]
#[command(version, about = "Populate a local music database from the Spotify catalog", long_about = None)]
struct Cli {
    /// Path of the SQLite database
    #[arg(long, global = true, default_value = DEFAULT_DB_PATH)]
    database: PathBuf,

    /// Log every SQL statement (target `musicdb::sql`, debug level)
    #[arg(long, global = true)]
    echo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables if they are missing
    Init {},
    /// Create the tables and load the configured artists
    Load {},
    /// Print bands, albums and songs in the database
    Show {},
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init {} => {
            open_storage(&cli)?.init_db()?;
            info!("Schema ready in {}", cli.database.display());
        }
        Commands::Load {} => {
            load_artists(open_storage(&cli)?).await?;
        }
        Commands::Show {} => {
            show(&open_storage(&cli)?)?;
        }
    }
    Ok(())
}

fn open_storage(cli: &Cli) -> Result<LocalStorage> {
    let mut storage = LocalStorage::open(&cli.database)?;
    storage.echo(cli.echo);
    Ok(storage)
}

async fn load_artists(storage: LocalStorage) -> Result<()> {
    info!("Building config ...");
    storage.init_db()?;
    let spotify = SpotifyClient::try_default()?;
    info!("Authorizing client ...");
    spotify.authorize_client().await?;

    let config = ConfigBuilder::new()
        .catalog(spotify)
        .storage(storage)
        .build()?;
    let mut loader = Loader::new(config);
    let summary = loader.run().await?;
    info!(
        "Load completed. Bands: {}, albums: {}, songs: {}",
        summary.bands, summary.albums, summary.songs
    );
    Ok(())
}

fn show(storage: &LocalStorage) -> Result<()> {
    for band in storage.bands()? {
        println!("{} (id {})", band.name, band.id);
        for album in storage.albums_of_band(band.id)? {
            let released = album
                .release_date
                .map_or_else(|| "unknown date".to_string(), |d| d.to_string());
            println!("  {} [{released}] (id {})", album.title, album.id);
            for song in storage.songs_of_album(album.id)? {
                println!(
                    "    {:>2}. {} ({:.1}s)",
                    song.track_num, song.title, song.length_seconds
                );
            }
        }
    }
    Ok(())
}
