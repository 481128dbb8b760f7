use dotenv::dotenv;
use flagbot::arena::{Arena, DEFAULT_ARENA};
use flagbot::game::Game;
use flagbot::infra::{Config, DefaultObserver, ReplayFile};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flagbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = Config::from_env()?;
    let arena = match &config.map_path {
        Some(path) => {
            info!("Loading arena from {}", path.display());
            Arena::load(path)?
        }
        None => Arena::parse(DEFAULT_ARENA)?,
    };

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut game = Game::new(arena, &config, rng, DefaultObserver);
    if let Some(folder) = &config.replays_folder {
        match ReplayFile::new(folder) {
            Ok(replay) => {
                info!("Recording replay to {}", replay.path().display());
                game = game.with_replay(replay);
            }
            Err(err) => warn!("Replay disabled: {}", err),
        }
    }

    game.run()?;
    Ok(())
}
