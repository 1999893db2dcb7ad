// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use config::{Config, File};

use crate::manager::Manager;
use crate::patterns::SharedPatterns;
use crate::{sink, store};

mod error;
mod player;
mod vocabulary;

pub use self::error::ConfigError;
pub use self::player::Player;
pub use self::vocabulary::Vocabulary;

/// Loads the player configuration from a YAML file.
pub fn load(path: &Path) -> Result<Player, ConfigError> {
    Ok(Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize()?)
}

/// Opens the configured store and loads the manager from it.
pub fn init_manager(config: &Player) -> Result<Manager, Box<dyn Error>> {
    let store = store::get_store(config.store())?;
    Ok(Manager::new(
        store,
        config.name_rules()?,
        config.capture_times().to_vec(),
    )?)
}

/// Creates a player that plays the given patterns through the configured sink.
pub fn init_player(
    config: &Player,
    patterns: SharedPatterns,
) -> Result<crate::player::Player, Box<dyn Error>> {
    let sink: Arc<dyn sink::Sink> = sink::get_sink(config.sink())?;
    Ok(crate::player::Player::new(
        sink,
        patterns,
        config.wait_after_scaling()?,
    ))
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;
    use std::time::Duration;

    use crate::store::Store;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("vibrator.yaml");
        fs::write(&path, contents).expect("failed to write config");
        path
    }

    #[test]
    fn test_load_defaults() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_config(&dir, "store: mock-store\n");

        let config = super::load(&path)?;
        assert_eq!("mock-store", config.store());
        assert_eq!("log", config.sink());
        assert_eq!(20, config.max_name_length());
        assert_eq!(&[5, 10, 15, 20, 30], config.capture_times());
        assert_eq!(Duration::from_millis(500), config.wait_after_scaling()?);

        let vocabulary = config.vocabulary()?;
        assert_eq!("start", vocabulary.start.word);
        assert_eq!("disable", vocabulary.disable.word);
        Ok(())
    }

    #[test]
    fn test_load_overrides() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let store_path = dir.path().join("patterns.yaml");
        let path = write_config(
            &dir,
            &format!(
                r#"
store: {}
sink: mock-sink
max_name_length: 8
capture_times: [3, 6]
wait_after_scaling: 1s
vocabulary:
  start: begin
  stop: halt
"#,
                store_path.display()
            ),
        );

        let config = super::load(&path)?;
        assert_eq!(8, config.max_name_length());
        assert_eq!(&[3, 6], config.capture_times());
        assert_eq!(Duration::from_secs(1), config.wait_after_scaling()?);

        let vocabulary = config.vocabulary()?;
        assert_eq!("begin", vocabulary.start.word);
        assert_eq!("halt", vocabulary.stop.word);
        assert_eq!("increase", vocabulary.increase.word);

        let manager = super::init_manager(&config)?;
        assert_eq!(&[3, 6], manager.capture_times());
        assert_eq!(2, manager.patterns().read().len());
        assert!(store_path.exists());

        let player = super::init_player(&config, manager.patterns())?;
        assert_eq!(Some("CONTINUOUS"), player.selected());

        // The store was seeded on open.
        let store = crate::store::yaml::Store::open(&store_path)?;
        assert_eq!(2, store.load_all()?.len());
        Ok(())
    }

    #[test]
    fn test_load_errors() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        assert!(super::load(&dir.path().join("missing.yaml")).is_err());

        let path = write_config(&dir, "sink: log\n");
        assert!(super::load(&path).is_err());

        let path = write_config(&dir, "store: mock\nwait_after_scaling: soon\n");
        assert!(super::load(&path)?.wait_after_scaling().is_err());

        let path = write_config(&dir, "store: mock\nvocabulary:\n  stop: \"  \"\n");
        assert!(super::load(&path)?.vocabulary().is_err());
        Ok(())
    }
}
