use std::sync::LazyLock;

use crate::config::LevelConfig;

include!(concat!(env!("OUT_DIR"), "/levels.rs"));

pub struct Level {
    pub name: &'static str,
    pub display_name: String,
    pub config: LevelConfig,
}

impl Level {
    fn parse(name: &'static str, json: &str) -> Option<Self> {
        match LevelConfig::parse(json) {
            Ok(config) => Some(Self {
                name,
                display_name: if config.name.is_empty() {
                    name.to_string()
                } else {
                    config.name.clone()
                },
                config,
            }),
            Err(e) => {
                log::warn!("skipping bundled level {name}: {e}");
                None
            }
        }
    }
}

static LEVELS: LazyLock<Vec<Level>> = LazyLock::new(|| {
    LEVEL_DATA
        .iter()
        .filter_map(|&(name, json)| Level::parse(name, json))
        .collect()
});

pub fn get_level(name: &str) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.name == name)
}

pub fn all() -> &'static [Level] {
    &LEVELS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;

    #[test]
    fn every_bundled_level_parses() {
        assert_eq!(all().len(), LEVEL_DATA.len());
        assert!(!all().is_empty());
    }

    #[test]
    fn bundled_levels_load_into_games() {
        for level in all() {
            let game = Game::from_config(&level.config).unwrap();
            assert_eq!(game.grid().height(), level.config.rows, "{}", level.name);
            assert_eq!(game.grid().width(), level.config.cols, "{}", level.name);
        }
    }

    #[test]
    fn lookup_by_name() {
        let first = &all()[0];
        assert!(std::ptr::eq(get_level(first.name).unwrap(), first));
        assert!(get_level("no/such/level").is_none());
    }
}
