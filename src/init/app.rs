use std::path::Path;

use super::json;
use crate::{App, LandingRules};

impl App {
    pub fn try_from_file<P: AsRef<Path>>(scene_file_path: P, seed: u64) -> Result<Self, String> {
        let scene = json::parse_scene(scene_file_path)?;
        Ok(Self::new(scene, LandingRules::new(seed)))
    }
}
