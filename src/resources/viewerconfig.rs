//! Viewer configuration resource.
//!
//! Manages viewer settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [viewer]
//! viewport_width = 375
//! initial_variant = black
//!
//! [rotation]
//! time_per_frame = 0.0416667
//! deceleration_duration = 0.5
//! distance_to_progress_factor = 800
//!
//! [transition]
//! time_per_frame = 0.0066667
//! laps = 2
//! max_blur_radius = 15
//!
//! [variant.black]
//! atlas = assets/BlackHelmetAtlas
//! title = Scorpion
//! price = $289.95
//! counter_clockwise = false
//! ```
//!
//! Section and key names are case-insensitive.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_VIEWPORT_WIDTH: f32 = 375.0;
const DEFAULT_INITIAL_VARIANT: &str = "black";
const DEFAULT_ROTATION_TIME_PER_FRAME: f32 = 1.0 / 24.0;
const DEFAULT_DECELERATION_DURATION: f32 = 0.5;
const DEFAULT_DISTANCE_TO_PROGRESS_FACTOR: f32 = 800.0;
const DEFAULT_TRANSITION_TIME_PER_FRAME: f32 = 1.0 / 150.0;
const DEFAULT_TRANSITION_LAPS: u32 = 2;
const DEFAULT_MAX_BLUR_RADIUS: f32 = 15.0;
const DEFAULT_CONFIG_PATH: &str = "./turntable.ini";

const VARIANT_SECTION_PREFIX: &str = "variant.";

/// One selectable product variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConfig {
    pub name: String,
    /// Directory holding the variant's atlas pairs.
    pub atlas_dir: PathBuf,
    pub title: String,
    pub price: String,
    /// Rotation direction of the transition into this variant.
    pub counter_clockwise: bool,
}

impl VariantConfig {
    pub fn new(name: impl Into<String>, atlas_dir: impl Into<PathBuf>) -> Self {
        VariantConfig {
            name: name.into(),
            atlas_dir: atlas_dir.into(),
            title: String::new(),
            price: String::new(),
            counter_clockwise: false,
        }
    }
}

/// Viewer configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct ViewerConfig {
    /// Width of the drag surface in points.
    pub viewport_width: f32,
    /// Variant shown once loading finishes.
    pub initial_variant: String,
    /// Seconds per frame of eased rotations and the idle spin.
    pub rotation_time_per_frame: f32,
    /// Length of the fling deceleration in seconds.
    pub deceleration_duration: f32,
    /// Points of fling travel per unit of progress.
    pub distance_to_progress_factor: f32,
    /// Seconds per frame of transition runs.
    pub transition_time_per_frame: f32,
    /// Full rotations played by each transition run.
    pub transition_laps: u32,
    pub max_blur_radius: f32,
    pub variants: Vec<VariantConfig>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            initial_variant: DEFAULT_INITIAL_VARIANT.to_string(),
            rotation_time_per_frame: DEFAULT_ROTATION_TIME_PER_FRAME,
            deceleration_duration: DEFAULT_DECELERATION_DURATION,
            distance_to_progress_factor: DEFAULT_DISTANCE_TO_PROGRESS_FACTOR,
            transition_time_per_frame: DEFAULT_TRANSITION_TIME_PER_FRAME,
            transition_laps: DEFAULT_TRANSITION_LAPS,
            max_blur_radius: DEFAULT_MAX_BLUR_RADIUS,
            variants: vec![
                VariantConfig {
                    name: "black".to_string(),
                    atlas_dir: PathBuf::from("assets/BlackHelmetAtlas"),
                    title: "Scorpion".to_string(),
                    price: "$289.95".to_string(),
                    counter_clockwise: false,
                },
                VariantConfig {
                    name: "purple".to_string(),
                    atlas_dir: PathBuf::from("assets/PurpleHelmetAtlas"),
                    title: "Chameleon".to_string(),
                    price: "$295.40".to_string(),
                    counter_clockwise: true,
                },
            ],
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn variant(&self, name: &str) -> Option<&VariantConfig> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Variant
    /// sections update the variant of the same name or add a new one.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [viewer] section
        if let Some(width) = config.getfloat("viewer", "viewport_width").ok().flatten() {
            self.viewport_width = width as f32;
        }
        if let Some(initial) = config.get("viewer", "initial_variant") {
            self.initial_variant = initial.to_lowercase();
        }

        // [rotation] section
        if let Some(tpf) = config.getfloat("rotation", "time_per_frame").ok().flatten() {
            self.rotation_time_per_frame = tpf as f32;
        }
        if let Some(d) = config
            .getfloat("rotation", "deceleration_duration")
            .ok()
            .flatten()
        {
            self.deceleration_duration = d as f32;
        }
        if let Some(f) = config
            .getfloat("rotation", "distance_to_progress_factor")
            .ok()
            .flatten()
        {
            self.distance_to_progress_factor = f as f32;
        }

        // [transition] section
        if let Some(tpf) = config.getfloat("transition", "time_per_frame").ok().flatten() {
            self.transition_time_per_frame = tpf as f32;
        }
        if let Some(laps) = config.getuint("transition", "laps").ok().flatten() {
            self.transition_laps = laps as u32;
        }
        if let Some(r) = config.getfloat("transition", "max_blur_radius").ok().flatten() {
            self.max_blur_radius = r as f32;
        }

        // [variant.<name>] sections, in name order for a stable slot order
        let mut names: Vec<String> = config
            .sections()
            .into_iter()
            .filter_map(|s| s.strip_prefix(VARIANT_SECTION_PREFIX).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        for name in names {
            let section = format!("{}{}", VARIANT_SECTION_PREFIX, name);
            let index = match self.variants.iter().position(|v| v.name == name) {
                Some(i) => i,
                None => {
                    self.variants
                        .push(VariantConfig::new(name.clone(), PathBuf::from(&name)));
                    self.variants.len() - 1
                }
            };
            let variant = &mut self.variants[index];
            if let Some(atlas) = config.get(&section, "atlas") {
                variant.atlas_dir = PathBuf::from(atlas);
            }
            if let Some(title) = config.get(&section, "title") {
                variant.title = title;
            }
            if let Some(price) = config.get(&section, "price") {
                variant.price = price;
            }
            if let Some(ccw) = config.getbool(&section, "counter_clockwise").ok().flatten() {
                variant.counter_clockwise = ccw;
            }
        }

        info!(
            "Loaded config: viewport={}, initial={}, rotation tpf={:.4}, transition tpf={:.4} x{} laps, {} variants",
            self.viewport_width,
            self.initial_variant,
            self.rotation_time_per_frame,
            self.transition_time_per_frame,
            self.transition_laps,
            self.variants.len()
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [viewer] section
        config.set("viewer", "viewport_width", Some(self.viewport_width.to_string()));
        config.set("viewer", "initial_variant", Some(self.initial_variant.clone()));

        // [rotation] section
        config.set(
            "rotation",
            "time_per_frame",
            Some(self.rotation_time_per_frame.to_string()),
        );
        config.set(
            "rotation",
            "deceleration_duration",
            Some(self.deceleration_duration.to_string()),
        );
        config.set(
            "rotation",
            "distance_to_progress_factor",
            Some(self.distance_to_progress_factor.to_string()),
        );

        // [transition] section
        config.set(
            "transition",
            "time_per_frame",
            Some(self.transition_time_per_frame.to_string()),
        );
        config.set("transition", "laps", Some(self.transition_laps.to_string()));
        config.set(
            "transition",
            "max_blur_radius",
            Some(self.max_blur_radius.to_string()),
        );

        for variant in &self.variants {
            let section = format!("{}{}", VARIANT_SECTION_PREFIX, variant.name);
            config.set(
                &section,
                "atlas",
                Some(variant.atlas_dir.to_string_lossy().into_owned()),
            );
            config.set(&section, "title", Some(variant.title.clone()));
            config.set(&section, "price", Some(variant.price.clone()));
            config.set(
                &section,
                "counter_clockwise",
                Some(variant.counter_clockwise.to_string()),
            );
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_widget() {
        let config = ViewerConfig::new();
        assert_eq!(config.initial_variant, "black");
        assert_eq!(config.transition_laps, 2);
        assert!((config.rotation_time_per_frame - 1.0 / 24.0).abs() < 1e-6);
        assert!((config.transition_time_per_frame - 1.0 / 150.0).abs() < 1e-6);
        assert_eq!(config.max_blur_radius, 15.0);
        let purple = config.variant("purple").unwrap();
        assert!(purple.counter_clockwise);
        assert_eq!(purple.title, "Chameleon");
        assert!(!config.variant("black").unwrap().counter_clockwise);
    }

    #[test]
    fn missing_file_is_an_error_and_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let mut config = ViewerConfig::with_path(tmp.path().join("absent.ini"));
        assert!(config.load_from_file().is_err());
        assert_eq!(config.viewport_width, DEFAULT_VIEWPORT_WIDTH);
    }

    #[test]
    fn partial_file_overrides_only_present_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("viewer.ini");
        fs::write(
            &path,
            "[viewer]\nviewport_width = 500\n\n[transition]\nlaps = 3\n\n\
             [variant.purple]\nprice = $300.00\n\n[variant.red]\natlas = atlases/red\ntitle = Ember\n",
        )
        .unwrap();
        let mut config = ViewerConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.viewport_width, 500.0);
        assert_eq!(config.transition_laps, 3);
        assert_eq!(config.deceleration_duration, DEFAULT_DECELERATION_DURATION);
        let purple = config.variant("purple").unwrap();
        assert_eq!(purple.price, "$300.00");
        assert_eq!(purple.title, "Chameleon");
        let red = config.variant("red").unwrap();
        assert_eq!(red.atlas_dir, PathBuf::from("atlases/red"));
        assert_eq!(red.title, "Ember");
        assert_eq!(config.variants.len(), 3);
    }

    #[test]
    fn saved_file_loads_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("viewer.ini");
        let mut saved = ViewerConfig::with_path(&path);
        saved.viewport_width = 640.0;
        saved.initial_variant = "purple".to_string();
        saved.variants[0].counter_clockwise = true;
        saved.save_to_file().unwrap();

        let mut loaded = ViewerConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.viewport_width, 640.0);
        assert_eq!(loaded.initial_variant, "purple");
        assert_eq!(loaded.variants, saved.variants);
    }
}
