// novade-system/src/compositor/config/mod.rs
use serde::{Deserialize, Serialize};

// ANCHOR[id=main_config_struct]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub visual: VisualConfig,
}

// ANCHOR[id=performance_config_struct]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub gpu_performance_settings: Option<String>, // Placeholder, to be detailed
    pub rendering_quality_presets: Option<String>, // Placeholder, to be detailed
    pub memory_usage_limits: Option<String>, // Placeholder, to be detailed
    pub power_management_settings: Option<String>, // Placeholder, to be detailed
    pub adaptive_performance_tuning: Option<bool>, // Placeholder, to be detailed
}

// ANCHOR[id=input_config_struct]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub keyboard_layout: Option<String>, // Placeholder, to be detailed (e.g., XKB integration)
    pub pointer_acceleration_settings: Option<String>, // Placeholder, to be detailed
    pub touch_gesture_configuration: Option<String>, // Placeholder, to be detailed
    pub multi_device_configuration: Option<String>, // Placeholder, to be detailed
    pub input_device_profiles: Option<String>, // Placeholder, to be detailed
}

// ANCHOR[id=visual_config_struct]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    pub theme_configuration: Option<String>, // Placeholder, to be detailed
    pub color_scheme_settings: Option<String>, // Placeholder, e.g., "dark", "light"
    pub font_configuration: Option<String>, // Placeholder, to be detailed
    pub animation_settings: Option<String>, // Placeholder, to be detailed
    pub custom_shader_loading: Option<String>, // Placeholder, to be detailed
}

// ANCHOR[id=config_impl]
impl Config {
    // TODO[issue=config_loading]: Implement loading from file
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Placeholder: Load default configuration
        Ok(Config::default())
    }

    // TODO[issue=config_saving]: Implement saving to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        // Placeholder: Save current configuration
        Ok(())
    }

    // TODO[issue=config_validation]: Implement validation logic
    pub fn validate(&self) -> Result<(), Vec<String>> {
        // Placeholder: Validate configuration
        Ok(())
    }
}

// ANCHOR[id=tests_module]
#[cfg(test)]
mod tests {
    use super::*;

    // ANCHOR[id=test_default_config]
    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.performance.adaptive_performance_tuning, Some(false)); // Example assertion
        // TODO[issue=tests_detail]: Add more detailed assertions for default values
    }

    // ANCHOR[id=test_load_save_config]
    #[test]
    fn test_load_save_config() {
        // TODO[issue=config_load_save_tests]: Implement tests for loading and saving configuration
        // This will require actual file operations and a sample config file.
        // For now, this is a placeholder.
        let config = Config::load().unwrap();
        config.save().unwrap();
    }
}
