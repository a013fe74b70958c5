pub const DEFAULT_MEASUREMENT_ID: &str = "GA_MEASUREMENT_ID";

/// Analytics settings fixed for the lifetime of a mount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Destination identifier for the tag.
    pub measurement_id: String,
    /// Echo every pushed command and tracked record to the console.
    pub debug: bool,
    /// Replace real form/CTA side effects with on-screen acknowledgments.
    pub test_mode: bool,
    /// Render the event inspector overlay.
    pub show_inspector: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            measurement_id: DEFAULT_MEASUREMENT_ID.to_string(),
            debug: cfg!(debug_assertions),
            test_mode: false,
            show_inspector: cfg!(debug_assertions),
        }
    }
}

impl AnalyticsConfig {
    /// Reads overrides baked in at build time.
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("ANALYTICS_MEASUREMENT_ID"),
            option_env!("ANALYTICS_DEBUG"),
            option_env!("ANALYTICS_TEST_MODE"),
            option_env!("ANALYTICS_INSPECTOR"),
        )
    }

    fn from_values(
        measurement_id: Option<&str>,
        debug: Option<&str>,
        test_mode: Option<&str>,
        inspector: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            measurement_id: measurement_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.measurement_id),
            debug: parse_flag(debug, defaults.debug),
            test_mode: parse_flag(test_mode, defaults.test_mode),
            show_inspector: parse_flag(inspector, defaults.show_inspector),
        }
    }
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            log::warn!("Unrecognized analytics flag value {:?}, using {}", v, default);
            default
        }
        None => default,
    }
}
