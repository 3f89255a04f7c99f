use crate::color::Color;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

const DEFAULT_TARGET: &str = "animated-background";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) struct Config {
    /// The animation configuration.
    #[serde(default)]
    pub animator: AnimatorConfig,

    /// The terminal rendering configuration.
    #[serde(default)]
    pub render: RenderConfig,

    /// The elements on screen.
    #[serde(default)]
    pub document: DocumentConfig,
}

impl Config {
    /// Load the configuration in the file at `path`.
    ///
    /// This doesn't validate it: callers apply their overrides first and validate the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&contents)
    }

    /// Load the configuration from the default path, falling back to the defaults if there's no
    /// file there.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "backdrop")?;
        Some(dirs.config_dir().join("config.yaml"))
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        // An empty document is not a valid mapping as far as serde_yaml is concerned.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animator.period_millis == 0 {
            return Err(ConfigError::Invalid("animator period must be greater than zero".into()));
        }
        if self.animator.target.is_empty() {
            return Err(ConfigError::Invalid("animator target can't be empty".into()));
        }
        if self.render.frames_per_second == 0 {
            return Err(ConfigError::Invalid("frames per second must be greater than zero".into()));
        }
        if self.document.elements.iter().any(|element| element.id.is_empty()) {
            return Err(ConfigError::Invalid("element ids can't be empty".into()));
        }
        Ok(())
    }

    /// Whether a cycle can fade out before the previous one faded back in.
    ///
    /// A cycle is done once its fade delay elapsed and its fade in frames were drawn.
    pub fn has_overlapping_cycles(&self) -> bool {
        let fade_in = self.render.frame_interval() * u32::from(self.animator.fade_in_frames);
        let cycle = Duration::from_millis(self.animator.fade_delay_millis) + fade_in;
        cycle >= Duration::from_millis(self.animator.period_millis)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) struct AnimatorConfig {
    /// The id of the element to animate.
    pub target: String,

    /// The time between the start of two cycles, in milliseconds.
    pub period_millis: u64,

    /// The time between fading out and applying the next gradient, in milliseconds.
    pub fade_delay_millis: u64,

    /// The number of animation frames to wait before fading back in.
    pub fade_in_frames: u8,

    /// The angle to start from, in degrees.
    pub initial_angle: u16,

    /// The seed for color generation. Colors are different on every run if this is not set.
    pub seed: Option<u64>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.into(),
            period_millis: 5000,
            fade_delay_millis: 2000,
            fade_in_frames: 2,
            initial_angle: 0,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) struct RenderConfig {
    /// How many frames to draw per second.
    pub frames_per_second: u16,

    /// How long an opacity change takes to show up on screen, in milliseconds.
    pub transition_millis: u64,

    /// The color behind every element, in `#rrggbb` form.
    #[cfg_attr(feature = "json-schema", schemars(with = "String"))]
    pub backdrop: Color,
}

impl RenderConfig {
    pub(crate) fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frames_per_second.max(1) as u32
    }

    pub(crate) fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_millis)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { frames_per_second: 30, transition_millis: 2000, backdrop: Color::BLACK }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) struct DocumentConfig {
    /// The elements, painted in order.
    pub elements: Vec<ElementConfig>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self { elements: vec![ElementConfig { id: DEFAULT_TARGET.into(), margin: 0 }] }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) struct ElementConfig {
    /// The element's id.
    pub id: String,

    /// The number of cells between the element and each edge of the screen.
    #[serde(default)]
    pub margin: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
