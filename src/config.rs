use std::fmt;
use std::str::FromStr;

use tracing::Level;

/// Image dimensions as `(height, width, channels)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

impl Shape {
    pub const fn new(height: u32, width: u32, channels: u8) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::new(512, 512, 3)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.width, self.channels)
    }
}

impl FromStr for Shape {
    type Err = String;

    /// Parse `HxWxC`, e.g. `512x512x3`. The channel count defaults to 3 when
    /// only `HxW` is given.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(['x', 'X']).collect();
        let dim = |p: &str| {
            p.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid dimension {p:?} in shape {s:?}: {e}"))
        };

        match parts.as_slice() {
            [h, w] => Ok(Shape::new(dim(h)?, dim(w)?, 3)),
            [h, w, c] => {
                let channels = c
                    .trim()
                    .parse::<u8>()
                    .map_err(|e| format!("invalid channel count {c:?} in shape {s:?}: {e}"))?;
                Ok(Shape::new(dim(h)?, dim(w)?, channels))
            }
            _ => Err(format!("shape must look like HxWxC, got {s:?}")),
        }
    }
}

/// Settings shared by the pipeline helpers.
///
/// Passed explicitly to the operations that need it instead of living in a
/// process-wide global.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shape every input image must have
    pub desired_shape: Shape,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            desired_shape: Shape::default(),
            log_level: Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_shape() {
        let shape: Shape = "256x128x4".parse().unwrap();
        assert_eq!(shape, Shape::new(256, 128, 4));
    }

    #[test]
    fn test_parse_shape_defaults_to_three_channels() {
        let shape: Shape = "64X32".parse().unwrap();
        assert_eq!(shape, Shape::new(64, 32, 3));
    }

    #[test]
    fn test_parse_shape_rejects_garbage() {
        assert!("512".parse::<Shape>().is_err());
        assert!("axbxc".parse::<Shape>().is_err());
        assert!("1x2x3x4".parse::<Shape>().is_err());
        assert!("1x2x300".parse::<Shape>().is_err());
    }

    #[test]
    fn test_display_matches_tuple_layout() {
        assert_eq!(Shape::default().to_string(), "(512, 512, 3)");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.desired_shape, Shape::new(512, 512, 3));
        assert_eq!(config.log_level, Level::INFO);
    }
}
