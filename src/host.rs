//! Startup guards. The backdrop is decoration: when the host cannot show
//! it, setup is skipped quietly instead of failing.

use std::fmt;

use crate::config::SceneConfig;
use crate::core::DisplayContext;

/// What the animator needs to know about its environment before building anything
pub trait Host {
    /// True when the primary input is touch
    fn is_touch_device(&self) -> bool;
    /// True when a usable graphics adapter exists
    fn has_graphics(&self) -> bool;
    /// Drawable area of the mount point with this id, if it exists
    fn container(&self, id: &str) -> Option<DisplayContext>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TouchDevice,
    GraphicsUnavailable,
    MissingContainer(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TouchDevice => write!(f, "touch-primary device"),
            SkipReason::GraphicsUnavailable => write!(f, "no graphics adapter"),
            SkipReason::MissingContainer(id) => write!(f, "no mount point with id '{}'", id),
        }
    }
}

/// Run the guards in order: touch, graphics, mount point
pub fn check(host: &dyn Host, config: &SceneConfig) -> Result<DisplayContext, SkipReason> {
    if config.skip_on_touch && host.is_touch_device() {
        return Err(SkipReason::TouchDevice);
    }
    if !host.has_graphics() {
        return Err(SkipReason::GraphicsUnavailable);
    }
    host.container(&config.mount_id)
        .ok_or_else(|| SkipReason::MissingContainer(config.mount_id.clone()))
}

/// Native host: one window, registered under a single mount id
#[derive(Debug, Clone)]
pub struct WindowHost {
    pub touch: bool,
    pub graphics: bool,
    pub mount_id: String,
    pub size: DisplayContext,
}

impl Host for WindowHost {
    fn is_touch_device(&self) -> bool {
        self.touch
    }

    fn has_graphics(&self) -> bool {
        self.graphics
    }

    fn container(&self, id: &str) -> Option<DisplayContext> {
        (id == self.mount_id).then_some(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct MockHost {
        touch: bool,
        graphics: bool,
        container: Option<DisplayContext>,
        container_lookups: Cell<u32>,
    }

    impl MockHost {
        fn ready() -> Self {
            Self {
                touch: false,
                graphics: true,
                container: Some(DisplayContext::new(1280, 720)),
                container_lookups: Cell::new(0),
            }
        }
    }

    impl Host for MockHost {
        fn is_touch_device(&self) -> bool {
            self.touch
        }

        fn has_graphics(&self) -> bool {
            self.graphics
        }

        fn container(&self, _id: &str) -> Option<DisplayContext> {
            self.container_lookups.set(self.container_lookups.get() + 1);
            self.container
        }
    }

    #[test]
    fn all_guards_pass() {
        let host = MockHost::ready();
        let viewport = check(&host, &SceneConfig::default()).unwrap();
        assert_eq!(viewport, DisplayContext::new(1280, 720));
    }

    #[test]
    fn touch_device_skips_first() {
        let host = MockHost {
            touch: true,
            graphics: false,
            container: None,
            ..MockHost::ready()
        };
        assert_eq!(check(&host, &SceneConfig::default()), Err(SkipReason::TouchDevice));
        assert_eq!(host.container_lookups.get(), 0);
    }

    #[test]
    fn touch_allowed_when_configured() {
        let host = MockHost {
            touch: true,
            ..MockHost::ready()
        };
        let config = SceneConfig {
            skip_on_touch: false,
            ..SceneConfig::default()
        };
        assert!(check(&host, &config).is_ok());
    }

    #[test]
    fn missing_graphics_skips_before_container_lookup() {
        let host = MockHost {
            graphics: false,
            ..MockHost::ready()
        };
        assert_eq!(
            check(&host, &SceneConfig::default()),
            Err(SkipReason::GraphicsUnavailable)
        );
        assert_eq!(host.container_lookups.get(), 0);
    }

    #[test]
    fn missing_container_skips() {
        let host = MockHost {
            container: None,
            ..MockHost::ready()
        };
        let err = check(&host, &SceneConfig::default()).unwrap_err();
        assert_eq!(err, SkipReason::MissingContainer("dune-backdrop".to_string()));
        assert_eq!(err.to_string(), "no mount point with id 'dune-backdrop'");
    }

    #[test]
    fn window_host_matches_mount_id() {
        let host = WindowHost {
            touch: false,
            graphics: true,
            mount_id: "hero".to_string(),
            size: DisplayContext::new(640, 480),
        };
        assert_eq!(host.container("hero"), Some(DisplayContext::new(640, 480)));
        assert_eq!(host.container("footer"), None);
    }
}
