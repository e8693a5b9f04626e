use std::fmt;
use std::rc::Rc;

use log::{error, warn};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::detector::{DeviceClass, Detector};

/// Global configuration, merged over defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Pixels added to every trigger position.
    pub offset: i32,
    /// Milliseconds, exposed to stylesheet.
    pub delay: u32,
    pub easing: Easing,
    /// Milliseconds, exposed to stylesheet.
    pub duration: u32,
    pub disable: Disable,
    /// Elements are revealed only once, never hidden again.
    pub once: bool,
    /// Event which starts the engine: `DOMContentLoaded`, `load` or any custom name.
    pub start_event: String,
    /// Minimal interval between scroll handlings, milliseconds.
    pub throttle_delay: u64,
    /// Quiescence interval for resize handling, milliseconds.
    pub debounce_delay: u64,
    pub disable_mutation_observer: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            offset: 120,
            delay: 0,
            easing: Easing::Ease,
            duration: 400,
            disable: Disable::Never,
            once: false,
            start_event: Options::DOM_CONTENT_LOADED.to_string(),
            throttle_delay: 99,
            debounce_delay: 50,
            disable_mutation_observer: false,
        }
    }
}

impl Options {
    pub const DOM_CONTENT_LOADED: &'static str = "DOMContentLoaded";
    pub const LOAD: &'static str = "load";

    /// Reads options from JSON-like settings object key by key, unknown keys are ignored
    /// and invalid values keep their defaults.
    ///
    /// Strict deserialization is available through `serde` directly.
    pub fn from_json(settings: &Value) -> Self {
        let mut options = Options::default();
        let settings = match settings.as_object() {
            Some(settings) => settings,
            None => {
                error!("unable to read options, object expected, defaults used");
                return options;
            }
        };
        for (key, value) in settings {
            let result = match key.as_str() {
                "offset" => read(value).map(|offset| options.offset = offset),
                "delay" => read(value).map(|delay| options.delay = delay),
                "easing" => read(value).map(|easing| options.easing = easing),
                "duration" => read(value).map(|duration| options.duration = duration),
                "disable" => read(value).map(|disable| options.disable = disable),
                "once" => read(value).map(|once| options.once = once),
                "startEvent" => read(value).map(|event| options.start_event = event),
                "throttleDelay" => read(value).map(|delay| options.throttle_delay = delay),
                "debounceDelay" => read(value).map(|delay| options.debounce_delay = delay),
                "disableMutationObserver" => {
                    read(value).map(|disable| options.disable_mutation_observer = disable)
                }
                _ => Ok(()),
            };
            if let Err(error) = result {
                warn!("unable to read option {key}={value}, {error}, default kept");
            }
        }
        options
    }

    pub fn offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn disable(mut self, disable: Disable) -> Self {
        self.disable = disable;
        self
    }

    pub fn disable_when(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.disable = Disable::Predicate(Rc::new(predicate));
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn start_event(mut self, start_event: &str) -> Self {
        self.start_event = start_event.to_string();
        self
    }

    pub fn throttle_delay(mut self, throttle_delay: u64) -> Self {
        self.throttle_delay = throttle_delay;
        self
    }

    pub fn debounce_delay(mut self, debounce_delay: u64) -> Self {
        self.debounce_delay = debounce_delay;
        self
    }

    pub fn disable_mutation_observer(mut self, disable: bool) -> Self {
        self.disable_mutation_observer = disable;
        self
    }
}

fn read<'de, T: Deserialize<'de>>(value: &'de Value) -> Result<T, serde_json::Error> {
    T::deserialize(value)
}

/// Condition under which animations are turned off entirely.
#[derive(Clone, Default)]
pub enum Disable {
    #[default]
    Never,
    Always,
    Device(DeviceClass),
    Predicate(Rc<dyn Fn() -> bool>),
}

impl Disable {
    pub fn resolve(&self, detector: &Detector) -> bool {
        match self {
            Disable::Never => false,
            Disable::Always => true,
            Disable::Device(class) => detector.is(*class),
            Disable::Predicate(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for Disable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disable::Never => write!(f, "Never"),
            Disable::Always => write!(f, "Always"),
            Disable::Device(class) => write!(f, "Device({class:?})"),
            Disable::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Disable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Device(DeviceClass),
        }

        let disable = match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Disable::Always,
            Raw::Flag(false) => Disable::Never,
            Raw::Device(class) => Disable::Device(class),
        };
        Ok(disable)
    }
}

/// Timing functions known to the stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
}

const EASINGS: [(Easing, &str); 20] = [
    (Easing::Linear, "linear"),
    (Easing::Ease, "ease"),
    (Easing::EaseIn, "ease-in"),
    (Easing::EaseOut, "ease-out"),
    (Easing::EaseInOut, "ease-in-out"),
    (Easing::EaseInBack, "ease-in-back"),
    (Easing::EaseOutBack, "ease-out-back"),
    (Easing::EaseInOutBack, "ease-in-out-back"),
    (Easing::EaseInSine, "ease-in-sine"),
    (Easing::EaseOutSine, "ease-out-sine"),
    (Easing::EaseInOutSine, "ease-in-out-sine"),
    (Easing::EaseInQuad, "ease-in-quad"),
    (Easing::EaseOutQuad, "ease-out-quad"),
    (Easing::EaseInOutQuad, "ease-in-out-quad"),
    (Easing::EaseInCubic, "ease-in-cubic"),
    (Easing::EaseOutCubic, "ease-out-cubic"),
    (Easing::EaseInOutCubic, "ease-in-out-cubic"),
    (Easing::EaseInQuart, "ease-in-quart"),
    (Easing::EaseOutQuart, "ease-out-quart"),
    (Easing::EaseInOutQuart, "ease-in-out-quart"),
];

impl Easing {
    pub fn parse(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        EASINGS
            .iter()
            .find(|(_, name)| *name == keyword)
            .map(|(easing, _)| *easing)
    }

    pub fn as_str(&self) -> &'static str {
        EASINGS
            .iter()
            .find(|(easing, _)| easing == self)
            .map(|(_, name)| *name)
            .unwrap_or("ease")
    }
}

impl From<String> for Easing {
    fn from(keyword: String) -> Self {
        Easing::parse(&keyword).unwrap_or_else(|| {
            warn!("easing {keyword} not supported, ease used");
            Easing::Ease
        })
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
