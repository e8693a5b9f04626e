use std::time::Duration;

use log::{debug, warn};

use crate::attributes::{
    ANIMATE_CLASS, DELAY, DURATION, EASING, INIT_CLASS, MARKER_SELECTOR, OBSERVED, PRESENTATION,
};
use crate::detector::Detector;
use crate::document::{Document, ReadyState};
use crate::elements::{collect, AnimatedElement};
use crate::observer::MutationObserver;
use crate::options::Options;
use crate::prepare::prepare;
use crate::scroll::{handle_scroll, Reveal};
use crate::timing::{Debounce, Throttle};

/// Notifications host delivers from its event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    DomContentLoaded,
    Load,
    /// Any other document event, may be configured as start event.
    Custom(String),
    Scroll,
    Resize,
    OrientationChange,
    /// Current batch of document mutations settled.
    Mutations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    /// Terminal, animations attributes stripped and all events ignored.
    Disabled,
    /// Waiting for start event.
    Initializing,
    Active,
}

/// Animate on scroll engine bound to one document.
pub struct Controller<D: Document> {
    document: D,
    options: Options,
    elements: Vec<AnimatedElement>,
    state: State,
    throttle: Throttle,
    debounce: Debounce,
    observer: Option<MutationObserver>,
}

impl<D: Document> Controller<D> {
    pub fn new(document: D) -> Self {
        let options = Options::default();
        Self {
            document,
            throttle: Throttle::new(Duration::from_millis(options.throttle_delay)),
            debounce: Debounce::new(Duration::from_millis(options.debounce_delay)),
            options,
            elements: vec![],
            state: State::Uninitialized,
            observer: None,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    pub fn elements(&self) -> &[AnimatedElement] {
        &self.elements
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Starts engine: collects elements, resolves disabling, exposes global timing
    /// to stylesheet and performs first refresh once start event has happened.
    pub fn init(&mut self, options: Options) -> &[AnimatedElement] {
        if self.state != State::Uninitialized {
            warn!("unable to init, engine already {:?}", self.state);
            return &self.elements;
        }
        self.options = options;
        self.throttle = Throttle::new(Duration::from_millis(self.options.throttle_delay));
        self.debounce = Debounce::new(Duration::from_millis(self.options.debounce_delay));
        self.elements = collect(&self.document);

        let detector = Detector::new(self.document.user_agent());
        if detector.is_legacy() {
            debug!("browser not supported, animations disabled");
            self.disable();
            return &self.elements;
        }
        if self.options.disable.resolve(&detector) {
            debug!("animations disabled by {:?}", self.options.disable);
            self.disable();
            return &self.elements;
        }

        if let Some(root) = self.document.root() {
            let easing = self.options.easing.as_str();
            let duration = self.options.duration.to_string();
            let delay = self.options.delay.to_string();
            self.document.set_attribute(root, EASING, easing);
            self.document.set_attribute(root, DURATION, &duration);
            self.document.set_attribute(root, DELAY, &delay);
        }

        if !self.options.disable_mutation_observer {
            self.observer = MutationObserver::observe(MARKER_SELECTOR)
                .map(|observer| observer.attributes(&OBSERVED));
        }

        self.state = State::Initializing;
        let ready = matches!(
            self.document.ready_state(),
            ReadyState::Interactive | ReadyState::Complete
        );
        if self.options.start_event == Options::DOM_CONTENT_LOADED && ready {
            self.refresh(true);
        }
        &self.elements
    }

    /// Recomputes positions and visibility of known elements.
    ///
    /// Does nothing until engine started, `initialize` marks the start of an
    /// initialized engine waiting for its start event.
    pub fn refresh(&mut self, initialize: bool) -> Option<&[AnimatedElement]> {
        self.update(initialize)?;
        Some(&self.elements)
    }

    /// Collects elements again and refreshes them.
    pub fn refresh_hard(&mut self) -> Option<&[AnimatedElement]> {
        self.update_hard()?;
        Some(&self.elements)
    }

    /// Strips animation attributes and classes from every known element, no way back.
    pub fn disable(&mut self) {
        for element in self.elements.iter_mut() {
            for name in PRESENTATION {
                self.document.remove_attribute(element.node, name);
            }
            self.document.remove_class(element.node, INIT_CLASS);
            self.document.remove_class(element.node, ANIMATE_CLASS);
            element.animated = false;
        }
        self.observer = None;
        self.state = State::Disabled;
    }

    /// Reacts to page event, returns elements revealed or hidden as a result.
    pub fn handle(&mut self, event: PageEvent, now: Duration) -> Vec<Reveal> {
        if matches!(self.state, State::Disabled | State::Uninitialized) {
            if event == PageEvent::Mutations {
                // nobody observes them, records must not pile up
                self.document.take_mutations();
            }
            return vec![];
        }
        let reveals = match event {
            PageEvent::DomContentLoaded => self.start(Options::DOM_CONTENT_LOADED),
            PageEvent::Load => self.start(Options::LOAD),
            PageEvent::Custom(name) => self.start(&name),
            PageEvent::Scroll => {
                if self.throttle.call(now) {
                    self.scroll()
                } else {
                    None
                }
            }
            PageEvent::Resize | PageEvent::OrientationChange => {
                if self.debounce.call(now) {
                    self.update_hard()
                } else {
                    None
                }
            }
            PageEvent::Mutations => {
                let records = self.document.take_mutations();
                let mut changed = false;
                if let Some(observer) = self.observer.as_ref() {
                    observer.deliver(&records, || changed = true);
                }
                if changed {
                    debug!("marked elements mutated, {} records", records.len());
                    self.update_hard()
                } else {
                    None
                }
            }
        };
        reveals.unwrap_or_default()
    }

    /// Fires suppressed scroll handling once throttle interval passed and
    /// refreshes elements once resize burst is over.
    pub fn advance(&mut self, now: Duration) -> Vec<Reveal> {
        if self.state != State::Active {
            return vec![];
        }
        let mut reveals = vec![];
        if self.debounce.poll(now) {
            reveals.extend(self.update_hard().unwrap_or_default());
        }
        if self.throttle.poll(now) {
            reveals.extend(self.scroll().unwrap_or_default());
        }
        reveals
    }

    /// Moment host should call `advance`, if trailing scroll handling or refresh is pending.
    pub fn deadline(&self) -> Option<Duration> {
        match (self.throttle.deadline(), self.debounce.deadline()) {
            (Some(scroll), Some(resize)) => Some(scroll.min(resize)),
            (scroll, resize) => scroll.or(resize),
        }
    }

    fn start(&mut self, event: &str) -> Option<Vec<Reveal>> {
        if self.state == State::Initializing && self.options.start_event == event {
            self.update(true)
        } else {
            None
        }
    }

    fn scroll(&mut self) -> Option<Vec<Reveal>> {
        if self.state != State::Active {
            return None;
        }
        Some(handle_scroll(
            &mut self.elements,
            self.options.once,
            &mut self.document,
        ))
    }

    fn update(&mut self, initialize: bool) -> Option<Vec<Reveal>> {
        if matches!(self.state, State::Disabled | State::Uninitialized) {
            return None;
        }
        if initialize && self.state != State::Active {
            debug!("animations started, {} elements", self.elements.len());
            self.state = State::Active;
        }
        if self.state != State::Active {
            return None;
        }
        self.elements = prepare(&self.elements, &self.options, &self.document);
        for element in &self.elements {
            self.document.add_class(element.node, INIT_CLASS);
        }
        Some(handle_scroll(
            &mut self.elements,
            self.options.once,
            &mut self.document,
        ))
    }

    fn update_hard(&mut self) -> Option<Vec<Reveal>> {
        if matches!(self.state, State::Disabled | State::Uninitialized) {
            return None;
        }
        self.elements = collect(&self.document);
        // revealed elements keep their class, state must follow it
        for element in self.elements.iter_mut() {
            element.animated = self.document.has_class(element.node, ANIMATE_CLASS);
        }
        self.update(false)
    }
}
