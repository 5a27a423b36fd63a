// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ordered dispatch of selection/key events to handlers.
//!
//! Higher priority runs first; equal priorities run in registration order. A handler that
//! returns [`Propagation::Consumed`] stops the event.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::linking::{CaptureOutcome, ComposerStep, LinkComposer};
use crate::model::ElementId;
use crate::segment::SelectionSegmenter;
use crate::surface::{SelectionRange, TextSurface};

/// Priority the link composer registers with; ahead of ordinary UI handlers.
pub const COMPOSER_PRIORITY: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown { at: Instant },
    /// Pointer released; `range` is the selection at that moment, if any.
    PointerUp { range: Option<SelectionRange>, at: Instant },
    Key { key: Key, at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Consumed,
}

/// What handlers can see while an event is dispatched.
pub struct InputContext<'a> {
    pub segmenter: SelectionSegmenter<'a, dyn TextSurface + 'a>,
    pub known_elements: Option<&'a BTreeSet<ElementId>>,
}

impl<'a> InputContext<'a> {
    pub fn new(surface: &'a (dyn TextSurface + 'a)) -> Self {
        Self {
            segmenter: SelectionSegmenter::new(surface),
            known_elements: None,
        }
    }

    pub fn with_known_elements(mut self, known_elements: &'a BTreeSet<ElementId>) -> Self {
        self.known_elements = Some(known_elements);
        self
    }
}

pub trait EventHandler {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn handle(&mut self, event: &InputEvent, cx: &InputContext<'_>) -> Propagation;
}

/// Which handlers saw an event, and who stopped it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub visited: Vec<&'static str>,
    pub consumed_by: Option<&'static str>,
}

#[derive(Default)]
pub struct EventPipeline<'h> {
    handlers: Vec<&'h mut dyn EventHandler>,
}

impl<'h> EventPipeline<'h> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register(&mut self, handler: &'h mut dyn EventHandler) {
        let priority = handler.priority();
        let index = self
            .handlers
            .iter()
            .position(|existing| existing.priority() < priority)
            .unwrap_or(self.handlers.len());
        self.handlers.insert(index, handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(&mut self, event: &InputEvent, cx: &InputContext<'_>) -> Dispatch {
        let mut dispatch = Dispatch::default();
        for handler in &mut self.handlers {
            let name = handler.name();
            dispatch.visited.push(name);
            if handler.handle(event, cx) == Propagation::Consumed {
                tracing::trace!(handler = name, "event consumed");
                dispatch.consumed_by = Some(name);
                break;
            }
        }
        dispatch
    }
}

impl EventHandler for LinkComposer {
    fn name(&self) -> &'static str {
        "link-composer"
    }

    fn priority(&self) -> i32 {
        COMPOSER_PRIORITY
    }

    fn handle(&mut self, event: &InputEvent, cx: &InputContext<'_>) -> Propagation {
        match event {
            InputEvent::PointerUp { range: Some(range), at } => {
                match self.capture_range(&cx.segmenter, range, cx.known_elements, *at) {
                    Ok(CaptureOutcome::Captured(_)) => Propagation::Consumed,
                    Ok(CaptureOutcome::Ignored(_)) => Propagation::Continue,
                    Err(err) => {
                        tracing::debug!(error = %err, "selection rejected by link composer");
                        Propagation::Consumed
                    }
                }
            }
            InputEvent::Key { key: Key::Escape, .. } => {
                if self.step() == ComposerStep::First {
                    Propagation::Continue
                } else {
                    self.reset();
                    Propagation::Consumed
                }
            }
            _ => Propagation::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{
        Dispatch, EventHandler, EventPipeline, InputContext, InputEvent, Key, Propagation,
    };
    use crate::dom::VirtualDom;
    use crate::linking::{ComposerStep, LinkComposer};
    use crate::model::{DocumentId, ElementId};

    struct Recorder {
        name: &'static str,
        priority: i32,
        consume: bool,
        seen: usize,
    }

    impl Recorder {
        fn new(name: &'static str, priority: i32, consume: bool) -> Self {
            Self {
                name,
                priority,
                consume,
                seen: 0,
            }
        }
    }

    impl EventHandler for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn handle(&mut self, _event: &InputEvent, _cx: &InputContext<'_>) -> Propagation {
            self.seen += 1;
            if self.consume {
                Propagation::Consumed
            } else {
                Propagation::Continue
            }
        }
    }

    fn dom() -> VirtualDom {
        let dom = VirtualDom::new();
        let first = dom.mount_panel(DocumentId::new(1));
        dom.mount_element(first, ElementId::new(1), "alpha beta");
        let second = dom.mount_panel(DocumentId::new(2));
        dom.mount_element(second, ElementId::new(2), "gamma delta");
        dom
    }

    #[test]
    fn handlers_run_by_priority_then_registration_order() {
        let dom = dom();
        let cx = InputContext::new(&dom);
        let mut low = Recorder::new("low", -5, false);
        let mut a = Recorder::new("a", 10, false);
        let mut b = Recorder::new("b", 10, false);
        let mut pipeline = EventPipeline::new();
        pipeline.register(&mut low);
        pipeline.register(&mut a);
        pipeline.register(&mut b);

        let dispatch = pipeline.dispatch(&InputEvent::PointerDown { at: Instant::now() }, &cx);
        assert_eq!(
            dispatch,
            Dispatch {
                visited: vec!["a", "b", "low"],
                consumed_by: None
            }
        );
    }

    #[test]
    fn consumed_events_stop_propagation() {
        let dom = dom();
        let cx = InputContext::new(&dom);
        let mut first = Recorder::new("first", 1, true);
        let mut second = Recorder::new("second", 0, false);
        {
            let mut pipeline = EventPipeline::new();
            pipeline.register(&mut second);
            pipeline.register(&mut first);
            let dispatch = pipeline.dispatch(&InputEvent::PointerDown { at: Instant::now() }, &cx);
            assert_eq!(dispatch.consumed_by, Some("first"));
        }
        assert_eq!(first.seen, 1);
        assert_eq!(second.seen, 0);
    }

    #[test]
    fn composer_consumes_selections_ahead_of_ui_handlers() {
        let dom = dom();
        let cx = InputContext::new(&dom);
        let mut composer = LinkComposer::default();
        let mut ui = Recorder::new("ui", 0, false);
        let t0 = Instant::now();

        let first = dom.range(ElementId::new(1), 0, ElementId::new(1), 5).expect("range");
        let second = dom.range(ElementId::new(2), 6, ElementId::new(2), 11).expect("range");
        {
            let mut pipeline = EventPipeline::new();
            pipeline.register(&mut ui);
            pipeline.register(&mut composer);

            let up = InputEvent::PointerUp { range: Some(first), at: t0 };
            assert_eq!(pipeline.dispatch(&up, &cx).consumed_by, Some("link-composer"));

            let repeat = InputEvent::PointerUp {
                range: Some(first),
                at: t0 + Duration::from_millis(20),
            };
            assert_eq!(pipeline.dispatch(&repeat, &cx).consumed_by, None);

            let up = InputEvent::PointerUp {
                range: Some(second),
                at: t0 + Duration::from_millis(40),
            };
            assert_eq!(pipeline.dispatch(&up, &cx).consumed_by, Some("link-composer"));
        }
        assert_eq!(composer.step(), ComposerStep::Confirm);
        assert_eq!(ui.seen, 1);
    }

    #[test]
    fn escape_resets_an_active_composition() {
        let dom = dom();
        let cx = InputContext::new(&dom);
        let mut composer = LinkComposer::default();
        let t0 = Instant::now();
        let range = dom.range(ElementId::new(1), 6, ElementId::new(1), 10).expect("range");
        {
            let mut pipeline = EventPipeline::new();
            pipeline.register(&mut composer);
            pipeline.dispatch(&InputEvent::PointerUp { range: Some(range), at: t0 }, &cx);
            let escape = InputEvent::Key { key: Key::Escape, at: t0 };
            assert_eq!(pipeline.dispatch(&escape, &cx).consumed_by, Some("link-composer"));
            assert_eq!(pipeline.dispatch(&escape, &cx).consumed_by, None);
        }
        assert_eq!(composer.step(), ComposerStep::First);
    }
}
