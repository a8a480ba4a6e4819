// src/ui/event.rs
use log::{debug, warn};
use smallvec::SmallVec;

use crate::core::canvas::{Frame, Point, Rect, Size};
use crate::ui::dialog::MessageDialog;

/// Identifies a widget that can receive [`UiEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u32);

impl WidgetId {
    pub const CANVAS: WidgetId = WidgetId(1);
    pub const ITEM_NEW: WidgetId = WidgetId(100);
}

/// Payload of a canvas redraw: the frame being built and the widget's area in it.
pub struct RedrawRequest<'a> {
    pub frame: &'a mut Frame,
    pub area: Rect,
}

/// Typed events delivered to registered sinks.
pub enum UiEvent<'a> {
    /// The widget must repaint `area` of the frame.
    Redraw(RedrawRequest<'a>),
    /// A menu item (or its accelerator) was activated.
    Activate,
}

impl UiEvent<'_> {
    fn name(&self) -> &'static str {
        match self {
            UiEvent::Redraw(_) => "redraw",
            UiEvent::Activate => "activate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

/// What a sink may ask of the shell. Sinks never touch shell state directly.
#[derive(Debug, Default)]
pub struct EventContext {
    dialog: Option<MessageDialog>,
    redraw: bool,
}

impl EventContext {
    /// Asks the shell to open a modal dialog once the sink returns.
    pub fn open_dialog(&mut self, dialog: MessageDialog) {
        if self.dialog.is_some() {
            warn!("a dialog was already requested in this dispatch; keeping the first");
            return;
        }
        self.dialog = Some(dialog);
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub(crate) fn into_parts(self) -> (Option<MessageDialog>, bool) {
        (self.dialog, self.redraw)
    }
}

/// Per-widget event handler, registered with an [`EventRouter`].
pub trait EventSink {
    fn handle(&mut self, event: UiEvent<'_>, cx: &mut EventContext) -> Handled;
}

/// Sinks keyed by widget. Registration happens while the shell is built.
#[derive(Default)]
pub struct EventRouter {
    sinks: SmallVec<[(WidgetId, Box<dyn EventSink>); 4]>,
}

impl EventRouter {
    /// Registers `sink` for `id`, replacing any previous sink for that widget.
    pub fn register(&mut self, id: WidgetId, sink: impl EventSink + 'static) {
        if let Some(slot) = self.sinks.iter_mut().find(|(w, _)| *w == id) {
            warn!("replacing event sink for {id:?}");
            slot.1 = Box::new(sink);
        } else {
            self.sinks.push((id, Box::new(sink)));
        }
    }

    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.sinks.iter().any(|(w, _)| *w == id)
    }

    pub fn dispatch(
        &mut self,
        target: WidgetId,
        event: UiEvent<'_>,
        cx: &mut EventContext,
    ) -> Handled {
        let Some((_, sink)) = self.sinks.iter_mut().find(|(w, _)| *w == target) else {
            debug!("no sink for {} on {target:?}", event.name());
            return Handled::No;
        };
        sink.handle(event, cx)
    }
}

/// Keys the shell reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Space,
    Other,
}

/// Window-level input, already translated from the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    CursorMoved(Point),
    CursorLeft,
    PointerPressed,
    Key { key: Key, ctrl: bool },
    Resized(Size),
    CloseRequested,
}

/// What the event loop should do after the shell handled an [`Input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    pub redraw: bool,
    pub exit: bool,
}

impl Response {
    pub const REDRAW: Response = Response {
        redraw: true,
        exit: false,
    };
    pub const EXIT: Response = Response {
        redraw: false,
        exit: true,
    };

    pub fn redraw_if(changed: bool) -> Response {
        Response {
            redraw: changed,
            exit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    impl EventSink for Counter {
        fn handle(&mut self, event: UiEvent<'_>, cx: &mut EventContext) -> Handled {
            match event {
                UiEvent::Activate => {
                    self.0 += 1;
                    cx.request_redraw();
                    Handled::Yes
                }
                UiEvent::Redraw(_) => Handled::No,
            }
        }
    }

    #[test]
    fn dispatch_reaches_only_the_target() {
        let mut router = EventRouter::default();
        router.register(WidgetId(7), Counter(0));
        let mut cx = EventContext::default();
        assert_eq!(router.dispatch(WidgetId(8), UiEvent::Activate, &mut cx), Handled::No);
        assert!(!cx.redraw);
        assert_eq!(router.dispatch(WidgetId(7), UiEvent::Activate, &mut cx), Handled::Yes);
        assert!(cx.redraw);
    }

    #[test]
    fn registering_twice_replaces_the_sink() {
        let mut router = EventRouter::default();
        router.register(WidgetId(7), Counter(0));
        router.register(WidgetId(7), Counter(5));
        assert_eq!(router.sinks.len(), 1);
        assert!(router.is_registered(WidgetId(7)));
    }

    #[test]
    fn only_the_first_dialog_request_is_kept() {
        let mut cx = EventContext::default();
        cx.open_dialog(MessageDialog::new("first", "a"));
        cx.open_dialog(MessageDialog::new("second", "b"));
        let (dialog, _) = cx.into_parts();
        assert_eq!(dialog.map(|d| d.title().to_owned()).as_deref(), Some("first"));
    }
}
