// src/ui/actions.rs
use log::info;

use crate::ui::dialog::MessageDialog;
use crate::ui::event::{EventContext, EventSink, Handled, UiEvent};

pub const NEW_DIALOG_TITLE: &str = "Bye";
pub const NEW_DIALOG_BODY: &str = "New position!";

/// Handler of File > New.
#[derive(Debug, Default)]
pub struct NewPositionAction;

impl EventSink for NewPositionAction {
    fn handle(&mut self, event: UiEvent<'_>, cx: &mut EventContext) -> Handled {
        match event {
            UiEvent::Activate => {
                info!("File > New activated");
                cx.open_dialog(MessageDialog::new(NEW_DIALOG_TITLE, NEW_DIALOG_BODY));
                Handled::Yes
            }
            UiEvent::Redraw(_) => Handled::No,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_requests_the_message_dialog() {
        let mut cx = EventContext::default();
        assert_eq!(NewPositionAction.handle(UiEvent::Activate, &mut cx), Handled::Yes);
        let (dialog, _) = cx.into_parts();
        let dialog = dialog.expect("dialog requested");
        assert_eq!(dialog.title(), "Bye");
        assert_eq!(dialog.body(), "New position!");
    }
}
