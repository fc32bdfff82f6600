//! The three mutually exclusive client views

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Session,
    List,
    Timer,
}

/// Which view is visible, published to whoever renders
#[derive(Debug)]
pub struct ViewState {
    tx: watch::Sender<View>,
    /// Keep the receiver alive to prevent channel closure
    _rx: watch::Receiver<View>,
}

impl ViewState {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(View::Session);
        Self { tx, _rx: rx }
    }

    pub fn show(&self, view: View) {
        self.tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    pub fn current(&self) -> View {
        *self.tx.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<View> {
        self.tx.subscribe()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_session_view() {
        assert_eq!(ViewState::new().current(), View::Session);
    }

    #[tokio::test]
    async fn showing_a_view_notifies_watchers_once() {
        let views = ViewState::new();
        let mut rx = views.watch();
        rx.borrow_and_update();

        views.show(View::List);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), View::List);

        // Re-showing the same view is not a change
        views.show(View::List);
        assert!(!rx.has_changed().unwrap());
    }
}
