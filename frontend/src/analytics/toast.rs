use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use web_sys::Element;

use super::tracker::{Acknowledgment, Tone};

pub const DISMISS_AFTER_MS: u32 = 3_000;

const BASE_STYLE: &str =
    "position: fixed; top: 20px; right: 20px; color: white; padding: 10px; border-radius: 5px; z-index: 1000;";

/// An acknowledgment overlay with a pending auto-dismiss timer.
/// Dropping the handle lets the timer run to completion; `cancel` removes the
/// overlay right away.
pub struct Toast {
    node: Element,
    timer: Option<Timeout>,
    done: Rc<Cell<bool>>,
}

impl Toast {
    pub fn show(ack: &Acknowledgment) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let node = document.create_element("div").ok()?;
        node.set_text_content(Some(&ack.message));
        let background = match ack.tone {
            Tone::Success => "green",
            Tone::Info => "blue",
        };
        if let Err(e) = node.set_attribute("style", &format!("{} background: {};", BASE_STYLE, background)) {
            log::warn!("Failed to style acknowledgment: {:?}", e);
        }
        document.body()?.append_child(&node).ok()?;

        let done = Rc::new(Cell::new(false));
        let timer = {
            let node = node.clone();
            let done = done.clone();
            Timeout::new(DISMISS_AFTER_MS, move || {
                node.remove();
                done.set(true);
            })
        };
        Some(Self {
            node,
            timer: Some(timer),
            done,
        })
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    pub fn cancel(mut self) {
        // Dropping the Timeout clears it.
        self.timer.take();
        self.node.remove();
        self.done.set(true);
    }
}

impl Drop for Toast {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            if !self.done.get() {
                timer.forget();
            }
        }
    }
}

/// Overlays currently on screen for one bootstrapper mount.
#[derive(Clone, Default)]
pub struct Toasts {
    live: Rc<RefCell<Vec<Toast>>>,
}

impl Toasts {
    pub fn show(&self, ack: &Acknowledgment) {
        let mut live = self.live.borrow_mut();
        live.retain(|toast| !toast.is_done());
        if let Some(toast) = Toast::show(ack) {
            live.push(toast);
        }
    }

    /// Removes every overlay still on screen.
    pub fn cancel_all(&self) {
        for toast in self.live.borrow_mut().drain(..) {
            toast.cancel();
        }
    }
}
