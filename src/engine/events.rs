//! Named event channels and the synchronous in-process dispatcher.
//!
//! Handlers run inline, in binding order, on the thread that drives the
//! engine. The handler list of a channel is snapshotted before it fires, so a
//! handler may bind or unbind (through a cloned [`Dispatcher`]) without
//! affecting the fire in progress.

use color_eyre::eyre;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;
use std::str::FromStr;
use tracing::debug;

use crate::controller::{Controller, RawDevice};
use crate::engine::EngineError;
use crate::mapping::Control;

/// Event channel names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Connected,
    Disconnected,
    Unsupported,
    Tick,
    ButtonDown,
    ButtonUp,
    AxisChanged,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Connected,
        Channel::Disconnected,
        Channel::Unsupported,
        Channel::Tick,
        Channel::ButtonDown,
        Channel::ButtonUp,
        Channel::AxisChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Connected => "connected",
            Channel::Disconnected => "disconnected",
            Channel::Unsupported => "unsupported",
            Channel::Tick => "tick",
            Channel::ButtonDown => "button-down",
            Channel::ButtonUp => "button-up",
            Channel::AxisChanged => "axis-changed",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

/// Payload of the control channels (`button-down`, `button-up`, `axis-changed`)
#[derive(Debug, Clone, Copy)]
pub struct ControlEvent<'a> {
    pub controller: &'a Controller,
    pub control: &'a Control,
    pub value: f32,
}

impl<'a> ControlEvent<'a> {
    pub fn new(controller: &'a Controller, control: &'a Control, value: f32) -> Self {
        Self {
            controller,
            control,
            value,
        }
    }

    pub fn name(&self) -> &'a str {
        self.control.name()
    }
}

/// Event payloads, one variant per channel
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Connected(&'a Controller),
    Disconnected(&'a RawDevice),
    Unsupported(&'a RawDevice),
    /// Every registered controller in slot order
    Tick(&'a [&'a Controller]),
    ButtonDown(ControlEvent<'a>),
    ButtonUp(ControlEvent<'a>),
    AxisChanged(ControlEvent<'a>),
}

impl<'a> Event<'a> {
    pub fn channel(&self) -> Channel {
        match self {
            Event::Connected(_) => Channel::Connected,
            Event::Disconnected(_) => Channel::Disconnected,
            Event::Unsupported(_) => Channel::Unsupported,
            Event::Tick(_) => Channel::Tick,
            Event::ButtonDown(_) => Channel::ButtonDown,
            Event::ButtonUp(_) => Channel::ButtonUp,
            Event::AxisChanged(_) => Channel::AxisChanged,
        }
    }

    pub fn control(&self) -> Option<&ControlEvent<'a>> {
        match self {
            Event::ButtonDown(control) | Event::ButtonUp(control) | Event::AxisChanged(control) => {
                Some(control)
            }
            _ => None,
        }
    }
}

/// A bound listener. Identity (for [`Dispatcher::unbind`]) is the `Rc` pointer.
pub type Handler = Rc<dyn Fn(&Event<'_>) -> eyre::Result<()>>;

/// Wraps a closure into a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Event<'_>) -> eyre::Result<()> + 'static,
{
    Rc::new(f)
}

/// Channel → handlers table. Clones share the same table.
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Rc<RefCell<HashMap<Channel, Vec<Handler>>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, channel: Channel, handler: Handler) {
        self.channels
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(handler);
        debug!("Bound handler on {}", channel);
    }

    /// Removes the first binding of `handler` on `channel`.
    pub fn unbind(&self, channel: Channel, handler: &Handler) -> bool {
        let mut channels = self.channels.borrow_mut();
        let Some(handlers) = channels.get_mut(&channel) else {
            return false;
        };

        match handlers.iter().position(|bound| Rc::ptr_eq(bound, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn unbind_channel(&self, channel: Channel) {
        self.channels.borrow_mut().remove(&channel);
    }

    pub fn unbind_all(&self) {
        self.channels.borrow_mut().clear();
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.channels
            .borrow()
            .get(&channel)
            .map_or(0, |handlers| handlers.len())
    }

    /// Invokes every handler bound to the event's channel, in binding order.
    ///
    /// The first handler error stops the fire and is returned.
    pub fn fire(&self, event: &Event<'_>) -> Result<(), EngineError> {
        let channel = event.channel();
        let handlers: Vec<Handler> = match self.channels.borrow().get(&channel) {
            Some(handlers) => handlers.clone(),
            None => return Ok(()),
        };

        for handler in handlers {
            handler(event).map_err(|report| EngineError::Listener { channel, report })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = self.channels.borrow();
        let mut map = f.debug_map();
        for channel in Channel::ALL {
            if let Some(handlers) = channels.get(&channel) {
                map.entry(&channel, &handlers.len());
            }
        }
        map.finish()
    }
}
