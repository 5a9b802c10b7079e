// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Registries of event listeners.
//!
//! Listeners are invoked synchronously on the thread that delivers the
//! MIDI input and must return quickly.

use std::{ffi::c_void, fmt};

use crate::input::{ButtonEvent, EncoderEvent, Event, PadEvent, PedalEvent, TouchStripEvent};

/// C-style callback that receives the event and the opaque context
/// pointer that was passed on registration.
pub type RawCallback<E> = extern "C" fn(E, *mut c_void);

pub type BoxedListener<E> = Box<dyn FnMut(E) + Send + 'static>;

/// Context pointer of a raw callback.
#[derive(Clone, Copy)]
struct RawContext(*mut c_void);

// The caller who registers a raw callback is responsible for the
// context pointer to be usable from the MIDI input thread.
#[allow(unsafe_code)]
unsafe impl Send for RawContext {}

impl RawContext {
    // Accessed through a method for capturing the whole wrapper in closures.
    const fn get(self) -> *mut c_void {
        self.0
    }
}

/// Listeners of a single event family, invoked in order of registration.
pub struct Listeners<E> {
    listeners: Vec<BoxedListener<E>>,
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<E> Listeners<E>
where
    E: Copy + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn register(&mut self, listener: impl FnMut(E) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a C-style callback.
    ///
    /// The `context` is passed to each invocation as is. It must remain
    /// valid for as long as the callback stays registered.
    pub fn register_raw(&mut self, callback: RawCallback<E>, context: *mut c_void) {
        let context = RawContext(context);
        self.register(move |event| callback(event, context.get()));
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Returns the number of listeners that have been invoked.
    pub fn dispatch(&mut self, event: E) -> usize {
        for listener in &mut self.listeners {
            listener(event);
        }
        self.listeners.len()
    }
}

/// Listeners of all event families.
#[derive(Debug, Default)]
pub struct EventListeners {
    pub pad: Listeners<PadEvent>,
    pub button: Listeners<ButtonEvent>,
    pub encoder: Listeners<EncoderEvent>,
    pub touch_strip: Listeners<TouchStripEvent>,
    pub pedal: Listeners<PedalEvent>,
}

impl EventListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of listeners that have been invoked.
    pub fn dispatch(&mut self, event: Event) -> usize {
        match event {
            Event::Pad(event) => self.pad.dispatch(event),
            Event::Button(event) => self.button.dispatch(event),
            Event::Encoder(event) => self.encoder.dispatch(event),
            Event::TouchStrip(event) => self.touch_strip.dispatch(event),
            Event::Pedal(event) => self.pedal.dispatch(event),
        }
    }

    pub fn clear(&mut self) {
        let Self {
            pad,
            button,
            encoder,
            touch_strip,
            pedal,
        } = self;
        pad.clear();
        button.clear();
        encoder.clear();
        touch_strip.clear();
        pedal.clear();
    }
}
