// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! The device handle.
//!
//! A [`Push`] owns the sysex transport, the pedal assignments, the
//! event listeners, and the display connection. It is internally
//! synchronized and can be shared between threads. Inbound MIDI
//! messages are fed through a [`PushInputHandler`].

use std::{ffi::c_void, fmt, sync::Arc};

use parking_lot::Mutex;

use crate::{
    display::{DisplayConnection, FrameBuffer},
    input::{
        decode_midi_input, ButtonEvent, EncoderEvent, PadEvent, PedalEvent, TouchStripEvent,
    },
    listener::{EventListeners, RawCallback},
    midi::{
        midi_message_kind, BoxedMidiOutputConnection, MidiInputHandler, MidiMessageKind,
        MidiOutputConnection, TimeStamp,
    },
    pedal::PedalAssignments,
    sysex::{SysexTransport, SysexTransportConfig},
    ConnectionError, Result,
};

mod display;
mod led;
mod misc;
mod pad;
mod pedal;
mod touch_strip;

pub use self::{
    led::{
        LedAnimation, LedAnimationDuration, LedAnimationKind, LedColor, LedColorGroup,
        MAX_LED_COLOR_INDEX,
    },
    misc::{MidiMode, PowerSupplyStatus, Statistics},
    pad::{AftertouchMode, PadSensitivity, PAD_VELOCITY_CURVE_ENTRIES},
    pedal::{PedalSampleData, PEDAL_CURVE_ENTRIES},
    touch_strip::{TouchStripConfig, TOUCH_STRIP_LEDS},
};

pub type BoxedDisplayConnection = Box<dyn DisplayConnection + 'static>;

struct Shared<C> {
    transport: SysexTransport<C>,
    pedal_assignments: Mutex<PedalAssignments>,
    listeners: Mutex<EventListeners>,
}

impl<C> Shared<C> {
    fn handle_midi_input(&self, ts: TimeStamp, input: &[u8]) -> bool {
        if midi_message_kind(input) == Some(MidiMessageKind::Sysex) {
            return self.transport.handle_sysex_input(input);
        }
        let event = {
            let pedal_assignments = self.pedal_assignments.lock();
            decode_midi_input(input, &pedal_assignments)
        };
        let Some(event) = event else {
            return false;
        };
        log::trace!("Dispatching {event:?} {ts}");
        self.listeners.lock().dispatch(event);
        true
    }
}

/// Feeds inbound MIDI messages into a [`Push`].
///
/// Replies to sysex commands are passed on to the transport. All other
/// messages are decoded and dispatched to the registered listeners.
pub struct PushInputHandler<C> {
    shared: Arc<Shared<C>>,
}

impl<C> fmt::Debug for PushInputHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushInputHandler").finish_non_exhaustive()
    }
}

impl<C> Clone for PushInputHandler<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C> MidiInputHandler for PushInputHandler<C>
where
    C: Send,
{
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        self.shared.handle_midi_input(ts, input)
    }
}

struct DisplayState<D> {
    connection: Option<D>,
    // Reused for every frame
    frame: FrameBuffer,
}

/// Handle of a single device.
pub struct Push<C = BoxedMidiOutputConnection, D = BoxedDisplayConnection> {
    shared: Arc<Shared<C>>,
    display: Mutex<DisplayState<D>>,
}

impl<C, D> fmt::Debug for Push<C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Push")
            .field("transport", &self.shared.transport)
            .field("pedal_assignments", &*self.shared.pedal_assignments.lock())
            .field("display_connected", &self.display.lock().connection.is_some())
            .finish_non_exhaustive()
    }
}

impl<C, D> Default for Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    fn default() -> Self {
        Self::new(SysexTransportConfig::default())
    }
}

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    /// Create a disconnected handle.
    #[must_use]
    pub fn new(config: SysexTransportConfig) -> Self {
        Self::with_transport(SysexTransport::new(config))
    }

    #[must_use]
    pub fn with_transport(transport: SysexTransport<C>) -> Self {
        let shared = Shared {
            transport,
            pedal_assignments: Mutex::new(PedalAssignments::new()),
            listeners: Mutex::new(EventListeners::new()),
        };
        Self {
            shared: Arc::new(shared),
            display: Mutex::new(DisplayState {
                connection: None,
                frame: FrameBuffer::new(),
            }),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &SysexTransport<C> {
        &self.shared.transport
    }

    /// The handler for inbound MIDI messages, e.g. for connecting the input port.
    #[must_use]
    pub fn input_handler(&self) -> PushInputHandler<C> {
        PushInputHandler {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Feed an inbound MIDI message.
    ///
    /// Returns `true` if the message has been handled.
    pub fn handle_midi_input(&self, ts: TimeStamp, input: &[u8]) -> bool {
        self.shared.handle_midi_input(ts, input)
    }

    pub fn connect_midi(&self, output: C) -> Result<()> {
        self.shared.transport.connect(output)
    }

    /// Pending sysex calls fail when disconnected.
    pub fn disconnect_midi(&self) -> Result<C> {
        self.shared.transport.disconnect()
    }

    #[must_use]
    pub fn is_midi_connected(&self) -> bool {
        self.shared.transport.is_connected()
    }

    pub fn connect_display(&self, connection: D) -> Result<()> {
        let mut display = self.display.lock();
        if display.connection.is_some() {
            return Err(ConnectionError::AlreadyConnected.into());
        }
        display.connection = Some(connection);
        Ok(())
    }

    pub fn disconnect_display(&self) -> Result<D> {
        self.display
            .lock()
            .connection
            .take()
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }

    #[must_use]
    pub fn is_display_connected(&self) -> bool {
        self.display.lock().connection.is_some()
    }

    /// A snapshot of the current pedal assignments.
    #[must_use]
    pub fn pedal_assignments(&self) -> PedalAssignments {
        self.shared.pedal_assignments.lock().clone()
    }

    fn send_midi_output(&self, output: &[u8]) -> Result<()> {
        log::trace!("Sending MIDI output: {output:02x?}");
        self.shared.transport.send_midi_output(output)
    }

    fn call(&self, command: u8, args: &[u8]) -> Result<Vec<u8>> {
        self.shared.transport.call(command, args)
    }
}

// Listeners are invoked on the MIDI input thread. They must neither
// register listeners nor call getters that wait for a reply, because
// the reply could only be delivered after the listener has returned.
impl<C, D> Push<C, D> {
    pub fn on_pad(&self, listener: impl FnMut(PadEvent) + Send + 'static) {
        self.shared.listeners.lock().pad.register(listener);
    }

    pub fn on_button(&self, listener: impl FnMut(ButtonEvent) + Send + 'static) {
        self.shared.listeners.lock().button.register(listener);
    }

    pub fn on_encoder(&self, listener: impl FnMut(EncoderEvent) + Send + 'static) {
        self.shared.listeners.lock().encoder.register(listener);
    }

    pub fn on_touch_strip(&self, listener: impl FnMut(TouchStripEvent) + Send + 'static) {
        self.shared.listeners.lock().touch_strip.register(listener);
    }

    pub fn on_pedal(&self, listener: impl FnMut(PedalEvent) + Send + 'static) {
        self.shared.listeners.lock().pedal.register(listener);
    }

    /// The `context` must stay valid while the callback is registered.
    pub fn register_pad_callback(&self, callback: RawCallback<PadEvent>, context: *mut c_void) {
        self.shared.listeners.lock().pad.register_raw(callback, context);
    }

    /// The `context` must stay valid while the callback is registered.
    pub fn register_button_callback(
        &self,
        callback: RawCallback<ButtonEvent>,
        context: *mut c_void,
    ) {
        self.shared
            .listeners
            .lock()
            .button
            .register_raw(callback, context);
    }

    /// The `context` must stay valid while the callback is registered.
    pub fn register_encoder_callback(
        &self,
        callback: RawCallback<EncoderEvent>,
        context: *mut c_void,
    ) {
        self.shared
            .listeners
            .lock()
            .encoder
            .register_raw(callback, context);
    }

    /// The `context` must stay valid while the callback is registered.
    pub fn register_touch_strip_callback(
        &self,
        callback: RawCallback<TouchStripEvent>,
        context: *mut c_void,
    ) {
        self.shared
            .listeners
            .lock()
            .touch_strip
            .register_raw(callback, context);
    }

    /// The `context` must stay valid while the callback is registered.
    pub fn register_pedal_callback(
        &self,
        callback: RawCallback<PedalEvent>,
        context: *mut c_void,
    ) {
        self.shared
            .listeners
            .lock()
            .pedal
            .register_raw(callback, context);
    }

    pub fn clear_listeners(&self) {
        self.shared.listeners.lock().clear();
    }
}

#[cfg(test)]
mod tests;
