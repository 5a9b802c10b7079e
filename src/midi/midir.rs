// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use midir::{
    ConnectError, Ignore, InitError, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput,
    MidiOutputConnection, MidiOutputPort, SendError,
};
use strum::EnumIter;

use super::{MidiInputHandler, TimeStamp};
use crate::{ConnectionError, Error, Result};

/// Common part of all MIDI port names of the device.
pub const DEVICE_NAME: &str = "Ableton Push 2";

const CLIENT_NAME: &str = "pushio";

impl From<SendError> for Error {
    fn from(err: SendError) -> Self {
        Error::Transport {
            msg: err.to_string().into(),
        }
    }
}

impl From<InitError> for Error {
    fn from(err: InitError) -> Self {
        Error::Transport {
            msg: err.to_string().into(),
        }
    }
}

impl<T> From<ConnectError<T>> for Error {
    fn from(err: ConnectError<T>) -> Self {
        Error::Transport {
            msg: err.to_string().into(),
        }
    }
}

/// The device offers two pairs of MIDI ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
pub enum MidiPort {
    /// Reserved for Ableton Live, but accepts all commands
    #[default]
    Live,
    User,
}

impl MidiPort {
    // macOS, Linux (ALSA), and Windows name the user port differently.
    const USER_PORT_MARKERS: &'static [&'static str] = &["User Port", "MIDI 2", "MIDIIN2", "MIDIOUT2"];

    /// Check if an input or output port name refers to this port of the device.
    #[must_use]
    pub fn matches_port_name(self, port_name: &str) -> bool {
        if !port_name.contains(DEVICE_NAME) {
            return false;
        }
        let is_user_port = Self::USER_PORT_MARKERS
            .iter()
            .any(|marker| port_name.contains(marker));
        match self {
            Self::Live => !is_user_port,
            Self::User => is_user_port,
        }
    }
}

// Adapter for the midir callback closure
fn handle_input<I>(micros: u64, input: &[u8], input_handler: &mut I)
where
    I: MidiInputHandler,
{
    let ts = TimeStamp::from_micros(micros);
    log::trace!("Received MIDI input: {ts} {input:02x?}");
    if !input_handler.handle_midi_input(ts, input) {
        log::debug!("Unhandled MIDI input {ts} {input:02x?}");
    }
}

/// A pair of MIDI ports of the device, driven by [`midir`].
#[allow(missing_debug_implementations)]
pub struct MidirDevice<I>
where
    I: MidiInputHandler + 'static,
{
    port: MidiPort,
    input_port_name: String,
    input_port: MidiInputPort,
    output_port_name: String,
    output_port: MidiOutputPort,
    input_connection: Option<MidiInputConnection<I>>,
}

impl<I> MidirDevice<I>
where
    I: MidiInputHandler + 'static,
{
    #[must_use]
    pub const fn port(&self) -> MidiPort {
        self.port
    }

    #[must_use]
    pub fn input_port_name(&self) -> &str {
        &self.input_port_name
    }

    #[must_use]
    pub fn output_port_name(&self) -> &str {
        &self.output_port_name
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.input_connection.is_some()
    }

    /// Connect both ports.
    ///
    /// All input is passed to `input_handler`. The returned output
    /// connection is supposed to be handed over to the sysex transport.
    pub fn connect(&mut self, input_handler: I) -> Result<MidiOutputConnection> {
        if self.is_connected() {
            return Err(ConnectionError::AlreadyConnected.into());
        }
        let mut input = MidiInput::new(CLIENT_NAME)?;
        // Sysex replies must not be filtered.
        input.ignore(Ignore::None);
        let input_connection = input.connect(
            &self.input_port,
            &self.input_port_name,
            |micros, input, input_handler| {
                handle_input(micros, input, input_handler);
            },
            input_handler,
        )?;
        let output = MidiOutput::new(CLIENT_NAME)?;
        let output_connection = output.connect(&self.output_port, &self.output_port_name)?;
        log::info!(
            "Connected MIDI ports \"{input_port_name}\" and \"{output_port_name}\"",
            input_port_name = self.input_port_name,
            output_port_name = self.output_port_name
        );
        self.input_connection = Some(input_connection);
        Ok(output_connection)
    }

    /// Close the input port and return the input handler.
    ///
    /// The output port is closed when its connection is dropped.
    pub fn disconnect(&mut self) -> Option<I> {
        let input_connection = self.input_connection.take()?;
        let (_input, input_handler) = input_connection.close();
        log::info!(
            "Disconnected MIDI input port \"{input_port_name}\"",
            input_port_name = self.input_port_name
        );
        Some(input_handler)
    }
}

/// Finds the MIDI ports of the device.
#[allow(missing_debug_implementations)]
pub struct MidirDeviceManager {
    input: MidiInput,
    output: MidiOutput,
}

impl MidirDeviceManager {
    pub fn new() -> Result<Self> {
        let input = MidiInput::new("input port watcher")?;
        let output = MidiOutput::new("output port watcher")?;
        Ok(Self { input, output })
    }

    pub fn filter_input_ports_by_name<'a>(
        &'a self,
        mut filter_port_name: impl FnMut(&str) -> bool + 'a,
    ) -> impl Iterator<Item = (String, MidiInputPort)> + 'a {
        self.input.ports().into_iter().filter_map(move |port| {
            let port_name = self.input.port_name(&port).ok()?;
            filter_port_name(&port_name).then_some((port_name, port))
        })
    }

    pub fn filter_output_ports_by_name<'a>(
        &'a self,
        mut filter_port_name: impl FnMut(&str) -> bool + 'a,
    ) -> impl Iterator<Item = (String, MidiOutputPort)> + 'a {
        self.output.ports().into_iter().filter_map(move |port| {
            let port_name = self.output.port_name(&port).ok()?;
            filter_port_name(&port_name).then_some((port_name, port))
        })
    }

    /// Look up the input and output port of the device.
    pub fn detect_device<I>(&self, port: MidiPort) -> Result<MidirDevice<I>>
    where
        I: MidiInputHandler + 'static,
    {
        let Some((input_port_name, input_port)) = self
            .filter_input_ports_by_name(|port_name| port.matches_port_name(port_name))
            .next()
        else {
            log::debug!("No MIDI input port found for {port:?}");
            return Err(ConnectionError::PortNotFound {
                name: format!("{DEVICE_NAME} ({port:?})").into(),
            }
            .into());
        };
        let Some((output_port_name, output_port)) = self
            .filter_output_ports_by_name(|port_name| port.matches_port_name(port_name))
            .next()
        else {
            log::debug!("No MIDI output port found for {port:?}");
            return Err(ConnectionError::PortNotFound {
                name: format!("{DEVICE_NAME} ({port:?})").into(),
            }
            .into());
        };
        log::debug!(
            "Found {port:?} MIDI ports (input port: \"{input_port_name}\", output port: \
             \"{output_port_name}\")"
        );
        Ok(MidirDevice {
            port,
            input_port_name,
            input_port,
            output_port_name,
            output_port,
            input_connection: None,
        })
    }
}

impl super::MidiOutputConnection for MidiOutputConnection {
    fn send_midi_output(&mut self, output: &[u8]) -> Result<()> {
        self.send(output).map_err(Into::into)
    }
}
