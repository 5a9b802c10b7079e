// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Sysex command/reply transport.
//!
//! Commands are sent as `[F0 00 21 1D 01 01] <command> <args...> [F7]`.
//! Replies carry the same prefix and the command code they answer. They are
//! matched to callers purely by this code, which is why at most one call per
//! command code is allowed to be in flight at any time.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::{midi::MidiOutputConnection, ConnectionError, Error, Result};

pub mod command;

pub const SYSEX_PREFIX: [u8; 6] = [0xf0, 0x00, 0x21, 0x1d, 0x01, 0x01];
pub const SYSEX_SUFFIX: u8 = 0xf7;

/// Build the wire frame of a command.
#[must_use]
pub fn encode_sysex_frame(command: u8, args: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(SYSEX_PREFIX.len() + 1 + args.len() + 1);
    frame.extend_from_slice(&SYSEX_PREFIX);
    frame.push(command);
    frame.extend_from_slice(args);
    frame.push(SYSEX_SUFFIX);
    frame
}

/// Split an inbound sysex message into its command code and arguments.
///
/// Returns `None` if the message does not start with the device's prefix
/// or is not properly terminated.
#[must_use]
pub fn decode_sysex_frame(input: &[u8]) -> Option<(u8, &[u8])> {
    let body = input.strip_prefix(&SYSEX_PREFIX)?;
    let body = body.strip_suffix(&[SYSEX_SUFFIX])?;
    let (&command, args) = body.split_first()?;
    Some((command, args))
}

fn describe_command(command: u8) -> impl fmt::Display {
    struct Described(u8);
    impl fmt::Display for Described {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let Self(command) = *self;
            match command::command_name(command) {
                Some(name) => write!(f, "0x{command:02x} ({name})"),
                None => write!(f, "0x{command:02x}"),
            }
        }
    }
    Described(command)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexTransportConfig {
    /// Maximum time to wait for a reply.
    ///
    /// Also bounds the time a caller waits for a preceding call
    /// of the same command code to finish.
    pub reply_timeout: Duration,
}

impl SysexTransportConfig {
    pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);
}

impl Default for SysexTransportConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Self::DEFAULT_REPLY_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
struct ReplyQueue {
    replies: VecDeque<Vec<u8>>,
    closed: bool,
    /// Incremented on every connect
    generation: u64,
}

impl ReplyQueue {
    const fn is_open_in(&self, generation: u64) -> bool {
        !self.closed && self.generation == generation
    }
}

/// Per-command reply bookkeeping.
#[derive(Debug)]
struct ReplySlot {
    /// Held for the whole duration of a call.
    in_flight: Mutex<()>,
    queue: Mutex<ReplyQueue>,
    reply_available: Condvar,
}

impl ReplySlot {
    fn new() -> Self {
        Self {
            in_flight: Mutex::new(()),
            queue: Mutex::new(ReplyQueue {
                replies: VecDeque::new(),
                closed: true,
                generation: 0,
            }),
            reply_available: Condvar::new(),
        }
    }

    fn open(&self) {
        let mut queue = self.queue.lock();
        queue.replies.clear();
        queue.closed = false;
        queue.generation = queue.generation.wrapping_add(1);
    }

    /// Returns the number of discarded replies.
    fn close(&self) -> usize {
        let discarded = {
            let mut queue = self.queue.lock();
            queue.closed = true;
            let discarded = queue.replies.len();
            queue.replies.clear();
            discarded
        };
        self.reply_available.notify_all();
        discarded
    }

    /// Returns `false` if the slot is closed and the reply has been dropped.
    fn push(&self, reply: Vec<u8>) -> bool {
        {
            let mut queue = self.queue.lock();
            if queue.closed {
                return false;
            }
            queue.replies.push_back(reply);
        }
        self.reply_available.notify_one();
        true
    }

    /// Returns the number of discarded replies and the current generation.
    fn discard_stale(&self) -> (usize, u64) {
        let mut queue = self.queue.lock();
        let discarded = queue.replies.len();
        queue.replies.clear();
        (discarded, queue.generation)
    }

    /// Fails if the slot has been closed or reopened since `generation`.
    fn wait_for_reply(&self, command: u8, generation: u64, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut queue = self.queue.lock();
        loop {
            if !queue.is_open_in(generation) {
                return Err(ConnectionError::NotConnected.into());
            }
            if let Some(reply) = queue.replies.pop_front() {
                return Ok(reply);
            }
            if self
                .reply_available
                .wait_until(&mut queue, deadline)
                .timed_out()
            {
                if !queue.is_open_in(generation) {
                    return Err(ConnectionError::NotConnected.into());
                }
                return queue
                    .replies
                    .pop_front()
                    .ok_or(Error::Timeout { command, timeout });
            }
        }
    }
}

/// Sends sysex commands and correlates them with their replies.
///
/// Shared between the caller threads that issue commands and the
/// MIDI input thread that feeds replies via [`Self::handle_sysex_input()`].
pub struct SysexTransport<C> {
    config: SysexTransportConfig,
    output: Mutex<Option<C>>,
    reply_slots: HashMap<u8, ReplySlot>,
}

impl<C> fmt::Debug for SysexTransport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands_with_reply: Vec<_> = self.reply_slots.keys().copied().collect();
        commands_with_reply.sort_unstable();
        f.debug_struct("SysexTransport")
            .field("config", &self.config)
            .field("connected", &self.output.lock().is_some())
            .field("commands_with_reply", &commands_with_reply)
            .finish_non_exhaustive()
    }
}

impl<C> SysexTransport<C>
where
    C: MidiOutputConnection,
{
    /// Create a disconnected transport for the device's commands.
    #[must_use]
    pub fn new(config: SysexTransportConfig) -> Self {
        Self::with_commands_with_reply(config, command::COMMANDS_WITH_REPLY)
    }

    /// Create a disconnected transport with a custom set of commands
    /// that produce replies.
    #[must_use]
    pub fn with_commands_with_reply(config: SysexTransportConfig, commands: &[u8]) -> Self {
        let reply_slots = commands
            .iter()
            .map(|&command| (command, ReplySlot::new()))
            .collect();
        Self {
            config,
            output: Mutex::new(None),
            reply_slots,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SysexTransportConfig {
        &self.config
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.output.lock().is_some()
    }

    #[must_use]
    pub fn expects_reply(&self, command: u8) -> bool {
        self.reply_slots.contains_key(&command)
    }

    pub fn connect(&self, connection: C) -> Result<()> {
        let mut output = self.output.lock();
        if output.is_some() {
            return Err(ConnectionError::AlreadyConnected.into());
        }
        for slot in self.reply_slots.values() {
            slot.open();
        }
        *output = Some(connection);
        log::info!("Sysex transport connected");
        Ok(())
    }

    /// Disconnect and return the output connection.
    ///
    /// All pending calls fail with [`ConnectionError::NotConnected`].
    pub fn disconnect(&self) -> Result<C> {
        let connection = self
            .output
            .lock()
            .take()
            .ok_or(ConnectionError::NotConnected)?;
        let discarded: usize = self.reply_slots.values().map(ReplySlot::close).sum();
        if discarded > 0 {
            log::debug!("Discarded {discarded} unclaimed sysex replies");
        }
        log::info!("Sysex transport disconnected");
        Ok(connection)
    }

    /// Send a raw MIDI message.
    pub fn send_midi_output(&self, output: &[u8]) -> Result<()> {
        let mut connection = self.output.lock();
        let Some(connection) = connection.as_mut() else {
            return Err(ConnectionError::NotConnected.into());
        };
        connection.send_midi_output(output)
    }

    /// Send a command and wait for its reply.
    ///
    /// Returns the argument bytes of the reply or an empty vector if the
    /// command does not produce a reply.
    pub fn call(&self, command: u8, args: &[u8]) -> Result<Vec<u8>> {
        let frame = encode_sysex_frame(command, args);
        let Some(slot) = self.reply_slots.get(&command) else {
            log::trace!(
                "Sending sysex command {command}: {frame:02x?}",
                command = describe_command(command)
            );
            self.send_midi_output(&frame)?;
            return Ok(Vec::new());
        };
        let timeout = self.config.reply_timeout;
        let Some(_in_flight) = slot.in_flight.try_lock_for(timeout) else {
            log::warn!(
                "Preceding call of sysex command {command} did not finish within {timeout:?}",
                command = describe_command(command)
            );
            return Err(Error::Timeout { command, timeout });
        };
        let (discarded, generation) = slot.discard_stale();
        if discarded > 0 {
            log::debug!(
                "Discarded {discarded} stale replies of sysex command {command}",
                command = describe_command(command)
            );
        }
        log::trace!(
            "Sending sysex command {command}: {frame:02x?}",
            command = describe_command(command)
        );
        self.send_midi_output(&frame)?;
        let reply = slot.wait_for_reply(command, generation, timeout).inspect_err(|err| {
            log::warn!(
                "Sysex command {command} failed: {err}",
                command = describe_command(command)
            );
        })?;
        log::trace!(
            "Received reply of sysex command {command}: {reply:02x?}",
            command = describe_command(command)
        );
        Ok(reply)
    }
}

impl<C> SysexTransport<C> {
    /// Feed an inbound sysex message.
    ///
    /// Invoked from the MIDI input thread. Never blocks for longer than
    /// needed for enqueuing the reply.
    ///
    /// Returns `true` if the message belongs to the device.
    pub fn handle_sysex_input(&self, input: &[u8]) -> bool {
        let Some((command, args)) = decode_sysex_frame(input) else {
            log::warn!("Unrecognized sysex input: {input:02x?}");
            return false;
        };
        let Some(slot) = self.reply_slots.get(&command) else {
            log::debug!(
                "Ignoring sysex input for command {command} without reply",
                command = describe_command(command)
            );
            return true;
        };
        if !slot.push(args.to_vec()) {
            log::warn!(
                "Dropped reply of sysex command {command} while disconnected",
                command = describe_command(command)
            );
        }
        true
    }
}
