// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    sync::{mpsc, Arc},
    thread::JoinHandle,
};

use parking_lot::Mutex;

use crate::{
    midi::MidiOutputConnection,
    sysex::{decode_sysex_frame, encode_sysex_frame},
    Result,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct SentMessages(Arc<Mutex<Vec<Vec<u8>>>>);

impl SentMessages {
    pub(crate) fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.0.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().len()
    }
}

/// Records all outbound messages and optionally forwards them to an emulated device.
#[derive(Debug)]
pub(crate) struct RecordingConnection {
    sent: SentMessages,
    forward: Option<mpsc::Sender<Vec<u8>>>,
}

impl RecordingConnection {
    pub(crate) fn new() -> (Self, SentMessages) {
        let sent = SentMessages::default();
        let connection = Self {
            sent: sent.clone(),
            forward: None,
        };
        (connection, sent)
    }

    pub(crate) fn with_forwarding() -> (Self, SentMessages, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        let sent = SentMessages::default();
        let connection = Self {
            sent: sent.clone(),
            forward: Some(tx),
        };
        (connection, sent, rx)
    }
}

impl MidiOutputConnection for RecordingConnection {
    fn send_midi_output(&mut self, output: &[u8]) -> Result<()> {
        self.sent.0.lock().push(output.to_vec());
        if let Some(forward) = &self.forward {
            // The device thread might already have terminated.
            forward.send(output.to_vec()).ok();
        }
        Ok(())
    }
}

/// Emulate the device on a separate thread.
///
/// Each forwarded sysex command is passed to `respond`. A returned reply
/// is framed and passed to `deliver`, i.e. into the inbound path. The
/// thread terminates when the connection is dropped.
pub(crate) fn spawn_responder<R, D>(
    rx: mpsc::Receiver<Vec<u8>>,
    mut respond: R,
    mut deliver: D,
) -> JoinHandle<()>
where
    R: FnMut(u8, &[u8], &mpsc::Receiver<Vec<u8>>) -> Option<Vec<u8>> + Send + 'static,
    D: FnMut(&[u8]) + Send + 'static,
{
    std::thread::spawn(move || {
        while let Ok(message) = rx.recv() {
            let Some((command, args)) = decode_sysex_frame(&message) else {
                continue;
            };
            if let Some(reply) = respond(command, args, &rx) {
                deliver(&encode_sysex_frame(command, &reply));
            }
        }
    })
}
