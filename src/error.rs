// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use std::{borrow::Cow, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("already connected")]
    AlreadyConnected,

    #[error("not connected")]
    NotConnected,

    #[error("device not found")]
    DeviceNotFound,

    #[error("MIDI port \"{name}\" not found")]
    PortNotFound { name: Cow<'static, str> },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("transport: {msg}")]
    Transport { msg: Cow<'static, str> },

    #[error("no reply for command 0x{command:02x} within {timeout:?}")]
    Timeout { command: u8, timeout: Duration },

    #[error("reply for command 0x{command:02x} too short: expected {expected} bytes, got {actual}")]
    Protocol {
        command: u8,
        expected: usize,
        actual: usize,
    },

    #[error("reply for command 0x{command:02x} contains invalid value {value}")]
    InvalidReply { command: u8, value: u8 },

    #[error("invalid argument: {msg}")]
    InvalidArgument { msg: Cow<'static, str> },
}

impl Error {
    #[must_use]
    pub fn transport(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Transport { msg: msg.into() }
    }

    #[must_use]
    pub fn invalid_argument(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument { msg: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check that a reply provides at least the expected number of argument bytes.
pub fn ensure_reply_len(command: u8, reply: &[u8], expected: usize) -> Result<()> {
    if reply.len() < expected {
        return Err(Error::Protocol {
            command,
            expected,
            actual: reply.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reply_is_a_protocol_error() {
        assert!(ensure_reply_len(0x1f, &[], 0).is_ok());
        assert!(ensure_reply_len(0x1f, &[1, 2], 2).is_ok());
        let err = ensure_reply_len(0x1f, &[1], 2).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol {
                command: 0x1f,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn display_messages() {
        let err = Error::Timeout {
            command: 0x09,
            timeout: Duration::from_millis(10),
        };
        assert_eq!("no reply for command 0x09 within 10ms", err.to_string());
        let err = Error::from(ConnectionError::NotConnected);
        assert_eq!("not connected", err.to_string());
        let err = Error::InvalidReply {
            command: 0x1f,
            value: 9,
        };
        assert_eq!(
            "reply for command 0x1f contains invalid value 9",
            err.to_string()
        );
    }
}
