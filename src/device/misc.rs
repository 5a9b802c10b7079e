// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

use strum::{EnumIter, FromRepr};

use super::Push;
use crate::{
    codec::unpack, display::DisplayConnection, ensure_reply_len, midi::MidiOutputConnection,
    sysex::command, Error, Result,
};

/// Selects the ports on which the device sends its MIDI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum MidiMode {
    Live = 0,
    User = 1,
    Dual = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum PowerSupplyStatus {
    UsbOnly = 0,
    External = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Statistics {
    pub power_supply: PowerSupplyStatus,
    pub uptime_secs: u32,
}

impl Statistics {
    #[must_use]
    pub fn uptime(&self) -> Duration {
        Duration::from_secs(self.uptime_secs.into())
    }
}

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    pub fn set_midi_mode(&self, mode: MidiMode) -> Result<()> {
        self.call(command::SET_MIDI_MODE, &[mode as u8]).map(drop)
    }

    pub fn statistics(&self, run_id: u8) -> Result<Statistics> {
        let reply = self.call(command::REQUEST_STATISTICS, &[run_id])?;
        ensure_reply_len(command::REQUEST_STATISTICS, &reply, 6)?;
        let power_supply = PowerSupplyStatus::from_repr(reply[0]).ok_or(Error::InvalidReply {
            command: command::REQUEST_STATISTICS,
            value: reply[0],
        })?;
        Ok(Statistics {
            power_supply,
            uptime_secs: unpack(&reply[2..6]),
        })
    }
}
