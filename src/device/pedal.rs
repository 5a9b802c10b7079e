// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::Push;
use crate::{
    codec::{curve_chunks, pack7, u7_pair_to_u14},
    display::DisplayConnection,
    ensure_reply_len,
    midi::MidiOutputConnection,
    pedal::{AssignmentChange, PedalContact, UNASSIGNED_CC_NUMBER},
    sysex::command,
    Result,
};

pub const PEDAL_CURVE_ENTRIES: usize = 32;

const PEDAL_CURVE_CHUNKS: usize = 4;

/// Raw analog readings of all pedal contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct PedalSampleData {
    pub pedal_1_ring: u16,
    pub pedal_1_tip: u16,
    pub pedal_2_ring: u16,
    pub pedal_2_tip: u16,
}

impl PedalSampleData {
    fn from_reply(reply: &[u8]) -> Self {
        debug_assert!(reply.len() >= 8);
        Self {
            pedal_1_ring: u7_pair_to_u14(reply[0], reply[1]),
            pedal_1_tip: u7_pair_to_u14(reply[2], reply[3]),
            pedal_2_ring: u7_pair_to_u14(reply[4], reply[5]),
            pedal_2_tip: u7_pair_to_u14(reply[6], reply[7]),
        }
    }
}

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    /// Averages over `2^log2_samples` readings.
    pub fn sample_pedals(&self, log2_samples: u8) -> Result<PedalSampleData> {
        let reply = self.call(command::SAMPLE_PEDAL_DATA, &[log2_samples])?;
        ensure_reply_len(command::SAMPLE_PEDAL_DATA, &reply, 8)?;
        Ok(PedalSampleData::from_reply(&reply))
    }

    /// Enable or disable control change messages for a pedal contact.
    ///
    /// Nothing is sent if the assignment does not change. The assignments
    /// are left unchanged if the command could not be sent.
    pub fn set_pedal_configuration(&self, contact: PedalContact, enable: bool) -> Result<()> {
        // Held until the command has been sent
        let mut pedal_assignments = self.shared.pedal_assignments.lock();
        let previous_assignments = pedal_assignments.clone();
        let change = if enable {
            pedal_assignments.enable(contact)
        } else {
            pedal_assignments.disable(contact)
        };
        let cc_number = match change {
            AssignmentChange::Assigned(cc_number) => {
                log::debug!("Assigned control change {cc_number} to pedal contact {contact:?}");
                cc_number
            }
            AssignmentChange::Released(cc_number) => {
                log::debug!("Released control change {cc_number} of pedal contact {contact:?}");
                UNASSIGNED_CC_NUMBER
            }
            AssignmentChange::Unchanged => return Ok(()),
        };
        self.call(
            command::CONFIGURE_PEDAL,
            &[contact.to_u7(), cc_number, 0, 0],
        )
        .map(drop)
        .inspect_err(|err| {
            log::warn!("Failed to configure pedal contact {contact:?}: {err}");
            *pedal_assignments = previous_assignments;
        })
    }

    pub fn set_pedal_curve_limits(
        &self,
        contact: PedalContact,
        heel_down: u16,
        toe_down: u16,
    ) -> Result<()> {
        let [heel_lo, heel_hi] = pack7(heel_down);
        let [toe_lo, toe_hi] = pack7(toe_down);
        self.call(
            command::SET_PEDAL_CURVE_LIMITS,
            &[contact.to_u7(), heel_lo, heel_hi, toe_lo, toe_hi],
        )
        .map(drop)
    }

    pub fn set_pedal_curve_entries(
        &self,
        contact: PedalContact,
        entries: &[u8; PEDAL_CURVE_ENTRIES],
    ) -> Result<()> {
        let entries_per_chunk = PEDAL_CURVE_ENTRIES / PEDAL_CURVE_CHUNKS;
        for chunk in curve_chunks(entries, entries_per_chunk) {
            let mut args = Vec::with_capacity(2 + 2 * chunk.entries.len());
            args.push(contact.to_u7());
            args.push(chunk.start);
            for &entry in chunk.entries {
                args.extend_from_slice(&pack7(entry.into()));
            }
            self.call(command::SET_PEDAL_CURVE_ENTRIES, &args)?;
        }
        Ok(())
    }
}
