// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Assignment of pedal contacts to control change numbers.
//!
//! The device reports each enabled pedal contact with its own control
//! change number. The numbers are taken from a small pool when a contact
//! is enabled and returned to the pool when it is disabled.

use strum::{EnumCount, EnumIter, FromRepr};

/// A contact of one of the two pedal jacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, EnumCount)]
#[repr(u8)]
pub enum PedalContact {
    Pedal1Ring = 0,
    Pedal1Tip = 1,
    Pedal2Ring = 2,
    // The gap in the numbering is how the firmware addresses this contact.
    Pedal2Tip = 4,
}

impl PedalContact {
    /// The contact as addressed in sysex commands.
    #[must_use]
    pub const fn to_u7(self) -> u8 {
        self as u8
    }
}

/// All control change numbers that might carry pedal input.
pub const PEDAL_CC_NUMBERS: [u8; 4] = [64, 65, 66, 69];

const INITIAL_AVAILABLE_CC_NUMBERS: [u8; 2] = [65, 66];

const INITIAL_ASSIGNMENTS: [(PedalContact, u8); 2] = [
    (PedalContact::Pedal1Ring, 64),
    (PedalContact::Pedal2Ring, 69),
];

/// Control change number that clears the assignment of a contact.
pub const UNASSIGNED_CC_NUMBER: u8 = 127;

/// Outcome of [`PedalAssignments::enable()`] and [`PedalAssignments::disable()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentChange {
    /// The contact has been assigned this control change number.
    Assigned(u8),
    /// The contact has released this control change number.
    Released(u8),
    Unchanged,
}

/// Bookkeeping of the control change numbers used by pedal contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedalAssignments {
    /// Free numbers, taken from the back
    available: Vec<u8>,
    assigned: Vec<(PedalContact, u8)>,
}

impl Default for PedalAssignments {
    /// The assignments of a freshly powered device.
    fn default() -> Self {
        Self {
            available: INITIAL_AVAILABLE_CC_NUMBERS.to_vec(),
            assigned: INITIAL_ASSIGNMENTS.to_vec(),
        }
    }
}

impl PedalAssignments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn available_cc_numbers(&self) -> &[u8] {
        &self.available
    }

    #[must_use]
    pub fn cc_number(&self, contact: PedalContact) -> Option<u8> {
        self.assigned
            .iter()
            .find_map(|&(assigned, cc_number)| (assigned == contact).then_some(cc_number))
    }

    /// The contact that is currently reported with the given number.
    #[must_use]
    pub fn contact(&self, cc_number: u8) -> Option<PedalContact> {
        self.assigned
            .iter()
            .find_map(|&(contact, assigned)| (assigned == cc_number).then_some(contact))
    }

    pub fn enable(&mut self, contact: PedalContact) -> AssignmentChange {
        if self.cc_number(contact).is_some() {
            return AssignmentChange::Unchanged;
        }
        let Some(cc_number) = self.available.pop() else {
            log::warn!("No control change number available for pedal contact {contact:?}");
            return AssignmentChange::Unchanged;
        };
        self.assigned.push((contact, cc_number));
        AssignmentChange::Assigned(cc_number)
    }

    pub fn disable(&mut self, contact: PedalContact) -> AssignmentChange {
        let Some(index) = self
            .assigned
            .iter()
            .position(|&(assigned, _)| assigned == contact)
        else {
            return AssignmentChange::Unchanged;
        };
        let (_, cc_number) = self.assigned.swap_remove(index);
        self.available.push(cc_number);
        AssignmentChange::Released(cc_number)
    }
}
