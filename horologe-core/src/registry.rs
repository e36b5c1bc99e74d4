//! Capability matching and attachment slot state machine
//!
//! Discovered devices declare a compatible string; the static match
//! table maps it to one of the two peripheral capabilities this system
//! coordinates. Each capability has one slot whose lifecycle is the
//! state machine below.

/// Peripheral capability kinds coordinated by this system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability {
    /// Battery-backed clock/time source
    Clock,
    /// Paged character display
    Display,
}

/// One entry of the capability match table
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDescriptor {
    /// Device-tree-style compatible identifier
    pub compatible: &'static str,
    /// Capability the device provides
    pub capability: Capability,
}

/// Static match table consulted on every discovery event
///
/// Devices presenting a compatible string outside this table are
/// rejected; no dynamic registration exists.
pub static MATCH_TABLE: &[CapabilityDescriptor] = &[
    CapabilityDescriptor {
        compatible: "maxim,ds1307",
        capability: Capability::Clock,
    },
    CapabilityDescriptor {
        compatible: "solomon,ssd1306",
        capability: Capability::Display,
    },
];

/// Attach-time classification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownDevice;

/// Match a declared compatible identifier against the known set
pub fn classify(compatible: &str) -> Result<Capability, UnknownDevice> {
    MATCH_TABLE
        .iter()
        .find(|d| d.compatible == compatible)
        .map(|d| d.capability)
        .ok_or(UnknownDevice)
}

/// Lifecycle state of one peripheral slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// No device bound to the slot
    #[default]
    Unattached,
    /// Discovery matched; hardware bring-up in progress
    Attaching,
    /// Handle published, device usable
    Attached,
    /// Teardown in progress; handle about to be invalidated
    Detaching,
}

/// Events driving a slot's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotEvent {
    /// Discovery matched this slot's capability
    AttachRequested,
    /// Bring-up finished, handle published
    AttachSucceeded,
    /// Bring-up failed, slot released
    AttachFailed,
    /// Removal reported for this slot's device
    DetachRequested,
    /// Teardown finished, handle invalidated
    DetachCompleted,
}

impl SlotState {
    /// Whether a handle for this slot is currently published
    pub fn is_attached(&self) -> bool {
        matches!(self, SlotState::Attached)
    }

    /// Process an event and return the next state
    ///
    /// Unlisted combinations keep the current state, which makes
    /// re-attach of an attached slot and detach of an unattached slot
    /// idempotent no-ops.
    pub fn transition(self, event: SlotEvent) -> Self {
        use SlotEvent::*;
        use SlotState::*;

        match (self, event) {
            (Unattached, AttachRequested) => Attaching,
            (Attaching, AttachSucceeded) => Attached,
            (Attaching, AttachFailed) => Unattached,
            (Attached, DetachRequested) => Detaching,
            (Detaching, DetachCompleted) => Unattached,

            // Default: stay in current state
            _ => self,
        }
    }
}
