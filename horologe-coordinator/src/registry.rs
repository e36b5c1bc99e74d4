//! Attachment registry
//!
//! Consumes discovery events, classifies the device against the
//! capability match table and drives the per-slot lifecycle state
//! machine, delegating the actual handle management and hardware
//! bring-up to the coordinator. Unknown devices are rejected with no
//! state mutated.

use horologe_core::registry::{classify, Capability, SlotEvent, SlotState};
use horologe_hal::Bus;

use crate::coordinator::{AttachError, Coordinator};

/// A device reported by bus discovery
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryEvent<'a> {
    /// Declared compatible identifier
    pub compatible: &'a str,
    /// 7-bit bus address
    pub address: u8,
}

/// Errors from processing a discovery event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Compatible identifier matched nothing in the capability table
    UnknownDevice,
    /// Classification succeeded but attach failed; the slot was
    /// released
    Attach(AttachError),
}

/// The attachment registry
///
/// One instance per coordinator, driven by whichever context receives
/// discovery events.
pub struct Registry<'a, B> {
    coordinator: &'a Coordinator<B>,
    clock_slot: SlotState,
    display_slot: SlotState,
}

impl<'a, B> Registry<'a, B>
where
    B: Bus,
{
    /// Create a registry feeding the given coordinator
    pub fn new(coordinator: &'a Coordinator<B>) -> Self {
        Self {
            coordinator,
            clock_slot: SlotState::default(),
            display_slot: SlotState::default(),
        }
    }

    /// Current lifecycle state of a capability's slot
    pub fn slot(&self, capability: Capability) -> SlotState {
        match capability {
            Capability::Clock => self.clock_slot,
            Capability::Display => self.display_slot,
        }
    }

    /// Process a device-added discovery event
    ///
    /// Re-attachment of an already-attached slot is an idempotent
    /// no-op.
    pub async fn device_added(&mut self, event: DiscoveryEvent<'_>) -> Result<(), RegistryError> {
        let capability = classify(event.compatible).map_err(|_| {
            warn!("rejecting unknown device at {=u8:#x}", event.address);
            RegistryError::UnknownDevice
        })?;

        {
            let slot = self.slot_mut(capability);
            let next = slot.transition(SlotEvent::AttachRequested);
            if next != SlotState::Attaching {
                debug!("slot busy, ignoring attach for {}", capability);
                return Ok(());
            }
            *slot = next;
        }

        let result = self.coordinator.attach(capability, event.address).await;
        let slot = self.slot_mut(capability);
        match result {
            Ok(()) => {
                *slot = slot.transition(SlotEvent::AttachSucceeded);
                Ok(())
            }
            Err(e) => {
                *slot = slot.transition(SlotEvent::AttachFailed);
                warn!("attach failed: {}", e);
                Err(RegistryError::Attach(e))
            }
        }
    }

    /// Process a device-removed event
    ///
    /// Detachment of an already-unattached slot is an idempotent
    /// no-op; unknown identifiers are ignored here since nothing of
    /// theirs was ever attached.
    pub async fn device_removed(&mut self, compatible: &str) {
        let Ok(capability) = classify(compatible) else {
            return;
        };

        {
            let slot = self.slot_mut(capability);
            let next = slot.transition(SlotEvent::DetachRequested);
            if next != SlotState::Detaching {
                return;
            }
            *slot = next;
        }

        self.coordinator.detach(capability).await;
        let slot = self.slot_mut(capability);
        *slot = slot.transition(SlotEvent::DetachCompleted);
    }

    fn slot_mut(&mut self, capability: Capability) -> &mut SlotState {
        match capability {
            Capability::Clock => &mut self.clock_slot,
            Capability::Display => &mut self.display_slot,
        }
    }
}
