//! # Manager configuration.
//!
//! [`Config`] centralizes the few knobs the manager and the built-in signalers
//! expose. OS signal mappings are configured separately through
//! [`SignalTable`](crate::SignalTable), passed to [`OsSignals::new`](crate::OsSignals::new).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `control_capacity = 0` → clamped to 1

/// Configuration for a [`ServiceManager`](crate::ServiceManager) and its signalers.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `control_capacity`: buffer of control channels built with
///   [`BaseSignaler::from_config`](crate::BaseSignaler::from_config) (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel.
    ///
    /// Subscribers lagging by more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,

    /// Buffer size of a signaler's control channel.
    ///
    /// With the default of 1, a second control function waits until the wait
    /// loop has taken the first.
    pub control_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a control channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn control_capacity_clamped(&self) -> usize {
        self.control_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `control_capacity = 1`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            control_capacity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_accessors() {
        let cfg = Config {
            bus_capacity: 0,
            control_capacity: 0,
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.control_capacity_clamped(), 1);

        let cfg = Config::default();
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
        assert_eq!(cfg.control_capacity_clamped(), 1);
    }
}
