//! Byte-denominated buffer sizing and the growth policy shared by every
//! device buffer the draw list owns.
//!
//! Kept as an explicit newtype over bytes (never element count) since the
//! draw list's four buffers (draw-commands, instance-data, transform-data,
//! material-data) hold differently-sized elements; mixing units here is the
//! exact ambiguity the growth policy must not reproduce.

use std::mem::size_of;

/// A size in bytes. Deliberately not `Deref<Target = u64>`: call sites must
/// say `.bytes()` rather than accidentally comparing a byte count to an
/// element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BufferLen(u64);

impl BufferLen {
    #[must_use]
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn of<T>(element_count: usize) -> Self {
        Self((element_count * size_of::<T>()) as u64)
    }

    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }
}

/// The outcome of checking a buffer's current capacity against what a frame
/// now requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPlan {
    pub required: BufferLen,
    pub new_capacity: BufferLen,
    pub needs_resize: bool,
}

/// If `required` exceeds `current_capacity`, grows to `ceil(required * 1.5)`;
/// existing buffer contents are not expected to survive a resize — each
/// frame uploads its full contents regardless.
#[must_use]
pub fn plan_growth(current_capacity: BufferLen, required: BufferLen) -> GrowthPlan {
    if required.0 <= current_capacity.0 {
        GrowthPlan {
            required,
            new_capacity: current_capacity,
            needs_resize: false,
        }
    } else {
        let grown = (required.0 as f64 * 1.5).ceil() as u64;
        GrowthPlan {
            required,
            new_capacity: BufferLen(grown),
            needs_resize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_rounds_up_to_one_and_a_half_times_required() {
        let current = BufferLen::from_bytes(1024 * 1024);
        let required = BufferLen::from_bytes((1.3 * 1024.0 * 1024.0) as u64);
        let plan = plan_growth(current, required);
        assert!(plan.needs_resize);
        assert_eq!(plan.new_capacity, BufferLen::from_bytes((required.bytes() as f64 * 1.5).ceil() as u64));
    }

    #[test]
    fn no_resize_when_capacity_already_sufficient() {
        let current = BufferLen::from_bytes(4096);
        let plan = plan_growth(current, BufferLen::from_bytes(2048));
        assert!(!plan.needs_resize);
        assert_eq!(plan.new_capacity, current);
    }
}
