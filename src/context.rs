//! Process-wide (thread-local) default options, with scoped push/pop.
//!
//! The three registers — fixed-point cast defaults, the floating-point
//! quantization default, and the optional accumulator override — are
//! explicit values that every kernel entry point accepts and threads
//! through; nothing in `fixed`/`float`/`array` reads these thread-locals
//! directly. They exist purely so call sites that omit a cast's mode
//! arguments get ergonomic, scoped defaults: a thread-local fallback is
//! acceptable to preserve call-site ergonomics, but the kernels themselves
//! must read the snapshot once.
//!
//! Uses the same `thread_local!`-free but scope-owned state as the rekey-
//! on-drop discipline in [`crate::rng`]; the scoped-guard shape here is the
//! same "push now, restore on drop" pattern applied to a value instead of a
//! key.

use std::cell::Cell;

use crate::fixed::FixedCastOption;
use crate::float::FloatSpec;
use crate::quantize::QuantizationMode;

thread_local! {
    static FIXED_CAST_OPTION: Cell<FixedCastOption> = Cell::new(FixedCastOption::default());
    static FLOAT_QUANTIZATION_MODE: Cell<QuantizationMode> = Cell::new(QuantizationMode::RndConv);
    static FLOAT_ACCUMULATOR: Cell<Option<AccumulatorOption>> = Cell::new(None);
}

/// Optional override for inner-product-like reductions: either a fixed-point spec or a
/// `(FloatSpec, QuantizationMode)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccumulatorOption {
    Fixed(crate::fixed::FixedSpec),
    Float(FloatSpec, QuantizationMode),
}

/// Current default fixed-point cast option.
pub fn fixed_cast_option() -> FixedCastOption {
    FIXED_CAST_OPTION.with(|c| c.get())
}

/// Replace the default fixed-point cast option, returning the previous one.
pub fn set_fixed_cast_option(value: FixedCastOption) -> FixedCastOption {
    FIXED_CAST_OPTION.with(|c| c.replace(value))
}

/// Current default floating-point quantization mode.
pub fn float_quantization_mode() -> QuantizationMode {
    FLOAT_QUANTIZATION_MODE.with(|c| c.get())
}

pub fn set_float_quantization_mode(value: QuantizationMode) -> QuantizationMode {
    FLOAT_QUANTIZATION_MODE.with(|c| c.replace(value))
}

/// Current accumulator override, if any.
pub fn float_accumulator_option() -> Option<AccumulatorOption> {
    FLOAT_ACCUMULATOR.with(|c| c.get())
}

pub fn set_float_accumulator_option(value: Option<AccumulatorOption>) -> Option<AccumulatorOption> {
    FLOAT_ACCUMULATOR.with(|c| c.replace(value))
}

/// RAII guard restoring the previous fixed cast option on drop, including
/// on an unwinding panic.
pub struct FixedCastOptionGuard {
    previous: FixedCastOption,
}

impl FixedCastOptionGuard {
    pub fn push(value: FixedCastOption) -> Self {
        Self {
            previous: set_fixed_cast_option(value),
        }
    }
}

impl Drop for FixedCastOptionGuard {
    fn drop(&mut self) {
        set_fixed_cast_option(self.previous);
    }
}

/// RAII guard restoring the previous float quantization mode on drop.
pub struct FloatQuantizationModeGuard {
    previous: QuantizationMode,
}

impl FloatQuantizationModeGuard {
    pub fn push(value: QuantizationMode) -> Self {
        Self {
            previous: set_float_quantization_mode(value),
        }
    }
}

impl Drop for FloatQuantizationModeGuard {
    fn drop(&mut self) {
        set_float_quantization_mode(self.previous);
    }
}

/// RAII guard restoring the previous accumulator option on drop.
pub struct FloatAccumulatorOptionGuard {
    previous: Option<AccumulatorOption>,
}

impl FloatAccumulatorOptionGuard {
    pub fn push(value: Option<AccumulatorOption>) -> Self {
        Self {
            previous: set_float_accumulator_option(value),
        }
    }
}

impl Drop for FloatAccumulatorOptionGuard {
    fn drop(&mut self) {
        set_float_accumulator_option(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::OverflowMode;

    #[test]
    fn scoped_push_restores_on_drop() {
        let before = float_quantization_mode();
        {
            let _guard = FloatQuantizationModeGuard::push(QuantizationMode::Jam);
            assert_eq!(float_quantization_mode(), QuantizationMode::Jam);
        }
        assert_eq!(float_quantization_mode(), before);
    }

    #[test]
    fn scoped_push_restores_on_panic_unwind() {
        let before = float_quantization_mode();
        let result = std::panic::catch_unwind(|| {
            let _guard = FloatQuantizationModeGuard::push(QuantizationMode::TrnZero);
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(float_quantization_mode(), before);
    }

    #[test]
    fn fixed_cast_option_defaults_and_overrides() {
        let custom = FixedCastOption {
            quantization: QuantizationMode::Rnd,
            overflow: OverflowMode::Sat,
        };
        let _guard = FixedCastOptionGuard::push(custom);
        assert_eq!(fixed_cast_option(), custom);
    }
}
