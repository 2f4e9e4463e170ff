//! Framebuffer config description and best-match selection.

use log::debug;

use crate::error::{ErrorKind, Result};

/// Penalty for every color, depth, stencil or accum channel that provides
/// fewer bits than requested.
const UNDER_PROVISION: u64 = 1 << 40;

/// Penalty for a config that has no multisample buffer when one was requested,
/// or has one when none was requested.
const SAMPLES_PRESENCE: u64 = 1 << 40;

/// Penalty for an sRGB capability mismatch.
const SRGB_MISMATCH: u64 = 1 << 36;

/// Penalty for a stereo or double buffering mismatch. Larger than every other
/// penalty summed together.
const HARD_MISMATCH: u64 = 1 << 48;

/// Framebuffer configuration.
///
/// This describes the buffers of a rendering surface and their sizes. It also
/// contains a backend specific handle used to map back to the native config
/// object.
///
/// The same type is used for the *desired* config, where every integer field
/// may be [`FramebufferConfig::DONT_CARE`], and for the alternatives
/// enumerated by a [`Backend`], which always report concrete values.
///
/// [`Backend`]: crate::backend::Backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferConfig {
    /// Bits of red in the color buffer.
    pub red_bits: i32,
    /// Bits of green in the color buffer.
    pub green_bits: i32,
    /// Bits of blue in the color buffer.
    pub blue_bits: i32,
    /// Bits of alpha in the color buffer.
    pub alpha_bits: i32,
    /// Bits of depth in the depth buffer.
    pub depth_bits: i32,
    /// Bits of stencil in the stencil buffer.
    pub stencil_bits: i32,
    /// Bits of red in the accumulation buffer.
    pub accum_red_bits: i32,
    /// Bits of green in the accumulation buffer.
    pub accum_green_bits: i32,
    /// Bits of blue in the accumulation buffer.
    pub accum_blue_bits: i32,
    /// Bits of alpha in the accumulation buffer.
    pub accum_alpha_bits: i32,
    /// Number of auxiliary buffers.
    pub aux_buffers: i32,
    /// Number of samples in the multisample buffer, zero when there's none.
    pub samples: i32,
    /// Whether left and right buffers are present.
    pub stereo: bool,
    /// Whether the color buffer is sRGB capable.
    pub srgb: bool,
    /// Whether the config is double buffered.
    pub doublebuffer: bool,
    /// Backend handle of an enumerated config. Zero for desired configs.
    pub handle: usize,
}

impl FramebufferConfig {
    /// The "no preference" value for the integer fields of a desired config.
    pub const DONT_CARE: i32 = -1;

    /// Whether every integer field holds a concrete value.
    ///
    /// Configs returned by a backend must always be concrete.
    pub fn is_concrete(&self) -> bool {
        self.integer_fields().iter().all(|&value| value >= 0)
    }

    /// The penalty of using `self` when `desired` was asked for. Lower is
    /// better, zero is an exact match.
    pub fn cost_against(&self, desired: &FramebufferConfig) -> u64 {
        let channels = [
            (desired.red_bits, self.red_bits),
            (desired.green_bits, self.green_bits),
            (desired.blue_bits, self.blue_bits),
            (desired.alpha_bits, self.alpha_bits),
            (desired.depth_bits, self.depth_bits),
            (desired.stencil_bits, self.stencil_bits),
            (desired.accum_red_bits, self.accum_red_bits),
            (desired.accum_green_bits, self.accum_green_bits),
            (desired.accum_blue_bits, self.accum_blue_bits),
            (desired.accum_alpha_bits, self.accum_alpha_bits),
        ];

        let mut cost: u64 = channels
            .iter()
            .map(|&(desired, actual)| channel_cost(desired, actual))
            .sum();

        cost += count_cost(desired.aux_buffers, self.aux_buffers);
        cost += count_cost(desired.samples, self.samples);
        if desired.samples != Self::DONT_CARE && (desired.samples == 0) != (self.samples == 0) {
            cost += SAMPLES_PRESENCE;
        }

        if desired.stereo != self.stereo {
            cost += HARD_MISMATCH;
        }
        if desired.doublebuffer != self.doublebuffer {
            cost += HARD_MISMATCH;
        }
        if desired.srgb != self.srgb {
            cost += SRGB_MISMATCH;
        }

        cost
    }

    /// Whether `self` satisfies the buffering mode requirements of `desired`.
    pub fn meets_hard_requirements(&self, desired: &FramebufferConfig) -> bool {
        self.stereo == desired.stereo && self.doublebuffer == desired.doublebuffer
    }

    fn integer_fields(&self) -> [i32; 12] {
        [
            self.red_bits,
            self.green_bits,
            self.blue_bits,
            self.alpha_bits,
            self.depth_bits,
            self.stencil_bits,
            self.accum_red_bits,
            self.accum_green_bits,
            self.accum_blue_bits,
            self.accum_alpha_bits,
            self.aux_buffers,
            self.samples,
        ]
    }
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        FramebufferConfig {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            accum_red_bits: 0,
            accum_green_bits: 0,
            accum_blue_bits: 0,
            accum_alpha_bits: 0,
            aux_buffers: 0,
            samples: 0,
            stereo: false,
            srgb: false,
            doublebuffer: true,
            handle: 0,
        }
    }
}

fn channel_cost(desired: i32, actual: i32) -> u64 {
    if desired == FramebufferConfig::DONT_CARE {
        return 0;
    }

    let mut cost = u64::from(desired.abs_diff(actual));
    if actual < desired {
        cost += UNDER_PROVISION;
    }

    cost
}

fn count_cost(desired: i32, actual: i32) -> u64 {
    if desired == FramebufferConfig::DONT_CARE {
        0
    } else {
        u64::from(desired.abs_diff(actual))
    }
}

/// Pick the alternative that matches `desired` best.
///
/// The returned reference points into `alternatives`. When several
/// alternatives share the lowest cost the first one wins.
///
/// Returns [`ErrorKind::ConfigUnavailable`] when `alternatives` is empty or
/// when every alternative mismatches the stereo or double buffering mode of
/// `desired`.
pub fn choose_fb_config<'a>(
    desired: &FramebufferConfig,
    alternatives: &'a [FramebufferConfig],
) -> Result<&'a FramebufferConfig> {
    debug_assert!(
        alternatives.iter().all(FramebufferConfig::is_concrete),
        "enumerated framebuffer configs must not use DONT_CARE"
    );

    let (cost, closest) = alternatives
        .iter()
        .map(|alternative| (alternative.cost_against(desired), alternative))
        .min_by_key(|&(cost, _)| cost)
        .ok_or(ErrorKind::ConfigUnavailable)?;

    if cost >= HARD_MISMATCH {
        return Err(ErrorKind::ConfigUnavailable.into());
    }

    debug!("picked framebuffer config {:#x} with cost {cost}", closest.handle);
    Ok(closest)
}

/// Builder for a desired [`FramebufferConfig`].
#[derive(Debug, Default, Clone)]
pub struct FramebufferConfigBuilder {
    config: FramebufferConfig,
}

impl FramebufferConfigBuilder {
    /// Create a new builder starting from the default RGBA8, D24S8, double
    /// buffered config.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Sizes of the color channels.
    #[inline]
    pub fn with_color_bits(mut self, red: i32, green: i32, blue: i32, alpha: i32) -> Self {
        self.config.red_bits = red;
        self.config.green_bits = green;
        self.config.blue_bits = blue;
        self.config.alpha_bits = alpha;
        self
    }

    /// Number of bits in the depth buffer.
    ///
    /// By default `24` is requested.
    #[inline]
    pub fn with_depth_bits(mut self, depth_bits: i32) -> Self {
        self.config.depth_bits = depth_bits;
        self
    }

    /// Number of bits in the stencil buffer.
    ///
    /// By default `8` is requested.
    #[inline]
    pub fn with_stencil_bits(mut self, stencil_bits: i32) -> Self {
        self.config.stencil_bits = stencil_bits;
        self
    }

    /// Sizes of the accumulation buffer channels.
    #[inline]
    pub fn with_accum_bits(mut self, red: i32, green: i32, blue: i32, alpha: i32) -> Self {
        self.config.accum_red_bits = red;
        self.config.accum_green_bits = green;
        self.config.accum_blue_bits = blue;
        self.config.accum_alpha_bits = alpha;
        self
    }

    /// Number of auxiliary buffers.
    #[inline]
    pub fn with_aux_buffers(mut self, aux_buffers: i32) -> Self {
        self.config.aux_buffers = aux_buffers;
        self
    }

    /// Number of samples in the multisample buffer. `0` disables
    /// multisampling.
    #[inline]
    pub fn with_multisampling(mut self, samples: i32) -> Self {
        self.config.samples = samples;
        self
    }

    /// Whether stereo pairs must be present.
    #[inline]
    pub fn with_stereo(mut self, stereo: bool) -> Self {
        self.config.stereo = stereo;
        self
    }

    /// Whether an sRGB capable color buffer is preferred.
    #[inline]
    pub fn with_srgb(mut self, srgb: bool) -> Self {
        self.config.srgb = srgb;
        self
    }

    /// Whether the config must be double buffered.
    ///
    /// By default `true` is requested.
    #[inline]
    pub fn with_doublebuffer(mut self, doublebuffer: bool) -> Self {
        self.config.doublebuffer = doublebuffer;
        self
    }

    /// Build the desired config to match the alternatives against.
    #[must_use]
    pub fn build(self) -> FramebufferConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DONT_CARE: i32 = FramebufferConfig::DONT_CARE;

    fn alternative(handle: usize) -> FramebufferConfig {
        FramebufferConfig { handle, ..Default::default() }
    }

    #[test]
    fn exact_depth_with_doublebuffer_wins() {
        let desired = FramebufferConfig::default();
        let alternatives = [
            FramebufferConfig { depth_bits: 16, ..alternative(1) },
            FramebufferConfig { depth_bits: 24, ..alternative(2) },
            FramebufferConfig { depth_bits: 32, doublebuffer: false, ..alternative(3) },
        ];

        let chosen = choose_fb_config(&desired, &alternatives).unwrap();
        assert_eq!(chosen.handle, 2);
        assert!(std::ptr::eq(chosen, &alternatives[1]));
    }

    #[test]
    fn selection_is_deterministic() {
        let desired = FramebufferConfigBuilder::new().with_multisampling(4).build();
        let alternatives = [
            FramebufferConfig { samples: 2, ..alternative(1) },
            FramebufferConfig { samples: 8, ..alternative(2) },
            FramebufferConfig { samples: 0, ..alternative(3) },
        ];

        let first = choose_fb_config(&desired, &alternatives).unwrap().handle;
        for _ in 0..16 {
            assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, first);
        }
    }

    #[test]
    fn dont_care_zeroes_a_single_attribute() {
        let desired = FramebufferConfig::default();
        let relaxed = FramebufferConfig { stencil_bits: DONT_CARE, ..desired };
        let alternatives = [
            FramebufferConfig { stencil_bits: 0, depth_bits: 32, ..alternative(1) },
            FramebufferConfig { stencil_bits: 8, depth_bits: 16, ..alternative(2) },
            FramebufferConfig { stencil_bits: 16, ..alternative(3) },
        ];

        for alt in &alternatives {
            let full = alt.cost_against(&desired);
            let without_stencil = alt.cost_against(&relaxed);
            let stencil = channel_cost(desired.stencil_bits, alt.stencil_bits);
            assert_eq!(full - without_stencil, stencil);

            let stencil_only = FramebufferConfig { stencil_bits: alt.stencil_bits, ..desired };
            assert_eq!(stencil_only.cost_against(&relaxed), 0);
        }
    }

    #[test]
    fn dont_care_fields_are_independent() {
        let desired = FramebufferConfig {
            red_bits: DONT_CARE,
            green_bits: DONT_CARE,
            blue_bits: DONT_CARE,
            alpha_bits: DONT_CARE,
            depth_bits: 24,
            ..Default::default()
        };
        let rgb565 = |depth_bits, handle| FramebufferConfig {
            red_bits: 5,
            green_bits: 6,
            blue_bits: 5,
            alpha_bits: 0,
            depth_bits,
            ..alternative(handle)
        };
        let alternatives = [rgb565(16, 1), rgb565(24, 2)];

        assert_eq!(alternatives[1].cost_against(&desired), 0);
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);
    }

    #[test]
    fn dont_care_samples_and_aux_buffers() {
        let desired = FramebufferConfig {
            samples: DONT_CARE,
            aux_buffers: DONT_CARE,
            ..Default::default()
        };
        let alternatives = [
            FramebufferConfig { samples: 0, aux_buffers: 2, ..alternative(1) },
            FramebufferConfig { samples: 4, ..alternative(2) },
        ];

        assert_eq!(alternatives[0].cost_against(&desired), 0);
        assert_eq!(alternatives[1].cost_against(&desired), 0);
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 1);
    }

    #[test]
    fn under_provisioned_depth_is_never_preferred() {
        let desired = FramebufferConfig::default();
        for depth in [24, 32] {
            let alternatives = [
                FramebufferConfig { depth_bits: 16, ..alternative(1) },
                FramebufferConfig { depth_bits: depth, ..alternative(2) },
            ];
            assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);
        }

        // Even when the lower one is much closer.
        let desired = FramebufferConfigBuilder::new().with_depth_bits(24).build();
        let alternatives = [
            FramebufferConfig { depth_bits: 23, ..alternative(1) },
            FramebufferConfig { depth_bits: 32, ..alternative(2) },
        ];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);
    }

    #[test]
    fn stereo_is_a_hard_requirement() {
        let desired = FramebufferConfigBuilder::new().with_stereo(true).build();
        let alternatives = [
            FramebufferConfig { depth_bits: 24, ..alternative(1) },
            FramebufferConfig { stereo: true, depth_bits: 16, red_bits: 4, ..alternative(2) },
        ];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);
        assert!(!alternatives[0].meets_hard_requirements(&desired));
        assert!(alternatives[1].meets_hard_requirements(&desired));

        let mono_only = [alternative(1), alternative(3)];
        let err = choose_fb_config(&desired, &mono_only).unwrap_err();
        assert_eq!(err.error_kind(), ErrorKind::ConfigUnavailable);
    }

    #[test]
    fn doublebuffer_mismatch_is_unavailable() {
        let desired = FramebufferConfigBuilder::new().with_doublebuffer(false).build();
        let alternatives = [alternative(1), alternative(2)];
        let err = choose_fb_config(&desired, &alternatives).unwrap_err();
        assert_eq!(err.error_kind(), ErrorKind::ConfigUnavailable);
    }

    #[test]
    fn empty_alternatives_are_unavailable() {
        let err = choose_fb_config(&FramebufferConfig::default(), &[]).unwrap_err();
        assert_eq!(err.error_kind(), ErrorKind::ConfigUnavailable);
    }

    #[test]
    fn srgb_is_a_soft_preference() {
        let desired = FramebufferConfigBuilder::new().with_srgb(true).build();
        let alternatives = [alternative(1), FramebufferConfig { srgb: true, ..alternative(2) }];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);

        // Losing depth bits weighs more than missing sRGB.
        let alternatives = [
            FramebufferConfig { srgb: true, depth_bits: 16, ..alternative(1) },
            alternative(2),
        ];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);
    }

    #[test]
    fn missing_multisampling_weighs_most() {
        let desired = FramebufferConfigBuilder::new().with_multisampling(4).build();
        let alternatives = [
            FramebufferConfig { samples: 0, ..alternative(1) },
            FramebufferConfig { samples: 16, ..alternative(2) },
        ];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);

        let desired = FramebufferConfig::default();
        let alternatives = [
            FramebufferConfig { samples: 2, ..alternative(1) },
            FramebufferConfig { samples: 0, ..alternative(2) },
        ];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 2);
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        let desired = FramebufferConfig::default();
        let alternatives = [
            FramebufferConfig { depth_bits: 32, ..alternative(1) },
            FramebufferConfig { depth_bits: 32, ..alternative(2) },
        ];
        assert_eq!(choose_fb_config(&desired, &alternatives).unwrap().handle, 1);
    }

    #[test]
    fn concreteness() {
        assert!(FramebufferConfig::default().is_concrete());
        let desired = FramebufferConfig { samples: DONT_CARE, ..Default::default() };
        assert!(!desired.is_concrete());
    }
}
