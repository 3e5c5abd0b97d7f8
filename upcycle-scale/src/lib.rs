// SPDX-License-Identifier: MIT
//! # upcycle-scale: Photo Scaling for Model Payloads and Result Cards
//!
//! Phone photos are routinely 12+ megapixels. A multimodal model does not need
//! that much detail to tell a chair from a cabinet, and every extra pixel costs
//! upload time and input tokens. This crate computes aspect-preserving scaling
//! plans and executes them on the CPU with `fast_image_resize`.
//!
//! ## Key Components
//!
//! - [`presets`]: Scaling plan computation and the photo size presets
//! - [`cpu`]: RGB8 scaling (SIMD-accelerated) into caller-provided buffers
//!
//! ## Usage Example
//!
//! ```rust
//! use upcycle_scale::{cpu::scale_rgb_cpu, presets::{build_plan, AspectMode, PhotoPreset, Size}};
//!
//! let input = Size { w: 40, h: 20 };
//! let src = vec![128u8; (input.w * input.h * 3) as usize];
//! let plan = build_plan(input, PhotoPreset::Small.to_target(), AspectMode::Preserve);
//!
//! let mut resizer = fast_image_resize::Resizer::new();
//! let mut out = vec![0u8; plan.out_len()];
//! scale_rgb_cpu(&mut resizer, &src, input, &plan, &mut out).unwrap();
//! ```

pub mod cpu;
pub mod presets;
