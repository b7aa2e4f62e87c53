// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Low-level byte interpretation shared by every decoder.
//!
//! - [`view`] - static field layouts, flag sets and packed tuples
//! - [`bounded`] - the bounded sub-stream used to fence child decoders
//! - [`text`] - zstring decoding in the configured 8-bit encoding
//! - [`compression`] - zlib record bodies

pub mod bounded;
pub mod compression;
pub mod text;
pub mod view;

pub use bounded::BoundedReader;
pub use view::{FieldKind, FieldSpec, FlagSet, Flags, Layout, Scalar, StructView, TupleFormat};
