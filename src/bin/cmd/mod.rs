// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod export;
mod inspect;
mod topics;

pub use export::ExportCmd;
pub use inspect::InspectCmd;
pub use topics::TopicsCmd;
