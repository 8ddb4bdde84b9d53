// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! External collaborators and their in-process implementations.

pub mod traits;
pub mod memory;
pub mod queue;
pub mod events;
