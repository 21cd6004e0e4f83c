// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every lookup of an entity is scoped to an organization: a row owned by
//! another organization is reported as not found.

pub mod assignments;
pub mod directory;
pub mod events;
pub mod sessions;
pub mod swaps;
