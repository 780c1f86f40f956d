// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Backend-agnostic API data for the frame pipelining core.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`handle`]**: Opaque resource IDs and the fence value type.
//! - **[`descriptor`]**: Upload buffer descriptors and alignment helpers.
//! - **[`constants`]**: GPU-side constant layouts uploaded each frame.

pub mod constants;
pub mod descriptor;
pub mod handle;

pub use constants::*;
pub use descriptor::*;
pub use handle::*;
