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

//! # Kyklos Infra
//!
//! Concrete implementations of the `kyklos-core` GPU contracts. The only
//! backend currently provided is the software execution timeline: a worker
//! thread that consumes submitted work strictly in order and signals fence
//! values, faithfully reproducing the observable behavior of a GPU queue
//! without any graphics hardware.

pub mod gpu;

pub use gpu::software::{SoftwareDevice, SoftwareFence, SoftwareGpu, SoftwareGpuDesc, SoftwareQueue};
