// Copyright 2025 Fernando Borretti
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

//! Spaced-repetition scheduling and a unified review queue for flashcards
//! and missed exam questions.

pub mod cli;
mod cmd;
pub mod config;
pub mod error;
#[cfg(test)]
mod helper;
pub mod queue;
pub mod recorder;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod stats;
pub mod types;
