// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod action;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod schemas;
pub mod state;
pub mod store;

pub use action::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use state::*;
pub use store::*;
