// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod catalog;
pub mod collection;
pub mod user;

pub use catalog::{Artist, Artwork};
pub use collection::{CollectionName, CollectionWithDetails, MemberKind, UserCollection};
pub use user::{Identity, Preferences, ProfileUpdate, UserProfile};
