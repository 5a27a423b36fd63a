// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Anchorlink: text-selection anchoring and cross-document links.
//!
//! A user's selection is segmented into element-addressed anchors ([`segment`]), two anchors
//! are composed into a linking annotation ([`linking`]), links are resolved into per-document
//! navigation options ([`resolve`]) and the destination is flashed on screen ([`highlight`]).

pub mod config;
pub mod dom;
pub mod highlight;
pub mod input;
pub mod linking;
pub mod model;
pub mod resolve;
pub mod retry;
pub mod segment;
pub mod store;
pub mod surface;
