// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for annotation folders on disk.
//!
//! A folder holds the workspace snapshot, the linking annotations and an optional config file,
//! all JSON. Used by the CLI and the end-to-end tests.

pub mod annotation_folder;

pub use annotation_folder::{annotation_schema, AnnotationFolder, StoreError, WriteDurability};
