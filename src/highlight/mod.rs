// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

mod locator;
mod navigator;

pub use locator::{css_escape, HighlightLocator, LocateStrategy};
pub use navigator::{
    Fallback, Flash, HighlightOptions, HighlightOutcome, HighlightReport, NavigationHighlighter,
};
