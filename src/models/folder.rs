// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// One entry of a LIST response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MailboxSummary {
    pub name: String,
    pub attributes: Vec<String>,
}

impl MailboxSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// `\Noselect` mailboxes exist only as hierarchy nodes.
    pub fn is_selectable(&self) -> bool {
        !self
            .attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case("\\Noselect"))
    }
}
