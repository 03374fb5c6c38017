// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use minijinja::{Environment, Error as MiniJinjaError};
use serde::Serialize;

pub const BASE_LAYOUT: &str = "layouts/base.html";
pub const INDEX_PAGE: &str = "pages/index.html";
pub const MAILS_PAGE: &str = "pages/mails.html";
pub const INBOX_PARTIAL: &str = "partials/inbox.html";
pub const TIME_PARTIAL: &str = "partials/time-update.html";

/// Templates compiled into the binary.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, MiniJinjaError> {
        let mut env = Environment::new();
        env.add_template(BASE_LAYOUT, include_str!("../../templates/layouts/base.html"))?;
        env.add_template(INDEX_PAGE, include_str!("../../templates/pages/index.html"))?;
        env.add_template(MAILS_PAGE, include_str!("../../templates/pages/mails.html"))?;
        env.add_template(INBOX_PARTIAL, include_str!("../../templates/partials/inbox.html"))?;
        env.add_template(TIME_PARTIAL, include_str!("../../templates/partials/time-update.html"))?;
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, MiniJinjaError> {
        self.env.get_template(name)?.render(context)
    }
}
