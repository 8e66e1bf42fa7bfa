use serde::{Deserialize, Serialize};

pub use crate::{db::Theme, view::View};

use crate::view::Controller;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub view: View,
    pub theme: Theme,
    pub login_error: Option<String>,
    pub summary: Option<String>,
    pub generating_summary: bool,
}

impl From<&Controller> for State {
    fn from(controller: &Controller) -> Self {
        Self {
            view: controller.view(),
            theme: controller.theme(),
            login_error: controller.login_error().map(|e| e.to_string()),
            summary: controller.summary().map(str::to_owned),
            generating_summary: controller.is_generating_summary(),
        }
    }
}
