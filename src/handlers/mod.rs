pub mod courses;
pub mod lessons;
pub mod modules;

use serde::Deserialize;

/// Query string shared by the progress endpoints: ?userId=...
#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}
