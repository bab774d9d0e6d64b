use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct DeleteParams {
    /// Deletion is irreversible; the caller must confirm it explicitly.
    #[serde(default)]
    pub confirm: bool,
}
