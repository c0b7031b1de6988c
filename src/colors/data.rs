use serde::{Deserialize, Serialize};

pub type ColorID = i64;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Color {
    pub id: ColorID,
    pub name: String,
    pub hex: String,
}
