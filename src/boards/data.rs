use serde::{Deserialize, Serialize};

use crate::auth::data::UserSummary;
use crate::templates::data::{Column, TemplateID};

pub type BoardID = i64;

#[derive(Serialize, Debug)]
pub struct Board {
    pub id: BoardID,
    pub name: String,
    pub creator: UserSummary,
    pub members: Vec<UserSummary>,
    pub columns: Vec<Column>,
    pub created_at: String,
}

#[derive(Serialize, Debug)]
pub struct BoardSummary {
    pub id: BoardID,
    pub name: String,
    pub created_at: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateBoardRequest {
    pub name: String,
    pub template_id: TemplateID,
}

#[derive(Serialize, Debug)]
pub struct AddBoardResult {
    pub board_id: BoardID,
}

#[derive(Deserialize, Debug)]
pub struct AddMemberRequest {
    pub username: String,
}
