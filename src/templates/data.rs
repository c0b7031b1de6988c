use serde::{Deserialize, Serialize};

pub type TemplateID = i64;

/// A workflow stage. Boards copy their columns from a template at creation
/// time; a task's `status` field holds the `id` of one of these.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub color: String,
    pub order: i64,
}

#[derive(Serialize, Debug)]
pub struct Template {
    pub id: TemplateID,
    pub name: String,
    pub columns: Vec<Column>,
}

#[derive(Deserialize, Debug)]
pub struct ColumnSpec {
    pub id: String,
    pub title: String,
    pub color: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Serialize, Debug)]
pub struct AddTemplateResult {
    pub template_id: TemplateID,
}
