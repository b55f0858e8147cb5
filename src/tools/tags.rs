/// Tools for managing tags
///
/// This module implements the tag_create, tag_list and tag_delete MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Tag, TagId};
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{ToolContext, ToolError};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTagParams {
    /// Unique tag name (1-50 characters)
    pub name: String,
}

/// tag_list takes no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListTagsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTagParams {
    /// ID of the tag to delete
    pub tag_id: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub success: bool,
    pub tag: Tag,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListTagsResponse {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct DeleteTagResponse {
    pub success: bool,
    pub message: String,
}

pub fn create_tag<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: CreateTagParams,
) -> Result<TagResponse, ToolError> {
    let tag = Tag::new(&params.name)?;
    ctx.storage.create_tag(&tag)?;
    tracing::info!("Created tag '{}' ({})", tag.name, tag.id);

    let message = format!("Created tag '{}'", tag.name);
    Ok(TagResponse {
        success: true,
        tag,
        message,
    })
}

pub fn list_tags<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    _params: ListTagsParams,
) -> Result<ListTagsResponse, ToolError> {
    Ok(ListTagsResponse {
        tags: ctx.storage.list_tags()?,
    })
}

/// Delete a tag; habits keep existing but lose the tag
pub fn delete_tag<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: DeleteTagParams,
) -> Result<DeleteTagResponse, ToolError> {
    let tag_id = TagId::parse(&params.tag_id)?;
    let tag = ctx.storage.get_tag(&tag_id)?;
    ctx.storage.delete_tag(&tag_id)?;
    tracing::info!("Deleted tag '{}' ({})", tag.name, tag.id);

    Ok(DeleteTagResponse {
        success: true,
        message: format!("Deleted tag '{}'", tag.name),
    })
}
