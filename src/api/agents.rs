/// Public agent directory
use crate::{
    api::ApiResponse, context::AppContext, error::HubResult, hostels::PublicAgent,
};
use axum::{extract::State, routing::get, Router};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/agents", get(list_agents))
}

async fn list_agents(State(ctx): State<AppContext>) -> HubResult<ApiResponse<Vec<PublicAgent>>> {
    let agents = ctx.hostel_manager.list_public_agents().await?;
    Ok(ApiResponse::data(agents))
}
