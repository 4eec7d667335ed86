use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{FAVORITE_FIELDS, PAGE_INFO};
use super::{parse_choice, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, success_at};
use crate::transport::client::LinearClient;
use crate::transport::values::clean_object;

const LIST_FAVORITES_QUERY: &str = concatcp!(
    r#"
query ListFavorites($first: Int, $after: String) {
    favorites(first: $first, after: $after) {
        nodes {"#,
    FAVORITE_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const CREATE_FAVORITE_MUTATION: &str = concatcp!(
    r#"
mutation CreateFavorite($input: FavoriteCreateInput!) {
    favoriteCreate(input: $input) {
        success
        favorite {"#,
    FAVORITE_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_FAVORITE_MUTATION: &str = r#"
mutation DeleteFavorite($id: String!) {
    favoriteDelete(id: $id) {
        success
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListFavorites,
    CreateFavorite,
    DeleteFavorite,
}

/// What a favorite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FavoriteType {
    Issue,
    Project,
    Cycle,
    Label,
    User,
}

impl FavoriteType {
    /// The parameter, and the input field, holding the target's id.
    fn id_field(self) -> &'static str {
        match self {
            FavoriteType::Issue => "issueId",
            FavoriteType::Project => "projectId",
            FavoriteType::Cycle => "cycleId",
            FavoriteType::Label => "labelId",
            FavoriteType::User => "userId",
        }
    }
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListFavorites => {
            let favorites = client
                .paginate(LIST_FAVORITES_QUERY, json!({}), "favorites", params.page_limit()?)
                .await?;
            return Ok(wrap_list("favorites", favorites));
        }
        Operation::CreateFavorite => {
            let favorite_type: FavoriteType =
                parse_choice("favoriteType", params.required_str("favoriteType")?)?;
            let id_field = favorite_type.id_field();

            let mut input = clean_object(&params.collection("additionalFields")?);
            input.insert(
                id_field.to_string(),
                Value::String(params.required_str(id_field)?.to_string()),
            );
            let data = client
                .request(CREATE_FAVORITE_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "favoriteCreate.favorite")?
        }
        Operation::DeleteFavorite => {
            let data = client
                .request(
                    DELETE_FAVORITE_MUTATION,
                    json!({ "id": params.required_str("favoriteId")? }),
                )
                .await?;
            success_at(&data, "favoriteDelete")?
        }
    };

    Ok(NodeOutput::Item(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinearError;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, request_bodies, respond_with_data};
    use wiremock::MockServer;

    async fn run(server: &MockServer, input: Value) -> Result<NodeOutput> {
        let items = JsonItems::from_value(input).unwrap();
        execute(&client(server), Operation::CreateFavorite, &ItemParams::new(&items, 0)).await
    }

    #[tokio::test]
    async fn favorite_type_selects_the_id_field() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "favoriteCreate": { "success": true, "favorite": { "id": "f1" } } }),
        )
        .await;

        run(
            &server,
            json!({ "favoriteType": "cycle", "cycleId": "cy1", "issueId": "ignored" }),
        )
        .await
        .unwrap();

        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({ "cycleId": "cy1" })
        );
    }

    #[tokio::test]
    async fn unknown_favorite_type_is_rejected() {
        let server = MockServer::start().await;
        let err = run(&server, json!({ "favoriteType": "roadmap" })).await.unwrap_err();
        assert!(matches!(err, LinearError::InvalidParameter { name, .. } if name == "favoriteType"));
    }

    #[tokio::test]
    async fn target_id_is_required() {
        let server = MockServer::start().await;
        let err = run(&server, json!({ "favoriteType": "label" })).await.unwrap_err();
        assert!(matches!(err, LinearError::MissingParameter(name) if name == "labelId"));
    }
}
